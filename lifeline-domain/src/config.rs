//! Application configuration
//!
//! Every setting comes from the process environment (after `.env` has been
//! loaded by the binary). Unset variables fall back to defaults; set but
//! unparsable numbers are rejected at startup.

use std::env;
use std::str::FromStr;

use thiserror::Error;
use tracing::info;

use lifeline_data::database::{DatabaseConfig, DatabaseError, DatabaseType};

use crate::llm::GeminiConfig;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable is set to a value that cannot be used
    #[error("Invalid value for {name}: '{value}'")]
    Invalid { name: &'static str, value: String },

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Token settings
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HS256 signing secret; requests needing auth fail while unset
    pub secret: Option<String>,
    pub expiration_hours: i64,
}

/// Where uploaded files live and how they are addressed
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub dir: String,
    pub public_url: String,
}

/// Conversational agent limits
#[derive(Debug, Clone, Copy)]
pub struct AgentConfig {
    /// Messages kept per user before the oldest are dropped
    pub memory_max_messages: usize,
    /// Model calls allowed for one chat turn
    pub max_steps: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            memory_max_messages: 50,
            max_steps: 5,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub storage: StorageConfig,
    pub gemini: GeminiConfig,
    pub tesseract_cmd: String,
    pub agent: AgentConfig,
}

impl AppConfig {
    /// Build the configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let port = vars.parse("PORT", 3000u16)?;

        let database_defaults = DatabaseConfig::default();
        let db_type = match vars.get("DB_TYPE") {
            Some(raw) => DatabaseType::parse(&raw)?,
            None => database_defaults.db_type,
        };
        let database = DatabaseConfig {
            db_type,
            sqlite_path: vars.get("DB_SQLITE_PATH").unwrap_or(database_defaults.sqlite_path),
            pool_size: vars.parse("DB_POOL_SIZE", database_defaults.pool_size)?,
            timeout_seconds: vars.parse("DB_TIMEOUT_SECONDS", database_defaults.timeout_seconds)?,
        };

        let jwt = JwtConfig {
            secret: vars.get("JWT_SECRET").filter(|s| !s.is_empty()),
            expiration_hours: vars.parse("JWT_EXPIRATION_HOURS", 24i64)?,
        };

        let storage = StorageConfig {
            dir: vars.get("STORAGE_DIR").unwrap_or_else(|| "data/storage".to_string()),
            public_url: vars
                .get("PUBLIC_FILES_URL")
                .unwrap_or_else(|| format!("http://localhost:{}/files", port)),
        };

        let mut gemini = GeminiConfig::new(vars.get("GEMINI_API_KEY").unwrap_or_default())
            .with_timeout(vars.parse("GEMINI_TIMEOUT_MS", 30_000u64)?);
        if let Some(model) = vars.get("GEMINI_MODEL") {
            gemini = gemini.with_model(model);
        }
        if let Some(api_base) = vars.get("GEMINI_API_BASE") {
            gemini = gemini.with_api_base(api_base);
        }

        let agent_defaults = AgentConfig::default();
        let agent = AgentConfig {
            memory_max_messages: vars.parse("AGENT_MEMORY_MAX_MESSAGES", agent_defaults.memory_max_messages)?,
            max_steps: vars.parse("AGENT_MAX_STEPS", agent_defaults.max_steps)?,
        };

        let config = Self {
            port,
            database,
            jwt,
            storage,
            gemini,
            tesseract_cmd: vars.get("TESSERACT_CMD").unwrap_or_else(|| "tesseract".to_string()),
            agent,
        };

        info!(
            "Configuration loaded: port={}, db={:?}, model={}, jwt_secret_set={}",
            config.port,
            config.database.db_type,
            config.gemini.model,
            config.jwt.secret.is_some()
        );

        Ok(config)
    }
}

struct Vars<F>(F);

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn get(&self, name: &str) -> Option<String> {
        (self.0)(name)
    }

    fn parse<T: FromStr>(&self, name: &'static str, default: T) -> Result<T, ConfigError> {
        match self.get(name) {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { name, value }),
            None => Ok(default),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.database.db_type, DatabaseType::Sqlite);
        assert_eq!(config.database.sqlite_path, "data/lifeline.db");
        assert!(config.jwt.secret.is_none());
        assert_eq!(config.jwt.expiration_hours, 24);
        assert_eq!(config.storage.public_url, "http://localhost:3000/files");
        assert_eq!(config.gemini.model, "gemini-pro");
        assert_eq!(config.tesseract_cmd, "tesseract");
        assert_eq!(config.agent.memory_max_messages, 50);
        assert_eq!(config.agent.max_steps, 5);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("DB_TYPE", "memory"),
            ("JWT_SECRET", "s3cret"),
            ("GEMINI_MODEL", "gemini-1.5-flash"),
            ("AGENT_MAX_STEPS", "3"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.database.db_type, DatabaseType::Memory);
        assert_eq!(config.jwt.secret.as_deref(), Some("s3cret"));
        assert_eq!(config.storage.public_url, "http://localhost:8080/files");
        assert_eq!(config.gemini.model, "gemini-1.5-flash");
        assert_eq!(config.agent.max_steps, 3);
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        let result = config_from(&[("DB_POOL_SIZE", "lots")]);
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { name: "DB_POOL_SIZE", .. })
        ));

        assert!(matches!(
            config_from(&[("DB_TYPE", "oracle")]),
            Err(ConfigError::Database(DatabaseError::UnsupportedDatabaseType(_)))
        ));
    }
}
