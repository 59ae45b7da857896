//! Database connection module for the Lifeline application
//!
//! SQLite is the only backend. A file-backed pool is used in production and
//! a single-connection in-memory pool for tests and throwaway runs.

use std::path::Path;
use std::time::Duration;

use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use tracing::{debug, info};

use super::migrations::run_sqlite_migrations;
use super::DatabaseError;

/// Connection pool shared by all repositories
pub type DatabasePool = r2d2::Pool<SqliteConnectionManager>;

/// Supported database types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    /// SQLite database (file-based)
    Sqlite,
    /// SQLite database held in memory, lost on shutdown
    Memory,
}

impl DatabaseType {
    /// Convert from string to database type
    pub fn parse(s: &str) -> Result<Self, DatabaseError> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(DatabaseType::Sqlite),
            "memory" | "in-memory" => Ok(DatabaseType::Memory),
            _ => Err(DatabaseError::UnsupportedDatabaseType(s.to_string())),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database type (sqlite, memory)
    pub db_type: DatabaseType,
    /// Path to SQLite database file
    pub sqlite_path: String,
    /// Maximum number of pooled connections
    pub pool_size: u32,
    /// Connection timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DatabaseType::Sqlite,
            sqlite_path: "data/lifeline.db".to_string(),
            pool_size: 10,
            timeout_seconds: 30,
        }
    }
}

impl DatabaseConfig {
    /// Configuration for an in-memory database
    pub fn in_memory() -> Self {
        Self {
            db_type: DatabaseType::Memory,
            pool_size: 1,
            ..Self::default()
        }
    }
}

/// Create the connection pool described by `config` and run migrations
pub fn create_pool(config: &DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    let pool = match config.db_type {
        DatabaseType::Sqlite => create_sqlite_pool(config)?,
        DatabaseType::Memory => create_in_memory_pool(config)?,
    };

    let conn = pool.get()?;
    run_sqlite_migrations(&conn).map_err(DatabaseError::Migration)?;

    Ok(pool)
}

/// Initialize SQLite connection pool
fn create_sqlite_pool(config: &DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    info!("Initializing SQLite database at: {}", config.sqlite_path);

    if let Some(parent) = Path::new(&config.sqlite_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            info!("Creating parent directory: {:?}", parent);
            std::fs::create_dir_all(parent)?;
        }
    }

    let manager = SqliteConnectionManager::file(&config.sqlite_path)
        .with_flags(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE)
        .with_init(|conn| conn.busy_timeout(Duration::from_secs(5)));

    let pool = r2d2::Pool::builder()
        .max_size(config.pool_size)
        .connection_timeout(Duration::from_secs(config.timeout_seconds))
        .build(manager)?;

    info!("SQLite connection pool created successfully");
    Ok(pool)
}

/// Initialize an in-memory SQLite database
///
/// Each in-memory connection is its own database, so the pool holds
/// exactly one connection.
fn create_in_memory_pool(config: &DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    info!("Initializing in-memory SQLite database");

    let pool = r2d2::Pool::builder()
        .max_size(1)
        .connection_timeout(Duration::from_secs(config.timeout_seconds))
        .build(SqliteConnectionManager::memory())?;

    Ok(pool)
}

/// Check that a pooled connection can run a trivial query
pub fn ping(pool: &DatabasePool) -> Result<(), DatabaseError> {
    let conn = pool.get()?;
    conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
    debug!("Database ping succeeded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_database_type() {
        assert_eq!(DatabaseType::parse("SQLite").unwrap(), DatabaseType::Sqlite);
        assert_eq!(DatabaseType::parse("memory").unwrap(), DatabaseType::Memory);
        assert!(matches!(
            DatabaseType::parse("oracle"),
            Err(DatabaseError::UnsupportedDatabaseType(_))
        ));
    }

    #[test]
    fn test_in_memory_pool_is_migrated() {
        let pool = create_pool(&DatabaseConfig::in_memory()).unwrap();
        ping(&pool).unwrap();

        let conn = pool.get().unwrap();
        let exists: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'emergencies'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(exists, 1);
    }

    #[test]
    fn test_file_pool_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("lifeline.db");
        let config = DatabaseConfig {
            sqlite_path: path.to_string_lossy().to_string(),
            pool_size: 2,
            ..DatabaseConfig::default()
        };

        let pool = create_pool(&config).unwrap();
        ping(&pool).unwrap();
        assert!(path.exists());
    }
}
