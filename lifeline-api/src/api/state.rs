use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::FromRef;

use lifeline_data::database::DatabasePool;
use lifeline_data::models::{Appointment, BloodRequest, Emergency, HealthRecord, Medicine, Report};
use lifeline_data::repository::SqliteUserRepository;
use lifeline_data::storage::LocalObjectStore;
use lifeline_domain::agent::{AgentTools, ConversationMemory, HealthAgent};
use lifeline_domain::auth::TokenService;
use lifeline_domain::config::{AgentConfig, AppConfig};
use lifeline_domain::health::{HealthService, HealthServiceTrait};
use lifeline_domain::llm::{GeminiClient, LanguageModel, LlmError};
use lifeline_domain::ocr::{TesseractExtractor, TextExtractor};
use lifeline_domain::services::{RecordService, ReportService, UserService};

/// Shared services handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub tokens: TokenService,
    pub users: UserService,
    pub health_records: RecordService<HealthRecord>,
    pub medicines: RecordService<Medicine>,
    pub appointments: RecordService<Appointment>,
    pub reports: RecordService<Report>,
    pub blood_requests: RecordService<BloodRequest>,
    pub emergencies: RecordService<Emergency>,
    pub report_files: ReportService,
    pub agent: Arc<HealthAgent>,
    pub health: Arc<dyn HealthServiceTrait>,
    /// Directory served under `/files`
    pub files_root: PathBuf,
}

impl AppState {
    /// Wire every service over one database pool
    pub fn new(
        pool: DatabasePool,
        tokens: TokenService,
        store: LocalObjectStore,
        ocr: Arc<dyn TextExtractor>,
        model: Arc<dyn LanguageModel>,
        agent: AgentConfig,
    ) -> Self {
        let medicines = RecordService::<Medicine>::sqlite(pool.clone());
        let appointments = RecordService::<Appointment>::sqlite(pool.clone());
        let reports = RecordService::<Report>::sqlite(pool.clone());

        let tools = AgentTools::new(reports.repository(), medicines.repository(), appointments.repository());
        let health_agent = HealthAgent::new(
            tools,
            model.clone(),
            ConversationMemory::new(agent.memory_max_messages),
            agent.max_steps,
        );

        let files_root = store.root().to_path_buf();
        let report_files = ReportService::new(reports.repository(), Arc::new(store), ocr, model);

        Self {
            users: UserService::new(Arc::new(SqliteUserRepository::new(pool.clone())), tokens.clone()),
            tokens,
            health_records: RecordService::sqlite(pool.clone()),
            medicines,
            appointments,
            reports,
            blood_requests: RecordService::sqlite(pool.clone()),
            emergencies: RecordService::sqlite(pool.clone()),
            report_files,
            agent: Arc::new(health_agent),
            health: Arc::new(HealthService::new(pool)),
            files_root,
        }
    }

    /// Production wiring: Gemini, tesseract and the given file store
    pub fn from_config(
        config: &AppConfig,
        pool: DatabasePool,
        store: LocalObjectStore,
    ) -> Result<Self, LlmError> {
        let model = GeminiClient::new(config.gemini.clone())?;

        Ok(Self::new(
            pool,
            TokenService::new(&config.jwt),
            store,
            Arc::new(TesseractExtractor::new(&config.tesseract_cmd)),
            Arc::new(model),
            config.agent,
        ))
    }

    pub fn with_health_service(mut self, health: Arc<dyn HealthServiceTrait>) -> Self {
        self.health = health;
        self
    }
}

macro_rules! from_ref {
    ($($field:ident: $ty:ty),* $(,)?) => {
        $(
            impl FromRef<AppState> for $ty {
                fn from_ref(state: &AppState) -> Self {
                    state.$field.clone()
                }
            }
        )*
    };
}

from_ref!(
    tokens: TokenService,
    users: UserService,
    health_records: RecordService<HealthRecord>,
    medicines: RecordService<Medicine>,
    appointments: RecordService<Appointment>,
    reports: RecordService<Report>,
    blood_requests: RecordService<BloodRequest>,
    emergencies: RecordService<Emergency>,
    report_files: ReportService,
    agent: Arc<HealthAgent>,
    health: Arc<dyn HealthServiceTrait>,
);
