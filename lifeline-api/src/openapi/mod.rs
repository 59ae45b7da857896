use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::handlers::{agent, health, records, reports, users};

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}

/// Registers the bearer scheme referenced by protected paths
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        health::root,
        health::health_check,

        // Users
        users::register,
        users::login,
        users::me,
        users::update_me,
        users::delete_me,

        // Owned records
        records::health_records::create,
        records::health_records::list,
        records::health_records::get,
        records::health_records::update,
        records::health_records::delete,
        records::medicines::create,
        records::medicines::list,
        records::medicines::get,
        records::medicines::update,
        records::medicines::delete,
        records::appointments::create,
        records::appointments::list,
        records::appointments::get,
        records::appointments::update,
        records::appointments::delete,
        records::reports::create,
        records::reports::list,
        records::reports::get,
        records::reports::update,
        records::reports::delete,
        records::blood_requests::create,
        records::blood_requests::list,
        records::blood_requests::get,
        records::blood_requests::update,
        records::blood_requests::delete,
        records::emergencies::create,
        records::emergencies::list,
        records::emergencies::get,
        records::emergencies::update,
        records::emergencies::delete,

        // Reports and AI
        reports::upload_report,
        reports::summarize_report,

        // Agent
        agent::timeline,
        agent::chat,
        agent::clear_chat,
        agent::suggest_doctor
    ),
    components(
        schemas(
            // Models
            lifeline_data::models::User,
            lifeline_data::models::UserSummary,
            lifeline_data::models::UserPatch,
            lifeline_data::models::HealthRecord,
            lifeline_data::models::NewHealthRecord,
            lifeline_data::models::HealthRecordPatch,
            lifeline_data::models::Medicine,
            lifeline_data::models::NewMedicine,
            lifeline_data::models::MedicinePatch,
            lifeline_data::models::Appointment,
            lifeline_data::models::NewAppointment,
            lifeline_data::models::AppointmentPatch,
            lifeline_data::models::Report,
            lifeline_data::models::NewReport,
            lifeline_data::models::ReportPatch,
            lifeline_data::models::BloodRequest,
            lifeline_data::models::NewBloodRequest,
            lifeline_data::models::BloodRequestPatch,
            lifeline_data::models::Emergency,
            lifeline_data::models::NewEmergency,
            lifeline_data::models::EmergencyPatch,

            // Users
            lifeline_domain::services::RegisterRequest,
            lifeline_domain::services::LoginRequest,
            lifeline_domain::services::LoginResponse,

            // Envelopes
            crate::entities::ErrorResponse,
            crate::entities::UserResponse,
            crate::entities::UpdatedUserResponse,
            crate::entities::UserSummaryResponse,
            crate::entities::HealthRecordResponse,
            crate::entities::HealthRecordListResponse,
            crate::entities::MedicineResponse,
            crate::entities::MedicineListResponse,
            crate::entities::AppointmentResponse,
            crate::entities::AppointmentListResponse,
            crate::entities::ReportResponse,
            crate::entities::ReportListResponse,
            crate::entities::BloodRequestResponse,
            crate::entities::BloodRequestListResponse,
            crate::entities::EmergencyResponse,
            crate::entities::EmergencyListResponse,
            crate::entities::DeletedResponse,
            crate::entities::SummaryResponse,
            crate::entities::AnalysisResponse,
            crate::entities::ChatResponse,
            crate::entities::ClearedResponse,
            crate::entities::SuggestionResponse,
            crate::entities::RootResponse,

            // Handlers
            reports::UploadForm,
            health::HealthResponse,
            health::Components,
            health::ComponentHealth
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Liveness and health checks"),
        (name = "users", description = "Registration, login and profile"),
        (name = "health-records", description = "Free-form health records"),
        (name = "medicines", description = "Medicines"),
        (name = "appointments", description = "Doctor appointments"),
        (name = "reports", description = "Medical reports and uploads"),
        (name = "blood-requests", description = "Blood donation requests"),
        (name = "emergencies", description = "Emergency alerts"),
        (name = "ai", description = "Report summaries"),
        (name = "agent", description = "Timeline analysis, chat and doctor suggestions")
    ),
    info(
        title = "Lifeline API",
        version = "0.1.0",
        description = "Personal health records with AI-assisted summaries",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_doc_generation() {
        let openapi = ApiDoc::openapi();

        assert_eq!(openapi.info.title, "Lifeline API");
        assert_eq!(openapi.info.version, "0.1.0");

        let tags = openapi.tags.as_ref().expect("tags are declared");
        assert!(tags.iter().any(|tag| tag.name == "agent"));

        let paths = &openapi.paths.paths;
        for path in [
            "/health",
            "/api/users",
            "/api/users/me",
            "/api/medicines",
            "/api/medicines/{id}",
            "/api/emergencies/{id}",
            "/api/reports/upload",
            "/api/ai/summarize-report/{report_id}",
            "/agent/chat",
            "/agent/suggest-doctor",
        ] {
            assert!(paths.contains_key(path), "missing path {}", path);
        }
    }

    #[test]
    fn test_bearer_scheme_is_registered() {
        let openapi = ApiDoc::openapi();
        let components = openapi.components.expect("components are generated");
        assert!(components.security_schemes.contains_key("bearer"));
    }
}
