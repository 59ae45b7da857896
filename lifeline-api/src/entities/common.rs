use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use lifeline_data::models::{
    Appointment, BloodRequest, Emergency, HealthRecord, Medicine, Report, User, UserSummary,
};

/// Value of `status` in every successful envelope
pub const SUCCESS: &str = "success";

/// Body of `GET /`
pub const ROOT_MESSAGE: &str = "Backend running fine 🚀";

/// Standardized error response format
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error code, e.g. "not_found"
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional details about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// `{status, data}` envelope around a row or a list of rows
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[aliases(
    UserResponse = DataResponse<User>,
    UpdatedUserResponse = DataResponse<Option<User>>,
    UserSummaryResponse = DataResponse<UserSummary>,
    HealthRecordResponse = DataResponse<HealthRecord>,
    HealthRecordListResponse = DataResponse<Vec<HealthRecord>>,
    MedicineResponse = DataResponse<Medicine>,
    MedicineListResponse = DataResponse<Vec<Medicine>>,
    AppointmentResponse = DataResponse<Appointment>,
    AppointmentListResponse = DataResponse<Vec<Appointment>>,
    ReportResponse = DataResponse<Report>,
    ReportListResponse = DataResponse<Vec<Report>>,
    BloodRequestResponse = DataResponse<BloodRequest>,
    BloodRequestListResponse = DataResponse<Vec<BloodRequest>>,
    EmergencyResponse = DataResponse<Emergency>,
    EmergencyListResponse = DataResponse<Vec<Emergency>>
)]
pub struct DataResponse<T> {
    pub status: String,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: SUCCESS.to_string(),
            data,
        }
    }
}

/// Answer to a delete, whether or not a row was removed
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeletedResponse {
    pub status: String,
    pub deleted: bool,
}

impl DeletedResponse {
    pub fn success() -> Self {
        Self {
            status: SUCCESS.to_string(),
            deleted: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SummaryResponse {
    pub status: String,
    pub summary: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AnalysisResponse {
    pub status: String,
    pub analysis: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    pub status: String,
    pub answer: String,
    /// Messages remembered for the caller after this turn
    pub memory_items: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClearedResponse {
    pub status: String,
    pub cleared: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SuggestionResponse {
    pub status: String,
    /// Parsed model JSON, or `{"raw": text}` when the reply was not JSON
    #[schema(value_type = Object)]
    pub suggestion: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RootResponse {
    pub msg: String,
}
