use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Deserialize;
use tracing::{debug, instrument};
use utoipa::ToSchema;

use lifeline_domain::services::ReportService;

use crate::api::error::ApiError;
use crate::api::extract::{CurrentUser, RecordId};
use crate::entities::{DataResponse, ErrorResponse, ReportResponse, SummaryResponse, SUCCESS};

/// Largest accepted upload
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Multipart form accepted by the upload endpoint
#[derive(Debug, Deserialize, ToSchema)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

/// Upload a report file, run OCR on it and store it as a report
#[utoipa::path(
    post,
    path = "/api/reports/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Report stored", body = ReportResponse),
        (status = 400, description = "No file or file name", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Upload failed", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "reports"
)]
#[instrument(skip_all)]
pub async fn upload_report(
    State(reports): State<ReportService>,
    CurrentUser(user): CurrentUser,
    mut multipart: Multipart,
) -> Result<Json<ReportResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        if field.name() != Some("file") {
            debug!("Skipping multipart field {:?}", field.name());
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        let report = reports.upload(user.id, &filename, bytes.to_vec()).await?;
        return Ok(Json(DataResponse::success(report)));
    }

    Err(ApiError::BadRequest("Multipart field 'file' is required".to_string()))
}

/// Summarise a report's OCR text with the language model
#[utoipa::path(
    post,
    path = "/api/ai/summarize-report/{report_id}",
    params(("report_id" = i64, Path, description = "Report id")),
    responses(
        (status = 200, description = "Summary saved on the report", body = SummaryResponse),
        (status = 400, description = "No OCR text found in report", body = ErrorResponse),
        (status = 404, description = "Report not found", body = ErrorResponse),
        (status = 500, description = "Model request failed", body = ErrorResponse)
    ),
    security(("bearer" = [])),
    tag = "ai"
)]
#[instrument(skip_all)]
pub async fn summarize_report(
    State(reports): State<ReportService>,
    CurrentUser(user): CurrentUser,
    RecordId(report_id): RecordId,
) -> Result<Json<SummaryResponse>, ApiError> {
    let summary = reports.summarize(user.id, report_id).await?;
    Ok(Json(SummaryResponse {
        status: SUCCESS.to_string(),
        summary,
    }))
}
