use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use lifeline_data::models::{NewReport, Report, ReportPatch};
use lifeline_data::repository::RecordRepository;
use lifeline_data::storage::ObjectStore;

use super::ServiceError;
use crate::llm::{GenerationRequest, LanguageModel};
use crate::ocr::TextExtractor;

/// Stored as the report text when OCR cannot read the upload
pub const OCR_FALLBACK_TEXT: &str = "[OCR not supported on this file type]";

/// Reduce a client-supplied file name to its final path component
pub fn sanitize_filename(name: &str) -> Option<String> {
    let last = name.rsplit(['/', '\\']).next().unwrap_or("").trim();
    match last {
        "" | "." | ".." => None,
        name => Some(name.to_string()),
    }
}

/// Report upload with OCR, and AI summaries of stored reports
#[derive(Clone)]
pub struct ReportService {
    reports: Arc<dyn RecordRepository<Report>>,
    store: Arc<dyn ObjectStore>,
    ocr: Arc<dyn TextExtractor>,
    model: Arc<dyn LanguageModel>,
}

impl ReportService {
    pub fn new(
        reports: Arc<dyn RecordRepository<Report>>,
        store: Arc<dyn ObjectStore>,
        ocr: Arc<dyn TextExtractor>,
        model: Arc<dyn LanguageModel>,
    ) -> Self {
        Self {
            reports,
            store,
            ocr,
            model,
        }
    }

    /// Store an uploaded file, run OCR on it and record it as a report
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload(&self, user_id: i64, filename: &str, bytes: Vec<u8>) -> Result<Report, ServiceError> {
        let filename = sanitize_filename(filename)
            .ok_or_else(|| ServiceError::Validation("A file name is required".to_string()))?;

        let key = format!("reports/{}/{}", user_id, filename);
        if let Err(e) = self.store.put(&key, &bytes).await {
            error!("Storing {} failed: {}", key, e);
            return Err(ServiceError::Storage("Upload failed".to_string()));
        }
        let file_url = self.store.public_url(&key);

        let text_content = match self.ocr.extract_text(bytes).await {
            Ok(text) => text,
            Err(e) => {
                warn!("OCR skipped for {}: {}", key, e);
                OCR_FALLBACK_TEXT.to_string()
            }
        };

        let inserted = self
            .reports
            .insert(
                user_id,
                NewReport {
                    title: filename,
                    file_url: Some(file_url),
                    text_content: Some(text_content),
                    ..NewReport::default()
                },
            )
            .await;
        let report = match inserted {
            Ok(report) => report,
            Err(e) => {
                // Keys are write-once, so a stray object would block this name for good
                if let Err(cleanup) = self.store.delete(&key).await {
                    error!("Removing orphaned object {} failed: {}", key, cleanup);
                }
                return Err(e.into());
            }
        };

        info!("Uploaded report {} for user {}", report.id, user_id);
        Ok(report)
    }

    /// Summarise a report's recognised text and save the summary on it
    #[instrument(skip(self))]
    pub async fn summarize(&self, user_id: i64, report_id: i64) -> Result<String, ServiceError> {
        let report = self
            .reports
            .find(user_id, report_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Report not found".to_string()))?;

        let text = report.text_content.unwrap_or_default();
        if text.trim().is_empty() {
            return Err(ServiceError::Validation("No OCR text found in report".to_string()));
        }

        let prompt = format!(
            "Summarize this medical report in simple terms for the patient:\n\n{}",
            text
        );
        let summary = self
            .model
            .generate(GenerationRequest::prompt(prompt))
            .await
            .map_err(|e| ServiceError::Model(format!("Gemini request failed: {}", e)))?;

        let patch = ReportPatch {
            ai_summary: Some(summary.clone()),
            ..ReportPatch::default()
        };
        self.reports.update(user_id, report_id, patch).await?;

        info!("Saved summary for report {}", report_id);
        Ok(summary)
    }
}
