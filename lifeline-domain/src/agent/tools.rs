use std::sync::Arc;

use serde_json::{json, Value};

use lifeline_data::models::{Appointment, Medicine, Report};
use lifeline_data::repository::{ListOrder, RecordRepository, RepositoryError};

/// Lookups the agent may ask for while answering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    FetchReports,
    FetchMedicines,
    FetchAppointments,
}

impl Tool {
    pub const ALL: [Tool; 3] = [Tool::FetchReports, Tool::FetchMedicines, Tool::FetchAppointments];

    pub fn name(&self) -> &'static str {
        match self {
            Tool::FetchReports => "fetch_reports",
            Tool::FetchMedicines => "fetch_medicines",
            Tool::FetchAppointments => "fetch_appointments",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Tool::FetchReports => "Returns the user's recent medical reports, OCR text and AI summaries.",
            Tool::FetchMedicines => "Returns the user's active and past medicines with dosage and frequency.",
            Tool::FetchAppointments => "Returns the user's appointments, doctor names and dates.",
        }
    }

    pub fn from_name(name: &str) -> Option<Tool> {
        Tool::ALL.into_iter().find(|tool| tool.name() == name.trim())
    }
}

/// Read-only views of a user's records, rendered as JSON text for prompts
#[derive(Clone)]
pub struct AgentTools {
    reports: Arc<dyn RecordRepository<Report>>,
    medicines: Arc<dyn RecordRepository<Medicine>>,
    appointments: Arc<dyn RecordRepository<Appointment>>,
}

impl AgentTools {
    pub fn new(
        reports: Arc<dyn RecordRepository<Report>>,
        medicines: Arc<dyn RecordRepository<Medicine>>,
        appointments: Arc<dyn RecordRepository<Appointment>>,
    ) -> Self {
        Self {
            reports,
            medicines,
            appointments,
        }
    }

    pub async fn run(&self, tool: Tool, user_id: i64) -> Result<String, RepositoryError> {
        match tool {
            Tool::FetchReports => self.fetch_reports(user_id).await,
            Tool::FetchMedicines => self.fetch_medicines(user_id).await,
            Tool::FetchAppointments => self.fetch_appointments(user_id).await,
        }
    }

    /// Reports, newest upload first
    pub async fn fetch_reports(&self, user_id: i64) -> Result<String, RepositoryError> {
        let reports = self.reports.list(user_id, ListOrder::desc("uploaded_at")).await?;
        let rows: Vec<Value> = reports
            .iter()
            .map(|r| {
                json!({
                    "id": r.id,
                    "report_type": r.report_type,
                    "ai_summary": r.ai_summary,
                    "text_content": r.text_content,
                    "uploaded_at": r.uploaded_at,
                })
            })
            .collect();
        Ok(Value::Array(rows).to_string())
    }

    /// Medicines, most recently added first
    pub async fn fetch_medicines(&self, user_id: i64) -> Result<String, RepositoryError> {
        let medicines = self.medicines.list(user_id, ListOrder::desc("id")).await?;
        let rows: Vec<Value> = medicines
            .iter()
            .map(|m| {
                json!({
                    "id": m.id,
                    "name": m.name,
                    "dosage": m.dosage,
                    "frequency": m.frequency,
                    "start_date": m.start_date,
                    "end_date": m.end_date,
                })
            })
            .collect();
        Ok(Value::Array(rows).to_string())
    }

    /// Appointments, latest date first
    pub async fn fetch_appointments(&self, user_id: i64) -> Result<String, RepositoryError> {
        let appointments = self
            .appointments
            .list(user_id, ListOrder::desc("appointment_date"))
            .await?;
        let rows: Vec<Value> = appointments
            .iter()
            .map(|a| {
                json!({
                    "id": a.id,
                    "doctor_name": a.doctor_name,
                    "hospital_name": a.hospital_name,
                    "appointment_date": a.appointment_date,
                    "status": a.status,
                })
            })
            .collect();
        Ok(Value::Array(rows).to_string())
    }

    /// Compact timeline of everything on file, in storage order
    pub async fn timeline(&self, user_id: i64) -> Result<String, RepositoryError> {
        let (reports, medicines, appointments) = futures::try_join!(
            self.reports.list(user_id, ListOrder::asc("id")),
            self.medicines.list(user_id, ListOrder::asc("id")),
            self.appointments.list(user_id, ListOrder::asc("id")),
        )?;

        let reports: Vec<Value> = reports
            .iter()
            .map(|r| {
                json!({
                    "report_type": r.report_type,
                    "text_content": r.text_content,
                    "ai_summary": r.ai_summary,
                })
            })
            .collect();
        let medicines: Vec<Value> = medicines
            .iter()
            .map(|m| json!({ "name": m.name, "dosage": m.dosage, "frequency": m.frequency }))
            .collect();
        let appointments: Vec<Value> = appointments
            .iter()
            .map(|a| {
                json!({
                    "doctor_name": a.doctor_name,
                    "hospital_name": a.hospital_name,
                    "appointment_date": a.appointment_date,
                    "status": a.status,
                })
            })
            .collect();

        Ok(format!(
            "Reports: {}\n\nMedicines: {}\n\nAppointments: {}",
            Value::Array(reports),
            Value::Array(medicines),
            Value::Array(appointments)
        ))
    }
}
