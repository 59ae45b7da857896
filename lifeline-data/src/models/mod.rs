// Storage models, one module per table

pub mod appointment;
pub mod blood_request;
pub mod emergency;
pub mod health_record;
pub mod medicine;
pub mod report;
pub mod user;

pub use appointment::{Appointment, AppointmentPatch, NewAppointment};
pub use blood_request::{BloodRequest, BloodRequestPatch, NewBloodRequest};
pub use emergency::{Emergency, EmergencyPatch, NewEmergency};
pub use health_record::{HealthRecord, HealthRecordPatch, NewHealthRecord};
pub use medicine::{Medicine, MedicinePatch, NewMedicine};
pub use report::{NewReport, Report, ReportPatch};
pub use user::{NewUser, User, UserPatch, UserSummary};
