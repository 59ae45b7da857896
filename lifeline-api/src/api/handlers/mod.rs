pub mod agent;
pub mod health;
pub mod records;
pub mod reports;
pub mod users;

// Re-export handlers for easier imports
pub use health::{health_check, root};
pub use reports::{summarize_report, upload_report};
