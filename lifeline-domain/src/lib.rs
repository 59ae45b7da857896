// Lifeline Domain
// This crate contains the business logic for the Lifeline application

// Environment-driven configuration
pub mod config;

// Authentication
pub mod auth;

// Services that implement business logic
pub mod services;

// Language model client
pub mod llm;

// Text recognition for uploaded reports
pub mod ocr;

// Conversational health agent
pub mod agent;

// Health checks and system status
pub mod health;

// Re-export the data crate for convenience
pub use lifeline_data as data;

// Testing utilities - only available with mock feature
#[cfg(feature = "mock")]
pub mod testing;
