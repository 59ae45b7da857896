// Lifeline Data
// This crate handles persistence: the SQLite pool, row models,
// repositories and the object store for uploaded files

// Database connection management
pub mod database;

// Repository implementations for data access
pub mod repository;

// Data storage models
pub mod models;

// Object storage for uploaded report files
pub mod storage;
