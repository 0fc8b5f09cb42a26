//! # Thyrorisk
//!
//! Thyroid risk scoring for patient intake records.
//!
//! This crate provides:
//! - A deterministic risk scorer over demographics, history, symptoms and
//!   thyroid lab values
//! - Local storage of scored assessments
//! - Plain-text risk reports
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types (PatientRecord, PredictionResult) and scoring
//! - `ports`: Trait definitions for storage
//! - `adapters`: Concrete implementations (SQLite, in-memory, log sanitizing)
//! - `application`: Use cases orchestrating domain and ports
//! - `config`: Environment-driven runtime settings

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use domain::{Assessment, PatientRecord, PredictionResult, RiskLevel};

/// Result type for Thyrorisk operations
pub type Result<T> = std::result::Result<T, ThyroriskError>;

/// Main error type for Thyrorisk
#[derive(Debug, thiserror::Error)]
pub enum ThyroriskError {
    #[error("Storage operation failed: {0}")]
    Storage(#[from] adapters::StorageError),

    #[error("Invalid patient data: {0}")]
    Validation(String),

    #[error("Assessment not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
