//! Domain layer: Core business types and logic.
//!
//! This module contains pure Rust types with no I/O. Scoring lives here
//! so that it can be exercised without any storage attached.

mod patient;
mod prediction;
mod reference;
pub mod scoring;

pub use patient::{
    Gender, LabResults, MedicalHistory, PatientRecord, PersonalInfo, Smoking, Symptoms, YesNo,
    MAX_AGE,
};
pub use prediction::{
    Assessment, LabAnalysis, ParseRiskLevelError, PredictionResult, RiskLevel, HIGH_THRESHOLD,
    MAX_SCORE, MODERATE_THRESHOLD,
};
pub use reference::{LabTest, RangePosition, ReferenceRange};
pub use scoring::{analyze_labs, evaluate, evaluate_record};
