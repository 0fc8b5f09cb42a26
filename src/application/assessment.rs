//! Assessment service: intake validation, scoring and persistence.
//!
//! This service coordinates:
//! - Validation of the intake record
//! - Risk scoring
//! - Storage of the resulting assessment
//! - Lookup, listing and removal of stored assessments

use std::sync::Arc;

use crate::adapters::StorageError;
use crate::domain::{analyze_labs, evaluate_record, Assessment, LabAnalysis, LabResults, PatientRecord, PredictionResult};
use crate::ports::{AssessmentPage, AssessmentRepository};
use crate::ThyroriskError;

/// Service over an injected assessment repository.
pub struct AssessmentService<R>
where
    R: AssessmentRepository,
{
    repository: Arc<R>,
}

impl<R> AssessmentService<R>
where
    R: AssessmentRepository,
    R::Error: Into<StorageError>,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    fn storage_err(e: R::Error) -> ThyroriskError {
        ThyroriskError::Storage(e.into())
    }

    fn validate(record: &PatientRecord) -> Result<(), ThyroriskError> {
        record.validate().map_err(|errors| {
            tracing::warn!("Rejected intake record: {} validation error(s)", errors.len());
            ThyroriskError::Validation(errors.join("; "))
        })
    }

    /// Score a record without storing it.
    ///
    /// # Errors
    /// Returns error if the record fails intake validation.
    pub fn preview(&self, record: &PatientRecord) -> Result<PredictionResult, ThyroriskError> {
        Self::validate(record)?;
        Ok(evaluate_record(record))
    }

    /// Validate, score and store a record.
    ///
    /// # Errors
    /// Returns error if validation or storage fails.
    pub fn submit(&self, record: PatientRecord) -> Result<Assessment, ThyroriskError> {
        Self::validate(&record)?;

        let prediction = evaluate_record(&record);
        let assessment = Assessment::new(record, prediction);

        self.repository
            .create(&assessment)
            .map_err(Self::storage_err)?;

        tracing::info!(
            "Assessment stored: score={}, tier={}, factors={}, abnormal_labs={}",
            assessment.prediction.score,
            assessment.prediction.tier,
            assessment.prediction.factors.len(),
            assessment.prediction.lab_analysis.details.len()
        );

        Ok(assessment)
    }

    /// Check lab values against reference ranges only.
    #[must_use]
    pub fn analyze_labs(&self, labs: &LabResults) -> LabAnalysis {
        let analysis = analyze_labs(labs);
        tracing::debug!("Lab analysis: {} abnormal value(s)", analysis.details.len());
        analysis
    }

    /// All stored assessments, newest first.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    pub fn list(&self) -> Result<Vec<Assessment>, ThyroriskError> {
        self.repository.list().map_err(Self::storage_err)
    }

    /// One page of stored assessments, newest first.
    ///
    /// # Errors
    /// Returns `Validation` if `limit` is zero, or a storage error.
    pub fn list_page(&self, offset: usize, limit: usize) -> Result<AssessmentPage, ThyroriskError> {
        if limit == 0 {
            return Err(ThyroriskError::Validation(
                "Page limit must be at least 1".to_string(),
            ));
        }
        self.repository
            .list_paginated(offset, limit)
            .map_err(Self::storage_err)
    }

    /// # Errors
    /// Returns `NotFound` if no assessment has this id, or a storage error.
    pub fn get(&self, id: &str) -> Result<Assessment, ThyroriskError> {
        self.repository
            .get_by_id(id)
            .map_err(Self::storage_err)?
            .ok_or_else(|| ThyroriskError::NotFound(id.to_string()))
    }

    /// # Errors
    /// Returns error if storage operation fails.
    pub fn count(&self) -> Result<usize, ThyroriskError> {
        self.repository.count().map_err(Self::storage_err)
    }

    /// # Errors
    /// Returns `NotFound` if no assessment has this id, or a storage error.
    pub fn delete(&self, id: &str) -> Result<(), ThyroriskError> {
        if self.repository.delete(id).map_err(Self::storage_err)? {
            tracing::info!("Deleted assessment {}", id);
            Ok(())
        } else {
            Err(ThyroriskError::NotFound(id.to_string()))
        }
    }

    /// Remove every stored assessment. Returns how many were removed.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    pub fn clear_all(&self) -> Result<usize, ThyroriskError> {
        let existing = self.count()?;
        self.repository.clear_all().map_err(Self::storage_err)?;
        tracing::warn!("Cleared {} stored assessment(s)", existing);
        Ok(existing)
    }
}
