//! Storage port: Trait for assessment persistence.
//!
//! Abstracts the storage backend (SQLite, in-memory) from the application
//! logic. Assessments form an append-only collection keyed by id.

use crate::domain::Assessment;

/// A page of assessments with pagination metadata.
#[derive(Debug, Clone)]
pub struct AssessmentPage {
    /// Assessments in this page, newest first
    pub items: Vec<Assessment>,
    /// Total count of stored assessments
    pub total_count: usize,
    pub offset: usize,
    pub limit: usize,
    pub has_more: bool,
}

impl AssessmentPage {
    #[must_use]
    pub fn new(items: Vec<Assessment>, total_count: usize, offset: usize, limit: usize) -> Self {
        let has_more = offset + items.len() < total_count;
        Self {
            items,
            total_count,
            offset,
            limit,
            has_more,
        }
    }

    /// Get the next page offset.
    #[must_use]
    pub fn next_offset(&self) -> Option<usize> {
        self.has_more.then(|| self.offset + self.limit)
    }

    /// Get the previous page offset.
    #[must_use]
    pub fn prev_offset(&self) -> Option<usize> {
        (self.offset > 0).then(|| self.offset.saturating_sub(self.limit))
    }
}

/// Repository of stored assessments.
///
/// All data is stored locally and never transmitted.
pub trait AssessmentRepository: Send + Sync {
    /// Error type for storage operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Append an assessment.
    ///
    /// # Errors
    /// Returns error if storage operation fails or the id already exists.
    fn create(&self, assessment: &Assessment) -> Result<(), Self::Error>;

    /// Load all assessments, newest first.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn list(&self) -> Result<Vec<Assessment>, Self::Error>;

    /// Load one page of assessments, newest first.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn list_paginated(&self, offset: usize, limit: usize) -> Result<AssessmentPage, Self::Error>;

    /// Look up an assessment by id.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn get_by_id(&self, id: &str) -> Result<Option<Assessment>, Self::Error>;

    /// Number of stored assessments.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn count(&self) -> Result<usize, Self::Error>;

    /// Delete an assessment by id. Returns whether anything was removed.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn delete(&self, id: &str) -> Result<bool, Self::Error>;

    /// Remove every stored assessment.
    ///
    /// # Errors
    /// Returns error if storage operation fails.
    fn clear_all(&self) -> Result<(), Self::Error>;
}
