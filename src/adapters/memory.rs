//! In-memory adapter: an append-only list behind a mutex.

use std::sync::Mutex;

use super::StorageError;
use crate::domain::Assessment;
use crate::ports::{AssessmentPage, AssessmentRepository};

/// Process-local assessment storage. Contents are lost on drop.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    // Oldest first; listing reverses.
    items: Mutex<Vec<Assessment>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_items<T>(&self, f: impl FnOnce(&mut Vec<Assessment>) -> T) -> Result<T, StorageError> {
        let mut items = self.items.lock().map_err(|_| StorageError::Lock)?;
        Ok(f(&mut items))
    }
}

impl AssessmentRepository for InMemoryRepository {
    type Error = StorageError;

    fn create(&self, assessment: &Assessment) -> Result<(), Self::Error> {
        self.with_items(|items| {
            if items.iter().any(|a| a.id == assessment.id) {
                return Err(StorageError::Duplicate(assessment.id.clone()));
            }
            items.push(assessment.clone());
            Ok(())
        })?
    }

    fn list(&self) -> Result<Vec<Assessment>, Self::Error> {
        self.with_items(|items| items.iter().rev().cloned().collect())
    }

    fn list_paginated(&self, offset: usize, limit: usize) -> Result<AssessmentPage, Self::Error> {
        self.with_items(|items| {
            let page = items.iter().rev().skip(offset).take(limit).cloned().collect();
            AssessmentPage::new(page, items.len(), offset, limit)
        })
    }

    fn get_by_id(&self, id: &str) -> Result<Option<Assessment>, Self::Error> {
        self.with_items(|items| items.iter().find(|a| a.id == id).cloned())
    }

    fn count(&self) -> Result<usize, Self::Error> {
        self.with_items(|items| items.len())
    }

    fn delete(&self, id: &str) -> Result<bool, Self::Error> {
        self.with_items(|items| {
            let before = items.len();
            items.retain(|a| a.id != id);
            items.len() != before
        })
    }

    fn clear_all(&self) -> Result<(), Self::Error> {
        self.with_items(Vec::clear)?;
        tracing::warn!("Cleared all assessments from memory");
        Ok(())
    }
}
