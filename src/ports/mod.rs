//! Ports layer: Trait definitions for external operations.
//!
//! These traits define the boundary between the application and the
//! storage backends.

mod storage;

pub use storage::{AssessmentPage, AssessmentRepository};
