//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! the core use cases of the application.

mod assessment;
pub mod intake;
pub mod report;

pub use assessment::AssessmentService;
