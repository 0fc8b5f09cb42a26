//! Reading intake documents from disk.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::domain::{LabResults, PatientRecord};
use crate::Result;

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Load a full intake record (`personalInfo`, `medicalHistory`, ...).
///
/// # Errors
/// Returns error if the file cannot be read or is not a valid record.
pub fn read_record(path: &Path) -> Result<PatientRecord> {
    read_json(path)
}

/// Load lab values alone, for the lab analysis action.
///
/// Accepts either a bare lab object or a full record, in which case its
/// `labResults` group is used (empty if the record has none).
///
/// # Errors
/// Returns error if the file cannot be read or parsed.
pub fn read_lab_results(path: &Path) -> Result<LabResults> {
    let value: serde_json::Value = read_json(path)?;
    let labs = match (value.get("labResults"), value.get("personalInfo")) {
        (Some(group), _) => group.clone(),
        (None, Some(_)) => return Ok(LabResults::default()),
        (None, None) => value,
    };
    Ok(serde_json::from_value(labs)?)
}
