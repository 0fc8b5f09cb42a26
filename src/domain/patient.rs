//! Patient intake types for thyroid risk assessment.
//!
//! Field names on the wire follow the intake form (camelCase keys,
//! lowercase enum values).

use serde::{Deserialize, Serialize};

use super::reference::LabTest;

/// Upper bound accepted for patient age at intake.
pub const MAX_AGE: u32 = 130;

/// Binary answer used by most history and symptom questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YesNo {
    Yes,
    #[default]
    No,
}

impl YesNo {
    #[must_use]
    pub fn is_yes(self) -> bool {
        matches!(self, Self::Yes)
    }
}

impl From<bool> for YesNo {
    fn from(value: bool) -> Self {
        if value {
            Self::Yes
        } else {
            Self::No
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Male => write!(f, "male"),
            Self::Female => write!(f, "female"),
        }
    }
}

/// Smoking status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Smoking {
    #[default]
    Never,
    Former,
    Current,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalInfo {
    /// Age in whole years
    pub age: u32,
    pub gender: Gender,
}

impl PersonalInfo {
    #[must_use]
    pub fn new(age: u32, gender: Gender) -> Self {
        Self { age, gender }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalHistory {
    pub family_history_thyroid: YesNo,
    /// Radiation exposure to neck or head
    pub radiation_exposure: YesNo,
    pub previous_thyroid_issues: YesNo,
    pub smoking: Smoking,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Symptoms {
    pub neck_swelling: YesNo,
    pub difficulty_swallowing: YesNo,
    pub voice_changes: YesNo,
    pub neck_pain: YesNo,
    pub swollen_lymph_nodes: YesNo,
}

/// Lab values as entered on the form.
///
/// Each value is an optional numeric string. `None` or a blank string means
/// the test was not measured, which is distinct from a normal result.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LabResults {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tsh: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t3: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t4: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thyroglobulin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calcitonin: Option<String>,
}

impl LabResults {
    /// Raw entered value for a test, if any.
    #[must_use]
    pub fn get(&self, test: LabTest) -> Option<&str> {
        let value = match test {
            LabTest::Tsh => &self.tsh,
            LabTest::T3 => &self.t3,
            LabTest::T4 => &self.t4,
            LabTest::Thyroglobulin => &self.thyroglobulin,
            LabTest::Calcitonin => &self.calcitonin,
        };
        value.as_deref()
    }

    /// Set the raw value for a test, builder style.
    #[must_use]
    pub fn with(mut self, test: LabTest, value: impl Into<String>) -> Self {
        let slot = match test {
            LabTest::Tsh => &mut self.tsh,
            LabTest::T3 => &mut self.t3,
            LabTest::T4 => &mut self.t4,
            LabTest::Thyroglobulin => &mut self.thyroglobulin,
            LabTest::Calcitonin => &mut self.calcitonin,
        };
        *slot = Some(value.into());
        self
    }

    /// Whether any test has a non-blank value.
    #[must_use]
    pub fn any_supplied(&self) -> bool {
        LabTest::ALL
            .iter()
            .filter_map(|test| self.get(*test))
            .any(|raw| !raw.trim().is_empty())
    }
}

/// A complete intake submission: the four form groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub medical_history: MedicalHistory,
    #[serde(default)]
    pub symptoms: Symptoms,
    #[serde(default)]
    pub lab_results: LabResults,
}

impl PatientRecord {
    /// Record with all-default history, symptoms and no labs.
    #[must_use]
    pub fn new(personal_info: PersonalInfo) -> Self {
        Self {
            personal_info,
            medical_history: MedicalHistory::default(),
            symptoms: Symptoms::default(),
            lab_results: LabResults::default(),
        }
    }

    /// Validate the fields the intake form is responsible for.
    ///
    /// Lab values are not checked here: unparseable values are tolerated
    /// by scoring.
    ///
    /// # Errors
    /// Returns validation errors as a vector of strings.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        let age = self.personal_info.age;
        if age == 0 {
            errors.push("Age is required and must be a positive integer".to_string());
        } else if age > MAX_AGE {
            errors.push(format!("Age {age} out of range [1, {MAX_AGE}]"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
