//! Prediction result types.
//!
//! Represents the output of thyroid risk scoring and the stored
//! assessment record built around it.

use serde::{Deserialize, Serialize};

use super::patient::{LabResults, MedicalHistory, PatientRecord, PersonalInfo, Symptoms};

/// Lowest score classified as moderate risk.
pub const MODERATE_THRESHOLD: u8 = 30;

/// Lowest score classified as high risk.
pub const HIGH_THRESHOLD: u8 = 70;

/// Upper bound of the risk score.
pub const MAX_SCORE: u8 = 100;

/// Risk tier classification for thyroid disease.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Low risk of thyroid disease
    Low,
    /// Moderate risk, follow-up recommended
    Moderate,
    /// High risk, specialist referral recommended
    High,
}

impl RiskLevel {
    /// Tier for a score.
    #[must_use]
    pub fn from_score(score: u8) -> Self {
        if score < MODERATE_THRESHOLD {
            Self::Low
        } else if score < HIGH_THRESHOLD {
            Self::Moderate
        } else {
            Self::High
        }
    }

    /// Get a human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => "Low risk - No significant indicators",
            Self::Moderate => "Moderate risk - Follow-up recommended",
            Self::High => "High risk - Specialist consultation advised",
        }
    }

    /// Lowercase storage form.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Moderate => write!(f, "MODERATE"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown risk level: {0}")]
pub struct ParseRiskLevelError(String);

impl std::str::FromStr for RiskLevel {
    type Err = ParseRiskLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "moderate" => Ok(Self::Moderate),
            "high" => Ok(Self::High),
            other => Err(ParseRiskLevelError(other.to_string())),
        }
    }
}

/// Out-of-range lab values found in one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LabAnalysis {
    /// True iff `details` is non-empty
    pub abnormal: bool,
    pub details: Vec<String>,
}

impl LabAnalysis {
    #[must_use]
    pub fn from_details(details: Vec<String>) -> Self {
        Self {
            abnormal: !details.is_empty(),
            details,
        }
    }
}

/// Result of scoring one patient record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    /// Risk score in `0..=100`
    pub score: u8,
    /// Risk tier, always `RiskLevel::from_score(score)`
    pub tier: RiskLevel,
    /// Triggered risk factors in check order
    pub factors: Vec<String>,
    pub lab_analysis: LabAnalysis,
}

impl PredictionResult {
    #[must_use]
    pub fn new(score: u8, factors: Vec<String>, lab_analysis: LabAnalysis) -> Self {
        let score = score.min(MAX_SCORE);
        Self {
            score,
            tier: RiskLevel::from_score(score),
            factors,
            lab_analysis,
        }
    }
}

/// A stored evaluation: inputs, result and metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    /// Unique identifier
    pub id: String,
    pub personal_info: PersonalInfo,
    pub medical_history: MedicalHistory,
    pub symptoms: Symptoms,
    pub lab_results: LabResults,
    pub prediction: PredictionResult,
    /// Timestamp of submission
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Assessment {
    /// Create a new assessment with a fresh identifier.
    #[must_use]
    pub fn new(record: PatientRecord, prediction: PredictionResult) -> Self {
        Self {
            id: uuid_v4(),
            personal_info: record.personal_info,
            medical_history: record.medical_history,
            symptoms: record.symptoms,
            lab_results: record.lab_results,
            prediction,
            created_at: chrono::Utc::now(),
        }
    }

    /// The intake groups this assessment was computed from.
    #[must_use]
    pub fn record(&self) -> PatientRecord {
        PatientRecord {
            personal_info: self.personal_info.clone(),
            medical_history: self.medical_history.clone(),
            symptoms: self.symptoms.clone(),
            lab_results: self.lab_results.clone(),
        }
    }
}

/// Generate a UUID v4 string from a CSPRNG seeded by OS entropy.
fn uuid_v4() -> String {
    use rand::Rng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_entropy();
    let mut bytes: [u8; 16] = rng.gen();
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::patient::Gender;

    #[test]
    fn test_risk_level_from_score() {
        assert_eq!(RiskLevel::from_score(0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(29), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(30), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_score(69), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_score(70), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(100), RiskLevel::High);
    }

    #[test]
    fn test_risk_level_parse() {
        assert_eq!("low".parse::<RiskLevel>(), Ok(RiskLevel::Low));
        assert_eq!("MODERATE".parse::<RiskLevel>(), Ok(RiskLevel::Moderate));
        assert_eq!(" high ".parse::<RiskLevel>(), Ok(RiskLevel::High));
        assert!("severe".parse::<RiskLevel>().is_err());

        for level in [RiskLevel::Low, RiskLevel::Moderate, RiskLevel::High] {
            assert_eq!(level.as_str().parse::<RiskLevel>(), Ok(level));
        }
    }

    #[test]
    fn test_prediction_clamps_score() {
        let result = PredictionResult::new(140, Vec::new(), LabAnalysis::default());
        assert_eq!(result.score, 100);
        assert_eq!(result.tier, RiskLevel::High);
    }

    #[test]
    fn test_lab_analysis_flag_tracks_details() {
        assert!(!LabAnalysis::from_details(Vec::new()).abnormal);
        assert!(LabAnalysis::from_details(vec!["TSH: 9 mIU/L".to_string()]).abnormal);
    }

    #[test]
    fn test_prediction_json_shape() {
        let result = PredictionResult::new(45, vec!["Neck pain".to_string()], LabAnalysis::default());
        let json = serde_json::to_value(&result).expect("Should serialize");
        assert_eq!(json["score"], 45);
        assert_eq!(json["tier"], "moderate");
        assert_eq!(json["labAnalysis"]["abnormal"], false);
    }

    #[test]
    fn test_assessment_creation() {
        let record = PatientRecord::new(PersonalInfo::new(50, Gender::Female));
        let prediction = PredictionResult::new(0, Vec::new(), LabAnalysis::default());
        let assessment = Assessment::new(record.clone(), prediction);

        assert_eq!(assessment.record(), record);
        assert_eq!(assessment.prediction.tier, RiskLevel::Low);
    }

    #[test]
    fn test_uuid_generation() {
        let id1 = uuid_v4();
        let id2 = uuid_v4();
        assert_ne!(id1, id2);
        assert_eq!(id1.len(), 36);
        assert_eq!(id1.as_bytes()[14], b'4');
    }
}
