//! Thyroid risk scoring.
//!
//! Scoring is a pure function of the intake groups: each triggered risk
//! factor adds a fixed weight, each out-of-range lab value adds another,
//! and a markedly elevated calcitonin adds a severity bonus on top.
//!
//! Lab values that cannot be parsed as numbers are treated as not
//! abnormal. Scoring never fails.

use super::patient::{LabResults, MedicalHistory, PatientRecord, PersonalInfo, Smoking, Symptoms};
use super::prediction::{LabAnalysis, PredictionResult, MAX_SCORE};
use super::reference::{LabTest, RangePosition};

/// Points per triggered risk factor.
pub const FACTOR_WEIGHT: u32 = 10;

/// Points per abnormal lab value.
pub const ABNORMAL_LAB_WEIGHT: u32 = 15;

/// Bonus for a severely elevated calcitonin.
pub const SEVERE_CALCITONIN_BONUS: u32 = 30;

/// Calcitonin above this value (pg/mL) is a severe indicator.
pub const SEVERE_CALCITONIN_LEVEL: f64 = 20.0;

pub const SEVERE_CALCITONIN_FACTOR: &str = "Significantly elevated calcitonin levels";

/// Age strictly above which age counts as a risk factor.
pub const AGE_RISK_THRESHOLD: u32 = 60;

/// Longest rendered number in a detail line; longer renderings show the
/// value as entered.
const MAX_RENDERED_VALUE_LEN: usize = 24;

/// View over the non-lab groups that factor predicates read.
struct FactorInput<'a> {
    personal: &'a PersonalInfo,
    history: &'a MedicalHistory,
    symptoms: &'a Symptoms,
}

struct RiskFactor {
    label: &'static str,
    applies: fn(&FactorInput<'_>) -> bool,
}

/// Risk factors in report order. Every entry is checked independently.
static RISK_FACTORS: [RiskFactor; 10] = [
    RiskFactor {
        label: "Age over 60",
        applies: |i| i.personal.age > AGE_RISK_THRESHOLD,
    },
    RiskFactor {
        label: "Family history of thyroid disease",
        applies: |i| i.history.family_history_thyroid.is_yes(),
    },
    RiskFactor {
        label: "Prior radiation exposure to neck/head",
        applies: |i| i.history.radiation_exposure.is_yes(),
    },
    RiskFactor {
        label: "Previous thyroid issues",
        applies: |i| i.history.previous_thyroid_issues.is_yes(),
    },
    RiskFactor {
        label: "Current smoker",
        applies: |i| i.history.smoking == Smoking::Current,
    },
    RiskFactor {
        label: "Neck swelling or lump",
        applies: |i| i.symptoms.neck_swelling.is_yes(),
    },
    RiskFactor {
        label: "Difficulty swallowing",
        applies: |i| i.symptoms.difficulty_swallowing.is_yes(),
    },
    RiskFactor {
        label: "Voice changes or hoarseness",
        applies: |i| i.symptoms.voice_changes.is_yes(),
    },
    RiskFactor {
        label: "Neck pain",
        applies: |i| i.symptoms.neck_pain.is_yes(),
    },
    RiskFactor {
        label: "Swollen lymph nodes",
        applies: |i| i.symptoms.swollen_lymph_nodes.is_yes(),
    },
];

/// Labels of all risk factors, in check order.
pub fn factor_labels() -> impl Iterator<Item = &'static str> {
    RISK_FACTORS.iter().map(|f| f.label)
}

/// Score one patient.
#[must_use]
pub fn evaluate(
    personal: &PersonalInfo,
    history: &MedicalHistory,
    symptoms: &Symptoms,
    labs: &LabResults,
) -> PredictionResult {
    let input = FactorInput {
        personal,
        history,
        symptoms,
    };

    let mut factors: Vec<String> = RISK_FACTORS
        .iter()
        .filter(|factor| (factor.applies)(&input))
        .map(|factor| factor.label.to_string())
        .collect();

    let lab_analysis = analyze_labs(labs);

    let mut points = FACTOR_WEIGHT * factors.len() as u32;
    points += ABNORMAL_LAB_WEIGHT * lab_analysis.details.len() as u32;

    if has_severe_calcitonin(labs) {
        points += SEVERE_CALCITONIN_BONUS;
        factors.push(SEVERE_CALCITONIN_FACTOR.to_string());
    }

    let score = points.min(u32::from(MAX_SCORE)) as u8;
    PredictionResult::new(score, factors, lab_analysis)
}

/// Score a full intake record.
#[must_use]
pub fn evaluate_record(record: &PatientRecord) -> PredictionResult {
    evaluate(
        &record.personal_info,
        &record.medical_history,
        &record.symptoms,
        &record.lab_results,
    )
}

/// Compare every supplied lab value against its reference range.
#[must_use]
pub fn analyze_labs(labs: &LabResults) -> LabAnalysis {
    let details = LabTest::ALL
        .iter()
        .filter_map(|test| lab_detail(*test, labs.get(*test)?))
        .collect();
    LabAnalysis::from_details(details)
}

fn lab_detail(test: LabTest, raw: &str) -> Option<String> {
    let value = parse_lab_value(raw)?;
    let range = test.reference_range();
    let direction = match range.classify(value) {
        RangePosition::Below => "below",
        RangePosition::Above => "above",
        RangePosition::Within => return None,
    };
    Some(format!(
        "{}: {} {} is {} normal range ({})",
        test.label(),
        render_value(raw.trim(), value),
        range.unit,
        direction,
        range
    ))
}

fn has_severe_calcitonin(labs: &LabResults) -> bool {
    let Some(value) = labs.get(LabTest::Calcitonin).and_then(parse_lab_value) else {
        return false;
    };
    LabTest::Calcitonin
        .reference_range()
        .classify(value)
        .is_abnormal()
        && value > SEVERE_CALCITONIN_LEVEL
}

fn render_value(entered: &str, value: f64) -> String {
    let shown = value.to_string();
    if shown.len() > MAX_RENDERED_VALUE_LEN {
        entered.to_string()
    } else {
        shown
    }
}

/// Parse an entered lab value. Blank, malformed and non-finite inputs
/// (`NaN`, `inf`) yield `None`.
fn parse_lab_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::patient::{Gender, YesNo};
    use crate::domain::prediction::RiskLevel;

    fn record(age: u32) -> PatientRecord {
        PatientRecord::new(PersonalInfo::new(age, Gender::Female))
    }

    fn all_factors() -> PatientRecord {
        let mut r = record(72);
        r.medical_history = MedicalHistory {
            family_history_thyroid: YesNo::Yes,
            radiation_exposure: YesNo::Yes,
            previous_thyroid_issues: YesNo::Yes,
            smoking: Smoking::Current,
        };
        r.symptoms = Symptoms {
            neck_swelling: YesNo::Yes,
            difficulty_swallowing: YesNo::Yes,
            voice_changes: YesNo::Yes,
            neck_pain: YesNo::Yes,
            swollen_lymph_nodes: YesNo::Yes,
        };
        r
    }

    /// Turn on the `i`-th risk factor (check order) in `r`.
    fn enable_factor(r: &mut PatientRecord, i: usize) {
        match i {
            0 => r.personal_info.age = r.personal_info.age.max(65),
            1 => r.medical_history.family_history_thyroid = YesNo::Yes,
            2 => r.medical_history.radiation_exposure = YesNo::Yes,
            3 => r.medical_history.previous_thyroid_issues = YesNo::Yes,
            4 => r.medical_history.smoking = Smoking::Current,
            5 => r.symptoms.neck_swelling = YesNo::Yes,
            6 => r.symptoms.difficulty_swallowing = YesNo::Yes,
            7 => r.symptoms.voice_changes = YesNo::Yes,
            8 => r.symptoms.neck_pain = YesNo::Yes,
            9 => r.symptoms.swollen_lymph_nodes = YesNo::Yes,
            _ => unreachable!("only ten risk factors"),
        }
    }

    /// Every record reachable by toggling one factor or lab at a time.
    fn sample_records() -> Vec<PatientRecord> {
        let mut out = vec![record(40), record(61), all_factors()];
        for i in 0..10 {
            let mut r = record(40);
            enable_factor(&mut r, i);
            out.push(r);
        }
        for value in ["0.1", "9", "25", "abc", "", "1e3", "-5"] {
            for test in LabTest::ALL {
                let mut r = all_factors();
                r.lab_results = LabResults::default().with(test, value);
                out.push(r.clone());
                r.medical_history = MedicalHistory::default();
                r.symptoms = Symptoms::default();
                out.push(r);
            }
        }
        let mut every_lab_high = all_factors();
        every_lab_high.lab_results = LabResults {
            tsh: Some("50".into()),
            t3: Some("500".into()),
            t4: Some("50".into()),
            thyroglobulin: Some("90".into()),
            calcitonin: Some("80".into()),
        };
        out.push(every_lab_high);
        out
    }

    #[test]
    fn test_no_factors_no_labs() {
        let result = evaluate_record(&record(40));
        assert_eq!(result.score, 0);
        assert_eq!(result.tier, RiskLevel::Low);
        assert!(result.factors.is_empty());
        assert_eq!(result.lab_analysis, LabAnalysis { abnormal: false, details: vec![] });
    }

    #[test]
    fn test_age_family_history_and_swelling() {
        let mut r = record(65);
        r.medical_history.family_history_thyroid = YesNo::Yes;
        r.symptoms.neck_swelling = YesNo::Yes;

        let result = evaluate_record(&r);
        assert_eq!(
            result.factors,
            vec![
                "Age over 60",
                "Family history of thyroid disease",
                "Neck swelling or lump"
            ]
        );
        assert_eq!(result.score, 30);
        assert_eq!(result.tier, RiskLevel::Moderate);
    }

    #[test]
    fn test_all_factors_in_fixed_order() {
        let result = evaluate_record(&all_factors());
        assert_eq!(result.score, 100);
        assert_eq!(result.tier, RiskLevel::High);
        assert_eq!(result.factors.len(), 10);
        let expected: Vec<&str> = factor_labels().collect();
        assert_eq!(result.factors, expected);
    }

    #[test]
    fn test_severe_calcitonin_alone() {
        let mut r = record(40);
        r.lab_results = LabResults::default().with(LabTest::Calcitonin, "25");

        let result = evaluate_record(&r);
        assert_eq!(
            result.lab_analysis.details,
            vec!["CALCITONIN: 25 pg/mL is above normal range (0-10 pg/mL)"]
        );
        assert!(result.lab_analysis.abnormal);
        assert_eq!(result.score, 45);
        assert_eq!(result.tier, RiskLevel::Moderate);
        assert_eq!(result.factors, vec![SEVERE_CALCITONIN_FACTOR]);
    }

    #[test]
    fn test_severe_factor_appended_last() {
        let mut r = record(65);
        r.symptoms.neck_pain = YesNo::Yes;
        r.lab_results = LabResults::default().with(LabTest::Calcitonin, "40");

        let result = evaluate_record(&r);
        assert_eq!(
            result.factors,
            vec!["Age over 60", "Neck pain", SEVERE_CALCITONIN_FACTOR]
        );
        assert_eq!(result.score, 20 + 15 + 30);
    }

    #[test]
    fn test_moderately_elevated_calcitonin_is_not_severe() {
        let mut r = record(40);
        r.lab_results = LabResults::default().with(LabTest::Calcitonin, "20");

        let result = evaluate_record(&r);
        assert_eq!(result.score, 15);
        assert!(result.factors.is_empty());
        assert_eq!(result.lab_analysis.details.len(), 1);
    }

    #[test]
    fn test_unparseable_lab_fails_open() {
        let mut r = record(40);
        r.lab_results = LabResults::default().with(LabTest::Tsh, "abc");

        let result = evaluate_record(&r);
        assert_eq!(result.score, 0);
        assert!(!result.lab_analysis.abnormal);
        assert!(result.lab_analysis.details.is_empty());
    }

    #[test]
    fn test_unparseable_calcitonin_has_no_bonus() {
        let mut r = record(40);
        r.lab_results = LabResults::default()
            .with(LabTest::Calcitonin, "25pg")
            .with(LabTest::T4, "NaN");

        let result = evaluate_record(&r);
        assert_eq!(result.score, 0);
        assert!(result.factors.is_empty());
    }

    #[test]
    fn test_non_finite_labs_fail_open() {
        for value in ["inf", "-infinity", "+Infinity", "NaN"] {
            let mut r = record(40);
            r.lab_results = LabResults::default()
                .with(LabTest::Calcitonin, value)
                .with(LabTest::Tsh, value);

            let result = evaluate_record(&r);
            assert_eq!(result.score, 0, "value {value}");
            assert!(result.factors.is_empty());
            assert!(!result.lab_analysis.abnormal);
        }
    }

    #[test]
    fn test_huge_value_rendered_as_entered() {
        let labs = LabResults::default().with(LabTest::Tsh, " 1e300 ");
        let analysis = analyze_labs(&labs);
        assert_eq!(
            analysis.details,
            vec!["TSH: 1e300 mIU/L is above normal range (0.4-4 mIU/L)"]
        );

        let labs = LabResults::default().with(LabTest::Tsh, "25.0");
        assert_eq!(
            analyze_labs(&labs).details,
            vec!["TSH: 25 mIU/L is above normal range (0.4-4 mIU/L)"]
        );
    }

    #[test]
    fn test_blank_labs_are_not_measured() {
        let labs = LabResults {
            tsh: Some(String::new()),
            t3: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(analyze_labs(&labs), LabAnalysis::default());
    }

    #[test]
    fn test_lab_details_below_and_above() {
        let labs = LabResults::default()
            .with(LabTest::Tsh, "0.1")
            .with(LabTest::T3, " 150 ")
            .with(LabTest::T4, "4.5")
            .with(LabTest::Thyroglobulin, "41");

        let analysis = analyze_labs(&labs);
        assert_eq!(
            analysis.details,
            vec![
                "TSH: 0.1 mIU/L is below normal range (0.4-4 mIU/L)",
                "T4: 4.5 µg/dL is below normal range (5-12 µg/dL)",
                "THYROGLOBULIN: 41 ng/mL is above normal range (3-40 ng/mL)",
            ]
        );
        assert!(analysis.abnormal);
    }

    #[test]
    fn test_each_abnormal_lab_adds_weight() {
        let mut r = record(40);
        r.lab_results = LabResults::default()
            .with(LabTest::Tsh, "9")
            .with(LabTest::T3, "20");
        assert_eq!(evaluate_record(&r).score, 30);
    }

    #[test]
    fn test_age_threshold_is_strict() {
        assert!(evaluate_record(&record(60)).factors.is_empty());
        assert_eq!(evaluate_record(&record(61)).factors, vec!["Age over 60"]);
    }

    #[test]
    fn test_former_smoker_is_not_a_factor() {
        let mut r = record(40);
        r.medical_history.smoking = Smoking::Former;
        assert_eq!(evaluate_record(&r).score, 0);
    }

    #[test]
    fn test_score_bounds_and_tier_invariant() {
        for r in sample_records() {
            let result = evaluate_record(&r);
            assert!(result.score <= 100);
            assert_eq!(result.tier, RiskLevel::from_score(result.score));
            assert_eq!(
                result.lab_analysis.abnormal,
                !result.lab_analysis.details.is_empty()
            );
        }
    }

    #[test]
    fn test_idempotent() {
        for r in sample_records() {
            assert_eq!(evaluate_record(&r), evaluate_record(&r));
        }
    }

    #[test]
    fn test_adding_a_factor_never_lowers_score() {
        for base in sample_records() {
            let before = evaluate_record(&base).score;
            for i in 0..RISK_FACTORS.len() {
                let mut toggled = base.clone();
                enable_factor(&mut toggled, i);
                assert!(
                    evaluate_record(&toggled).score >= before,
                    "enabling {} lowered the score",
                    RISK_FACTORS[i].label
                );
            }
        }
    }

    #[test]
    fn test_score_saturates_at_max() {
        let mut r = all_factors();
        r.lab_results = LabResults::default()
            .with(LabTest::Calcitonin, "300")
            .with(LabTest::Tsh, "12");
        let result = evaluate_record(&r);
        assert_eq!(result.score, 100);
        assert_eq!(result.factors.len(), 11);
        assert_eq!(result.lab_analysis.details.len(), 2);
    }
}
