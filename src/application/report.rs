//! Plain-text rendering of assessments.

use std::fmt::Write;

use crate::domain::{Assessment, LabAnalysis, LabResults, PredictionResult};

/// Full report for a stored assessment.
#[must_use]
pub fn render_report(assessment: &Assessment) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Thyroid Risk Assessment");
    let _ = writeln!(out, "=======================");
    let _ = writeln!(out, "ID:       {}", assessment.id);
    let _ = writeln!(out, "Date:     {}", assessment.created_at.format("%Y-%m-%d %H:%M UTC"));
    let _ = writeln!(
        out,
        "Patient:  {} years, {}",
        assessment.personal_info.age, assessment.personal_info.gender
    );
    out.push('\n');
    out.push_str(&render_prediction(&assessment.prediction, &assessment.lab_results));
    out
}

/// Score, factors and lab sections for a prediction.
#[must_use]
pub fn render_prediction(prediction: &PredictionResult, labs: &LabResults) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Risk score: {}/100", prediction.score);
    let _ = writeln!(
        out,
        "Risk tier:  {} ({})",
        prediction.tier,
        prediction.tier.description()
    );
    out.push('\n');

    let _ = writeln!(out, "Risk factors:");
    if prediction.factors.is_empty() {
        let _ = writeln!(out, "  No risk factors identified");
    }
    for (n, factor) in prediction.factors.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", n + 1, factor);
    }
    out.push('\n');

    out.push_str(&render_lab_analysis(&prediction.lab_analysis, labs));
    out
}

/// Lab section. `labs` distinguishes "nothing supplied" from "all normal".
#[must_use]
pub fn render_lab_analysis(analysis: &LabAnalysis, labs: &LabResults) -> String {
    let mut out = String::from("Lab analysis:\n");
    if analysis.abnormal {
        for detail in &analysis.details {
            let _ = writeln!(out, "  - {detail}");
        }
    } else if labs.any_supplied() {
        out.push_str("  All supplied lab values within normal range\n");
    } else {
        out.push_str("  No lab values supplied\n");
    }
    out
}

/// One-line summary used by listings.
#[must_use]
pub fn summary_line(assessment: &Assessment) -> String {
    format!(
        "{}  {}  score={:>3}  tier={:<8}  factors={}",
        assessment.id,
        assessment.created_at.format("%Y-%m-%d %H:%M"),
        assessment.prediction.score,
        assessment.prediction.tier.to_string(),
        assessment.prediction.factors.len()
    )
}
