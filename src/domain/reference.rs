//! Thyroid lab tests and their reference ranges.

use serde::Serialize;

/// Lab tests collected on the intake form, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabTest {
    Tsh,
    T3,
    T4,
    Thyroglobulin,
    Calcitonin,
}

impl LabTest {
    pub const ALL: [LabTest; 5] = [
        LabTest::Tsh,
        LabTest::T3,
        LabTest::T4,
        LabTest::Thyroglobulin,
        LabTest::Calcitonin,
    ];

    /// Form key of the test.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Self::Tsh => "tsh",
            Self::T3 => "t3",
            Self::T4 => "t4",
            Self::Thyroglobulin => "thyroglobulin",
            Self::Calcitonin => "calcitonin",
        }
    }

    /// Uppercased key, as shown in abnormality details.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Tsh => "TSH",
            Self::T3 => "T3",
            Self::T4 => "T4",
            Self::Thyroglobulin => "THYROGLOBULIN",
            Self::Calcitonin => "CALCITONIN",
        }
    }

    #[must_use]
    pub fn reference_range(&self) -> ReferenceRange {
        ReferenceRange::for_test(*self)
    }
}

impl std::fmt::Display for LabTest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Inclusive normal range for a lab test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReferenceRange {
    pub min: f64,
    pub max: f64,
    pub unit: &'static str,
}

impl ReferenceRange {
    #[must_use]
    pub fn for_test(test: LabTest) -> Self {
        match test {
            LabTest::Tsh => Self::new(0.4, 4.0, "mIU/L"),
            LabTest::T3 => Self::new(80.0, 200.0, "ng/dL"),
            LabTest::T4 => Self::new(5.0, 12.0, "µg/dL"),
            LabTest::Thyroglobulin => Self::new(3.0, 40.0, "ng/mL"),
            LabTest::Calcitonin => Self::new(0.0, 10.0, "pg/mL"),
        }
    }

    const fn new(min: f64, max: f64, unit: &'static str) -> Self {
        Self { min, max, unit }
    }

    /// Where a value falls relative to the range.
    #[must_use]
    pub fn classify(&self, value: f64) -> RangePosition {
        if value < self.min {
            RangePosition::Below
        } else if value > self.max {
            RangePosition::Above
        } else {
            RangePosition::Within
        }
    }
}

impl std::fmt::Display for ReferenceRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{} {}", self.min, self.max, self.unit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangePosition {
    Below,
    Within,
    Above,
}

impl RangePosition {
    #[must_use]
    pub fn is_abnormal(self) -> bool {
        !matches!(self, Self::Within)
    }
}
