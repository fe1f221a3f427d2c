// Grading Engine - derived percentage and division
// Pure computation, applied on every write of a student's marks.

use serde::{Deserialize, Serialize};

/// Number of subjects every student is graded on.
pub const SUBJECT_COUNT: usize = 5;

/// Maximum achievable total across all subjects.
const MAX_TOTAL: f64 = 500.0;

// ============================================================================
// DIVISION
// ============================================================================

/// Categorical grade band derived from percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Division {
    Distinction,
    #[serde(rename = "First Class")]
    FirstClass,
    #[serde(rename = "Second Class")]
    SecondClass,
    #[serde(rename = "Third Class")]
    ThirdClass,
}

impl Division {
    pub fn as_str(&self) -> &'static str {
        match self {
            Division::Distinction => "Distinction",
            Division::FirstClass => "First Class",
            Division::SecondClass => "Second Class",
            Division::ThirdClass => "Third Class",
        }
    }

    /// Parse the stored band name back into a `Division`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Distinction" => Some(Division::Distinction),
            "First Class" => Some(Division::FirstClass),
            "Second Class" => Some(Division::SecondClass),
            "Third Class" => Some(Division::ThirdClass),
            _ => None,
        }
    }
}

impl std::fmt::Display for Division {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// GRADING
// ============================================================================

/// Compute percentage (2 decimal places) and division from five marks.
///
/// Thresholds are checked descending, first match wins:
/// >= 75 Distinction, >= 60 First Class, >= 50 Second Class,
/// otherwise Third Class.
pub fn compute_grading(marks: &[f64; SUBJECT_COUNT]) -> (f64, Division) {
    let total: f64 = marks.iter().sum();
    let percentage = round2(total / MAX_TOTAL * 100.0);

    let division = if percentage >= 75.0 {
        Division::Distinction
    } else if percentage >= 60.0 {
        Division::FirstClass
    } else if percentage >= 50.0 {
        Division::SecondClass
    } else {
        Division::ThirdClass
    };

    (percentage, division)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_formula() {
        let (percentage, division) = compute_grading(&[80.0, 70.0, 90.0, 60.0, 100.0]);
        assert_eq!(percentage, 80.0);
        assert_eq!(division, Division::Distinction);
    }

    #[test]
    fn test_percentage_rounds_to_two_decimals() {
        let (percentage, _) = compute_grading(&[33.333, 33.333, 33.333, 33.333, 33.333]);
        assert_eq!(percentage, 33.33);
    }

    #[test]
    fn test_distinction_boundary() {
        let (percentage, division) = compute_grading(&[75.0; 5]);
        assert_eq!(percentage, 75.0);
        assert_eq!(division, Division::Distinction);

        // Just under the boundary falls into the next band down
        let (percentage, division) = compute_grading(&[74.95, 75.0, 75.0, 75.0, 75.0]);
        assert_eq!(percentage, 74.99);
        assert_eq!(division, Division::FirstClass);
    }

    #[test]
    fn test_first_class_boundary() {
        let (_, division) = compute_grading(&[60.0; 5]);
        assert_eq!(division, Division::FirstClass);

        let (percentage, division) = compute_grading(&[59.95, 60.0, 60.0, 60.0, 60.0]);
        assert_eq!(percentage, 59.99);
        assert_eq!(division, Division::SecondClass);
    }

    #[test]
    fn test_second_class_boundary() {
        let (_, division) = compute_grading(&[50.0; 5]);
        assert_eq!(division, Division::SecondClass);

        let (percentage, division) = compute_grading(&[49.95, 50.0, 50.0, 50.0, 50.0]);
        assert_eq!(percentage, 49.99);
        assert_eq!(division, Division::ThirdClass);
    }

    #[test]
    fn test_third_class() {
        let (percentage, division) = compute_grading(&[40.0; 5]);
        assert_eq!(percentage, 40.0);
        assert_eq!(division, Division::ThirdClass);
    }

    #[test]
    fn test_division_serializes_as_band_name() {
        assert_eq!(
            serde_json::to_string(&Division::FirstClass).unwrap(),
            "\"First Class\""
        );
        assert_eq!(
            serde_json::to_string(&Division::Distinction).unwrap(),
            "\"Distinction\""
        );
    }

    #[test]
    fn test_division_parse_roundtrip() {
        for division in [
            Division::Distinction,
            Division::FirstClass,
            Division::SecondClass,
            Division::ThirdClass,
        ] {
            assert_eq!(Division::parse(division.as_str()), Some(division));
        }
        assert_eq!(Division::parse("Fourth Class"), None);
    }
}
