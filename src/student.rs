// Student record model and request-body validation.
// Validation runs before any store interaction; numeric coercion of the
// marks array is explicit rather than implicit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::grading::{Division, SUBJECT_COUNT};

// ============================================================================
// STUDENT RECORD
// ============================================================================

/// A persisted student record.
///
/// `percentage` and `division` are derived from `marks` on every write and
/// are never read from client input. `id` and the timestamps are assigned
/// by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub marks: Vec<f64>,
    pub percentage: f64,
    pub division: Division,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// VALIDATION
// ============================================================================

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        FieldError {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Validated create/update input: a name plus exactly five numeric marks.
#[derive(Debug, Clone)]
pub struct StudentInput {
    pub name: String,
    pub marks: [f64; SUBJECT_COUNT],
}

impl StudentInput {
    /// Parse a raw JSON body into validated input.
    ///
    /// Marks may arrive as JSON numbers or numeric strings; anything else
    /// is a field error. All failures for the body are collected so the
    /// caller can report them together.
    pub fn from_body(body: &Value) -> Result<Self, Vec<FieldError>> {
        let mut errors = Vec::new();

        let name = match body.get("name").and_then(Value::as_str) {
            Some(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    errors.push(FieldError::new("name", "Name is required"));
                    None
                } else if !trimmed
                    .chars()
                    .all(|c| c.is_ascii_alphabetic() || c.is_whitespace())
                {
                    errors.push(FieldError::new("name", "Name should contain only letters"));
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            None => {
                errors.push(FieldError::new("name", "Name is required"));
                None
            }
        };

        let marks = match body.get("marks").and_then(Value::as_array) {
            Some(raw) if raw.len() == SUBJECT_COUNT => {
                let mut parsed = [0.0; SUBJECT_COUNT];
                let mut all_numeric = true;
                for (i, value) in raw.iter().enumerate() {
                    match coerce_numeric(value) {
                        Some(n) => parsed[i] = n,
                        None => {
                            errors.push(FieldError::new(
                                "marks",
                                format!("Mark {} is not numeric", i + 1),
                            ));
                            all_numeric = false;
                        }
                    }
                }
                if all_numeric {
                    Some(parsed)
                } else {
                    None
                }
            }
            _ => {
                errors.push(FieldError::new("marks", "Enter marks for 5 subjects"));
                None
            }
        };

        match (name, marks) {
            (Some(name), Some(marks)) => Ok(StudentInput { name, marks }),
            _ => Err(errors),
        }
    }
}

/// Coerce a JSON value to f64: numbers pass through, numeric strings parse.
fn coerce_numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

// ============================================================================
// TESTS
// ============================================================================
