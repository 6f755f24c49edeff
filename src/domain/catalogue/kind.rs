//! Question input kinds and their typed answer values.
//!
//! `QuestionKind` is a closed sum type: every switch point (validation,
//! duration weighting, mapping) matches it exhaustively so adding a kind
//! is a compile-time event, not a runtime surprise.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The input kind of a catalogue question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    /// Yes/no toggle.
    Boolean,
    /// One choice from a fixed option list.
    SingleSelect { options: Vec<String> },
    /// Any subset of a fixed option list.
    MultiSelect { options: Vec<String> },
    /// A number constrained to an inclusive range.
    NumericRange {
        min: f64,
        max: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        unit: Option<String>,
    },
    /// Unconstrained operator-entered text.
    FreeText,
    /// A calendar date.
    Date,
    /// An ordinal rating from 1 to `max`.
    Rating { max: u8 },
    /// An elapsed-time answer expressed in hours.
    DurationHours,
}

impl QuestionKind {
    /// Short name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            QuestionKind::Boolean => "boolean",
            QuestionKind::SingleSelect { .. } => "single_select",
            QuestionKind::MultiSelect { .. } => "multi_select",
            QuestionKind::NumericRange { .. } => "numeric_range",
            QuestionKind::FreeText => "free_text",
            QuestionKind::Date => "date",
            QuestionKind::Rating { .. } => "rating",
            QuestionKind::DurationHours => "duration_hours",
        }
    }

    /// Validates an answer value against this kind.
    ///
    /// This is the single type/range check for answer recording: it fails
    /// closed so a malformed value is never stored.
    pub fn validate(&self, value: &AnswerValue) -> Result<(), AnswerTypeError> {
        match (self, value) {
            (QuestionKind::Boolean, AnswerValue::Boolean(_)) => Ok(()),
            (QuestionKind::SingleSelect { options }, AnswerValue::Selection(choice)) => {
                if options.iter().any(|o| o == choice) {
                    Ok(())
                } else {
                    Err(AnswerTypeError::UnknownOption(choice.clone()))
                }
            }
            (QuestionKind::MultiSelect { options }, AnswerValue::Selections(choices)) => {
                match choices.iter().find(|c| !options.contains(c)) {
                    Some(unknown) => Err(AnswerTypeError::UnknownOption(unknown.clone())),
                    None => Ok(()),
                }
            }
            (QuestionKind::NumericRange { min, max, .. }, AnswerValue::Number(n)) => {
                if *n >= *min && *n <= *max {
                    Ok(())
                } else {
                    Err(AnswerTypeError::OutOfRange {
                        value: *n,
                        min: *min,
                        max: *max,
                    })
                }
            }
            (QuestionKind::FreeText, AnswerValue::Text(_)) => Ok(()),
            (QuestionKind::Date, AnswerValue::Date(_)) => Ok(()),
            (QuestionKind::Rating { max }, AnswerValue::Rating(r)) => {
                if *r >= 1 && r <= max {
                    Ok(())
                } else {
                    Err(AnswerTypeError::RatingOutOfRange {
                        value: *r,
                        max: *max,
                    })
                }
            }
            (QuestionKind::DurationHours, AnswerValue::Hours(h)) => {
                if *h >= 0.0 {
                    Ok(())
                } else {
                    Err(AnswerTypeError::NegativeHours(*h))
                }
            }
            (kind, answer) => Err(AnswerTypeError::WrongKind {
                expected: kind.name(),
                actual: answer.kind_name(),
            }),
        }
    }
}

/// A typed answer value, mirroring the question kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AnswerValue {
    Boolean(bool),
    Selection(String),
    Selections(Vec<String>),
    Number(f64),
    Text(String),
    Date(NaiveDate),
    Rating(u8),
    Hours(f64),
}

impl AnswerValue {
    /// Short name used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            AnswerValue::Boolean(_) => "boolean",
            AnswerValue::Selection(_) => "selection",
            AnswerValue::Selections(_) => "selections",
            AnswerValue::Number(_) => "number",
            AnswerValue::Text(_) => "text",
            AnswerValue::Date(_) => "date",
            AnswerValue::Rating(_) => "rating",
            AnswerValue::Hours(_) => "hours",
        }
    }

    /// Returns the value as a number where the kind is numeric.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AnswerValue::Number(n) => Some(*n),
            AnswerValue::Rating(r) => Some(f64::from(*r)),
            AnswerValue::Hours(h) => Some(*h),
            _ => None,
        }
    }

    /// Returns a string key for lookup-table transforms.
    ///
    /// Only answers with a natural textual identity have one.
    pub fn lookup_key(&self) -> Option<String> {
        match self {
            AnswerValue::Selection(s) => Some(s.clone()),
            AnswerValue::Text(t) => Some(t.clone()),
            AnswerValue::Boolean(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerValue::Boolean(b) => write!(f, "{}", b),
            AnswerValue::Selection(s) => write!(f, "{}", s),
            AnswerValue::Selections(list) => write!(f, "{}", list.join(", ")),
            AnswerValue::Number(n) => write!(f, "{}", n),
            AnswerValue::Text(t) => write!(f, "{}", t),
            AnswerValue::Date(d) => write!(f, "{}", d),
            AnswerValue::Rating(r) => write!(f, "{}", r),
            AnswerValue::Hours(h) => write!(f, "{}h", h),
        }
    }
}

/// Errors from checking an answer value against a question kind.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnswerTypeError {
    #[error("expected a {expected} answer, got {actual}")]
    WrongKind {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("selection '{0}' is not among the declared options")]
    UnknownOption(String),

    #[error("number {value} is outside the declared range {min}..={max}")]
    OutOfRange { value: f64, min: f64, max: f64 },

    #[error("rating {value} is outside 1..={max}")]
    RatingOutOfRange { value: u8, max: u8 },

    #[error("duration hours must be non-negative, got {0}")]
    NegativeHours(f64),
}
