//! Water-damage classification derived from accumulated answers.
//!
//! A small ordered set of escalation rules: the contamination source
//! answer sets a base category, elapsed time past a threshold upgrades
//! it (never downgrades), and the affected-area answer buckets an
//! independent severity class. Recomputed from scratch on every
//! relevant answer, so the result depends only on the current answer
//! state, never on submission order.

use serde::{Deserialize, Serialize};

use crate::domain::catalogue::{AnswerLookup, AnswerValue, ClassificationRole, Question};

/// Materials that force specialty drying regardless of affected area.
pub const SPECIALTY_MATERIALS: [&str; 2] = ["hardwood", "plaster"];

/// IICRC-style contamination category, 1 (clean) through 3 (black).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContaminationCategory {
    /// Category 1: clean supply water.
    Clean,
    /// Category 2: grey water with significant contamination.
    Grey,
    /// Category 3: black water, grossly contaminated.
    Black,
}

impl ContaminationCategory {
    /// Base category for a contamination-source selection.
    pub fn from_source(source: &str) -> Option<Self> {
        match source {
            "clean" => Some(Self::Clean),
            "grey" => Some(Self::Grey),
            "black" => Some(Self::Black),
            _ => None,
        }
    }

    /// Numeric category, 1 through 3.
    pub fn value(&self) -> u8 {
        match self {
            Self::Clean => 1,
            Self::Grey => 2,
            Self::Black => 3,
        }
    }

    /// One category worse, capped at black.
    pub fn escalated(&self) -> Self {
        match self {
            Self::Clean => Self::Grey,
            Self::Grey | Self::Black => Self::Black,
        }
    }
}

/// Severity class from affected area, 1 through 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityClass {
    /// Class 1: less than 5% of the area affected.
    Minimal,
    /// Class 2: 5% to 40% affected.
    Significant,
    /// Class 3: more than 40% affected.
    Extensive,
    /// Class 4: specialty drying materials involved.
    Specialty,
}

impl SeverityClass {
    /// Buckets an affected-area percentage.
    pub fn from_area_percent(percent: f64) -> Self {
        if percent < 5.0 {
            Self::Minimal
        } else if percent <= 40.0 {
            Self::Significant
        } else {
            Self::Extensive
        }
    }

    /// Numeric class, 1 through 4.
    pub fn value(&self) -> u8 {
        match self {
            Self::Minimal => 1,
            Self::Significant => 2,
            Self::Extensive => 3,
            Self::Specialty => 4,
        }
    }
}

/// Derived severity classification for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub category: ContaminationCategory,
    /// Absent until the affected-area answer exists.
    pub severity_class: Option<SeverityClass>,
    /// True when elapsed time upgraded the category past its base.
    pub escalated_by_time: bool,
}

/// Derives the classification from the current answer state.
///
/// `questions` is the session's applicable question set; only questions
/// carrying a classification role participate. Returns `None` until the
/// contamination source answer exists.
pub fn derive_classification<'a>(
    questions: impl IntoIterator<Item = &'a Question>,
    answers: &impl AnswerLookup,
    escalation_hours: f64,
) -> Option<Classification> {
    let mut source = None;
    let mut hours = None;
    let mut area_percent = None;
    let mut materials: Option<&[String]> = None;

    for question in questions {
        let Some(role) = question.classification_role else {
            continue;
        };
        let Some(answer) = answers.answer_value(&question.id) else {
            continue;
        };
        match role {
            ClassificationRole::ContaminationSource => {
                if let AnswerValue::Selection(s) = answer {
                    source = ContaminationCategory::from_source(s);
                }
            }
            ClassificationRole::HoursSinceIncident => hours = answer.as_number(),
            ClassificationRole::AffectedAreaPercent => area_percent = answer.as_number(),
            ClassificationRole::MaterialsAffected => {
                if let AnswerValue::Selections(choices) = answer {
                    materials = Some(choices);
                }
            }
        }
    }

    let base = source?;
    let escalate = hours.is_some_and(|h| h >= escalation_hours);
    let category = if escalate { base.escalated() } else { base };

    let specialty = materials.is_some_and(|m| {
        m.iter()
            .any(|choice| SPECIALTY_MATERIALS.contains(&choice.as_str()))
    });
    let severity_class = if specialty {
        Some(SeverityClass::Specialty)
    } else {
        area_percent.map(SeverityClass::from_area_percent)
    };

    Some(Classification {
        category,
        severity_class,
        escalated_by_time: escalate && category != base,
    })
}
