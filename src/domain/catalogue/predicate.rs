//! Rule predicates as data.
//!
//! Applicability and visibility conditions are explicit expression trees
//! (operator + operand references), never executable code, so the
//! catalogue stays data-only and can be validated statically for cycles
//! before any session runs.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::domain::foundation::QuestionId;

use super::context::{EntitlementTier, SessionContext};
use super::kind::AnswerValue;

/// Read access to recorded answers during predicate evaluation.
///
/// The interview session implements this over the answers of currently
/// visible questions; an absent answer always evaluates as a false
/// predicate operand, never as an error.
pub trait AnswerLookup {
    /// Returns the latest answer value for a question, if any.
    fn answer_value(&self, id: &QuestionId) -> Option<&AnswerValue>;
}

impl AnswerLookup for HashMap<QuestionId, AnswerValue> {
    fn answer_value(&self, id: &QuestionId) -> Option<&AnswerValue> {
        self.get(id)
    }
}

impl AnswerLookup for BTreeMap<QuestionId, AnswerValue> {
    fn answer_value(&self, id: &QuestionId) -> Option<&AnswerValue> {
        self.get(id)
    }
}

/// Predicate over session context, evaluated once at session start.
///
/// A question failing its applicability predicate is permanently excluded
/// from the session, unlike visibility which is re-evaluated dynamically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Applicability {
    /// Applies to every session.
    #[default]
    Always,
    /// Applies when the job type is one of the listed types.
    JobTypeIn { job_types: Vec<String> },
    /// Applies when the jurisdiction is one of the listed codes.
    JurisdictionIn { jurisdictions: Vec<String> },
    /// Applies when the operator's entitlement meets the minimum tier.
    MinEntitlement { tier: EntitlementTier },
    /// Applies when every sub-rule applies.
    All { rules: Vec<Applicability> },
    /// Applies when any sub-rule applies.
    Any { rules: Vec<Applicability> },
    /// Applies when the sub-rule does not.
    Not { rule: Box<Applicability> },
}

impl Applicability {
    /// Evaluates this predicate against a session context.
    pub fn evaluate(&self, context: &SessionContext) -> bool {
        match self {
            Applicability::Always => true,
            Applicability::JobTypeIn { job_types } => {
                job_types.iter().any(|jt| jt == &context.job_type)
            }
            Applicability::JurisdictionIn { jurisdictions } => {
                jurisdictions.iter().any(|j| j == &context.jurisdiction)
            }
            Applicability::MinEntitlement { tier } => context.entitlement.satisfies(*tier),
            Applicability::All { rules } => rules.iter().all(|r| r.evaluate(context)),
            Applicability::Any { rules } => rules.iter().any(|r| r.evaluate(context)),
            Applicability::Not { rule } => !rule.evaluate(context),
        }
    }
}

/// Boolean expression over prior answers controlling question visibility.
///
/// Leaves referencing an unanswered question evaluate to false; `Not`
/// applies plain boolean negation on top of that policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Condition {
    /// True when the referenced question has an answer.
    Answered { question: QuestionId },
    /// True when the referenced answer equals the given value.
    Equals {
        question: QuestionId,
        value: AnswerValue,
    },
    /// True when the referenced answer exists and differs from the value.
    NotEquals {
        question: QuestionId,
        value: AnswerValue,
    },
    /// True when a multi-select answer includes the given choice.
    Includes {
        question: QuestionId,
        choice: String,
    },
    /// True when a numeric answer is at least the threshold.
    AtLeast {
        question: QuestionId,
        threshold: f64,
    },
    /// True when a numeric answer is at most the threshold.
    AtMost {
        question: QuestionId,
        threshold: f64,
    },
    /// True when every sub-condition holds.
    All { conditions: Vec<Condition> },
    /// True when any sub-condition holds.
    Any { conditions: Vec<Condition> },
    /// True when the sub-condition does not hold.
    Not { condition: Box<Condition> },
}

impl Condition {
    /// Evaluates this condition against recorded answers.
    pub fn evaluate(&self, answers: &impl AnswerLookup) -> bool {
        match self {
            Condition::Answered { question } => answers.answer_value(question).is_some(),
            Condition::Equals { question, value } => answers
                .answer_value(question)
                .map(|a| a == value)
                .unwrap_or(false),
            Condition::NotEquals { question, value } => answers
                .answer_value(question)
                .map(|a| a != value)
                .unwrap_or(false),
            Condition::Includes { question, choice } => {
                match answers.answer_value(question) {
                    Some(AnswerValue::Selections(choices)) => choices.contains(choice),
                    _ => false,
                }
            }
            Condition::AtLeast {
                question,
                threshold,
            } => answers
                .answer_value(question)
                .and_then(|a| a.as_number())
                .map(|n| n >= *threshold)
                .unwrap_or(false),
            Condition::AtMost {
                question,
                threshold,
            } => answers
                .answer_value(question)
                .and_then(|a| a.as_number())
                .map(|n| n <= *threshold)
                .unwrap_or(false),
            Condition::All { conditions } => conditions.iter().all(|c| c.evaluate(answers)),
            Condition::Any { conditions } => conditions.iter().any(|c| c.evaluate(answers)),
            Condition::Not { condition } => !condition.evaluate(answers),
        }
    }

    /// Collects every question this condition references.
    ///
    /// Used at catalogue load to reject forward references and at runtime
    /// to re-evaluate only the conditions touched by a new answer.
    pub fn referenced_questions(&self) -> Vec<&QuestionId> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<&'a QuestionId>) {
        match self {
            Condition::Answered { question }
            | Condition::Equals { question, .. }
            | Condition::NotEquals { question, .. }
            | Condition::Includes { question, .. }
            | Condition::AtLeast { question, .. }
            | Condition::AtMost { question, .. } => out.push(question),
            Condition::All { conditions } | Condition::Any { conditions } => {
                for c in conditions {
                    c.collect_references(out);
                }
            }
            Condition::Not { condition } => condition.collect_references(out),
        }
    }
}
