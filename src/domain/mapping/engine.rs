//! MappingEngine - applies a question's mapping rules to an answer.

use tracing::debug;

use crate::domain::catalogue::{AnswerLookup, AnswerValue, FieldValue, MappingRule, Question};
use crate::domain::foundation::{Confidence, FieldKey};

use super::field_map::FieldMap;

// Static-rule exact matching lives with the rule definitions.
use crate::domain::catalogue::static_rule_matches;

/// Applies field-mapping rules and merges the results into a field map.
///
/// Never fails: a rule whose inputs are unavailable (a transform missing
/// its upstream answer, a static rule that does not match) simply does
/// not fire. Partial multi-field population is expected.
pub struct MappingEngine;

impl MappingEngine {
    /// Applies every mapping rule of `question` to `answer`.
    ///
    /// `answers` supplies the other already-known answers transforms may
    /// consume. Returns the fields written, in rule order.
    pub fn apply(
        question: &Question,
        answer: &AnswerValue,
        answers: &impl AnswerLookup,
        field_map: &mut FieldMap,
    ) -> Vec<FieldKey> {
        let mut written = Vec::new();
        for rule in &question.mappings {
            Self::apply_rule(question, rule, answer, answers, field_map, &mut written);
        }
        if !written.is_empty() {
            debug!(
                question = question.id.as_str(),
                fields = written.len(),
                "mapped answer into field map"
            );
        }
        written
    }

    fn apply_rule(
        question: &Question,
        rule: &MappingRule,
        answer: &AnswerValue,
        answers: &impl AnswerLookup,
        field_map: &mut FieldMap,
        written: &mut Vec<FieldKey>,
    ) {
        match rule {
            MappingRule::Direct { target } => {
                field_map.write(
                    target.clone(),
                    question.id.clone(),
                    FieldValue::from_answer(answer),
                    Confidence::DIRECT,
                );
                written.push(target.clone());
            }
            MappingRule::Transformed { target, transform } => {
                if let Some((value, upstream)) = transform.apply(answer, answers) {
                    field_map.write(
                        target.clone(),
                        question.id.clone(),
                        value,
                        Confidence::transformed(upstream),
                    );
                    written.push(target.clone());
                }
            }
            MappingRule::Static {
                target,
                when,
                assign,
            } => {
                if static_rule_matches(when, answer) {
                    field_map.write(
                        target.clone(),
                        question.id.clone(),
                        assign.clone(),
                        Confidence::STATIC_EXACT,
                    );
                    written.push(target.clone());
                }
            }
            MappingRule::MultiField { parts } => {
                for part in parts {
                    Self::apply_rule(question, part, answer, answers, field_map, written);
                }
            }
        }
    }

}
