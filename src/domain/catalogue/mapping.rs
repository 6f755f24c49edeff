//! Field-mapping rules - how answers populate the report field map.
//!
//! Four rule kinds, each producing `(target field, value, confidence)`:
//! direct verbatim copies, pure transforms, static assignments on exact
//! match, and multi-field expansions. Transforms are themselves data so
//! the catalogue can be validated without executing anything.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{FieldKey, QuestionId};

use super::kind::AnswerValue;
use super::predicate::AnswerLookup;

/// A typed value written into the report field map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Boolean(bool),
    List(Vec<String>),
    Date(NaiveDate),
}

impl FieldValue {
    /// Converts an answer verbatim into a field value (Direct rule).
    pub fn from_answer(answer: &AnswerValue) -> Self {
        match answer {
            AnswerValue::Boolean(b) => FieldValue::Boolean(*b),
            AnswerValue::Selection(s) => FieldValue::Text(s.clone()),
            AnswerValue::Selections(list) => FieldValue::List(list.clone()),
            AnswerValue::Number(n) => FieldValue::Number(*n),
            AnswerValue::Text(t) => FieldValue::Text(t.clone()),
            AnswerValue::Date(d) => FieldValue::Date(*d),
            AnswerValue::Rating(r) => FieldValue::Number(f64::from(*r)),
            AnswerValue::Hours(h) => FieldValue::Number(*h),
        }
    }
}

/// A pure, data-described function of the answer (and optionally other
/// already-known answers).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Transform {
    /// Maps the answer's textual key through a fixed table.
    Lookup {
        table: BTreeMap<String, FieldValue>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<FieldValue>,
    },
    /// Buckets a numeric answer: `bounds` are ascending upper bounds, and
    /// `labels` has one more entry than `bounds` for the open top bucket.
    BucketNumber {
        bounds: Vec<f64>,
        labels: Vec<String>,
    },
    /// Counts the choices of a multi-select answer.
    CountSelections,
    /// Joins the choices of a multi-select answer into one text value.
    JoinSelections { separator: String },
    /// Looks up the pair `(this answer, other question's answer)` in a
    /// table keyed as `"this|other"`. Does not fire while the other
    /// question is unanswered.
    CombineLookup {
        other: QuestionId,
        table: BTreeMap<String, FieldValue>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<FieldValue>,
    },
}

impl Transform {
    /// Applies the transform, returning the derived value and how many
    /// upstream answers it consumed.
    ///
    /// Returns `None` when the transform cannot fire for this answer
    /// (wrong shape, missing table entry with no default, or a required
    /// upstream answer absent). Not firing is expected, never an error.
    pub fn apply(
        &self,
        answer: &AnswerValue,
        answers: &impl AnswerLookup,
    ) -> Option<(FieldValue, usize)> {
        match self {
            Transform::Lookup { table, default } => {
                let key = answer.lookup_key()?;
                table
                    .get(&key)
                    .or(default.as_ref())
                    .cloned()
                    .map(|v| (v, 1))
            }
            Transform::BucketNumber { bounds, labels } => {
                let n = answer.as_number()?;
                let idx = bounds.iter().position(|b| n <= *b).unwrap_or(bounds.len());
                labels.get(idx).map(|l| (FieldValue::Text(l.clone()), 1))
            }
            Transform::CountSelections => match answer {
                AnswerValue::Selections(choices) => {
                    Some((FieldValue::Number(choices.len() as f64), 1))
                }
                _ => None,
            },
            Transform::JoinSelections { separator } => match answer {
                AnswerValue::Selections(choices) => {
                    Some((FieldValue::Text(choices.join(separator)), 1))
                }
                _ => None,
            },
            Transform::CombineLookup {
                other,
                table,
                default,
            } => {
                let own_key = answer.lookup_key()?;
                let other_key = answers.answer_value(other)?.lookup_key()?;
                let key = format!("{}|{}", own_key, other_key);
                table
                    .get(&key)
                    .or(default.as_ref())
                    .cloned()
                    .map(|v| (v, 2))
            }
        }
    }

    /// Returns the other questions this transform reads, if any.
    pub fn referenced_questions(&self) -> Vec<&QuestionId> {
        match self {
            Transform::CombineLookup { other, .. } => vec![other],
            _ => Vec::new(),
        }
    }
}

/// One field-mapping rule of a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MappingRule {
    /// Copies the answer value verbatim to the target field.
    Direct { target: FieldKey },
    /// Derives the value via a pure transform of the answer.
    Transformed {
        target: FieldKey,
        transform: Transform,
    },
    /// Assigns a fixed constant when the answer matches `when` exactly.
    ///
    /// For multi-select answers a `Selection` match fires when the choice
    /// is among the selected options.
    Static {
        target: FieldKey,
        when: AnswerValue,
        assign: FieldValue,
    },
    /// Expands into multiple target fields from one answer. Parts are
    /// non-multi-field rules; a part whose inputs are unavailable simply
    /// does not fire (partial population is expected).
    MultiField { parts: Vec<MappingRule> },
}

impl MappingRule {
    /// Returns every target field this rule can write.
    pub fn targets(&self) -> Vec<&FieldKey> {
        match self {
            MappingRule::Direct { target }
            | MappingRule::Transformed { target, .. }
            | MappingRule::Static { target, .. } => vec![target],
            MappingRule::MultiField { parts } => {
                parts.iter().flat_map(|p| p.targets()).collect()
            }
        }
    }

    /// Returns the other questions this rule's transforms read, if any.
    pub fn referenced_questions(&self) -> Vec<&QuestionId> {
        match self {
            MappingRule::Transformed { transform, .. } => transform.referenced_questions(),
            MappingRule::MultiField { parts } => {
                parts.iter().flat_map(|p| p.referenced_questions()).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Returns true for the multi-field expansion kind.
    pub fn is_multi_field(&self) -> bool {
        matches!(self, MappingRule::MultiField { .. })
    }
}

/// Exact-match test for Static rules.
///
/// Free function rather than a method on `AnswerValue` because the
/// multi-select containment special case is a mapping-rule policy, not a
/// property of answer equality.
pub(crate) fn static_rule_matches(when: &AnswerValue, answer: &AnswerValue) -> bool {
    match (when, answer) {
        (AnswerValue::Selection(choice), AnswerValue::Selections(choices)) => {
            choices.contains(choice)
        }
        _ => when == answer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_answers() -> HashMap<QuestionId, AnswerValue> {
        HashMap::new()
    }

    #[test]
    fn from_answer_copies_verbatim() {
        assert_eq!(
            FieldValue::from_answer(&AnswerValue::Selection("grey".into())),
            FieldValue::Text("grey".into())
        );
        assert_eq!(
            FieldValue::from_answer(&AnswerValue::Rating(4)),
            FieldValue::Number(4.0)
        );
        assert_eq!(
            FieldValue::from_answer(&AnswerValue::Hours(60.0)),
            FieldValue::Number(60.0)
        );
    }

    #[test]
    fn lookup_maps_through_table() {
        let transform = Transform::Lookup {
            table: [("grey".to_string(), FieldValue::Text("Category 2".into()))]
                .into_iter()
                .collect(),
            default: None,
        };
        let (value, upstream) = transform
            .apply(&AnswerValue::Selection("grey".into()), &no_answers())
            .unwrap();
        assert_eq!(value, FieldValue::Text("Category 2".into()));
        assert_eq!(upstream, 1);
    }

    #[test]
    fn lookup_misses_fall_back_to_default_or_nothing() {
        let with_default = Transform::Lookup {
            table: BTreeMap::new(),
            default: Some(FieldValue::Text("unknown".into())),
        };
        assert!(with_default
            .apply(&AnswerValue::Selection("x".into()), &no_answers())
            .is_some());

        let without_default = Transform::Lookup {
            table: BTreeMap::new(),
            default: None,
        };
        assert!(without_default
            .apply(&AnswerValue::Selection("x".into()), &no_answers())
            .is_none());
    }

    #[test]
    fn bucket_number_picks_correct_bucket() {
        let transform = Transform::BucketNumber {
            bounds: vec![5.0, 40.0],
            labels: vec!["small".into(), "medium".into(), "large".into()],
        };
        let bucket = |n: f64| {
            transform
                .apply(&AnswerValue::Number(n), &no_answers())
                .map(|(v, _)| v)
        };
        assert_eq!(bucket(3.0), Some(FieldValue::Text("small".into())));
        assert_eq!(bucket(5.0), Some(FieldValue::Text("small".into())));
        assert_eq!(bucket(20.0), Some(FieldValue::Text("medium".into())));
        assert_eq!(bucket(80.0), Some(FieldValue::Text("large".into())));
    }

    #[test]
    fn count_and_join_only_fire_on_multi_select() {
        let selections = AnswerValue::Selections(vec!["carpet".into(), "drywall".into()]);
        assert_eq!(
            Transform::CountSelections
                .apply(&selections, &no_answers())
                .map(|(v, _)| v),
            Some(FieldValue::Number(2.0))
        );
        assert_eq!(
            Transform::JoinSelections {
                separator: "; ".into()
            }
            .apply(&selections, &no_answers())
            .map(|(v, _)| v),
            Some(FieldValue::Text("carpet; drywall".into()))
        );
        assert!(Transform::CountSelections
            .apply(&AnswerValue::Number(2.0), &no_answers())
            .is_none());
    }

    #[test]
    fn combine_lookup_waits_for_upstream_answer() {
        let transform = Transform::CombineLookup {
            other: QuestionId::new("water.source"),
            table: [(
                "hardwood|grey".to_string(),
                FieldValue::Text("aggressive".into()),
            )]
            .into_iter()
            .collect(),
            default: None,
        };

        // Upstream unanswered: does not fire.
        assert!(transform
            .apply(&AnswerValue::Selection("hardwood".into()), &no_answers())
            .is_none());

        // Upstream answered: fires and reports two consumed answers.
        let answers: HashMap<_, _> = [(
            QuestionId::new("water.source"),
            AnswerValue::Selection("grey".into()),
        )]
        .into_iter()
        .collect();
        let (value, upstream) = transform
            .apply(&AnswerValue::Selection("hardwood".into()), &answers)
            .unwrap();
        assert_eq!(value, FieldValue::Text("aggressive".into()));
        assert_eq!(upstream, 2);
    }

    #[test]
    fn targets_expands_multi_field_rules() {
        let rule = MappingRule::MultiField {
            parts: vec![
                MappingRule::Direct {
                    target: FieldKey::new("materials.list"),
                },
                MappingRule::Transformed {
                    target: FieldKey::new("drying.method"),
                    transform: Transform::CountSelections,
                },
            ],
        };
        let targets: Vec<&str> = rule.targets().into_iter().map(|t| t.as_str()).collect();
        assert_eq!(targets, vec!["materials.list", "drying.method"]);
    }

    #[test]
    fn static_match_is_exact_for_scalars() {
        assert!(static_rule_matches(
            &AnswerValue::Boolean(true),
            &AnswerValue::Boolean(true)
        ));
        assert!(!static_rule_matches(
            &AnswerValue::Boolean(true),
            &AnswerValue::Boolean(false)
        ));
    }

    #[test]
    fn static_selection_matches_inside_multi_select() {
        assert!(static_rule_matches(
            &AnswerValue::Selection("hardwood".into()),
            &AnswerValue::Selections(vec!["carpet".into(), "hardwood".into()])
        ));
        assert!(!static_rule_matches(
            &AnswerValue::Selection("hardwood".into()),
            &AnswerValue::Selections(vec!["carpet".into()])
        ));
    }

    #[test]
    fn mapping_rule_roundtrips_through_yaml() {
        let rule = MappingRule::Static {
            target: FieldKey::new("response.priority"),
            when: AnswerValue::Selection("black".into()),
            assign: FieldValue::Text("emergency".into()),
        };
        let yaml = serde_yaml::to_string(&rule).unwrap();
        let back: MappingRule = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, rule);
    }
}
