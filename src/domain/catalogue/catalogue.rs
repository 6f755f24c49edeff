//! QuestionCatalogue - the validated, versioned question set.
//!
//! Loading is the external caller's job; this type is the validation
//! boundary. Every structural problem (cycles via forward references,
//! dangling ids, malformed kinds or transforms) is rejected here, at load
//! time, so no session can ever hit one at runtime.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

use crate::domain::foundation::{FieldKey, QuestionId, Tier};

use super::mapping::{MappingRule, Transform};
use super::question::Question;
use super::QuestionKind;

/// Errors detected while validating a catalogue at load time.
///
/// All of these are fatal: the catalogue must be fixed before any session
/// can start.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogueError {
    #[error("catalogue contains no questions")]
    Empty,

    #[error("duplicate question id '{0}'")]
    DuplicateId(QuestionId),

    #[error("question '{question}' has tier 0; tiers start at 1")]
    ZeroTier { question: QuestionId },

    #[error("question '{question}' references unknown question '{referenced}'")]
    UnknownQuestionReference {
        question: QuestionId,
        referenced: QuestionId,
    },

    #[error(
        "question '{question}' visibility references '{referenced}', \
         which is not strictly earlier in tier order"
    )]
    ForwardVisibilityReference {
        question: QuestionId,
        referenced: QuestionId,
    },

    #[error("select question '{question}' declares no options")]
    NoOptions { question: QuestionId },

    #[error("question '{question}' numeric range is inverted ({min} > {max})")]
    InvertedRange {
        question: QuestionId,
        min: f64,
        max: f64,
    },

    #[error("rating question '{question}' has maximum 0")]
    ZeroRatingMax { question: QuestionId },

    #[error(
        "question '{question}' bucket transform needs one more label than \
         bound ({labels} labels, {bounds} bounds)"
    )]
    BucketShape {
        question: QuestionId,
        bounds: usize,
        labels: usize,
    },

    #[error("question '{question}' bucket transform bounds are not ascending")]
    UnsortedBucketBounds { question: QuestionId },

    #[error("question '{question}' nests a multi-field rule inside another")]
    NestedMultiField { question: QuestionId },

    #[error("failed to parse catalogue: {0}")]
    Parse(String),
}

/// An immutable, versioned set of question definitions.
///
/// Process-wide, load-once, read-only data: injected into the engines as
/// a value so multiple catalogue versions can coexist (e.g. in tests).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionCatalogue {
    version: String,
    questions: Vec<Question>,
}

impl QuestionCatalogue {
    /// Creates a catalogue, validating it in full.
    pub fn new(
        version: impl Into<String>,
        questions: Vec<Question>,
    ) -> Result<Self, CatalogueError> {
        let catalogue = Self {
            version: version.into(),
            questions,
        };
        catalogue.validate()?;
        Ok(catalogue)
    }

    /// Parses and validates a catalogue from YAML.
    pub fn from_yaml(source: &str) -> Result<Self, CatalogueError> {
        let catalogue: Self =
            serde_yaml::from_str(source).map_err(|e| CatalogueError::Parse(e.to_string()))?;
        catalogue.validate()?;
        Ok(catalogue)
    }

    /// Parses and validates a catalogue from JSON.
    pub fn from_json(source: &str) -> Result<Self, CatalogueError> {
        let catalogue: Self =
            serde_json::from_str(source).map_err(|e| CatalogueError::Parse(e.to_string()))?;
        catalogue.validate()?;
        Ok(catalogue)
    }

    /// Returns the catalogue version string.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns all questions in declared order.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Looks a question up by id.
    pub fn get(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| &q.id == id)
    }

    /// Returns every target field any mapping rule can write.
    ///
    /// The engine guarantees session field maps never stray outside this
    /// universe.
    pub fn field_universe(&self) -> BTreeSet<FieldKey> {
        self.questions
            .iter()
            .flat_map(|q| q.mappings.iter())
            .flat_map(|m| m.targets())
            .cloned()
            .collect()
    }

    /// Validates the catalogue structure.
    ///
    /// Visibility references must target an existing question strictly
    /// earlier in `(tier, declared position)` order, which rules out
    /// dependency cycles by construction.
    pub fn validate(&self) -> Result<(), CatalogueError> {
        if self.questions.is_empty() {
            return Err(CatalogueError::Empty);
        }

        let mut order: HashMap<&QuestionId, (Tier, usize)> = HashMap::new();
        for (pos, q) in self.questions.iter().enumerate() {
            if q.tier.value() == 0 {
                return Err(CatalogueError::ZeroTier {
                    question: q.id.clone(),
                });
            }
            if order.insert(&q.id, (q.tier, pos)).is_some() {
                return Err(CatalogueError::DuplicateId(q.id.clone()));
            }
        }

        for q in &self.questions {
            self.validate_kind(q)?;
            self.validate_visibility(q, &order)?;
            for rule in &q.mappings {
                self.validate_rule(q, rule, false)?;
            }
        }

        Ok(())
    }

    fn validate_kind(&self, q: &Question) -> Result<(), CatalogueError> {
        match &q.kind {
            QuestionKind::SingleSelect { options } | QuestionKind::MultiSelect { options } => {
                if options.is_empty() {
                    return Err(CatalogueError::NoOptions {
                        question: q.id.clone(),
                    });
                }
            }
            QuestionKind::NumericRange { min, max, .. } => {
                if min > max {
                    return Err(CatalogueError::InvertedRange {
                        question: q.id.clone(),
                        min: *min,
                        max: *max,
                    });
                }
            }
            QuestionKind::Rating { max } => {
                if *max == 0 {
                    return Err(CatalogueError::ZeroRatingMax {
                        question: q.id.clone(),
                    });
                }
            }
            QuestionKind::Boolean
            | QuestionKind::FreeText
            | QuestionKind::Date
            | QuestionKind::DurationHours => {}
        }
        Ok(())
    }

    fn validate_visibility(
        &self,
        q: &Question,
        order: &HashMap<&QuestionId, (Tier, usize)>,
    ) -> Result<(), CatalogueError> {
        let own_order = order[&q.id];
        for referenced in q.visibility_references() {
            match order.get(referenced) {
                None => {
                    return Err(CatalogueError::UnknownQuestionReference {
                        question: q.id.clone(),
                        referenced: referenced.clone(),
                    });
                }
                Some(ref_order) if *ref_order >= own_order => {
                    return Err(CatalogueError::ForwardVisibilityReference {
                        question: q.id.clone(),
                        referenced: referenced.clone(),
                    });
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    fn validate_rule(
        &self,
        q: &Question,
        rule: &MappingRule,
        nested: bool,
    ) -> Result<(), CatalogueError> {
        match rule {
            MappingRule::MultiField { parts } => {
                if nested {
                    return Err(CatalogueError::NestedMultiField {
                        question: q.id.clone(),
                    });
                }
                for part in parts {
                    self.validate_rule(q, part, true)?;
                }
            }
            MappingRule::Transformed { transform, .. } => {
                self.validate_transform(q, transform)?;
            }
            MappingRule::Direct { .. } | MappingRule::Static { .. } => {}
        }
        Ok(())
    }

    fn validate_transform(&self, q: &Question, transform: &Transform) -> Result<(), CatalogueError> {
        match transform {
            Transform::BucketNumber { bounds, labels } => {
                if labels.len() != bounds.len() + 1 {
                    return Err(CatalogueError::BucketShape {
                        question: q.id.clone(),
                        bounds: bounds.len(),
                        labels: labels.len(),
                    });
                }
                if bounds.windows(2).any(|w| w[0] >= w[1]) {
                    return Err(CatalogueError::UnsortedBucketBounds {
                        question: q.id.clone(),
                    });
                }
            }
            Transform::CombineLookup { other, .. } => {
                if self.get(other).is_none() {
                    return Err(CatalogueError::UnknownQuestionReference {
                        question: q.id.clone(),
                        referenced: other.clone(),
                    });
                }
            }
            Transform::Lookup { .. }
            | Transform::CountSelections
            | Transform::JoinSelections { .. } => {}
        }
        Ok(())
    }
}
