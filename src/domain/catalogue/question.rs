//! Question definition - one immutable catalogue entry.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{QuestionId, Tier};

use super::mapping::MappingRule;
use super::predicate::{Applicability, Condition};
use super::QuestionKind;

/// Classification input a question's answer feeds, if any.
///
/// Declared in the catalogue so the classification rules stay data-driven:
/// the flow engine looks answers up by role rather than by hard-coded ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationRole {
    /// Sets the base contamination category.
    ContaminationSource,
    /// Can upgrade (never downgrade) the category past a threshold.
    HoursSinceIncident,
    /// Buckets the severity class.
    AffectedAreaPercent,
    /// Specialty materials force the top severity class.
    MaterialsAffected,
}

/// An immutable catalogue question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub tier: Tier,
    pub prompt: String,
    pub kind: QuestionKind,
    #[serde(default)]
    pub applicability: Applicability,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Condition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mappings: Vec<MappingRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification_role: Option<ClassificationRole>,
    /// Opaque reference strings (e.g. standards clauses). Informational
    /// only; no behavioral effect.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<String>,
}

impl Question {
    /// Creates a question with no predicates, mappings, or citations.
    pub fn new(
        id: impl Into<QuestionId>,
        tier: Tier,
        prompt: impl Into<String>,
        kind: QuestionKind,
    ) -> Self {
        Self {
            id: id.into(),
            tier,
            prompt: prompt.into(),
            kind,
            applicability: Applicability::Always,
            visibility: None,
            mappings: Vec::new(),
            classification_role: None,
            citations: Vec::new(),
        }
    }

    /// Sets the applicability predicate.
    pub fn with_applicability(mut self, applicability: Applicability) -> Self {
        self.applicability = applicability;
        self
    }

    /// Sets the visibility condition.
    pub fn with_visibility(mut self, condition: Condition) -> Self {
        self.visibility = Some(condition);
        self
    }

    /// Appends a field-mapping rule.
    pub fn with_mapping(mut self, rule: MappingRule) -> Self {
        self.mappings.push(rule);
        self
    }

    /// Declares the classification input this answer feeds.
    pub fn with_classification_role(mut self, role: ClassificationRole) -> Self {
        self.classification_role = Some(role);
        self
    }

    /// Appends an informational citation.
    pub fn with_citation(mut self, citation: impl Into<String>) -> Self {
        self.citations.push(citation.into());
        self
    }

    /// Collects every question referenced by this question's visibility
    /// condition.
    pub fn visibility_references(&self) -> Vec<&QuestionId> {
        self.visibility
            .as_ref()
            .map(|c| c.referenced_questions())
            .unwrap_or_default()
    }
}
