//! InterviewPlan - the ordered question set computed at session start.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{QuestionId, Tier};

/// Questions of one tier, in catalogue-declared order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierBreakdown {
    pub tier: Tier,
    pub question_ids: Vec<QuestionId>,
}

/// How much of the catalogue's field universe this session can populate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageSummary {
    /// Questions surviving the applicability filter.
    pub total_questions: usize,
    /// Fields reachable through surviving questions' mappings.
    pub coverable_fields: usize,
    /// Size of the catalogue's full field universe.
    pub total_fields: usize,
}

/// The ordered, tiered question set for one session.
///
/// Computed once by the generator and never reordered mid-session. Tier
/// membership is fixed; only the *visibility* of individual questions
/// changes as answers accumulate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewPlan {
    catalogue_version: String,
    ordered_questions: Vec<QuestionId>,
    tiers: Vec<TierBreakdown>,
    estimated_duration_minutes: u32,
    coverage: CoverageSummary,
}

impl InterviewPlan {
    pub(crate) fn new(
        catalogue_version: String,
        tiers: Vec<TierBreakdown>,
        estimated_duration_minutes: u32,
        coverage: CoverageSummary,
    ) -> Self {
        let ordered_questions = tiers
            .iter()
            .flat_map(|t| t.question_ids.iter().cloned())
            .collect();
        Self {
            catalogue_version,
            ordered_questions,
            tiers,
            estimated_duration_minutes,
            coverage,
        }
    }

    /// Version of the catalogue this plan was generated from.
    pub fn catalogue_version(&self) -> &str {
        &self.catalogue_version
    }

    /// All session questions in tier order.
    pub fn ordered_questions(&self) -> &[QuestionId] {
        &self.ordered_questions
    }

    /// Per-tier breakdown in ascending tier order.
    pub fn tiers(&self) -> &[TierBreakdown] {
        &self.tiers
    }

    /// Estimated answering time for the whole plan.
    pub fn estimated_duration_minutes(&self) -> u32 {
        self.estimated_duration_minutes
    }

    /// Field coverage summary.
    pub fn coverage(&self) -> &CoverageSummary {
        &self.coverage
    }

    /// Returns the position of a question in tier order, if present.
    pub fn position(&self, id: &QuestionId) -> Option<usize> {
        self.ordered_questions.iter().position(|q| q == id)
    }

    /// Returns true if the question is part of this session.
    pub fn contains(&self, id: &QuestionId) -> bool {
        self.position(id).is_some()
    }

    /// Returns the question ids of one tier, if the plan has it.
    pub fn questions_in_tier(&self, tier: Tier) -> Option<&[QuestionId]> {
        self.tiers
            .iter()
            .find(|t| t.tier == tier)
            .map(|t| t.question_ids.as_slice())
    }
}
