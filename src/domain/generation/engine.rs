//! QuestionGenerator - applicability filtering and session planning.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;

use crate::config::EngineSettings;
use crate::domain::catalogue::{Question, QuestionCatalogue, SessionContext};
use crate::domain::foundation::Tier;

use super::plan::{CoverageSummary, InterviewPlan, TierBreakdown};

/// Errors from session planning.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
    /// The catalogue yields zero applicable questions for this context.
    /// An operator should never see a session with no content.
    #[error(
        "no catalogue questions apply to job type '{job_type}' \
         in jurisdiction '{jurisdiction}'"
    )]
    NoApplicableQuestions {
        job_type: String,
        jurisdiction: String,
    },
}

/// Builds the ordered question plan for a session context.
pub struct QuestionGenerator;

impl QuestionGenerator {
    /// Generates the session plan.
    ///
    /// Questions failing their applicability predicate are permanently
    /// excluded (unlike visibility, which is re-evaluated dynamically).
    /// Surviving questions keep their catalogue-declared intra-tier
    /// order, which is also the tie-break for next-question selection.
    pub fn generate(
        catalogue: &QuestionCatalogue,
        context: &SessionContext,
        settings: &EngineSettings,
    ) -> Result<InterviewPlan, GenerationError> {
        let surviving: Vec<&Question> = catalogue
            .questions()
            .iter()
            .filter(|q| q.applicability.evaluate(context))
            .collect();

        if surviving.is_empty() {
            return Err(GenerationError::NoApplicableQuestions {
                job_type: context.job_type.clone(),
                jurisdiction: context.jurisdiction.clone(),
            });
        }

        let mut by_tier: BTreeMap<Tier, Vec<&Question>> = BTreeMap::new();
        for q in &surviving {
            by_tier.entry(q.tier).or_default().push(q);
        }
        let tiers: Vec<TierBreakdown> = by_tier
            .into_iter()
            .map(|(tier, questions)| TierBreakdown {
                tier,
                question_ids: questions.iter().map(|q| q.id.clone()).collect(),
            })
            .collect();

        let weighted_minutes: f64 = surviving
            .iter()
            .map(|q| settings.duration_weights.weight_for(&q.kind))
            .sum();
        let estimated_duration_minutes = (weighted_minutes.ceil() as u32).max(1);

        let coverable_fields = surviving
            .iter()
            .flat_map(|q| q.mappings.iter())
            .flat_map(|m| m.targets())
            .collect::<std::collections::BTreeSet<_>>()
            .len();
        let coverage = CoverageSummary {
            total_questions: surviving.len(),
            coverable_fields,
            total_fields: catalogue.field_universe().len(),
        };

        debug!(
            catalogue_version = catalogue.version(),
            questions = surviving.len(),
            tiers = tiers.len(),
            estimated_duration_minutes,
            "generated interview plan"
        );

        Ok(InterviewPlan::new(
            catalogue.version().to_string(),
            tiers,
            estimated_duration_minutes,
            coverage,
        ))
    }
}
