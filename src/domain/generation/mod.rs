//! Question generation module - builds the per-session question plan.
//!
//! Runs once at session start: filters the catalogue by applicability,
//! groups survivors into tiers preserving catalogue order, and computes
//! the duration estimate and coverage summary. The resulting plan is
//! immutable for the life of the session; only per-question visibility
//! changes afterwards.

mod engine;
mod plan;

pub use engine::{GenerationError, QuestionGenerator};
pub use plan::{CoverageSummary, InterviewPlan, TierBreakdown};
