//! Interview flow module - session progression.
//!
//! Owns the session state machine (`NotStarted -> Active -> Completed |
//! Abandoned`), answer recording with cascading visibility
//! re-evaluation and field-map refresh, navigation (back and tier
//! jump), and the derived water-damage classification.

mod classification;
mod errors;
mod session;

pub use classification::{
    derive_classification, Classification, ContaminationCategory, SeverityClass,
    SPECIALTY_MATERIALS,
};
pub use errors::InterviewError;
pub use session::{Advance, AnswerRecord, InterviewSession, SessionExport};
