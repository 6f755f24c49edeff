//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the DrySight interview domain.

mod confidence;
mod errors;
mod ids;
mod percentage;
mod session_status;
mod state_machine;
mod timestamp;

pub use confidence::Confidence;
pub use errors::ValidationError;
pub use ids::{FieldKey, QuestionId, SessionId, Tier};
pub use percentage::Percentage;
pub use session_status::SessionStatus;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
