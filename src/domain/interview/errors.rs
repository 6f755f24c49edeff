//! Interview flow errors.
//!
//! Every variant is local to a single session and operation. Each one is
//! either a caller-input problem the operator can recover from by sending
//! different input, or a lifecycle misuse; nothing here is retried
//! internally.

use thiserror::Error;

use crate::domain::catalogue::AnswerTypeError;
use crate::domain::foundation::{QuestionId, SessionStatus, Tier};

/// Errors raised by interview flow operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterviewError {
    /// The answer value does not match the question's declared kind.
    /// Recoverable: the caller should re-prompt. The malformed value is
    /// never stored.
    #[error("answer for question '{question}' does not match its declared kind")]
    TypeMismatch {
        question: QuestionId,
        #[source]
        source: AnswerTypeError,
    },

    /// The question is not part of this session's plan.
    #[error("question '{question}' is not part of this session")]
    UnknownQuestion { question: QuestionId },

    /// The question exists but its visibility condition currently
    /// evaluates false.
    #[error("question '{question}' is not currently visible")]
    QuestionNotVisible { question: QuestionId },

    /// A jump targeted a tier with unanswered visible questions in
    /// earlier tiers. Recoverable: the caller should block the
    /// navigation and re-surface the missing questions.
    #[error("cannot jump to tier {tier}: {} earlier question(s) unanswered", missing.len())]
    OutOfOrder {
        tier: Tier,
        missing: Vec<QuestionId>,
    },

    /// Completion was attempted while visible essential questions
    /// remain unanswered.
    #[error("cannot complete: {} essential question(s) unanswered", missing.len())]
    Incomplete { missing: Vec<QuestionId> },

    /// The operation requires an active session.
    #[error("session is {status}, not active")]
    SessionNotActive { status: SessionStatus },
}
