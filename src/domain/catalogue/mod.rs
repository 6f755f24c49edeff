//! Question catalogue module - immutable, versioned question definitions.
//!
//! The catalogue is pure data: question kinds, applicability and visibility
//! predicates, and field-mapping rules are all closed sum types that are
//! safe to validate statically before any session runs. The catalogue is
//! loaded once at process start by an external loader, validated here, and
//! shared read-only across all sessions.

pub mod builtin;
mod catalogue;
mod context;
mod kind;
mod mapping;
mod predicate;
mod question;

pub use catalogue::{CatalogueError, QuestionCatalogue};
pub use context::{EntitlementTier, SessionContext};
pub use kind::{AnswerTypeError, AnswerValue, QuestionKind};
pub use mapping::{FieldValue, MappingRule, Transform};
pub(crate) use mapping::static_rule_matches;
pub use predicate::{AnswerLookup, Applicability, Condition};
pub use question::{ClassificationRole, Question};
