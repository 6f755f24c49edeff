//! Domain layer containing the interview engine's business logic.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, enums, errors)
//! - `catalogue` - Immutable question catalogue: definitions, predicates, mapping rules
//! - `generation` - Session planning: applicability filtering, tiering, duration estimate
//! - `interview` - Interview session aggregate: sequencing, navigation, classification
//! - `mapping` - Answer-to-field mapping, conflict audit, and quality reporting

pub mod catalogue;
pub mod foundation;
pub mod generation;
pub mod interview;
pub mod mapping;
