//! Answer mapping module - answers to report fields.
//!
//! Applies each question's field-mapping rules to produce
//! `(field, value, confidence, provenance)` entries, merges them into the
//! session field map with a latest-answer-wins conflict policy (superseded
//! writes are retained for audit), and aggregates the quality report the
//! downstream report pipeline uses to flag fields for human review.

mod engine;
mod field_map;
mod quality;

pub use engine::MappingEngine;
pub use field_map::{FieldEntry, FieldMap, SupersededWrite, WriteOutcome};
pub use quality::QualityReport;
