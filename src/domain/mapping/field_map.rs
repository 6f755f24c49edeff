//! FieldMap - the session's output field map with conflict audit.
//!
//! The map always reflects the latest state of the answer history, not a
//! log of every past write: a rewrite from the same source question
//! replaces in place, a write from a different source displaces the
//! current entry into a retained superseded list, and retraction removes
//! a question's contributions entirely, promoting the most recent
//! surviving superseded write.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::catalogue::FieldValue;
use crate::domain::foundation::{Confidence, FieldKey, QuestionId};

/// A write displaced by a later answer from a different question.
///
/// Retained for audit and quality reporting; never silently discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupersededWrite {
    pub source: QuestionId,
    pub value: FieldValue,
    pub confidence: Confidence,
}

/// Current state of one populated field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldEntry {
    pub value: FieldValue,
    pub confidence: Confidence,
    pub source: QuestionId,
    superseded: Vec<SupersededWrite>,
}

impl FieldEntry {
    /// Writes displaced from this field, oldest first.
    pub fn superseded(&self) -> &[SupersededWrite] {
        &self.superseded
    }

    /// Every question that has contributed to this field, current first.
    pub fn source_question_ids(&self) -> Vec<&QuestionId> {
        std::iter::once(&self.source)
            .chain(self.superseded.iter().map(|w| &w.source))
            .collect()
    }
}

/// Outcome of one field write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The field was previously unset.
    Inserted,
    /// The same source rewrote its own value.
    Replaced,
    /// A different source took the field over; the old entry was audited.
    Displaced,
}

/// The session's output field map, keyed by target field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldMap {
    entries: BTreeMap<FieldKey, FieldEntry>,
}

impl FieldMap {
    /// Creates an empty field map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a value, applying the latest-answer-wins conflict policy.
    pub fn write(
        &mut self,
        field: FieldKey,
        source: QuestionId,
        value: FieldValue,
        confidence: Confidence,
    ) -> WriteOutcome {
        match self.entries.get_mut(&field) {
            None => {
                self.entries.insert(
                    field,
                    FieldEntry {
                        value,
                        confidence,
                        source,
                        superseded: Vec::new(),
                    },
                );
                WriteOutcome::Inserted
            }
            Some(entry) if entry.source == source => {
                entry.value = value;
                entry.confidence = confidence;
                WriteOutcome::Replaced
            }
            Some(entry) => {
                // A re-answer by a source already in the audit trail must
                // not double-count it as a contributor.
                entry.superseded.retain(|w| w.source != source);
                entry.superseded.push(SupersededWrite {
                    source: std::mem::replace(&mut entry.source, source),
                    value: std::mem::replace(&mut entry.value, value),
                    confidence: std::mem::replace(&mut entry.confidence, confidence),
                });
                WriteOutcome::Displaced
            }
        }
    }

    /// Removes every contribution from the given question.
    ///
    /// Fields currently owned by it revert to their most recent surviving
    /// superseded write, or to unset when no contributor remains. Returns
    /// the fields that changed.
    pub fn retract_question(&mut self, question: &QuestionId) -> Vec<FieldKey> {
        let mut changed = Vec::new();
        let mut removed = Vec::new();

        for (field, entry) in self.entries.iter_mut() {
            let before = entry.superseded.len();
            entry.superseded.retain(|w| &w.source != question);
            let mut touched = entry.superseded.len() != before;

            if &entry.source == question {
                touched = true;
                match entry.superseded.pop() {
                    Some(promoted) => {
                        entry.source = promoted.source;
                        entry.value = promoted.value;
                        entry.confidence = promoted.confidence;
                    }
                    None => removed.push(field.clone()),
                }
            }
            if touched {
                changed.push(field.clone());
            }
        }
        for field in &removed {
            self.entries.remove(field);
        }
        changed
    }

    /// Returns the entry for a field, if populated.
    pub fn get(&self, field: &FieldKey) -> Option<&FieldEntry> {
        self.entries.get(field)
    }

    /// Number of populated fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no field is populated.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates populated fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&FieldKey, &FieldEntry)> {
        self.entries.iter()
    }

    /// Exports the plain `field -> value` view for the report pipeline.
    pub fn export(&self) -> BTreeMap<FieldKey, FieldValue> {
        self.entries
            .iter()
            .map(|(k, e)| (k.clone(), e.value.clone()))
            .collect()
    }
}
