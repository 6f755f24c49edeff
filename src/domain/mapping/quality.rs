//! Quality report aggregated over a session's field map.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::FieldKey;

use super::field_map::FieldMap;

/// Aggregate quality signals for the downstream report pipeline.
///
/// Flags the fields a human reviewer should look at: low-confidence
/// derivations and fields whose value was overwritten at least once
/// during the interview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Number of fields currently populated.
    pub fields_populated: usize,
    /// Mean confidence across populated fields, rounded to the nearest
    /// whole point. Zero when the map is empty.
    pub average_confidence: u8,
    /// Fields whose confidence sits below the review threshold.
    pub low_confidence_fields: Vec<FieldKey>,
    /// Fields with at least one superseded write.
    pub overwritten_fields: Vec<FieldKey>,
    /// Total superseded writes retained across all fields.
    pub total_superseded_writes: usize,
}

impl QualityReport {
    /// Builds a report from the current field map state.
    ///
    /// `low_confidence_threshold` is exclusive: a field at exactly the
    /// threshold is not flagged.
    pub fn from_field_map(field_map: &FieldMap, low_confidence_threshold: u8) -> Self {
        let mut confidence_sum: u32 = 0;
        let mut low_confidence_fields = Vec::new();
        let mut overwritten_fields = Vec::new();
        let mut total_superseded_writes = 0;

        for (field, entry) in field_map.iter() {
            confidence_sum += u32::from(entry.confidence.value());
            if entry.confidence.is_below(low_confidence_threshold) {
                low_confidence_fields.push(field.clone());
            }
            if !entry.superseded().is_empty() {
                overwritten_fields.push(field.clone());
                total_superseded_writes += entry.superseded().len();
            }
        }

        let fields_populated = field_map.len();
        let average_confidence = if fields_populated == 0 {
            0
        } else {
            let denominator = fields_populated as u32;
            ((confidence_sum + denominator / 2) / denominator) as u8
        };

        Self {
            fields_populated,
            average_confidence,
            low_confidence_fields,
            overwritten_fields,
            total_superseded_writes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalogue::FieldValue;
    use crate::domain::foundation::{Confidence, QuestionId};

    fn populated_map() -> FieldMap {
        let mut map = FieldMap::new();
        map.write(
            FieldKey::new("water.source"),
            QuestionId::new("q1"),
            FieldValue::Text("grey".into()),
            Confidence::DIRECT,
        );
        map.write(
            FieldKey::new("drying.method"),
            QuestionId::new("q2"),
            FieldValue::Text("assess on site".into()),
            Confidence::transformed(3),
        );
        map
    }

    #[test]
    fn empty_map_reports_zeroes() {
        let report = QualityReport::from_field_map(&FieldMap::new(), 75);
        assert_eq!(report.fields_populated, 0);
        assert_eq!(report.average_confidence, 0);
        assert!(report.low_confidence_fields.is_empty());
        assert!(report.overwritten_fields.is_empty());
        assert_eq!(report.total_superseded_writes, 0);
    }

    #[test]
    fn averages_round_to_nearest_point() {
        // DIRECT (98) and transformed with 3 upstream answers (74):
        // mean 86.0.
        let report = QualityReport::from_field_map(&populated_map(), 75);
        assert_eq!(report.fields_populated, 2);
        assert_eq!(report.average_confidence, 86);
    }

    #[test]
    fn threshold_is_exclusive() {
        let report = QualityReport::from_field_map(&populated_map(), 75);
        assert_eq!(
            report.low_confidence_fields,
            vec![FieldKey::new("drying.method")]
        );

        // At exactly 74 the transformed field is no longer flagged.
        let report = QualityReport::from_field_map(&populated_map(), 74);
        assert!(report.low_confidence_fields.is_empty());
    }

    #[test]
    fn overwritten_fields_count_superseded_writes() {
        let mut map = populated_map();
        map.write(
            FieldKey::new("water.source"),
            QuestionId::new("q3"),
            FieldValue::Text("black".into()),
            Confidence::DIRECT,
        );

        let report = QualityReport::from_field_map(&map, 75);
        assert_eq!(report.overwritten_fields, vec![FieldKey::new("water.source")]);
        assert_eq!(report.total_superseded_writes, 1);
    }
}
