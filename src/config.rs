//! Engine configuration.
//!
//! Tuning knobs the caller supplies alongside the catalogue: duration
//! weights for the session estimate, the low-confidence reporting
//! threshold, and the time-based classification escalation threshold.
//! Plain serde data with defaults encoding the standard behavior; the
//! engine performs no environment or file loading itself.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::catalogue::QuestionKind;

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("duration weight for {kind} must be positive, got {weight}")]
    NonPositiveWeight { kind: &'static str, weight: f64 },

    #[error("low confidence threshold must be at most 100, got {0}")]
    ThresholdTooHigh(u8),

    #[error("escalation hours must be positive, got {0}")]
    NonPositiveEscalation(f64),
}

/// Per-kind answer-time weights, in minutes.
///
/// Multi-select and free-text questions take the operator longer than a
/// boolean toggle; the session duration estimate is the weighted count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DurationWeights {
    pub boolean: f64,
    pub single_select: f64,
    pub multi_select: f64,
    pub numeric_range: f64,
    pub free_text: f64,
    pub date: f64,
    pub rating: f64,
    pub duration_hours: f64,
}

impl Default for DurationWeights {
    fn default() -> Self {
        Self {
            boolean: 0.25,
            single_select: 0.5,
            multi_select: 1.0,
            numeric_range: 0.75,
            free_text: 1.5,
            date: 0.5,
            rating: 0.25,
            duration_hours: 0.5,
        }
    }
}

impl DurationWeights {
    /// Returns the weight for a question kind.
    pub fn weight_for(&self, kind: &QuestionKind) -> f64 {
        match kind {
            QuestionKind::Boolean => self.boolean,
            QuestionKind::SingleSelect { .. } => self.single_select,
            QuestionKind::MultiSelect { .. } => self.multi_select,
            QuestionKind::NumericRange { .. } => self.numeric_range,
            QuestionKind::FreeText => self.free_text,
            QuestionKind::Date => self.date,
            QuestionKind::Rating { .. } => self.rating,
            QuestionKind::DurationHours => self.duration_hours,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let weights = [
            ("boolean", self.boolean),
            ("single_select", self.single_select),
            ("multi_select", self.multi_select),
            ("numeric_range", self.numeric_range),
            ("free_text", self.free_text),
            ("date", self.date),
            ("rating", self.rating),
            ("duration_hours", self.duration_hours),
        ];
        for (kind, weight) in weights {
            if weight <= 0.0 {
                return Err(ConfigError::NonPositiveWeight { kind, weight });
            }
        }
        Ok(())
    }
}

/// Engine tuning settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Per-kind weights for the session duration estimate.
    pub duration_weights: DurationWeights,
    /// Fields scoring below this confidence are flagged for human review.
    pub low_confidence_threshold: u8,
    /// Hours since incident past which the contamination category
    /// escalates one step.
    pub escalation_hours: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            duration_weights: DurationWeights::default(),
            low_confidence_threshold: 75,
            escalation_hours: 48.0,
        }
    }
}

impl EngineSettings {
    /// Validates the settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.duration_weights.validate()?;
        if self.low_confidence_threshold > 100 {
            return Err(ConfigError::ThresholdTooHigh(self.low_confidence_threshold));
        }
        if self.escalation_hours <= 0.0 {
            return Err(ConfigError::NonPositiveEscalation(self.escalation_hours));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(EngineSettings::default().validate().is_ok());
    }

    #[test]
    fn default_escalation_is_48_hours() {
        assert_eq!(EngineSettings::default().escalation_hours, 48.0);
    }

    #[test]
    fn free_text_weighs_more_than_boolean() {
        let weights = DurationWeights::default();
        assert!(weights.free_text > weights.boolean);
        assert!(weights.multi_select > weights.boolean);
    }

    #[test]
    fn weight_for_matches_kind() {
        let weights = DurationWeights::default();
        assert_eq!(
            weights.weight_for(&QuestionKind::MultiSelect { options: vec![] }),
            weights.multi_select
        );
        assert_eq!(weights.weight_for(&QuestionKind::FreeText), weights.free_text);
    }

    #[test]
    fn zero_weight_is_rejected() {
        let mut settings = EngineSettings::default();
        settings.duration_weights.boolean = 0.0;
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::NonPositiveWeight { .. })
        ));
    }

    #[test]
    fn threshold_over_100_is_rejected() {
        let settings = EngineSettings {
            low_confidence_threshold: 101,
            ..Default::default()
        };
        assert_eq!(
            settings.validate(),
            Err(ConfigError::ThresholdTooHigh(101))
        );
    }

    #[test]
    fn settings_deserialize_with_partial_overrides() {
        let settings: EngineSettings =
            serde_yaml::from_str("low_confidence_threshold: 60").unwrap();
        assert_eq!(settings.low_confidence_threshold, 60);
        assert_eq!(settings.escalation_hours, 48.0);
    }
}
