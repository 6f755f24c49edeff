//! Confidence value object (0-100 scale).
//!
//! Scores how directly a report field value was derived from operator
//! input versus inferred. Each mapping rule kind has its own band:
//! direct copies score near the top, transforms score lower the more
//! upstream answers they had to consume.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Confidence ceiling for direct verbatim copies.
pub const DIRECT_CONFIDENCE: u8 = 98;

/// Confidence for static assignments on an exact answer match.
pub const STATIC_EXACT_CONFIDENCE: u8 = 95;

/// Base confidence for transformed values consuming a single answer.
pub const TRANSFORMED_BASE_CONFIDENCE: u8 = 90;

/// Penalty applied per additional upstream answer a transform consumes.
pub const TRANSFORMED_UPSTREAM_PENALTY: u8 = 8;

/// Floor for transformed confidence regardless of upstream count.
pub const TRANSFORMED_FLOOR_CONFIDENCE: u8 = 70;

/// A 0-100 score indicating derivation confidence for a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Confidence(u8);

impl Confidence {
    /// Confidence of a direct verbatim copy (no inference occurred).
    pub const DIRECT: Self = Self(DIRECT_CONFIDENCE);

    /// Confidence of a static assignment on exact match.
    pub const STATIC_EXACT: Self = Self(STATIC_EXACT_CONFIDENCE);

    /// Creates a new Confidence, clamping to valid range.
    pub fn new(value: u8) -> Self {
        Self(value.min(100))
    }

    /// Creates a Confidence, returning error if out of range.
    pub fn try_new(value: u8) -> Result<Self, ValidationError> {
        if value > 100 {
            return Err(ValidationError::out_of_range(
                "confidence",
                0,
                100,
                value as i32,
            ));
        }
        Ok(Self(value))
    }

    /// Confidence of a transformed value.
    ///
    /// Starts at the transformed base and drops per *additional* upstream
    /// answer consumed beyond the triggering one, never below the floor.
    pub fn transformed(upstream_answers: usize) -> Self {
        let extra = upstream_answers.saturating_sub(1) as u8;
        let penalty = extra.saturating_mul(TRANSFORMED_UPSTREAM_PENALTY);
        Self(
            TRANSFORMED_BASE_CONFIDENCE
                .saturating_sub(penalty)
                .max(TRANSFORMED_FLOOR_CONFIDENCE),
        )
    }

    /// Returns the value as u8.
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Returns true if this confidence is below the given threshold.
    pub fn is_below(&self, threshold: u8) -> bool {
        self.0 < threshold
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_is_near_maximum() {
        assert!(Confidence::DIRECT.value() >= 95);
    }

    #[test]
    fn static_exact_is_in_band() {
        let c = Confidence::STATIC_EXACT.value();
        assert!((90..=100).contains(&c));
    }

    #[test]
    fn transformed_single_upstream_is_band_top() {
        assert_eq!(
            Confidence::transformed(1).value(),
            TRANSFORMED_BASE_CONFIDENCE
        );
    }

    #[test]
    fn transformed_drops_per_extra_upstream() {
        assert_eq!(Confidence::transformed(2).value(), 82);
        assert_eq!(Confidence::transformed(3).value(), 74);
    }

    #[test]
    fn transformed_never_falls_below_floor() {
        assert_eq!(
            Confidence::transformed(10).value(),
            TRANSFORMED_FLOOR_CONFIDENCE
        );
    }

    #[test]
    fn transformed_band_matches_spec_range() {
        for upstream in 1..20 {
            let c = Confidence::transformed(upstream).value();
            assert!((70..=95).contains(&c), "out of band: {}", c);
        }
    }

    #[test]
    fn new_clamps_to_100() {
        assert_eq!(Confidence::new(120).value(), 100);
    }

    #[test]
    fn try_new_rejects_over_100() {
        assert!(Confidence::try_new(101).is_err());
    }

    #[test]
    fn is_below_compares_strictly() {
        assert!(Confidence::new(79).is_below(80));
        assert!(!Confidence::new(80).is_below(80));
    }
}
