//! Strongly-typed identifier value objects.
//!
//! `SessionId` is machine-generated; `QuestionId` and `FieldKey` are stable
//! human-authored identifiers coming from the catalogue (e.g. `water.source`,
//! `drying.method`), so they wrap strings rather than UUIDs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Unique identifier for an interview session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Creates a new random SessionId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a SessionId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Stable identifier of a catalogue question.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
    /// Creates a QuestionId, rejecting empty strings.
    pub fn try_new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::empty_field("question_id"));
        }
        Ok(Self(id))
    }

    /// Creates a QuestionId from a known-good literal.
    ///
    /// Intended for catalogue construction where ids are compile-time
    /// constants; validation still happens at catalogue load.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for QuestionId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Stable key of a target field in the downstream report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldKey(String);

impl FieldKey {
    /// Creates a FieldKey, rejecting empty strings.
    pub fn try_new(key: impl Into<String>) -> Result<Self, ValidationError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ValidationError::empty_field("field_key"));
        }
        Ok(Self(key))
    }

    /// Creates a FieldKey from a known-good literal.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FieldKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Ordinal question tier. Tier 1 is essential; higher tiers are optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tier(u8);

impl Tier {
    /// The essential tier. Questions here gate session completion.
    pub const ESSENTIAL: Self = Self(1);

    /// Creates a Tier, rejecting zero.
    pub fn try_new(value: u8) -> Result<Self, ValidationError> {
        if value == 0 {
            return Err(ValidationError::out_of_range("tier", 1, u8::MAX as i32, 0));
        }
        Ok(Self(value))
    }

    /// Creates a Tier from a known-good ordinal.
    pub fn new(value: u8) -> Self {
        Self(value.max(1))
    }

    /// Returns the ordinal value.
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Returns true if this is the essential tier.
    pub fn is_essential(&self) -> bool {
        *self == Self::ESSENTIAL
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tier {}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }

    #[test]
    fn session_id_roundtrips_through_string() {
        let id = SessionId::new();
        let parsed: SessionId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn question_id_rejects_empty() {
        assert!(QuestionId::try_new("").is_err());
        assert!(QuestionId::try_new("   ").is_err());
    }

    #[test]
    fn question_id_accepts_dotted_names() {
        let id = QuestionId::try_new("water.source").unwrap();
        assert_eq!(id.as_str(), "water.source");
    }

    #[test]
    fn field_key_rejects_empty() {
        assert!(FieldKey::try_new("").is_err());
    }

    #[test]
    fn field_key_serializes_transparently() {
        let key = FieldKey::new("drying.method");
        assert_eq!(
            serde_json::to_string(&key).unwrap(),
            "\"drying.method\""
        );
    }

    #[test]
    fn tier_rejects_zero() {
        assert!(Tier::try_new(0).is_err());
        assert!(Tier::try_new(1).is_ok());
    }

    #[test]
    fn tier_one_is_essential() {
        assert!(Tier::new(1).is_essential());
        assert!(!Tier::new(2).is_essential());
    }

    #[test]
    fn tiers_order_by_ordinal() {
        assert!(Tier::new(1) < Tier::new(2));
        assert!(Tier::new(3) > Tier::new(2));
    }
}
