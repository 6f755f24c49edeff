//! Session context - the inputs a session is generated against.
//!
//! The context is supplied by the external entitlement provider at
//! `start()`; the engine treats it as an opaque input to applicability
//! predicates and does not itself enforce entitlement policy.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Subscription tier gating optional catalogue content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntitlementTier {
    /// Entry tier - essential question content only.
    Basic,
    /// Professional tier - advanced question tiers unlocked.
    Pro,
    /// Enterprise tier - full catalogue including jurisdiction add-ons.
    Enterprise,
}

impl EntitlementTier {
    /// Returns the numeric rank of this tier for comparison.
    ///
    /// Higher rank unlocks more catalogue content.
    pub fn rank(&self) -> u8 {
        match self {
            EntitlementTier::Basic => 0,
            EntitlementTier::Pro => 1,
            EntitlementTier::Enterprise => 2,
        }
    }

    /// Returns true if this tier meets or exceeds the required tier.
    pub fn satisfies(&self, required: EntitlementTier) -> bool {
        self.rank() >= required.rank()
    }

    /// Returns the display name for this tier.
    pub fn display_name(&self) -> &'static str {
        match self {
            EntitlementTier::Basic => "Basic",
            EntitlementTier::Pro => "Pro",
            EntitlementTier::Enterprise => "Enterprise",
        }
    }
}

impl fmt::Display for EntitlementTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// The context an interview session is generated against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    /// Job/domain type, e.g. "water", "fire", "mold".
    pub job_type: String,
    /// Jurisdiction code the job falls under.
    pub jurisdiction: String,
    /// Operator's subscription tier.
    pub entitlement: EntitlementTier,
}

impl SessionContext {
    /// Creates a new session context.
    pub fn new(
        job_type: impl Into<String>,
        jurisdiction: impl Into<String>,
        entitlement: EntitlementTier,
    ) -> Self {
        Self {
            job_type: job_type.into(),
            jurisdiction: jurisdiction.into(),
            entitlement,
        }
    }
}
