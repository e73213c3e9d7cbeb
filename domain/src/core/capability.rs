//! Capabilities a member may hold.
//!
//! Capabilities are what the workflows ask about; how they map onto
//! platform roles is an adapter concern.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Age-verified member; required by both parties of a relationship.
    Adult,
    /// May review submissions.
    Moderator,
    /// Passed the verification review.
    Verified,
}

impl Capability {
    pub const ALL: [Capability; 3] = [Capability::Adult, Capability::Moderator, Capability::Verified];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Adult => "adult",
            Capability::Moderator => "moderator",
            Capability::Verified => "verified",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "adult" | "18+" => Ok(Capability::Adult),
            "moderator" | "mod" => Ok(Capability::Moderator),
            "verified" => Ok(Capability::Verified),
            _ => Err(format!("Invalid Capability: {}", s)),
        }
    }
}
