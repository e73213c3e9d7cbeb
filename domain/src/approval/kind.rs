//! Submission kinds and what each one requires.

use crate::core::capability::Capability;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionKind {
    /// Identity questionnaire; approval grants [`Capability::Verified`].
    Verification,
    /// Character profile questionnaire.
    Profile,
    /// Reference image attached to an existing profile.
    ProfileImage,
}

/// Condition on the submitter checked before the questionnaire starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prerequisite {
    /// The submitter must not already hold this capability.
    LacksCapability(Capability),
    /// The submitter must not already have an approved record of this kind.
    NoRecord(SubmissionKind),
    /// The submitter must already have an approved record of this kind.
    HasRecord(SubmissionKind),
}

/// Why a submission may not start.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unmet {
    #[error("you are already {0}")]
    AlreadyHolds(Capability),

    #[error("you already have a {0}")]
    RecordExists(SubmissionKind),

    #[error("you need an approved {0} first")]
    RecordMissing(SubmissionKind),
}

impl Prerequisite {
    /// The reason reported when this prerequisite does not hold.
    pub fn unmet(&self) -> Unmet {
        match *self {
            Prerequisite::LacksCapability(capability) => Unmet::AlreadyHolds(capability),
            Prerequisite::NoRecord(kind) => Unmet::RecordExists(kind),
            Prerequisite::HasRecord(kind) => Unmet::RecordMissing(kind),
        }
    }
}

impl SubmissionKind {
    pub const ALL: [SubmissionKind; 3] = [
        SubmissionKind::Verification,
        SubmissionKind::Profile,
        SubmissionKind::ProfileImage,
    ];

    /// Capability a reviewer must hold to decide this kind.
    pub fn reviewer_capability(&self) -> Capability {
        Capability::Moderator
    }

    /// Capability granted to the submitter on approval.
    pub fn granted_capability(&self) -> Option<Capability> {
        match self {
            SubmissionKind::Verification => Some(Capability::Verified),
            SubmissionKind::Profile | SubmissionKind::ProfileImage => None,
        }
    }

    /// Whether an approval is persisted as a submission record.
    pub fn persists_record(&self) -> bool {
        !matches!(self, SubmissionKind::Verification)
    }

    /// Whether a resubmission cooldown starts once this kind is submitted.
    pub fn has_resubmit_cooldown(&self) -> bool {
        matches!(self, SubmissionKind::Verification)
    }

    pub fn prerequisite(&self) -> Prerequisite {
        match self {
            SubmissionKind::Verification => Prerequisite::LacksCapability(Capability::Verified),
            SubmissionKind::Profile => Prerequisite::NoRecord(SubmissionKind::Profile),
            SubmissionKind::ProfileImage => Prerequisite::HasRecord(SubmissionKind::Profile),
        }
    }

    /// Whether the payload is an uploaded image rather than answers.
    pub fn expects_image(&self) -> bool {
        matches!(self, SubmissionKind::ProfileImage)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionKind::Verification => "verification",
            SubmissionKind::Profile => "profile",
            SubmissionKind::ProfileImage => "profile_image",
        }
    }
}

impl fmt::Display for SubmissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SubmissionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "verification" | "verify" => Ok(SubmissionKind::Verification),
            "profile" | "fursona" => Ok(SubmissionKind::Profile),
            "profile_image" | "image" => Ok(SubmissionKind::ProfileImage),
            _ => Err(format!("Invalid SubmissionKind: {}", s)),
        }
    }
}
