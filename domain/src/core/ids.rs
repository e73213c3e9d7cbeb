//! Identifier newtypes.
//!
//! Platform identifiers (users, channels, messages, roles) are the chat
//! platform's 64-bit snowflakes. Proposal and submission ids are allocated
//! monotonically by their owning registry and never reused.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            pub fn get(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s.trim().trim_start_matches($prefix);
                raw.parse::<u64>()
                    .map(Self)
                    .map_err(|_| format!("Invalid {}: {}", stringify!($name), s))
            }
        }
    };
}

id_newtype!(
    /// A member of the community.
    UserId,
    "@"
);
id_newtype!(
    /// A text channel (public, moderator, log...).
    ChannelId,
    "#"
);
id_newtype!(
    /// A posted message; reactions are keyed by it.
    MessageId,
    "msg:"
);
id_newtype!(
    /// A platform role.
    RoleId,
    "role:"
);
id_newtype!(
    /// A tracked pairwise proposal.
    ProposalId,
    "proposal:"
);
id_newtype!(
    /// A tracked submission awaiting review.
    SubmissionId,
    "submission:"
);
id_newtype!(
    /// A persisted relationship record.
    RelationshipId,
    "rel:"
);

impl ProposalId {
    /// The id allocated after this one.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl SubmissionId {
    /// The id allocated after this one.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_prefix() {
        assert_eq!(UserId(42).to_string(), "@42");
        assert_eq!(ChannelId(7).to_string(), "#7");
        assert_eq!(MessageId(9).to_string(), "msg:9");
        assert_eq!(ProposalId(3).to_string(), "proposal:3");
    }

    #[test]
    fn test_from_str_accepts_prefixed_and_bare() {
        assert_eq!("@42".parse::<UserId>(), Ok(UserId(42)));
        assert_eq!("42".parse::<UserId>(), Ok(UserId(42)));
        assert_eq!("msg:5".parse::<MessageId>(), Ok(MessageId(5)));
        assert!("alice".parse::<UserId>().is_err());
    }

    #[test]
    fn test_next_is_monotonic() {
        assert_eq!(ProposalId(1).next(), ProposalId(2));
        assert!(SubmissionId(1) < SubmissionId(1).next());
    }
}
