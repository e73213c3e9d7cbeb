//! Proposal kinds and their static properties.
//!
//! | Kind | Domain | Phases | Responder | Forms |
//! |------|--------|--------|-----------|-------|
//! | Marriage | Relationship | two | counterparty, then initiator confirms | Marriage |
//! | Collar | Relationship | one | counterparty | Collar |
//! | Divorce | Dissolution | one | initiator | - |
//! | Escape | Dissolution | one | initiator | - |

use crate::relationship::RelationshipKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Set of proposal kinds sharing the "one non-terminal proposal per user"
/// constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusivityDomain {
    /// Forming a relationship (marriage, collar).
    Relationship,
    /// Ending a relationship (divorce, escape).
    Dissolution,
}

impl fmt::Display for ExclusivityDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExclusivityDomain::Relationship => write!(f, "relationship"),
            ExclusivityDomain::Dissolution => write!(f, "dissolution"),
        }
    }
}

/// Who must react for the first phase to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Responder {
    Counterparty,
    /// Self-confirmation of a destructive action.
    Initiator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalKind {
    Marriage,
    Collar,
    Divorce,
    Escape,
}

impl ProposalKind {
    pub fn exclusivity_domain(&self) -> ExclusivityDomain {
        match self {
            ProposalKind::Marriage | ProposalKind::Collar => ExclusivityDomain::Relationship,
            ProposalKind::Divorce | ProposalKind::Escape => ExclusivityDomain::Dissolution,
        }
    }

    /// Whether counterparty acceptance must be confirmed by the initiator.
    pub fn requires_confirmation(&self) -> bool {
        matches!(self, ProposalKind::Marriage)
    }

    pub fn responder(&self) -> Responder {
        match self {
            ProposalKind::Marriage | ProposalKind::Collar => Responder::Counterparty,
            ProposalKind::Divorce | ProposalKind::Escape => Responder::Initiator,
        }
    }

    /// The relationship created (forming kinds) or removed (dissolving kinds).
    pub fn relationship_kind(&self) -> RelationshipKind {
        match self {
            ProposalKind::Marriage | ProposalKind::Divorce => RelationshipKind::Marriage,
            ProposalKind::Collar | ProposalKind::Escape => RelationshipKind::Collar,
        }
    }

    pub fn forms_relationship(&self) -> bool {
        self.exclusivity_domain() == ExclusivityDomain::Relationship
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalKind::Marriage => "marriage",
            ProposalKind::Collar => "collar",
            ProposalKind::Divorce => "divorce",
            ProposalKind::Escape => "escape",
        }
    }
}

impl fmt::Display for ProposalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProposalKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "marriage" | "marry" => Ok(ProposalKind::Marriage),
            "collar" => Ok(ProposalKind::Collar),
            "divorce" => Ok(ProposalKind::Divorce),
            "escape" => Ok(ProposalKind::Escape),
            _ => Err(format!("Invalid ProposalKind: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relationship_kinds_share_a_domain() {
        assert_eq!(
            ProposalKind::Marriage.exclusivity_domain(),
            ProposalKind::Collar.exclusivity_domain()
        );
        assert_ne!(
            ProposalKind::Marriage.exclusivity_domain(),
            ProposalKind::Divorce.exclusivity_domain()
        );
    }

    #[test]
    fn test_only_marriage_is_two_phase() {
        assert!(ProposalKind::Marriage.requires_confirmation());
        assert!(!ProposalKind::Collar.requires_confirmation());
        assert!(!ProposalKind::Divorce.requires_confirmation());
    }

    #[test]
    fn test_dissolutions_are_self_confirmed() {
        assert_eq!(ProposalKind::Divorce.responder(), Responder::Initiator);
        assert_eq!(ProposalKind::Escape.responder(), Responder::Initiator);
        assert_eq!(ProposalKind::Collar.responder(), Responder::Counterparty);
        assert_eq!(
            ProposalKind::Escape.relationship_kind(),
            RelationshipKind::Collar
        );
    }

    #[test]
    fn test_from_str() {
        assert_eq!("marry".parse::<ProposalKind>(), Ok(ProposalKind::Marriage));
        assert_eq!("Collar".parse::<ProposalKind>(), Ok(ProposalKind::Collar));
        assert!("adopt".parse::<ProposalKind>().is_err());
    }
}
