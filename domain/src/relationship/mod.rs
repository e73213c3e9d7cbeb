//! Committed pairwise relationships.
//!
//! A [`Relationship`] is the persisted result of an accepted forming
//! proposal. Marriages are symmetric; collars are directed, with
//! `party_a` as the owner and `party_b` as the pet.

use crate::core::ids::{RelationshipId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    Marriage,
    Collar,
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationshipKind::Marriage => write!(f, "marriage"),
            RelationshipKind::Collar => write!(f, "collar"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: RelationshipId,
    pub kind: RelationshipKind,
    pub party_a: UserId,
    pub party_b: UserId,
    pub formed_at: DateTime<Utc>,
}

impl Relationship {
    pub fn involves(&self, user: UserId) -> bool {
        self.party_a == user || self.party_b == user
    }

    /// The other party, if `user` is one of the two.
    pub fn partner_of(&self, user: UserId) -> Option<UserId> {
        if self.party_a == user {
            Some(self.party_b)
        } else if self.party_b == user {
            Some(self.party_a)
        } else {
            None
        }
    }

    /// Owner of a collar.
    pub fn owner(&self) -> Option<UserId> {
        (self.kind == RelationshipKind::Collar).then_some(self.party_a)
    }

    /// Pet of a collar.
    pub fn pet(&self) -> Option<UserId> {
        (self.kind == RelationshipKind::Collar).then_some(self.party_b)
    }
}

/// Read-only view over one user's relationships, used by eligibility checks.
#[derive(Debug, Clone, Copy)]
pub struct RelationshipView<'a> {
    user: UserId,
    relationships: &'a [Relationship],
}

impl<'a> RelationshipView<'a> {
    pub fn new(user: UserId, relationships: &'a [Relationship]) -> Self {
        Self {
            user,
            relationships,
        }
    }

    pub fn user(&self) -> UserId {
        self.user
    }

    pub fn marriage(&self) -> Option<&'a Relationship> {
        self.relationships
            .iter()
            .find(|r| r.kind == RelationshipKind::Marriage && r.involves(self.user))
    }

    /// The collar this user wears, if any.
    pub fn collar(&self) -> Option<&'a Relationship> {
        self.relationships
            .iter()
            .find(|r| r.kind == RelationshipKind::Collar && r.party_b == self.user)
    }

    /// Number of pets this user owns.
    pub fn pet_count(&self) -> usize {
        self.relationships
            .iter()
            .filter(|r| r.kind == RelationshipKind::Collar && r.party_a == self.user)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel(id: u64, kind: RelationshipKind, a: u64, b: u64) -> Relationship {
        Relationship {
            id: RelationshipId(id),
            kind,
            party_a: UserId(a),
            party_b: UserId(b),
            formed_at: Utc::now(),
        }
    }

    #[test]
    fn test_partner_of() {
        let r = rel(1, RelationshipKind::Marriage, 1, 2);
        assert_eq!(r.partner_of(UserId(1)), Some(UserId(2)));
        assert_eq!(r.partner_of(UserId(2)), Some(UserId(1)));
        assert_eq!(r.partner_of(UserId(3)), None);
        assert_eq!(r.owner(), None);
    }

    #[test]
    fn test_view_distinguishes_owner_and_pet() {
        let rels = vec![
            rel(1, RelationshipKind::Collar, 1, 2),
            rel(2, RelationshipKind::Collar, 1, 3),
            rel(3, RelationshipKind::Marriage, 1, 4),
        ];

        let owner = RelationshipView::new(UserId(1), &rels);
        assert_eq!(owner.pet_count(), 2);
        assert!(owner.collar().is_none());
        assert_eq!(owner.marriage().map(|r| r.id), Some(RelationshipId(3)));

        let pet = RelationshipView::new(UserId(2), &rels);
        assert_eq!(pet.pet_count(), 0);
        assert_eq!(pet.collar().and_then(|r| r.owner()), Some(UserId(1)));
        assert!(pet.marriage().is_none());
    }
}
