//! Pure eligibility rules evaluated before a proposal is registered.
//!
//! The coordinator gathers [`EligibilityFacts`] from the authorizer and the
//! relationship store, then calls [`check`]. The same rules run again right
//! before a proposal commits, so a party that lost a capability or got
//! married elsewhere in the meantime is caught.

use super::kind::ProposalKind;
use crate::core::ids::UserId;
use crate::relationship::{Relationship, RelationshipView};
use thiserror::Error;

/// Why a proposal may not be made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Ineligibility {
    #[error("you can't propose to yourself")]
    SelfTarget,

    #[error("{0} is not age-verified")]
    NotAdult(UserId),

    #[error("{0} is already married")]
    AlreadyMarried(UserId),

    #[error("{pet} is already collared")]
    AlreadyCollared { pet: UserId },

    #[error("{pet} already wears your collar")]
    AlreadyYourPet { pet: UserId },

    #[error("you already own {limit} pets")]
    TooManyPets { limit: usize },

    #[error("you are not married")]
    NotMarried,

    #[error("you are not collared")]
    NotCollared,
}

/// Everything the rules need to know about the two parties.
#[derive(Debug, Clone, Copy)]
pub struct EligibilityFacts<'a> {
    pub initiator: UserId,
    pub counterparty: UserId,
    pub initiator_adult: bool,
    pub counterparty_adult: bool,
    pub initiator_relationships: &'a [Relationship],
    pub counterparty_relationships: &'a [Relationship],
    pub max_pets: usize,
}

/// Evaluate the rules for `kind`. The first failing rule is reported.
pub fn check(kind: ProposalKind, facts: &EligibilityFacts<'_>) -> Result<(), Ineligibility> {
    let initiator = RelationshipView::new(facts.initiator, facts.initiator_relationships);
    let counterparty = RelationshipView::new(facts.counterparty, facts.counterparty_relationships);

    match kind {
        ProposalKind::Marriage => {
            check_pair(facts)?;
            if initiator.marriage().is_some() {
                return Err(Ineligibility::AlreadyMarried(facts.initiator));
            }
            if counterparty.marriage().is_some() {
                return Err(Ineligibility::AlreadyMarried(facts.counterparty));
            }
            Ok(())
        }
        ProposalKind::Collar => {
            check_pair(facts)?;
            if let Some(collar) = counterparty.collar() {
                return Err(if collar.party_a == facts.initiator {
                    Ineligibility::AlreadyYourPet {
                        pet: facts.counterparty,
                    }
                } else {
                    Ineligibility::AlreadyCollared {
                        pet: facts.counterparty,
                    }
                });
            }
            if initiator.pet_count() >= facts.max_pets {
                return Err(Ineligibility::TooManyPets {
                    limit: facts.max_pets,
                });
            }
            Ok(())
        }
        ProposalKind::Divorce => initiator
            .marriage()
            .map(|_| ())
            .ok_or(Ineligibility::NotMarried),
        ProposalKind::Escape => initiator
            .collar()
            .map(|_| ())
            .ok_or(Ineligibility::NotCollared),
    }
}

fn check_pair(facts: &EligibilityFacts<'_>) -> Result<(), Ineligibility> {
    if facts.initiator == facts.counterparty {
        return Err(Ineligibility::SelfTarget);
    }
    if !facts.initiator_adult {
        return Err(Ineligibility::NotAdult(facts.initiator));
    }
    if !facts.counterparty_adult {
        return Err(Ineligibility::NotAdult(facts.counterparty));
    }
    Ok(())
}
