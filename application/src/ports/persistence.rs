//! Persistence ports
//!
//! Stores are written only after a decision is committed. A failure there
//! is reported as "commit failed" and never rolls the decision back.

use async_trait::async_trait;
use denkeeper_domain::{Relationship, RelationshipId, RelationshipKind, Submission, SubmissionKind, UserId};
use thiserror::Error;

/// Errors that can occur during persistence operations
#[derive(Error, Debug, Clone)]
pub enum PersistenceError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Store of committed relationships.
#[async_trait]
pub trait RelationshipStore: Send + Sync {
    /// Persist a new relationship. For collars `party_a` is the owner.
    async fn create_relationship(
        &self,
        kind: RelationshipKind,
        party_a: UserId,
        party_b: UserId,
    ) -> Result<Relationship, PersistenceError>;

    async fn delete_relationship(&self, id: RelationshipId) -> Result<(), PersistenceError>;

    /// Every relationship `user` is a party to.
    async fn relationships_of(&self, user: UserId) -> Result<Vec<Relationship>, PersistenceError>;
}

/// Store of approved submissions (profiles, profile images).
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn create_submission_record(&self, submission: &Submission) -> Result<(), PersistenceError>;

    async fn has_record(&self, user: UserId, kind: SubmissionKind) -> Result<bool, PersistenceError>;
}
