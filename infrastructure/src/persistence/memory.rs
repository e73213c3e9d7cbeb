//! In-memory relationship and submission stores.

use async_trait::async_trait;
use chrono::Utc;
use denkeeper_application::ports::persistence::{
    PersistenceError, RelationshipStore, SubmissionStore,
};
use denkeeper_domain::{
    Relationship, RelationshipId, RelationshipKind, Submission, SubmissionKind, UserId,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use tracing::debug;

#[derive(Default)]
struct RelationshipTable {
    next_id: u64,
    rows: BTreeMap<RelationshipId, Relationship>,
}

/// Relationship store backed by an ordered map.
///
/// Ids are allocated from 1 and never reused.
#[derive(Default)]
pub struct InMemoryRelationshipStore {
    table: Mutex<RelationshipTable>,
}

impl InMemoryRelationshipStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored relationships.
    pub fn len(&self) -> usize {
        self.table
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .rows
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every stored relationship, oldest first.
    pub fn all(&self) -> Vec<Relationship> {
        self.table
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .rows
            .values()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl RelationshipStore for InMemoryRelationshipStore {
    async fn create_relationship(
        &self,
        kind: RelationshipKind,
        party_a: UserId,
        party_b: UserId,
    ) -> Result<Relationship, PersistenceError> {
        if party_a == party_b {
            return Err(PersistenceError::Storage(format!(
                "{} needs two different parties",
                kind
            )));
        }

        let mut table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        table.next_id += 1;
        let relationship = Relationship {
            id: RelationshipId(table.next_id),
            kind,
            party_a,
            party_b,
            formed_at: Utc::now(),
        };
        table.rows.insert(relationship.id, relationship.clone());
        debug!(
            "Stored {} {} ({} / {})",
            kind, relationship.id, party_a, party_b
        );
        Ok(relationship)
    }

    async fn delete_relationship(&self, id: RelationshipId) -> Result<(), PersistenceError> {
        let mut table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        table
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| PersistenceError::NotFound(format!("relationship {}", id)))
    }

    async fn relationships_of(&self, user: UserId) -> Result<Vec<Relationship>, PersistenceError> {
        let table = self.table.lock().unwrap_or_else(|e| e.into_inner());
        Ok(table
            .rows
            .values()
            .filter(|r| r.involves(user))
            .cloned()
            .collect())
    }
}

/// Submission record store keyed by (submitter, kind).
///
/// A later approval for the same pair replaces the earlier record.
#[derive(Default)]
pub struct InMemorySubmissionStore {
    records: Mutex<HashMap<(UserId, SubmissionKind), Submission>>,
}

impl InMemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, user: UserId, kind: SubmissionKind) -> Option<Submission> {
        self.records
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&(user, kind))
            .cloned()
    }
}

#[async_trait]
impl SubmissionStore for InMemorySubmissionStore {
    async fn create_submission_record(
        &self,
        submission: &Submission,
    ) -> Result<(), PersistenceError> {
        if !submission.kind.persists_record() {
            return Err(PersistenceError::Storage(format!(
                "{} submissions are not stored",
                submission.kind
            )));
        }

        let mut records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        records.insert((submission.submitter, submission.kind), submission.clone());
        debug!(
            "Stored {} record for {}",
            submission.kind, submission.submitter
        );
        Ok(())
    }

    async fn has_record(&self, user: UserId, kind: SubmissionKind) -> Result<bool, PersistenceError> {
        let records = self.records.lock().unwrap_or_else(|e| e.into_inner());
        Ok(records.contains_key(&(user, kind)))
    }
}
