//! Persistence adapters
//!
//! In-memory stores backing the [`RelationshipStore`] and [`SubmissionStore`]
//! ports. State lives for the lifetime of the process.
//!
//! [`RelationshipStore`]: denkeeper_application::RelationshipStore
//! [`SubmissionStore`]: denkeeper_application::SubmissionStore

mod memory;

pub use memory::{InMemoryRelationshipStore, InMemorySubmissionStore};
