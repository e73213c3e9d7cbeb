//! Authorization port
//!
//! Answers capability questions and applies role changes on the platform.

use async_trait::async_trait;
use denkeeper_domain::{Capability, RoleId, UserId};
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum AuthorizationError {
    #[error("No role is configured for capability {0}")]
    UnmappedCapability(Capability),

    #[error("Role update failed: {0}")]
    Platform(String),
}

#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Whether `subject` currently holds `capability`.
    ///
    /// Synchronous so it can be called inside a registry's guarded section.
    fn has_capability(&self, subject: UserId, capability: Capability) -> bool;

    async fn grant_capability(
        &self,
        subject: UserId,
        capability: Capability,
    ) -> Result<(), AuthorizationError>;

    async fn roles_of(&self, subject: UserId) -> Result<BTreeSet<RoleId>, AuthorizationError>;

    async fn add_role(&self, subject: UserId, role: RoleId) -> Result<(), AuthorizationError>;

    async fn remove_role(&self, subject: UserId, role: RoleId) -> Result<(), AuthorizationError>;
}
