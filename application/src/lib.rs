//! Application layer for denkeeper
//!
//! This crate contains the workflow coordinator, the registries and gates it
//! drives, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod cooldown;
pub mod gate;
pub mod ports;
pub mod registry;
pub mod use_cases;

// Re-export commonly used types
pub use config::{ChannelMap, CooldownPolicy, Questionnaires, WorkflowConfig, WorkflowParams};
pub use cooldown::{CooldownAction, CooldownTracker};
pub use gate::{GateOutcome, GateRequest, GateResponse, ReactionGate, ReplyGate};
pub use ports::{
    audit_log::{AuditEntry, AuditLog, NoAuditLog},
    authorization::{AuthorizationError, Authorizer},
    notification::{NotificationError, Notice, Notifier, Target},
    persistence::{PersistenceError, RelationshipStore, SubmissionStore},
};
pub use registry::{ApprovalQueue, ProposalRegistry, ProposalTicket, SubmissionDraft};
pub use use_cases::coordinator::{
    IntakeOutcome, ReviewOutcome, WorkflowCoordinator, WorkflowError, WorkflowOutcome,
};
pub use use_cases::sync_level_roles::{SyncLevelRolesError, SyncLevelRolesUseCase};
