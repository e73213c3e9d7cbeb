//! Application-level configuration.
//!
//! This module provides configuration types that control how workflows behave:
//!
//! - [`WorkflowParams`]: gate timeouts and capacity limits
//! - [`CooldownPolicy`]: rate-limit window per action
//! - [`ChannelMap`]: where notices are posted
//! - [`Questionnaires`]: DM questions per submission kind
//! - [`WorkflowConfig`]: container handed to the coordinator

pub mod channels;
pub mod cooldown_policy;
pub mod questionnaires;
pub mod workflow_config;
pub mod workflow_params;

pub use channels::ChannelMap;
pub use cooldown_policy::CooldownPolicy;
pub use questionnaires::Questionnaires;
pub use workflow_config::WorkflowConfig;
pub use workflow_params::WorkflowParams;
