//! Workflow parameters: timeouts and limits.
//!
//! [`WorkflowParams`] groups the static parameters that control how long
//! each gate waits and how much a member may hold. These are
//! application-layer concerns, not domain policy.

use denkeeper_domain::ProposalKind;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gate timeouts and capacity limits.
///
/// | Wait | Default |
/// |------|---------|
/// | Marriage / collar response | 60s |
/// | Marriage confirmation | 30s |
/// | Divorce self-confirmation | 60s |
/// | Escape self-confirmation | 30s |
/// | Questionnaire answer | 300s |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowParams {
    /// How long the counterparty has to answer a forming proposal.
    pub response_timeout: Duration,
    /// How long the initiator has to confirm an accepted marriage.
    pub confirmation_timeout: Duration,
    pub divorce_timeout: Duration,
    pub escape_timeout: Duration,
    /// How long a submitter has to answer each questionnaire question.
    pub answer_timeout: Duration,
    /// Maximum pets one owner may collar.
    pub max_pets: usize,
    /// How often the sweeper looks for overdue proposals.
    pub sweep_interval: Duration,
}

impl Default for WorkflowParams {
    fn default() -> Self {
        Self {
            response_timeout: Duration::from_secs(60),
            confirmation_timeout: Duration::from_secs(30),
            divorce_timeout: Duration::from_secs(60),
            escape_timeout: Duration::from_secs(30),
            answer_timeout: Duration::from_secs(300),
            max_pets: 2,
            sweep_interval: Duration::from_secs(30),
        }
    }
}

impl WorkflowParams {
    /// First-phase timeout for a proposal of `kind`.
    pub fn timeout_for(&self, kind: ProposalKind) -> Duration {
        match kind {
            ProposalKind::Marriage | ProposalKind::Collar => self.response_timeout,
            ProposalKind::Divorce => self.divorce_timeout,
            ProposalKind::Escape => self.escape_timeout,
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.confirmation_timeout = timeout;
        self
    }

    pub fn with_divorce_timeout(mut self, timeout: Duration) -> Self {
        self.divorce_timeout = timeout;
        self
    }

    pub fn with_escape_timeout(mut self, timeout: Duration) -> Self {
        self.escape_timeout = timeout;
        self
    }

    pub fn with_answer_timeout(mut self, timeout: Duration) -> Self {
        self.answer_timeout = timeout;
        self
    }

    pub fn with_max_pets(mut self, max: usize) -> Self {
        self.max_pets = max;
        self
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let params = WorkflowParams::default();
        assert_eq!(params.response_timeout, Duration::from_secs(60));
        assert_eq!(params.confirmation_timeout, Duration::from_secs(30));
        assert_eq!(params.answer_timeout, Duration::from_secs(300));
        assert_eq!(params.max_pets, 2);
    }

    #[test]
    fn test_timeout_per_kind() {
        let params = WorkflowParams::default().with_escape_timeout(Duration::from_secs(10));
        assert_eq!(params.timeout_for(ProposalKind::Collar), Duration::from_secs(60));
        assert_eq!(params.timeout_for(ProposalKind::Divorce), Duration::from_secs(60));
        assert_eq!(params.timeout_for(ProposalKind::Escape), Duration::from_secs(10));
    }
}
