//! Single-party submissions awaiting a privileged reviewer.

pub mod entities;
pub mod kind;

pub use entities::{Answer, Decision, Submission, SubmissionPayload, SubmissionState};
pub use kind::{Prerequisite, SubmissionKind, Unmet};
