//! Questions asked over DM before a submission is queued.

use denkeeper_domain::SubmissionKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Questionnaires {
    pub verification: Vec<String>,
    pub profile: Vec<String>,
    /// Prompt sent before waiting for an image upload.
    pub image_prompt: String,
}

impl Default for Questionnaires {
    fn default() -> Self {
        Self {
            verification: vec![
                "What's your age?".to_string(),
                "How did you find our server?".to_string(),
                "Why do you want to join our community?".to_string(),
                "Do you agree to follow our server rules?".to_string(),
            ],
            profile: vec![
                "What's your fursona's name?".to_string(),
                "What's your fursona's species?".to_string(),
                "What's your fursona's age?".to_string(),
                "Please write a brief bio for your fursona:".to_string(),
            ],
            image_prompt: "Please upload an image of your fursona.".to_string(),
        }
    }
}

impl Questionnaires {
    /// Questions for an answer-based submission; empty for image uploads.
    pub fn questions_for(&self, kind: SubmissionKind) -> &[String] {
        match kind {
            SubmissionKind::Verification => &self.verification,
            SubmissionKind::Profile => &self.profile,
            SubmissionKind::ProfileImage => &[],
        }
    }
}
