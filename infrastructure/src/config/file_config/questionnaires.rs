//! DM questionnaires from TOML (`[questionnaires]` section)

use denkeeper_application::Questionnaires;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileQuestionnairesConfig {
    pub verification: Vec<String>,
    pub profile: Vec<String>,
    pub image_prompt: String,
}

impl Default for FileQuestionnairesConfig {
    fn default() -> Self {
        let defaults = Questionnaires::default();
        Self {
            verification: defaults.verification,
            profile: defaults.profile,
            image_prompt: defaults.image_prompt,
        }
    }
}

impl FileQuestionnairesConfig {
    pub fn to_questionnaires(&self) -> Questionnaires {
        Questionnaires {
            verification: self.verification.clone(),
            profile: self.profile.clone(),
            image_prompt: self.image_prompt.clone(),
        }
    }
}
