//! Log destinations from TOML (`[logging]` section)
//!
//! ```toml
//! [logging]
//! directory = "/var/log/denkeeper"    # daily-rolling operation log
//! audit_file = "/var/lib/denkeeper/audit.jsonl"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Directory for the daily-rolling operation log; stderr only when unset
    pub directory: Option<PathBuf>,
    /// File name prefix inside `directory`
    pub file_prefix: String,
    /// JSONL decision log; disabled when unset
    pub audit_file: Option<PathBuf>,
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self {
            directory: None,
            file_prefix: "denkeeper.log".to_string(),
            audit_file: None,
        }
    }
}
