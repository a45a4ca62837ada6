//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Directory for daily-rotated diagnostic logs; stderr only when unset
    pub dir: Option<PathBuf>,
    /// JSONL file receiving critique events
    pub events_file: Option<PathBuf>,
    /// `EnvFilter` directive used when no `-v` flag is given
    pub filter: Option<String>,
}
