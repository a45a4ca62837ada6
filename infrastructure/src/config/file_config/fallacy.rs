//! Fallacy rule configuration from TOML (`[fallacy]` section)
//!
//! ```toml
//! [[fallacy.custom_rules]]
//! fallacy_type = "appeal_to_popularity"
//! pattern = "(?i)\\bthe consensus of the faithful\\b"
//! severity = "low"
//! ```

use critique_domain::{FallacyRule, FallacyRuleConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileFallacyConfig {
    /// Appended to the built-in rule table
    pub custom_rules: Vec<FallacyRuleConfig>,
}

impl FileFallacyConfig {
    /// Error message for every rule that fails to compile.
    pub fn rule_errors(&self) -> Vec<String> {
        self.custom_rules
            .iter()
            .filter_map(|rule| FallacyRule::from_config(rule).err())
            .map(|e| e.to_string())
            .collect()
    }
}
