//! Runtime configuration

use serde::{Deserialize, Serialize};

/// Default ignore marker attribute
pub const ATTR_IGNORE: &str = "data-graft-ignore";

/// Lifecycle runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Elements carrying this attribute are skipped, subtree included,
    /// by both initialization and removal walks
    pub ignore_attribute: String,
    /// Turn silently ignored malformed declarations into errors
    pub strict: bool,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            ignore_attribute: ATTR_IGNORE.to_string(),
            strict: false,
        }
    }
}

impl LifecycleConfig {
    pub fn with_ignore_attribute(mut self, name: &str) -> Self {
        self.ignore_attribute = name.to_string();
        self
    }

    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }
}
