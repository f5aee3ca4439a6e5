//! Retention configuration — how much history the audit trail keeps.

use serde::{Deserialize, Serialize};

const fn default_max_entries() -> u32 {
    50
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetentionConfig {
    /// Maximum number of audit entries retained. Oldest entries (whole
    /// batches at a time) are evicted after every append once the count
    /// exceeds this; evicted entries become permanently un-undoable.
    #[serde(default = "default_max_entries")]
    pub max_entries: u32,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = RetentionConfig::default();
        assert_eq!(config.max_entries, 50);
    }
}
