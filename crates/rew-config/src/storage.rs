//! Storage configuration — where the ledger database lives.

use serde::{Deserialize, Serialize};

fn default_db_path() -> String {
    ".rewind/ledger.db".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Path to the libSQL database file, relative to the working
    /// directory unless absolute. `":memory:"` is accepted for tests.
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = StorageConfig::default();
        assert_eq!(config.db_path, ".rewind/ledger.db");
    }
}
