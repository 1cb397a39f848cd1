//! Engine configuration.
//!
//! The engine recognizes a small set of keys loaded from a TOML file or built
//! in code:
//! - `indexer_thread_count`: worker count for parallel indexing; zero or
//!   negative selects the machine's ideal thread count with a fallback of 4
//! - `cancel_indexing_on_fatal_errors`: propagated to every indexer command

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DendriteError, Result};

/// Fallback worker count when the ideal thread count cannot be determined.
const FALLBACK_THREAD_COUNT: usize = 4;

/// Configuration recognized by the indexing engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of parallel indexer workers; `<= 0` means auto-detect.
    pub indexer_thread_count: i32,

    /// Cancel the whole refresh when an indexer command fails fatally.
    pub cancel_indexing_on_fatal_errors: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            indexer_thread_count: 0,
            cancel_indexing_on_fatal_errors: false,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&text)
            .map_err(|e| DendriteError::config(format!("{}: {e}", path.as_ref().display())))
    }

    /// Resolve the configured thread count to the number of workers to spawn.
    pub fn resolve_worker_count(&self) -> usize {
        if self.indexer_thread_count > 0 {
            return self.indexer_thread_count as usize;
        }
        ideal_thread_count()
    }
}

/// Number of hardware threads, with a fallback when detection fails.
pub fn ideal_thread_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(FALLBACK_THREAD_COUNT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.indexer_thread_count, 0);
        assert!(!config.cancel_indexing_on_fatal_errors);
    }

    #[test]
    fn test_explicit_thread_count_wins() {
        let config = EngineConfig {
            indexer_thread_count: 3,
            ..EngineConfig::default()
        };
        assert_eq!(config.resolve_worker_count(), 3);
    }

    #[test]
    fn test_auto_thread_count_is_positive() {
        let config = EngineConfig::default();
        assert!(config.resolve_worker_count() >= 1);
    }

    #[test]
    fn test_load_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        std::fs::write(
            &path,
            "indexer_thread_count = 8\ncancel_indexing_on_fatal_errors = true\n",
        )
        .unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.indexer_thread_count, 8);
        assert!(config.cancel_indexing_on_fatal_errors);
    }

    #[test]
    fn test_load_partial_toml_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        std::fs::write(&path, "indexer_thread_count = 2\n").unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.indexer_thread_count, 2);
        assert!(!config.cancel_indexing_on_fatal_errors);
    }
}
