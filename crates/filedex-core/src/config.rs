//! Index configuration.

use std::path::PathBuf;
use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Configuration for indexing one root.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct IndexConfig {
    /// Root path to index.
    pub root: PathBuf,

    /// Files larger than this are not hashed; only their size is
    /// recorded.
    #[builder(default = "default_hash_ceiling()")]
    #[serde(default = "default_hash_ceiling")]
    pub hash_ceiling: u64,

    /// Skip hashing of remote/placeholder files whose content is not
    /// locally resident.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub skip_placeholders: bool,

    /// Interval between full recrawls of the root.
    #[builder(default = "default_full_interval()")]
    #[serde(default = "default_full_interval")]
    pub full_recrawl_interval: Duration,

    /// Coordinator sleep when the pending queue is empty.
    #[builder(default = "default_idle_backoff()")]
    #[serde(default = "default_idle_backoff")]
    pub idle_backoff: Duration,

    /// How long the watcher blocks per wait before re-checking for
    /// cancellation. Bounds shutdown latency.
    #[builder(default = "default_watch_poll()")]
    #[serde(default = "default_watch_poll")]
    pub watch_poll_interval: Duration,
}

fn default_true() -> bool {
    true
}

fn default_hash_ceiling() -> u64 {
    1024 * 1024 * 1024 // 1 GiB
}

fn default_full_interval() -> Duration {
    Duration::from_secs(2 * 60 * 60)
}

fn default_idle_backoff() -> Duration {
    Duration::from_millis(50)
}

fn default_watch_poll() -> Duration {
    Duration::from_millis(100)
}

impl IndexConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref root) = self.root {
            if root.as_os_str().is_empty() {
                return Err("Root path cannot be empty".to_string());
            }
        } else {
            return Err("Root path is required".to_string());
        }
        Ok(())
    }
}

impl IndexConfig {
    /// Create a new config builder.
    pub fn builder() -> IndexConfigBuilder {
        IndexConfigBuilder::default()
    }

    /// Create a config with defaults for a root path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            hash_ceiling: default_hash_ceiling(),
            skip_placeholders: true,
            full_recrawl_interval: default_full_interval(),
            idle_backoff: default_idle_backoff(),
            watch_poll_interval: default_watch_poll(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = IndexConfig::new("/data");
        assert_eq!(config.root, PathBuf::from("/data"));
        assert_eq!(config.hash_ceiling, 1024 * 1024 * 1024);
        assert_eq!(config.full_recrawl_interval, Duration::from_secs(7200));
        assert!(config.skip_placeholders);
    }

    #[test]
    fn test_config_builder() {
        let config = IndexConfig::builder()
            .root("/data")
            .hash_ceiling(1024u64)
            .full_recrawl_interval(Duration::from_secs(60))
            .build()
            .unwrap();

        assert_eq!(config.hash_ceiling, 1024);
        assert_eq!(config.full_recrawl_interval, Duration::from_secs(60));
    }

    #[test]
    fn test_config_requires_root() {
        assert!(IndexConfig::builder().build().is_err());
        assert!(IndexConfig::builder().root("").build().is_err());
    }
}
