//! Classifier configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{RegionError, RegionResult};

pub const DEFAULT_DB_PATH: &str = "GeoLite2-Country.mmdb";
pub const DEFAULT_MAX_WORKERS: usize = 20;
pub const DEFAULT_CACHE_SIZE: usize = 10_000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_TARGET_REGION: &str = "CN";

/// Recognised classifier options; every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    /// MaxMind country database (`.mmdb`).
    pub db_path: PathBuf,
    /// Width of the shared worker pool and default per-batch concurrency.
    pub max_workers: usize,
    /// Maximum memoized addresses.
    pub cache_size: usize,
    /// Per-address timeout inside a batch, in seconds.
    pub timeout_secs: u64,
    /// ISO country code counted as "in region".
    pub target_region: String,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            max_workers: DEFAULT_MAX_WORKERS,
            cache_size: DEFAULT_CACHE_SIZE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            target_region: DEFAULT_TARGET_REGION.to_string(),
        }
    }
}

impl RegionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check the numeric limits and the region code. The database path is
    /// checked separately when the database is opened.
    pub fn validate(&self) -> RegionResult<()> {
        if self.max_workers == 0 {
            return Err(RegionError::InvalidConfig(
                "max_workers must be greater than 0".to_string(),
            ));
        }
        if self.cache_size == 0 {
            return Err(RegionError::InvalidConfig(
                "cache_size must be greater than 0".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(RegionError::InvalidConfig(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.target_region.trim().is_empty() {
            return Err(RegionError::InvalidConfig(
                "target_region must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
