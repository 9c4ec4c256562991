//! IP region classification for mailprobe
//!
//! 基于离线 GeoIP 国家库判断 IP 是否属于目标地区，带 LRU 缓存与并发批量查询。
//! 批量结果按去重后的输入顺序返回。

mod cache;
mod classifier;
mod config;
mod error;
mod source;

#[cfg(test)]
mod test_support;

pub use cache::{CacheInfo, RegionCache, RegionLookup};
pub use classifier::{IpClassification, RegionClassifier, RegionStatistics};
pub use config::{
    RegionConfig, DEFAULT_CACHE_SIZE, DEFAULT_DB_PATH, DEFAULT_MAX_WORKERS, DEFAULT_TARGET_REGION,
    DEFAULT_TIMEOUT_SECS,
};
pub use error::{RegionError, RegionResult};
pub use source::{CountryLookup, MaxMindCountryLookup};
