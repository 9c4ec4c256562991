//! Single and batch region classification on top of [`RegionCache`].

use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::time::timeout;

use crate::cache::{CacheInfo, RegionCache};
use crate::config::RegionConfig;
use crate::error::{RegionError, RegionResult};
use crate::source::{CountryLookup, MaxMindCountryLookup};

/// Verdict for one address.
///
/// `in_target_region` is only ever true when `region_code` equals the target
/// region and `error` is absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IpClassification {
    pub ip: String,
    pub in_target_region: bool,
    pub region_code: Option<String>,
    pub error: Option<String>,
    pub from_cache: bool,
}

impl IpClassification {
    fn failed(ip: String, error: impl Into<String>) -> Self {
        Self {
            ip,
            in_target_region: false,
            region_code: None,
            error: Some(error.into()),
            from_cache: false,
        }
    }
}

/// Aggregate counts over one deduplicated batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionStatistics {
    pub total: usize,
    pub in_region_count: usize,
    pub out_of_region_count: usize,
    pub error_count: usize,
    pub cache_hit_count: usize,
    pub in_region_pct: f64,
    pub cache_hit_pct: f64,
}

impl RegionStatistics {
    pub fn from_results(results: &[IpClassification]) -> Self {
        let total = results.len();
        let in_region_count = results
            .iter()
            .filter(|r| r.in_target_region && r.error.is_none())
            .count();
        let out_of_region_count = results
            .iter()
            .filter(|r| !r.in_target_region && r.error.is_none())
            .count();
        let error_count = results.iter().filter(|r| r.error.is_some()).count();
        let cache_hit_count = results.iter().filter(|r| r.from_cache).count();

        Self {
            total,
            in_region_count,
            out_of_region_count,
            error_count,
            cache_hit_count,
            in_region_pct: percentage(in_region_count, total),
            cache_hit_pct: percentage(cache_hit_count, total),
        }
    }
}

/// `part / total` as a percentage rounded to two decimals; 0 for an empty total.
#[allow(clippy::cast_precision_loss)]
fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 / total as f64 * 10_000.0).round() / 100.0
}

/// Drop repeated addresses, keeping each first occurrence in place.
fn dedupe<S: AsRef<str>>(ips: &[S]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(ips.len());
    ips.iter()
        .map(AsRef::<str>::as_ref)
        .filter(|ip| seen.insert(*ip))
        .map(str::to_string)
        .collect()
}

struct ClassifierInner {
    config: RegionConfig,
    target_region: String,
    cache: RegionCache,
    source: ArcSwap<Box<dyn CountryLookup>>,
    /// Shared by every batch; sized once from `max_workers`.
    workers: Arc<Semaphore>,
}

/// Process-wide region classifier. Clones share the cache, the lookup
/// source and the worker pool.
#[derive(Clone)]
pub struct RegionClassifier {
    inner: Arc<ClassifierInner>,
}

impl RegionClassifier {
    /// Validate `config` and open its MaxMind database.
    pub fn open(config: RegionConfig) -> RegionResult<Self> {
        config.validate()?;
        let source = MaxMindCountryLookup::open(&config.db_path)?;
        info!(
            "[Region] Classifier ready: db={}, workers={}, cache={}, target={}",
            config.db_path.display(),
            config.max_workers,
            config.cache_size,
            config.target_region
        );
        Self::with_source(config, Box::new(source))
    }

    /// Classifier over an arbitrary lookup source; `db_path` is not touched.
    pub fn with_source(config: RegionConfig, source: Box<dyn CountryLookup>) -> RegionResult<Self> {
        config.validate()?;
        let capacity = NonZeroUsize::new(config.cache_size).ok_or_else(|| {
            RegionError::InvalidConfig("cache_size must be greater than 0".to_string())
        })?;
        Ok(Self {
            inner: Arc::new(ClassifierInner {
                target_region: config.target_region.trim().to_ascii_uppercase(),
                cache: RegionCache::new(capacity),
                source: ArcSwap::from_pointee(source),
                workers: Arc::new(Semaphore::new(config.max_workers)),
                config,
            }),
        })
    }

    pub fn config(&self) -> &RegionConfig {
        &self.inner.config
    }

    /// Normalised ISO code counted as "in region".
    pub fn target_region(&self) -> &str {
        &self.inner.target_region
    }

    /// Classify one address through the cache. Never fails; errors land in
    /// the `error` field.
    pub fn classify_one(&self, ip: &str) -> IpClassification {
        let source = self.inner.source.load_full();
        let (lookup, from_cache) = self.inner.cache.lookup(ip, &**source);
        let in_target_region =
            lookup.error.is_none() && lookup.region_code.as_deref() == Some(self.target_region());
        IpClassification {
            ip: ip.to_string(),
            in_target_region,
            region_code: lookup.region_code,
            error: lookup.error,
            from_cache,
        }
    }

    /// [`classify_one`](Self::classify_one), clearing the whole cache first
    /// when `use_cache` is false.
    pub fn check_single(&self, ip: &str, use_cache: bool) -> IpClassification {
        if !use_cache {
            self.clear_cache();
        }
        self.classify_one(ip)
    }

    /// Classify a batch, one result per distinct address in first-occurrence
    /// order.
    ///
    /// `max_workers` caps this batch's concurrency (default from config); the
    /// shared pool still bounds the total across batches. `use_cache = false`
    /// clears the cache for every caller before the batch starts. Each address
    /// gets its own timeout; an expired one yields `error = "timeout"`.
    pub async fn classify_batch<S: AsRef<str>>(
        &self,
        ips: &[S],
        max_workers: Option<usize>,
        use_cache: bool,
    ) -> Vec<IpClassification> {
        let unique = dedupe(ips);
        if unique.is_empty() {
            return Vec::new();
        }
        if !use_cache {
            self.clear_cache();
        }
        if let [ip] = unique.as_slice() {
            return vec![self.classify_one(ip)];
        }

        let width = max_workers.unwrap_or(self.inner.config.max_workers).max(1);
        debug!("[Region] Classifying {} addresses, width {width}", unique.len());

        stream::iter(unique)
            .map(|ip| self.clone().classify_pooled(ip))
            .buffered(width)
            .collect()
            .await
    }

    /// One pooled lookup. The deadline covers waiting for a worker as well as
    /// the lookup itself; an expired lookup keeps its worker until it returns.
    async fn classify_pooled(self, ip: String) -> IpClassification {
        let deadline = self.inner.config.timeout();
        let workers = Arc::clone(&self.inner.workers);
        let this = self.clone();
        let task_ip = ip.clone();
        let task = async move {
            let permit = workers.acquire_owned().await.map_err(|e| e.to_string())?;
            tokio::task::spawn_blocking(move || {
                let _permit = permit;
                this.classify_one(&task_ip)
            })
            .await
            .map_err(|e| e.to_string())
        };

        match timeout(deadline, task).await {
            Ok(Ok(classification)) => classification,
            Ok(Err(e)) => {
                warn!("[Region] Classification task for {ip} failed: {e}");
                IpClassification::failed(ip, e)
            }
            Err(_) => {
                warn!("[Region] Classification of {ip} timed out after {deadline:?}");
                IpClassification::failed(ip, "timeout")
            }
        }
    }

    /// Addresses classified in region without error, batch order.
    pub async fn filter_in_region<S: AsRef<str>>(&self, ips: &[S], use_cache: bool) -> Vec<String> {
        self.classify_batch(ips, None, use_cache)
            .await
            .into_iter()
            .filter(|r| r.in_target_region && r.error.is_none())
            .map(|r| r.ip)
            .collect()
    }

    /// Addresses classified outside the region without error, batch order.
    pub async fn filter_out_of_region<S: AsRef<str>>(
        &self,
        ips: &[S],
        use_cache: bool,
    ) -> Vec<String> {
        self.classify_batch(ips, None, use_cache)
            .await
            .into_iter()
            .filter(|r| !r.in_target_region && r.error.is_none())
            .map(|r| r.ip)
            .collect()
    }

    pub async fn statistics<S: AsRef<str>>(&self, ips: &[S], use_cache: bool) -> RegionStatistics {
        let results = self.classify_batch(ips, None, use_cache).await;
        RegionStatistics::from_results(&results)
    }

    pub fn cache_info(&self) -> CacheInfo {
        self.inner.cache.info()
    }

    pub fn clear_cache(&self) {
        self.inner.cache.clear();
        debug!("[Region] Cache cleared");
    }

    /// Swap in the database at `path`, then clear the cache. The current
    /// source stays in place if the new one cannot be opened.
    pub fn update_database(&self, path: &Path) -> RegionResult<()> {
        let source = MaxMindCountryLookup::open(path)?;
        self.replace_source(Box::new(source));
        info!("[Region] Database replaced with {}", path.display());
        Ok(())
    }

    /// Swap the lookup source, then clear the cache.
    pub fn replace_source(&self, source: Box<dyn CountryLookup>) {
        self.inner.source.store(Arc::new(source));
        self.clear_cache();
    }
}
