//! Client address extraction and the per-client region verdict cache.

use std::time::{Duration, Instant};

use actix_web::HttpRequest;
use dashmap::DashMap;
use mailprobe_region::RegionClassifier;

const UNKNOWN_CLIENT: &str = "unknown";

/// Upper bound on cached client verdicts.
pub const DEFAULT_CLIENT_CACHE_CAPACITY: usize = 10_000;

/// Addresses seen for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAddrs {
    /// First `X-Forwarded-For` entry, else the peer address.
    pub client_ip: String,
    /// Every `X-Forwarded-For` entry followed by the peer address.
    pub all_ips: Vec<String>,
}

impl ClientAddrs {
    pub fn from_request(req: &HttpRequest) -> Self {
        let forwarded = req
            .headers()
            .get("X-Forwarded-For")
            .and_then(|value| value.to_str().ok());
        let peer = req.peer_addr().map(|addr| addr.ip().to_string());
        Self::from_parts(forwarded, peer.as_deref())
    }

    pub fn from_parts(forwarded_for: Option<&str>, peer: Option<&str>) -> Self {
        let all_ips: Vec<String> = forwarded_for
            .unwrap_or_default()
            .split(',')
            .chain(peer)
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .map(str::to_string)
            .collect();
        let client_ip = all_ips
            .first()
            .cloned()
            .unwrap_or_else(|| UNKNOWN_CLIENT.to_string());
        Self { client_ip, all_ips }
    }
}

#[derive(Debug, Clone, Copy)]
struct CachedVerdict {
    in_target_region: bool,
    checked_at: Instant,
}

/// Time-bounded memo of "is this client in the target region", keyed by
/// client IP. Independent of the classifier's own LRU cache.
///
/// `X-Forwarded-For` is client-controlled, so the map is capped: inserting
/// into a full cache first drops expired verdicts, then the oldest one.
pub struct ClientRegionCache {
    entries: DashMap<String, CachedVerdict>,
    ttl: Duration,
    capacity: usize,
}

impl ClientRegionCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, DEFAULT_CLIENT_CACHE_CAPACITY)
    }

    pub fn with_capacity(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Cached verdict for `client_ip`, classifying it when absent or expired.
    ///
    /// Without a classifier, or when classification reports an error, the
    /// client counts as outside the region; that verdict is cached too.
    pub fn is_target_region(&self, client_ip: &str, classifier: Option<&RegionClassifier>) -> bool {
        let cached = self.entries.get(client_ip).map(|entry| *entry.value());
        if let Some(verdict) = cached {
            if verdict.checked_at.elapsed() < self.ttl {
                return verdict.in_target_region;
            }
        }

        let in_target_region = classifier.is_some_and(|classifier| {
            let result = classifier.check_single(client_ip, true);
            result.in_target_region && result.error.is_none()
        });
        if !self.entries.contains_key(client_ip) {
            self.make_room();
        }
        self.entries.insert(
            client_ip.to_string(),
            CachedVerdict {
                in_target_region,
                checked_at: Instant::now(),
            },
        );
        in_target_region
    }

    /// Drop expired verdicts.
    pub fn purge_expired(&self) {
        let ttl = self.ttl;
        self.entries
            .retain(|_, verdict| verdict.checked_at.elapsed() < ttl);
    }

    fn make_room(&self) {
        if self.entries.len() < self.capacity {
            return;
        }
        self.purge_expired();
        if self.entries.len() < self.capacity {
            return;
        }
        let oldest = self
            .entries
            .iter()
            .min_by_key(|entry| entry.value().checked_at)
            .map(|entry| entry.key().clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
