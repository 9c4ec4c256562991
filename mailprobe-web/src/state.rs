use std::time::Duration;

use mailprobe_region::RegionClassifier;
use mailprobe_toolbox::ProbeService;

use crate::client::ClientRegionCache;

/// Shared application state, registered once as `web::Data<AppState>`.
pub struct AppState {
    pub probes: ProbeService,
    /// `None` when the GeoIP database could not be opened; every client then
    /// gets English and the `/api/ip` endpoints report the classifier as
    /// unavailable.
    pub classifier: Option<RegionClassifier>,
    pub client_regions: ClientRegionCache,
}

impl AppState {
    pub fn new(
        probes: ProbeService,
        classifier: Option<RegionClassifier>,
        client_cache_ttl: Duration,
    ) -> Self {
        Self {
            probes,
            classifier,
            client_regions: ClientRegionCache::new(client_cache_ttl),
        }
    }
}
