//! Request bodies and API-only response payloads.

use mailprobe_region::{IpClassification, RegionStatistics};
use serde::{Deserialize, Serialize};

/// Trimmed value, `None` when absent or blank.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TargetRequest {
    pub target: Option<String>,
}

impl TargetRequest {
    pub fn target(&self) -> Option<&str> {
        non_blank(self.target.as_deref())
    }
}

/// Ports accept `host`, falling back to `target`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PortsRequest {
    pub host: Option<String>,
    pub target: Option<String>,
}

impl PortsRequest {
    pub fn host(&self) -> Option<&str> {
        non_blank(self.host.as_deref()).or_else(|| non_blank(self.target.as_deref()))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DkimRequest {
    pub target: Option<String>,
    pub selectors: Option<Vec<String>>,
}

impl DkimRequest {
    pub fn target(&self) -> Option<&str> {
        non_blank(self.target.as_deref())
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct IpBatchRequest {
    pub ips: Vec<String>,
    pub max_workers: Option<usize>,
    pub use_cache: bool,
    /// Attach aggregate statistics to a batch check.
    pub stats: bool,
}

impl Default for IpBatchRequest {
    fn default() -> Self {
        Self {
            ips: Vec::new(),
            max_workers: None,
            use_cache: true,
            stats: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchClassification {
    pub results: Vec<IpClassification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<RegionStatistics>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: &'static str,
    pub region_detection: bool,
}
