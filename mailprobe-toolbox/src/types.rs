//! Public types returned by probe operations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ToolboxResult;

/// Uniform response envelope shared by every probe.
///
/// `ok == false` always carries a non-empty `error`; `data` and `issues` are
/// only present on success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeResponse<T> {
    /// Success discriminator.
    pub ok: bool,
    /// Probe-specific payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human-readable notes attached to a successful result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<String>>,
    /// Failure message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ProbeResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            issues: None,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        let mut error = error.into();
        if error.is_empty() {
            error = "unknown error".to_string();
        }
        Self {
            ok: false,
            data: None,
            issues: None,
            error: Some(error),
        }
    }

    #[must_use]
    pub fn with_issues(mut self, issues: Vec<String>) -> Self {
        if self.ok {
            self.issues = Some(issues);
        }
        self
    }
}

impl<T> From<ToolboxResult<T>> for ProbeResponse<T> {
    fn from(result: ToolboxResult<T>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(e) => Self::failure(e.to_string()),
        }
    }
}

/// A single MX answer, kept in DNS answer order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MxHost {
    /// Exchange host name, trailing dot removed.
    pub host: String,
    /// MX preference value.
    pub preference: u16,
}

/// `all` mechanism qualifier found in an SPF record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpfPolicy {
    /// `-all`
    #[serde(rename = "-all")]
    Fail,
    /// `~all`
    #[serde(rename = "~all")]
    SoftFail,
    /// `?all`, also the default when no qualifier is present.
    #[serde(rename = "?all")]
    Neutral,
}

impl SpfPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fail => "-all",
            Self::SoftFail => "~all",
            Self::Neutral => "?all",
        }
    }
}

impl fmt::Display for SpfPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of the SPF probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpfAnalysis {
    /// Raw `v=spf1` record text.
    pub record: String,
    /// Number of `include:` occurrences (substring count, not a full SPF parse).
    pub includes: usize,
    /// Qualifier of the `all` mechanism.
    pub policy: SpfPolicy,
}

impl SpfAnalysis {
    /// The two notes reported alongside the record: include count, then policy.
    pub fn issues(&self) -> Vec<String> {
        vec![
            format!("include chain {}", self.includes),
            format!("policy: {}", self.policy),
        ]
    }

    pub fn into_response(self) -> ProbeResponse<String> {
        let issues = self.issues();
        ProbeResponse::success(self.record).with_issues(issues)
    }
}

/// Outcome for one DKIM selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DkimSelectorResult {
    /// TXT strings published at `<selector>._domainkey.<domain>`.
    Found { selector: String, pubkey: Vec<String> },
    /// Lookup failure for this selector only.
    Failed { selector: String, error: String },
}

impl DkimSelectorResult {
    pub fn selector(&self) -> &str {
        match self {
            Self::Found { selector, .. } | Self::Failed { selector, .. } => selector,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }
}

/// Reachability of one mail port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortStatus {
    /// Port number rendered as a string.
    pub service: String,
    pub reachable: bool,
    /// Raw connection error when unreachable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Result of the SMTPS (465) TLS probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TlsReport {
    /// Whether the submission port (587) advertises STARTTLS in its EHLO reply.
    pub starttls: bool,
    /// Negotiated protocol version, e.g. `"TLSv1.3"`.
    pub min_version: String,
    /// Leaf certificate subject CN, `"(unknown)"` when absent.
    #[serde(rename = "certCN")]
    pub cert_cn: String,
    /// Weak suites negotiated on the handshake.
    ///
    /// rustls never offers a weak suite, so a completed handshake reports 0.
    pub weak_ciphers: u32,
    /// Negotiated cipher suite name.
    pub cipher_suite: String,
}

/// Result of the DNSBL probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DnsblReport {
    /// Number of zones queried.
    pub checked: usize,
    /// Number of zones on which the reversed address resolved.
    pub listed: usize,
    /// Zones that listed the address, in query order.
    pub listed_on: Vec<String>,
}

/// Result of the PTR probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PtrReport {
    /// Forward A address of the target.
    pub ip: String,
    /// First PTR answer, trailing dot removed.
    pub ptr: String,
}
