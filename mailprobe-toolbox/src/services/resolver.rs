//! DNS backend shared by every probe.

use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::{
    config::{ResolverConfig, ResolverOpts},
    name_server::TokioConnectionProvider,
    proto::rr::RecordType,
    TokioResolver,
};
use tokio::time::timeout;

use crate::error::{ToolboxError, ToolboxResult};
use crate::types::MxHost;

/// The record lookups the probes need.
///
/// Implementations return records in answer order and map every resolver
/// failure (NXDOMAIN included) to [`ToolboxError::ResolutionError`].
#[async_trait]
pub trait MailResolver: Send + Sync {
    /// MX records of `domain`.
    async fn mx(&self, domain: &str) -> ToolboxResult<Vec<MxHost>>;

    /// TXT records of `name`, each record's character-strings concatenated.
    async fn txt(&self, name: &str) -> ToolboxResult<Vec<String>>;

    /// IPv4 addresses of `host`.
    async fn ipv4(&self, host: &str) -> ToolboxResult<Vec<Ipv4Addr>>;

    /// PTR targets published at the reverse name `name`, trailing dots removed.
    async fn ptr(&self, name: &str) -> ToolboxResult<Vec<String>>;
}

/// Shared default DNS resolver.
///
/// On Unix/Windows this uses the host system configuration (e.g. `/etc/resolv.conf`).
/// If the system configuration cannot be loaded, it falls back to Hickory's default
/// upstream set (Google Public DNS).
static DEFAULT_RESOLVER: LazyLock<TokioResolver> = LazyLock::new(build_system_resolver);

/// Build a resolver using the host system DNS configuration (with fallback).
fn build_system_resolver() -> TokioResolver {
    #[cfg(any(unix, target_os = "windows"))]
    {
        match TokioResolver::builder_tokio() {
            Ok(builder) => return builder.build(),
            Err(e) => {
                log::warn!(
                    "Failed to load system DNS configuration, falling back to defaults: {e}"
                );
            }
        }
    }

    let provider = TokioConnectionProvider::default();
    TokioResolver::builder_with_config(ResolverConfig::default(), provider)
        .with_options(ResolverOpts::default())
        .build()
}

fn resolution_error(e: impl std::fmt::Display) -> ToolboxError {
    ToolboxError::ResolutionError(e.to_string())
}

/// Forward IPv4 address of `target`.
///
/// IPv4 literals pass through; names resolve to their first A answer within
/// `deadline`. IPv6 literals are rejected because reverse zones here are
/// built from IPv4 octets.
pub(crate) async fn forward_ipv4(
    resolver: &dyn MailResolver,
    target: &str,
    deadline: Duration,
) -> ToolboxResult<Ipv4Addr> {
    if let Ok(ip) = target.parse::<Ipv4Addr>() {
        return Ok(ip);
    }
    if target.parse::<Ipv6Addr>().is_ok() {
        return Err(ToolboxError::ValidationError(format!(
            "IPv6 address not supported: {target}"
        )));
    }

    let addrs = timeout(deadline, resolver.ipv4(target))
        .await
        .map_err(|_| ToolboxError::Timeout(format!("A lookup for {target}")))??;
    addrs
        .into_iter()
        .next()
        .ok_or_else(|| ToolboxError::ResolutionError(format!("no A record found for {target}")))
}

/// [`MailResolver`] backed by Hickory.
#[derive(Clone)]
pub struct HickoryMailResolver {
    resolver: TokioResolver,
}

impl HickoryMailResolver {
    pub fn new(resolver: TokioResolver) -> Self {
        Self { resolver }
    }

    /// Resolver using the process-wide system configuration.
    pub fn system() -> Self {
        Self::new(DEFAULT_RESOLVER.clone())
    }
}

impl Default for HickoryMailResolver {
    fn default() -> Self {
        Self::system()
    }
}

#[async_trait]
impl MailResolver for HickoryMailResolver {
    async fn mx(&self, domain: &str) -> ToolboxResult<Vec<MxHost>> {
        let response = self.resolver.mx_lookup(domain).await.map_err(resolution_error)?;
        Ok(response
            .iter()
            .map(|mx| MxHost {
                host: mx.exchange().to_string().trim_end_matches('.').to_string(),
                preference: mx.preference(),
            })
            .collect())
    }

    async fn txt(&self, name: &str) -> ToolboxResult<Vec<String>> {
        let response = self.resolver.txt_lookup(name).await.map_err(resolution_error)?;
        Ok(response
            .iter()
            .map(|txt| {
                txt.iter()
                    .map(|data| String::from_utf8_lossy(data).to_string())
                    .collect::<String>()
            })
            .collect())
    }

    async fn ipv4(&self, host: &str) -> ToolboxResult<Vec<Ipv4Addr>> {
        let response = self.resolver.ipv4_lookup(host).await.map_err(resolution_error)?;
        Ok(response.iter().map(|a| a.0).collect())
    }

    async fn ptr(&self, name: &str) -> ToolboxResult<Vec<String>> {
        let response = self
            .resolver
            .lookup(name, RecordType::PTR)
            .await
            .map_err(resolution_error)?;
        Ok(response
            .record_iter()
            .filter_map(|record| record.data().as_ptr())
            .map(|ptr| ptr.0.to_string().trim_end_matches('.').to_string())
            .collect())
    }
}
