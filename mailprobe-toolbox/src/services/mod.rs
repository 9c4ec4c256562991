//! Probe façade exposing every mail diagnostic.
//!
//! [`ProbeService`] owns nothing but its backends, so it is cheap to clone and
//! safe to call concurrently; no probe depends on another's result.

mod dialer;
mod dnsbl;
mod ports;
mod ptr;
mod records;
mod resolver;
mod smtp;
#[cfg(feature = "rustls")]
mod tls;

#[cfg(test)]
mod test_support;

use std::sync::Arc;
use std::time::Duration;

use idna::uts46::{AsciiDenyList, DnsLength, Hyphens, Uts46};

pub use dialer::{Dialer, TcpDialer};
pub use dnsbl::DNSBL_ZONES;
pub use ports::MAIL_PORTS;
pub use records::DEFAULT_DKIM_SELECTOR;
pub use resolver::{HickoryMailResolver, MailResolver};

use crate::error::{ToolboxError, ToolboxResult};
use crate::types::{
    DkimSelectorResult, DnsblReport, MxHost, PortStatus, PtrReport, SpfAnalysis,
};
#[cfg(feature = "rustls")]
use crate::types::TlsReport;

/// ASCII rejected in a target name: controls, space and punctuation other
/// than `-`, `.` and `_` (`_spf`, `_dmarc` and `_domainkey` labels are valid).
const DNS_NAME_DENY_LIST: AsciiDenyList =
    AsciiDenyList::new(true, "!\"#$%&'()*+,/:;<=>?@[\\]^`{|}~");

/// Validate and normalise a domain name or IP address input.
///
/// Trims whitespace, passes through valid IP addresses unchanged, converts
/// internationalised domain names (IDN) to ASCII via UTS 46, and rejects
/// empty or overlong inputs. Underscore labels are accepted.
pub fn validate_domain(domain: &str) -> ToolboxResult<String> {
    let domain = domain.trim();
    if domain.is_empty() {
        return Err(ToolboxError::ValidationError(
            "Domain name is required".to_string(),
        ));
    }
    // If it's a valid IP address, pass through without IDNA processing.
    if domain.parse::<std::net::IpAddr>().is_ok() {
        return Ok(domain.to_string());
    }
    let ascii_domain = Uts46::new()
        .to_ascii(
            domain.as_bytes(),
            DNS_NAME_DENY_LIST,
            Hyphens::Allow,
            DnsLength::Ignore,
        )
        .map_err(|_| ToolboxError::ValidationError(format!("Invalid domain name: {domain}")))?
        .into_owned();
    if ascii_domain.len() > 253 {
        return Err(ToolboxError::ValidationError(format!(
            "Domain name exceeds maximum length of 253 characters (got {})",
            ascii_domain.len()
        )));
    }
    Ok(ascii_domain)
}

/// Per-step network deadlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeTimeouts {
    /// TCP connect per mail port.
    pub port_connect: Duration,
    /// TCP connect and TLS handshake on port 465.
    pub tls: Duration,
    /// Forward A lookup before DNSBL / PTR queries.
    pub forward_lookup: Duration,
    /// Whole SMTP EHLO session used for the STARTTLS flag.
    pub smtp_session: Duration,
}

impl Default for ProbeTimeouts {
    fn default() -> Self {
        Self {
            port_connect: Duration::from_secs(2),
            tls: Duration::from_secs(3),
            forward_lookup: Duration::from_secs(3),
            smtp_session: Duration::from_secs(3),
        }
    }
}

/// Entry point for all mail diagnostics.
///
/// ```rust,no_run
/// use mailprobe_toolbox::ProbeService;
/// # async fn demo() -> mailprobe_toolbox::ToolboxResult<()> {
/// let probes = ProbeService::new();
/// let mx = probes.mx("example.com").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ProbeService {
    resolver: Arc<dyn MailResolver>,
    dialer: Arc<dyn Dialer>,
    timeouts: ProbeTimeouts,
}

impl Default for ProbeService {
    fn default() -> Self {
        Self::new()
    }
}

impl ProbeService {
    /// Probes on the system DNS configuration and plain TCP.
    pub fn new() -> Self {
        Self::with_backends(
            Arc::new(HickoryMailResolver::system()),
            Arc::new(TcpDialer),
            ProbeTimeouts::default(),
        )
    }

    pub fn with_backends(
        resolver: Arc<dyn MailResolver>,
        dialer: Arc<dyn Dialer>,
        timeouts: ProbeTimeouts,
    ) -> Self {
        Self {
            resolver,
            dialer,
            timeouts,
        }
    }

    pub fn timeouts(&self) -> ProbeTimeouts {
        self.timeouts
    }

    /// MX records in DNS answer order.
    pub async fn mx(&self, target: &str) -> ToolboxResult<Vec<MxHost>> {
        let domain = validate_domain(target)?;
        records::mx_lookup(self.resolver.as_ref(), &domain).await
    }

    /// The `v=spf1` TXT record with its include count and `all` policy.
    pub async fn spf(&self, target: &str) -> ToolboxResult<SpfAnalysis> {
        let domain = validate_domain(target)?;
        records::spf_check(self.resolver.as_ref(), &domain).await
    }

    /// DKIM key records per selector; `None` probes [`DEFAULT_DKIM_SELECTOR`].
    ///
    /// Only target validation can fail the call; selector failures are
    /// reported inside the returned list.
    pub async fn dkim(
        &self,
        target: &str,
        selectors: Option<&[String]>,
    ) -> ToolboxResult<Vec<DkimSelectorResult>> {
        let domain = validate_domain(target)?;
        let default_selectors = [DEFAULT_DKIM_SELECTOR.to_string()];
        let selectors = selectors.unwrap_or(&default_selectors[..]);
        Ok(records::dkim_lookup(self.resolver.as_ref(), &domain, selectors).await)
    }

    /// First DMARC record at `_dmarc.<domain>`.
    pub async fn dmarc(&self, target: &str) -> ToolboxResult<String> {
        let domain = validate_domain(target)?;
        records::dmarc_lookup(self.resolver.as_ref(), &domain).await
    }

    /// Reachability of the seven mail ports, in [`MAIL_PORTS`] order.
    pub async fn ports(&self, host: &str) -> ToolboxResult<Vec<PortStatus>> {
        let host = validate_domain(host)?;
        Ok(ports::port_check(self.dialer.as_ref(), &host, self.timeouts.port_connect).await)
    }

    /// SMTPS handshake report for port 465.
    #[cfg(feature = "rustls")]
    pub async fn tls(&self, target: &str) -> ToolboxResult<TlsReport> {
        let domain = validate_domain(target)?;
        tls::tls_check(&domain, self.timeouts.tls, self.timeouts.smtp_session).await
    }

    /// Blocklist status of the target's forward IPv4 address.
    pub async fn dnsbl(&self, target: &str) -> ToolboxResult<DnsblReport> {
        let domain = validate_domain(target)?;
        dnsbl::dnsbl_check(self.resolver.as_ref(), &domain, self.timeouts.forward_lookup).await
    }

    /// PTR name of the target's forward IPv4 address.
    pub async fn ptr(&self, target: &str) -> ToolboxResult<PtrReport> {
        let domain = validate_domain(target)?;
        ptr::ptr_lookup(self.resolver.as_ref(), &domain, self.timeouts.forward_lookup).await
    }
}
