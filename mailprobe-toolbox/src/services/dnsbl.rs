//! DNS blocklist lookups.

use std::time::Duration;

use futures::future::join_all;
use log::debug;

use super::ptr::reversed_octets;
use super::resolver::{forward_ipv4, MailResolver};
use crate::error::ToolboxResult;
use crate::types::DnsblReport;

/// Blocklist zones queried for every target.
pub const DNSBL_ZONES: [&str; 4] = [
    "zen.spamhaus.org",
    "bl.spamcop.net",
    "dnsbl.sorbs.net",
    "b.barracudacentral.org",
];

/// Check the target's forward IPv4 address against [`DNSBL_ZONES`].
///
/// An A answer at `<reversed-octets>.<zone>` counts as listed. Any failure,
/// NXDOMAIN or a resolver error alike, counts as not listed.
pub async fn dnsbl_check(
    resolver: &dyn MailResolver,
    target: &str,
    forward_deadline: Duration,
) -> ToolboxResult<DnsblReport> {
    let ip = forward_ipv4(resolver, target, forward_deadline).await?;
    let reversed = reversed_octets(ip);

    let futures = DNSBL_ZONES.iter().map(|zone| {
        let query = format!("{reversed}.{zone}");
        async move {
            match resolver.ipv4(&query).await {
                Ok(addrs) if !addrs.is_empty() => {
                    debug!("[DNSBL] {ip} listed on {zone}");
                    true
                }
                Ok(_) => false,
                Err(e) => {
                    debug!("[DNSBL] {query}: {e}");
                    false
                }
            }
        }
    });
    let hits = join_all(futures).await;

    let listed_on: Vec<String> = DNSBL_ZONES
        .iter()
        .zip(hits)
        .filter(|(_, listed)| *listed)
        .map(|(zone, _)| (*zone).to_string())
        .collect();

    Ok(DnsblReport {
        checked: DNSBL_ZONES.len(),
        listed: listed_on.len(),
        listed_on,
    })
}
