//! Reverse DNS for the target's forward address.

use std::net::Ipv4Addr;
use std::time::Duration;

use super::resolver::{forward_ipv4, MailResolver};
use crate::error::{ToolboxError, ToolboxResult};
use crate::types::PtrReport;

/// `a.b.c.d` → `d.c.b.a`
pub(crate) fn reversed_octets(ip: Ipv4Addr) -> String {
    let [a, b, c, d] = ip.octets();
    format!("{d}.{c}.{b}.{a}")
}

/// Standard `in-addr.arpa` name for `ip`.
pub(crate) fn reverse_pointer_name(ip: Ipv4Addr) -> String {
    format!("{}.in-addr.arpa.", reversed_octets(ip))
}

/// Resolve the target's A record, then the PTR of that address.
pub async fn ptr_lookup(
    resolver: &dyn MailResolver,
    target: &str,
    forward_deadline: Duration,
) -> ToolboxResult<PtrReport> {
    let ip = forward_ipv4(resolver, target, forward_deadline).await?;
    let name = reverse_pointer_name(ip);
    let ptr = resolver
        .ptr(&name)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ToolboxError::ResolutionError(format!("no PTR record found for {name}")))?;

    Ok(PtrReport {
        ip: ip.to_string(),
        ptr: ptr.trim_end_matches('.').to_string(),
    })
}
