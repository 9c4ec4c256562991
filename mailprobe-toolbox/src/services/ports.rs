//! Mail port reachability.

use std::time::Duration;

use futures::future::join_all;
use log::trace;

use super::dialer::Dialer;
use crate::types::PortStatus;

/// SMTP, SMTPS, submission, IMAP, IMAPS, POP3, POP3S, in report order.
pub const MAIL_PORTS: [u16; 7] = [25, 465, 587, 143, 993, 110, 995];

/// Try a TCP connect to every mail port of `host`.
///
/// Ports are dialled concurrently but reported in [`MAIL_PORTS`] order.
pub async fn port_check(dialer: &dyn Dialer, host: &str, deadline: Duration) -> Vec<PortStatus> {
    let futures = MAIL_PORTS.iter().map(|&port| async move {
        match dialer.connect(host, port, deadline).await {
            Ok(()) => {
                trace!("[Ports] {host}:{port} reachable");
                PortStatus {
                    service: port.to_string(),
                    reachable: true,
                    note: None,
                }
            }
            Err(e) => {
                trace!("[Ports] {host}:{port} unreachable: {e}");
                PortStatus {
                    service: port.to_string(),
                    reachable: false,
                    note: Some(e.to_string()),
                }
            }
        }
    });
    join_all(futures).await
}
