//! In-memory backends for probe tests.

use std::collections::{HashMap, HashSet};
use std::io;
use std::net::Ipv4Addr;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::dialer::Dialer;
use super::resolver::MailResolver;
use crate::error::{ToolboxError, ToolboxResult};
use crate::types::MxHost;

fn nxdomain(name: &str) -> ToolboxError {
    ToolboxError::ResolutionError(format!("no record found for {name}"))
}

/// Resolver answering from fixed tables; unknown names fail like NXDOMAIN.
#[derive(Default)]
pub struct MockResolver {
    mx: HashMap<String, Vec<MxHost>>,
    txt: HashMap<String, Vec<String>>,
    a: HashMap<String, Vec<Ipv4Addr>>,
    ptr: HashMap<String, Vec<String>>,
    queries: Mutex<Vec<String>>,
}

impl MockResolver {
    pub fn with_mx(mut self, domain: &str, hosts: &[(&str, u16)]) -> Self {
        self.mx.insert(
            domain.to_string(),
            hosts
                .iter()
                .map(|(host, preference)| MxHost {
                    host: (*host).to_string(),
                    preference: *preference,
                })
                .collect(),
        );
        self
    }

    pub fn with_txt(mut self, name: &str, records: &[&str]) -> Self {
        self.txt.insert(
            name.to_string(),
            records.iter().map(|r| (*r).to_string()).collect(),
        );
        self
    }

    pub fn with_a(mut self, host: &str, addrs: &[Ipv4Addr]) -> Self {
        self.a.insert(host.to_string(), addrs.to_vec());
        self
    }

    pub fn with_ptr(mut self, name: &str, targets: &[&str]) -> Self {
        self.ptr.insert(
            name.to_string(),
            targets.iter().map(|t| (*t).to_string()).collect(),
        );
        self
    }

    /// Names queried so far, in call order.
    #[allow(clippy::unwrap_used)]
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    #[allow(clippy::unwrap_used)]
    fn record(&self, name: &str) {
        self.queries.lock().unwrap().push(name.to_string());
    }
}

#[async_trait]
impl MailResolver for MockResolver {
    async fn mx(&self, domain: &str) -> ToolboxResult<Vec<MxHost>> {
        self.record(domain);
        self.mx.get(domain).cloned().ok_or_else(|| nxdomain(domain))
    }

    async fn txt(&self, name: &str) -> ToolboxResult<Vec<String>> {
        self.record(name);
        self.txt.get(name).cloned().ok_or_else(|| nxdomain(name))
    }

    async fn ipv4(&self, host: &str) -> ToolboxResult<Vec<Ipv4Addr>> {
        self.record(host);
        self.a.get(host).cloned().ok_or_else(|| nxdomain(host))
    }

    async fn ptr(&self, name: &str) -> ToolboxResult<Vec<String>> {
        self.record(name);
        self.ptr.get(name).cloned().ok_or_else(|| nxdomain(name))
    }
}

/// Dialer that succeeds only for the listed ports.
#[derive(Default)]
pub struct MockDialer {
    open: HashSet<u16>,
}

impl MockDialer {
    pub fn with_open(ports: &[u16]) -> Self {
        Self {
            open: ports.iter().copied().collect(),
        }
    }
}

#[async_trait]
impl Dialer for MockDialer {
    async fn connect(&self, _host: &str, port: u16, _deadline: Duration) -> io::Result<()> {
        if self.open.contains(&port) {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "Connection refused (os error 111)",
            ))
        }
    }
}
