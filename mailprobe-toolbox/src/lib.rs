//! Mail domain diagnostics for mailprobe
//!
//! 提供邮件基础设施检查：MX、SPF、DKIM、DMARC、端口连通性、SMTPS TLS、DNSBL、PTR。
//! 每个探测都是无状态的单次请求，互不依赖。

mod error;
mod services;
mod types;

pub use error::{ToolboxError, ToolboxResult};
pub use services::{
    validate_domain, Dialer, HickoryMailResolver, MailResolver, ProbeService, ProbeTimeouts,
    TcpDialer, DEFAULT_DKIM_SELECTOR, DNSBL_ZONES, MAIL_PORTS,
};
pub use types::{
    DkimSelectorResult, DnsblReport, MxHost, PortStatus, ProbeResponse, PtrReport, SpfAnalysis,
    SpfPolicy, TlsReport,
};
