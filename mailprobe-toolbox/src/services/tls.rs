//! SMTPS (implicit TLS) inspection module.
//!
//! Uses rustls for the handshake and x509-parser for the leaf certificate.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, trace, warn};
use rustls::crypto::CryptoProvider;
use rustls::{ClientConfig, ProtocolVersion, RootCertStore};
use rustls_pki_types::ServerName;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;
use x509_parser::prelude::*;

use super::smtp::{starttls_offered, SUBMISSION_PORT};
use crate::error::{ToolboxError, ToolboxResult};
use crate::types::TlsReport;

/// Implicit-TLS submission port.
pub const SMTPS_PORT: u16 = 465;

const UNKNOWN_CN: &str = "(unknown)";
const UNKNOWN_VERSION: &str = "unknown";

/// Cipher name fragments that mark a suite as weak.
const WEAK_SUITE_MARKERS: [&str; 6] = ["NULL", "EXPORT", "RC4", "3DES", "MD5", "CBC"];

/// Initialize the rustls `CryptoProvider` (once).
///
/// `install_default` returns `Err` only when a provider is already set.
fn ensure_crypto_provider() {
    let _ = CryptoProvider::install_default(rustls::crypto::ring::default_provider());
}

fn protocol_label(version: Option<ProtocolVersion>) -> String {
    match version {
        Some(ProtocolVersion::TLSv1_3) => "TLSv1.3".to_string(),
        Some(ProtocolVersion::TLSv1_2) => "TLSv1.2".to_string(),
        Some(other) => format!("{other:?}"),
        None => UNKNOWN_VERSION.to_string(),
    }
}

fn is_weak_suite(name: &str) -> bool {
    WEAK_SUITE_MARKERS.iter().any(|marker| name.contains(marker))
}

/// First subject commonName of a DER certificate, `"(unknown)"` when absent.
fn common_name(cert_der: &[u8]) -> String {
    X509Certificate::from_der(cert_der)
        .ok()
        .and_then(|(_, cert)| {
            cert.subject()
                .iter_common_name()
                .next()
                .and_then(|cn| cn.as_str().ok())
                .map(String::from)
        })
        .unwrap_or_else(|| UNKNOWN_CN.to_string())
}

/// What the handshake revealed about the server.
#[derive(Debug)]
struct SessionInfo {
    min_version: String,
    cipher_suite: String,
    weak_ciphers: u32,
    cert_cn: String,
}

/// Client config trusting the bundled webpki roots.
fn webpki_client_config() -> Arc<ClientConfig> {
    let mut root_store = RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    Arc::new(
        ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth(),
    )
}

/// TCP connect plus TLS handshake with `domain:port` (SNI = `domain`); both
/// steps are bounded by `connect_timeout`.
async fn handshake(
    domain: &str,
    port: u16,
    config: Arc<ClientConfig>,
    connect_timeout: Duration,
) -> ToolboxResult<SessionInfo> {
    let start_time = Instant::now();

    // 1. Establish TCP connection (with timeout)
    let stream = match timeout(connect_timeout, TcpStream::connect((domain, port))).await {
        Ok(Ok(s)) => s,
        Ok(Err(e)) => {
            warn!("[TLS] TCP connection failed: {e}");
            return Err(ToolboxError::ConnectivityError(e.to_string()));
        }
        Err(_) => {
            warn!("[TLS] TCP connection timeout ({connect_timeout:?})");
            return Err(ToolboxError::Timeout(format!("TCP connect to {domain}:{port}")));
        }
    };

    let server_name = ServerName::try_from(domain.to_string())
        .map_err(|_| ToolboxError::ValidationError(format!("Invalid domain name: {domain}")))?;

    // 2. TLS handshake (with timeout)
    let connector = TlsConnector::from(config);
    let tls_stream = match timeout(connect_timeout, connector.connect(server_name, stream)).await {
        Ok(Ok(s)) => s,
        Ok(Err(e)) => {
            warn!("[TLS] Handshake failed: {e}");
            return Err(ToolboxError::ConnectivityError(e.to_string()));
        }
        Err(_) => {
            warn!("[TLS] Handshake timeout ({connect_timeout:?})");
            return Err(ToolboxError::Timeout("TLS handshake".to_string()));
        }
    };
    trace!("[TLS] Handshake done in {:?}", start_time.elapsed());

    // 3. Inspect the session
    let (_, tls_conn) = tls_stream.get_ref();
    let cipher_suite = tls_conn
        .negotiated_cipher_suite()
        .map(|suite| format!("{:?}", suite.suite()))
        .unwrap_or_default();
    Ok(SessionInfo {
        min_version: protocol_label(tls_conn.protocol_version()),
        weak_ciphers: u32::from(is_weak_suite(&cipher_suite)),
        cipher_suite,
        cert_cn: tls_conn
            .peer_certificates()
            .and_then(|certs| certs.first())
            .map_or_else(|| UNKNOWN_CN.to_string(), |der| common_name(der.as_ref())),
    })
}

/// Handshake with `domain:465` (SNI = `domain`) and report protocol, cipher and CN.
///
/// `starttls` comes from a separate EHLO on the submission port; a failure
/// there only turns the flag off.
pub async fn tls_check(
    domain: &str,
    connect_timeout: Duration,
    smtp_timeout: Duration,
) -> ToolboxResult<TlsReport> {
    ensure_crypto_provider();

    debug!("[TLS] Starting check for {domain}:{SMTPS_PORT}");
    let start_time = Instant::now();
    let session = handshake(domain, SMTPS_PORT, webpki_client_config(), connect_timeout).await?;

    let starttls = match starttls_offered(domain, SUBMISSION_PORT, smtp_timeout).await {
        Ok(offered) => offered,
        Err(e) => {
            debug!("[TLS] STARTTLS probe on {domain}:{SUBMISSION_PORT} failed: {e}");
            false
        }
    };

    debug!(
        "[TLS] Check completed: {domain} - version={}, cn={}, starttls={starttls}, total_time={:?}",
        session.min_version,
        session.cert_cn,
        start_time.elapsed()
    );

    Ok(TlsReport {
        starttls,
        min_version: session.min_version,
        cert_cn: session.cert_cn,
        weak_ciphers: session.weak_ciphers,
        cipher_suite: session.cipher_suite,
    })
}
