//! TCP connect backend for the port probe.

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Opens (and immediately drops) a TCP connection.
#[async_trait]
pub trait Dialer: Send + Sync {
    async fn connect(&self, host: &str, port: u16, deadline: Duration) -> io::Result<()>;
}

/// [`Dialer`] using `tokio::net::TcpStream`; name resolution counts against the deadline.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpDialer;

#[async_trait]
impl Dialer for TcpDialer {
    async fn connect(&self, host: &str, port: u16, deadline: Duration) -> io::Result<()> {
        match timeout(deadline, TcpStream::connect((host, port))).await {
            Ok(Ok(_stream)) => Ok(()),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "timed out")),
        }
    }
}
