//! Minimal SMTP client: greeting, `EHLO`, capability scan.

use std::time::Duration;

use log::trace;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::error::{ToolboxError, ToolboxResult};

/// Submission port probed for STARTTLS.
pub const SUBMISSION_PORT: u16 = 587;

const EHLO_NAME: &str = "mailprobe.invalid";
const MAX_REPLY_LINES: usize = 128;
/// RFC 5321 caps reply lines at 512 octets; allow some slack.
const MAX_LINE_BYTES: u64 = 1024;

fn connectivity(e: impl std::fmt::Display) -> ToolboxError {
    ToolboxError::ConnectivityError(e.to_string())
}

/// Read one (possibly multi-line) SMTP reply: status code plus the text of each line.
async fn read_reply<R: AsyncBufRead + Unpin>(reader: &mut R) -> ToolboxResult<(u16, Vec<String>)> {
    let mut lines = Vec::new();
    loop {
        let mut raw = String::new();
        let read = (&mut *reader)
            .take(MAX_LINE_BYTES)
            .read_line(&mut raw)
            .await
            .map_err(connectivity)?;
        if read == 0 {
            return Err(ToolboxError::ConnectivityError(
                "connection closed by server".to_string(),
            ));
        }
        if !raw.ends_with('\n') && read as u64 >= MAX_LINE_BYTES {
            return Err(ToolboxError::ConnectivityError(
                "SMTP reply line too long".to_string(),
            ));
        }
        let line = raw.trim_end_matches(['\r', '\n']);
        let code = line
            .get(..3)
            .and_then(|c| c.parse::<u16>().ok())
            .ok_or_else(|| ToolboxError::ConnectivityError(format!("malformed SMTP reply: {line}")))?;
        let more = line.as_bytes().get(3) == Some(&b'-');
        lines.push(line.get(4..).unwrap_or_default().to_string());

        if !more {
            return Ok((code, lines));
        }
        if lines.len() >= MAX_REPLY_LINES {
            return Err(ToolboxError::ConnectivityError(
                "SMTP reply too long".to_string(),
            ));
        }
    }
}

/// Whether an `EHLO` reply lists the `STARTTLS` extension.
pub(crate) fn advertises_starttls(lines: &[String]) -> bool {
    lines.iter().any(|line| {
        line.split_whitespace()
            .next()
            .is_some_and(|keyword| keyword.eq_ignore_ascii_case("STARTTLS"))
    })
}

/// Connect to `host:port`, greet with `EHLO` and report whether STARTTLS is offered.
pub async fn starttls_offered(host: &str, port: u16, deadline: Duration) -> ToolboxResult<bool> {
    timeout(deadline, async {
        let stream = TcpStream::connect((host, port)).await.map_err(connectivity)?;
        let (read_half, mut write_half) = stream.into_split();
        let mut reader = BufReader::new(read_half);

        let (code, _) = read_reply(&mut reader).await?;
        if code != 220 {
            return Err(ToolboxError::ConnectivityError(format!(
                "unexpected SMTP greeting code {code}"
            )));
        }

        write_half
            .write_all(format!("EHLO {EHLO_NAME}\r\n").as_bytes())
            .await
            .map_err(connectivity)?;
        let (code, capabilities) = read_reply(&mut reader).await?;
        trace!("[SMTP] {host}:{port} EHLO -> {code} {capabilities:?}");

        let _ = write_half.write_all(b"QUIT\r\n").await;

        if code != 250 {
            return Err(ToolboxError::ConnectivityError(format!(
                "EHLO rejected with code {code}"
            )));
        }
        Ok(advertises_starttls(&capabilities))
    })
    .await
    .map_err(|_| ToolboxError::Timeout(format!("SMTP session with {host}:{port}")))?
}
