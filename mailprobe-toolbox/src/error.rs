//! 统一错误类型定义

use serde::Serialize;
use thiserror::Error;

/// Probe error type.
///
/// Resolution and connectivity variants carry the underlying message verbatim;
/// callers pass that text straight through to clients.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum ToolboxError {
    /// 验证错误 (missing or malformed target)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// DNS query failure (NXDOMAIN, SERVFAIL, resolver timeout, ...)
    #[error("{0}")]
    ResolutionError(String),

    /// TCP connect or TLS handshake failure
    #[error("{0}")]
    ConnectivityError(String),

    /// The queried name exists but holds no usable record
    #[error("{0}")]
    RecordNotFound(String),

    /// A bounded network step ran out of time
    #[error("{0} timed out")]
    Timeout(String),
}

/// 工具箱 Result 类型别名
pub type ToolboxResult<T> = std::result::Result<T, ToolboxError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_error_is_passed_through_verbatim() {
        let err = ToolboxError::ResolutionError("no record found for example.com".to_string());
        assert_eq!(err.to_string(), "no record found for example.com");
    }

    #[test]
    fn test_timeout_message() {
        let err = ToolboxError::Timeout("TLS handshake".to_string());
        assert_eq!(err.to_string(), "TLS handshake timed out");
    }

    #[test]
    fn test_serialize_tagged() {
        let err = ToolboxError::ValidationError("Domain name is required".to_string());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "ValidationError");
        assert_eq!(json["details"], "Domain name is required");
    }
}
