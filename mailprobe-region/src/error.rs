//! Region classification errors.

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum RegionError {
    /// Configured database file does not exist.
    #[error("GeoIP database not found: {0}")]
    DatabaseNotFound(String),

    /// Database could not be opened or read.
    #[error("GeoIP database error: {0}")]
    Database(String),

    /// The database has no entry for the address.
    #[error("IP address not found")]
    AddressNotFound,

    /// Input is not an IPv4/IPv6 address.
    #[error("invalid IP address: {0}")]
    InvalidAddress(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type RegionResult<T> = std::result::Result<T, RegionError>;
