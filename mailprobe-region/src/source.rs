//! Country lookup port and its MaxMind adapter.

use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;

use log::debug;
use maxminddb::{geoip2, MaxMindDBError, Reader};

use crate::error::{RegionError, RegionResult};

/// Resolves an IP address to an ISO country code.
///
/// `Ok(None)` means the address is known but carries no country code.
pub trait CountryLookup: Send + Sync {
    fn country_of(&self, ip: IpAddr) -> RegionResult<Option<String>>;
}

impl<T: CountryLookup + ?Sized> CountryLookup for Arc<T> {
    fn country_of(&self, ip: IpAddr) -> RegionResult<Option<String>> {
        (**self).country_of(ip)
    }
}

/// Offline GeoLite2/GeoIP2 country database, loaded into memory once.
pub struct MaxMindCountryLookup {
    reader: Reader<Vec<u8>>,
}

impl MaxMindCountryLookup {
    /// Open `path`, failing fast when the file does not exist.
    pub fn open(path: &Path) -> RegionResult<Self> {
        if !path.exists() {
            return Err(RegionError::DatabaseNotFound(path.display().to_string()));
        }
        let reader = Reader::open_readfile(path).map_err(|e| RegionError::Database(e.to_string()))?;
        debug!(
            "[Region] Opened {} ({})",
            path.display(),
            reader.metadata.database_type
        );
        Ok(Self { reader })
    }
}

impl CountryLookup for MaxMindCountryLookup {
    fn country_of(&self, ip: IpAddr) -> RegionResult<Option<String>> {
        match self.reader.lookup::<geoip2::Country>(ip) {
            Ok(record) => Ok(record
                .country
                .and_then(|country| country.iso_code)
                .map(String::from)),
            Err(MaxMindDBError::AddressNotFoundError(_)) => Err(RegionError::AddressNotFound),
            Err(e) => Err(RegionError::Database(e.to_string())),
        }
    }
}
