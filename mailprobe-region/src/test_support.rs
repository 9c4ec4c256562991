use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::{RegionError, RegionResult};
use crate::source::CountryLookup;

/// In-memory country table that counts every query it answers.
#[derive(Default)]
pub struct StaticLookup {
    countries: HashMap<IpAddr, String>,
    delay: Option<Duration>,
    queries: AtomicUsize,
}

impl StaticLookup {
    pub fn new(entries: &[(&str, &str)]) -> Self {
        let countries = entries
            .iter()
            .filter_map(|(ip, code)| Some((ip.parse().ok()?, (*code).to_string())))
            .collect();
        Self {
            countries,
            ..Self::default()
        }
    }

    /// Sleep this long inside every query.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl CountryLookup for StaticLookup {
    fn country_of(&self, ip: IpAddr) -> RegionResult<Option<String>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.countries
            .get(&ip)
            .cloned()
            .map(Some)
            .ok_or(RegionError::AddressNotFound)
    }
}
