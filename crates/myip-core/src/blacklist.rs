//! DNSBL listing checks
//!
//! - [`SimulatedBlacklist`]: deterministic fixture, the default
//! - [`DnsblChecker`]: real DNSBL queries through the system resolver

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};
use crate::traits::BlacklistChecker;

/// Zones checked by default
pub const DEFAULT_ZONES: &[&str] = &["zen.spamhaus.org", "bl.spamcop.net"];

const LISTED_MESSAGE: &str = "This IP address is listed on one or more blacklists.";
const NOT_LISTED_MESSAGE: &str = "This IP address is not listed on any known blacklists.";

/// Listing status for one address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlacklistResult {
    pub ip: String,
    pub is_listed: bool,
    pub listed_on: Vec<String>,
    pub message: String,
}

impl BlacklistResult {
    /// Build a result; `is_listed` and `message` follow from `listed_on`
    pub fn new(address: impl Into<String>, listed_on: Vec<String>) -> Self {
        let is_listed = !listed_on.is_empty();
        Self {
            ip: address.into(),
            is_listed,
            listed_on,
            message: if is_listed {
                LISTED_MESSAGE
            } else {
                NOT_LISTED_MESSAGE
            }
            .to_string(),
        }
    }
}

/// Fixture checker: an address ending in `.100` is listed on every zone
#[derive(Debug, Clone)]
pub struct SimulatedBlacklist {
    zones: Vec<String>,
}

impl SimulatedBlacklist {
    /// Create a fixture checker reporting the default zones
    pub fn new() -> Self {
        Self {
            zones: DEFAULT_ZONES.iter().map(|z| z.to_string()).collect(),
        }
    }
}

impl Default for SimulatedBlacklist {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlacklistChecker for SimulatedBlacklist {
    async fn check(&self, address: &str) -> Result<BlacklistResult> {
        let listed_on = if address.ends_with(".100") {
            self.zones.clone()
        } else {
            Vec::new()
        };
        Ok(BlacklistResult::new(address, listed_on))
    }
}

/// Real DNSBL checker (IPv4 only)
///
/// For `a.b.c.d` each zone is queried as `d.c.b.a.<zone>`; any A answer in
/// `127.0.0.0/8` outside `127.255.255.0/24` counts as listed. The
/// `127.255.255.x` range is how Spamhaus reports refused queries (e.g. via
/// public resolvers), so it is not treated as a listing.
#[derive(Debug, Clone)]
pub struct DnsblChecker {
    zones: Vec<String>,
    query_timeout: Duration,
}

impl DnsblChecker {
    /// Create a checker over the given zones
    pub fn new(zones: Vec<String>, query_timeout: Duration) -> Self {
        Self {
            zones,
            query_timeout,
        }
    }

    /// Create a checker over [`DEFAULT_ZONES`]
    pub fn with_default_zones(query_timeout: Duration) -> Self {
        Self::new(
            DEFAULT_ZONES.iter().map(|z| z.to_string()).collect(),
            query_timeout,
        )
    }

    /// DNSBL query name for `ip` under `zone`
    pub fn query_name(ip: Ipv4Addr, zone: &str) -> String {
        let [a, b, c, d] = ip.octets();
        format!("{}.{}.{}.{}.{}", d, c, b, a, zone)
    }

    async fn is_listed_on(&self, ip: Ipv4Addr, zone: &str) -> bool {
        let name = Self::query_name(ip, zone);
        let lookup = tokio::net::lookup_host((name.as_str(), 0));

        match tokio::time::timeout(self.query_timeout, lookup).await {
            Ok(Ok(addrs)) => addrs.map(|a| a.ip()).any(is_listing_answer),
            // NXDOMAIN surfaces as an I/O error: not listed
            Ok(Err(e)) => {
                debug!("DNSBL query {} returned no listing: {}", name, e);
                false
            }
            Err(_) => {
                debug!("DNSBL query {} timed out", name);
                false
            }
        }
    }
}

fn is_listing_answer(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            let [a, b, c, _] = v4.octets();
            a == 127 && !(b == 255 && c == 255)
        }
        IpAddr::V6(_) => false,
    }
}

#[async_trait]
impl BlacklistChecker for DnsblChecker {
    async fn check(&self, address: &str) -> Result<BlacklistResult> {
        let ip: Ipv4Addr = address.trim().parse().map_err(|_| {
            Error::invalid_input(format!(
                "DNSBL checks require an IPv4 address, got: {}",
                address
            ))
        })?;

        let mut listed_on = Vec::new();
        for zone in &self.zones {
            if self.is_listed_on(ip, zone).await {
                listed_on.push(zone.clone());
            }
        }

        Ok(BlacklistResult::new(address, listed_on))
    }
}
