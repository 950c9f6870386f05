//! Core traits for the MyIP service
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`IpEcho`]: Discover the caller's public address from an external service
//! - [`GeoProvider`]: Geolocation lookups, chained into a waterfall
//! - [`ReputationProvider`]: VPN/proxy/fraud lookups
//! - [`NetworkProbe`]: Ping and traceroute
//! - [`BlacklistChecker`]: DNSBL listing checks

pub mod blacklist;
pub mod geo_provider;
pub mod ip_echo;
pub mod probe;
pub mod reputation_provider;

pub use blacklist::BlacklistChecker;
pub use geo_provider::{GeoProvider, GeoProviderFactory};
pub use ip_echo::{IpEcho, IpEchoFactory};
pub use probe::NetworkProbe;
pub use reputation_provider::{ReputationProvider, ReputationProviderFactory};
