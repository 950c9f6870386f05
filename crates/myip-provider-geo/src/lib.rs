// # Geolocation Providers
//
// This crate provides the three geolocation upstreams of the IP-info
// waterfall, in their default order:
//
// 1. [`IpGeolocationProvider`]: ipgeolocation.io (API key required)
// 2. [`IpApiProvider`]: ipapi.co
// 3. [`IpWhoisProvider`]: ipwho.is
//
// ## Architectural Constraints
//
// Providers are isolated, stateless and single-shot:
// - One HTTP request per `lookup()` call
// - No retry logic (the resolver walks the waterfall instead)
// - No caching (owned by the resolver)
// - Every failure mode maps to `Err`: network error, non-2xx status,
//   malformed JSON, and "soft" failures reported inside a 200 body
//
// ## Security Requirements
//
// - API keys NEVER appear in logs, errors or `Debug` output

/// Request plumbing shared with other JSON upstreams
pub mod http;
mod ipapi;
mod ipgeolocation;
mod ipwhois;

pub use ipapi::{IpApiFactory, IpApiProvider};
pub use ipgeolocation::{IpGeolocationFactory, IpGeolocationProvider};
pub use ipwhois::{IpWhoisFactory, IpWhoisProvider};

use myip_core::ProviderRegistry;

/// Register all geolocation providers with a registry
///
/// # Example
///
/// ```rust
/// use myip_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::new();
/// myip_provider_geo::register(&registry);
/// assert!(registry.has_geo_provider("ipapi"));
/// ```
pub fn register(registry: &ProviderRegistry) {
    registry.register_geo_provider("ipgeolocation", Box::new(IpGeolocationFactory));
    registry.register_geo_provider("ipapi", Box::new(IpApiFactory));
    registry.register_geo_provider("ipwhois", Box::new(IpWhoisFactory));
}
