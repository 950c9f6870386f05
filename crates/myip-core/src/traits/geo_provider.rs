// # Geolocation Provider Trait
//
// Defines the interface every geolocation upstream implements. The
// resolver holds an ordered list of these and walks it until one succeeds.
//
// ## Implementations
//
// - ipgeolocation.io, ipapi.co, ipwho.is: `myip-provider-geo` crate

use async_trait::async_trait;

use crate::record::IpRecord;

/// Trait for geolocation provider implementations
///
/// # Contract
///
/// - One upstream request per `lookup()` call, no internal retries
/// - Network failure, non-success HTTP status, malformed JSON and
///   provider-reported failures all return `Err`
/// - Missing fields in a successful response map to empty/zero defaults,
///   never to an error
/// - No caching: the resolver owns the cache
#[async_trait]
pub trait GeoProvider: Send + Sync {
    /// Look up geolocation data for `address`
    ///
    /// # Returns
    ///
    /// - `Ok(IpRecord)`: Normalized record, `ip` set to `address`
    /// - `Err(Error)`: Provider unavailable
    async fn lookup(&self, address: &str) -> Result<IpRecord, crate::Error>;

    /// Get the provider name (e.g., "ipapi", "ipwhois")
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing geolocation providers from configuration
pub trait GeoProviderFactory: Send + Sync {
    /// Create a GeoProvider instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Configuration specific to this provider type
    /// - `timeout`: Per-request HTTP timeout
    fn create(
        &self,
        config: &crate::config::GeoProviderConfig,
        timeout: std::time::Duration,
    ) -> Result<Box<dyn GeoProvider>, crate::Error>;
}
