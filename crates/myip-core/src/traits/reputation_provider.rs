// # Reputation Provider Trait
//
// Defines the interface for IP reputation (VPN / proxy / Tor / bot / fraud
// score) upstreams.
//
// ## Implementations
//
// - IPQualityScore: `myip-provider-ipqs` crate

use async_trait::async_trait;

use crate::address::ClientContext;
use crate::record::ReputationRecord;

/// Trait for reputation provider implementations
///
/// Same contract as [`crate::GeoProvider`]: single-shot, no caching, every
/// failure mode collapses into `Err`.
#[async_trait]
pub trait ReputationProvider: Send + Sync {
    /// Look up reputation flags for `address`
    ///
    /// `context` carries the caller's user agent and language, which some
    /// providers use to refine bot detection.
    async fn lookup(
        &self,
        address: &str,
        context: &ClientContext,
    ) -> Result<ReputationRecord, crate::Error>;

    /// Get the provider name (e.g., "ipqualityscore")
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing reputation providers from configuration
pub trait ReputationProviderFactory: Send + Sync {
    /// Create a ReputationProvider instance from configuration
    fn create(
        &self,
        config: &crate::config::ReputationProviderConfig,
        timeout: std::time::Duration,
    ) -> Result<Box<dyn ReputationProvider>, crate::Error>;
}
