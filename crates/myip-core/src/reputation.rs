//! Reputation (VPN / proxy / Tor) lookups
//!
//! Single provider, no fallback chain. Results are cached per address for
//! the configured TTL. A failed lookup yields [`ReputationRecord::failed`]
//! and is never cached; unlike [`crate::IpResolver`], stale data is not
//! served on failure.

use crate::address::ClientContext;
use crate::cache::KeyedCache;
use crate::config::ReputationConfig;
use crate::record::ReputationRecord;
use crate::traits::ReputationProvider;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Cached reputation lookups over one [`ReputationProvider`]
pub struct ReputationService {
    provider: Box<dyn ReputationProvider>,
    cache: KeyedCache<ReputationRecord>,
    provider_timeout: Duration,
}

impl ReputationService {
    /// Create a new reputation service
    pub fn new(provider: Box<dyn ReputationProvider>, config: &ReputationConfig) -> Self {
        Self {
            provider,
            cache: KeyedCache::new(config.ttl(), config.capacity),
            provider_timeout: config.provider_timeout(),
        }
    }

    /// Name of the backing provider
    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }

    /// Look up `address`, serving a fresh cached result when available
    ///
    /// Always returns a record; check [`ReputationRecord::success`].
    pub async fn lookup(&self, address: &str, context: &ClientContext) -> ReputationRecord {
        if let Some(record) = self.cache.get(address).await {
            debug!("Using cached reputation data for {}", address);
            return record;
        }

        let name = self.provider.provider_name();
        let call = self.provider.lookup(address, context);

        match tokio::time::timeout(self.provider_timeout, call).await {
            Ok(Ok(record)) => {
                info!(
                    "Reputation for {} via {}: fraud_score={} anonymized={}",
                    address,
                    name,
                    record.fraud_score,
                    record.is_anonymized()
                );
                self.cache.insert(address, record.clone()).await;
                record
            }
            Ok(Err(e)) => {
                warn!("Reputation provider {} failed for {}: {}", name, address, e);
                ReputationRecord::failed()
            }
            Err(_) => {
                warn!(
                    "Reputation provider {} timed out after {:?} for {}",
                    name, self.provider_timeout, address
                );
                ReputationRecord::failed()
            }
        }
    }
}
