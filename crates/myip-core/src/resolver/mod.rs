//! IP-info resolution
//!
//! The IpResolver is responsible for:
//! - Serving a fresh cached record without touching any upstream
//! - Discovering the caller's address (proxy headers, else the echo service)
//! - Walking the geolocation waterfall until one provider succeeds
//! - Degrading to the last cached record, or the placeholder, on total failure
//!
//! ## Architecture
//!
//! ```text
//!                    ┌──────────────┐
//!  ClientContext ───▶│  IpResolver  │───▶ Resolution
//!                    └──────────────┘
//!                            │
//!         ┌──────────────────┼──────────────────────┐
//!         │                  │                      │
//!         ▼                  ▼                      ▼
//! ┌─────────────┐   ┌─────────────────┐    ┌──────────────┐
//! │ RecordSlot  │   │     IpEcho      │    │ GeoProvider  │ × N
//! │ (check/put) │   │ (no header ip)  │    │ (in order)   │
//! └─────────────┘   └─────────────────┘    └──────────────┘
//! ```
//!
//! ## Flow
//!
//! 1. Fresh cache hit → return it
//! 2. Address from `X-Forwarded-For` / `X-Real-IP`, else `IpEcho::discover()`
//! 3. Providers are tried one at a time, in order, each bounded by a timeout
//! 4. First success overwrites the cache and is returned
//! 5. Nothing succeeded → stale cache if any, else [`IpRecord::placeholder`]

use crate::address::ClientContext;
use crate::cache::RecordSlot;
use crate::config::ResolverConfig;
use crate::error::{Error, Result};
use crate::record::IpRecord;
use crate::traits::{GeoProvider, IpEcho};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Where a resolved record came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionSource {
    /// Fresh cache hit, no upstream contacted
    Cache,
    /// Fetched from the named provider
    Provider(&'static str),
    /// Every upstream failed; last cached record served regardless of age
    Stale,
    /// Every upstream failed and nothing was cached
    Placeholder,
}

/// Outcome of [`IpResolver::resolve`]
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub record: IpRecord,
    pub source: ResolutionSource,
}

/// Core IP-info resolver
///
/// Owns its cache; construct once at startup and share behind an `Arc`.
pub struct IpResolver {
    /// External address discovery
    echo: Box<dyn IpEcho>,

    /// Geolocation providers, in waterfall order
    providers: Vec<Box<dyn GeoProvider>>,

    /// Single-slot record cache
    cache: RecordSlot,

    /// Age below which the cache short-circuits resolution
    freshness: Duration,

    /// Upper bound on each upstream call
    provider_timeout: Duration,
}

impl IpResolver {
    /// Create a new resolver
    ///
    /// # Parameters
    ///
    /// - `echo`: Address discovery used when no proxy header is present
    /// - `providers`: Geolocation providers, tried in the given order
    /// - `config`: Freshness window and per-provider timeout
    ///
    /// # Returns
    ///
    /// - `Err(Error::Config)` if `providers` is empty
    pub fn new(
        echo: Box<dyn IpEcho>,
        providers: Vec<Box<dyn GeoProvider>>,
        config: &ResolverConfig,
    ) -> Result<Self> {
        if providers.is_empty() {
            return Err(Error::config("At least one geolocation provider is required"));
        }

        Ok(Self {
            echo,
            providers,
            cache: RecordSlot::new(),
            freshness: config.freshness(),
            provider_timeout: config.provider_timeout(),
        })
    }

    /// Names of the configured providers, in waterfall order
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.provider_name()).collect()
    }

    /// Resolve the caller's address into a normalized record
    ///
    /// Never fails: total upstream failure degrades to cached or
    /// placeholder data, reported through [`Resolution::source`].
    pub async fn resolve(&self, context: &ClientContext) -> Resolution {
        if let Some(record) = self.cache.fresh(self.freshness).await {
            debug!("Serving cached record for {}", record.ip);
            return Resolution {
                record,
                source: ResolutionSource::Cache,
            };
        }

        match self.fetch(context).await {
            Ok((record, provider)) => {
                info!("Resolved {} via {}", record.ip, provider);
                self.cache.store(record.clone()).await;
                Resolution {
                    record,
                    source: ResolutionSource::Provider(provider),
                }
            }
            Err(e) => {
                warn!("IP resolution failed: {}", e);
                match self.cache.last().await {
                    Some(record) => {
                        info!("Serving stale cached record for {}", record.ip);
                        Resolution {
                            record,
                            source: ResolutionSource::Stale,
                        }
                    }
                    None => {
                        info!("No cached record, serving placeholder");
                        Resolution {
                            record: IpRecord::placeholder(),
                            source: ResolutionSource::Placeholder,
                        }
                    }
                }
            }
        }
    }

    /// Discover the address, then walk the waterfall
    async fn fetch(&self, context: &ClientContext) -> Result<(IpRecord, &'static str)> {
        let address = match context.client_address() {
            Some(address) => {
                debug!("Using address from headers: {}", address);
                address
            }
            None => {
                let address = self.bounded("echo", self.echo.discover()).await?;
                debug!("Using address from echo service: {}", address);
                address
            }
        };

        for provider in &self.providers {
            let name = provider.provider_name();
            match self.bounded(name, provider.lookup(&address)).await {
                Ok(record) => return Ok((record, name)),
                Err(e) => {
                    warn!("Provider {} unavailable: {}", name, e);
                }
            }
        }

        Err(Error::Other(format!(
            "All {} geolocation providers failed for {}",
            self.providers.len(),
            address
        )))
    }

    /// Run an upstream call under the per-provider timeout
    async fn bounded<T>(
        &self,
        name: &str,
        call: impl std::future::Future<Output = Result<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.provider_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(Error::timeout(format!(
                "{} did not answer within {:?}",
                name, self.provider_timeout
            ))),
        }
    }
}
