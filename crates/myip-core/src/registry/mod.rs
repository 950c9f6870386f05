//! Plugin-based provider registry
//!
//! The registry allows geolocation providers, IP echo sources and
//! reputation providers to be registered dynamically at runtime, so the
//! waterfall order is pure configuration rather than hard-coded if-else.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use myip_core::registry::ProviderRegistry;
//! use myip_core::config::GeoProviderConfig;
//!
//! let registry = ProviderRegistry::new();
//! myip_provider_geo::register(&registry);
//!
//! let config = GeoProviderConfig::IpApi { base_url: None };
//! let provider = registry.create_geo_provider(&config, Duration::from_secs(5))?;
//! ```
//!
//! ## Registration
//!
//! Provider crates expose a `register()` function:
//!
//! ```rust,ignore
//! pub fn register(registry: &ProviderRegistry) {
//!     registry.register_geo_provider("ipapi", Box::new(IpApiFactory));
//! }
//! ```

use crate::config::{GeoProviderConfig, IpEchoConfig, ReputationProviderConfig};
use crate::error::{Error, Result};
use crate::traits::{GeoProvider, IpEcho, ReputationProvider};
use crate::traits::{GeoProviderFactory, IpEchoFactory, ReputationProviderFactory};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

type FactoryMap<F> = RwLock<HashMap<String, Box<F>>>;

/// Provider registry for plugin-based provider creation
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct ProviderRegistry {
    /// Registered geolocation provider factories
    geo_providers: FactoryMap<dyn GeoProviderFactory>,

    /// Registered IP echo factories
    ip_echoes: FactoryMap<dyn IpEchoFactory>,

    /// Registered reputation provider factories
    reputation_providers: FactoryMap<dyn ReputationProviderFactory>,
}

// Registration happens once at startup; a poisoned lock still holds a
// consistent map because every write is a single insert.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a geolocation provider factory
    ///
    /// # Parameters
    ///
    /// - `name`: Provider type name (e.g., "ipapi", "ipwhois")
    /// - `factory`: Factory object for creating provider instances
    pub fn register_geo_provider(
        &self,
        name: impl Into<String>,
        factory: Box<dyn GeoProviderFactory>,
    ) {
        write(&self.geo_providers).insert(name.into(), factory);
    }

    /// Register an IP echo factory
    pub fn register_ip_echo(&self, name: impl Into<String>, factory: Box<dyn IpEchoFactory>) {
        write(&self.ip_echoes).insert(name.into(), factory);
    }

    /// Register a reputation provider factory
    pub fn register_reputation_provider(
        &self,
        name: impl Into<String>,
        factory: Box<dyn ReputationProviderFactory>,
    ) {
        write(&self.reputation_providers).insert(name.into(), factory);
    }

    /// Create a geolocation provider from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn GeoProvider>)`: Created provider instance
    /// - `Err(Error)`: If provider type is not registered or creation fails
    pub fn create_geo_provider(
        &self,
        config: &GeoProviderConfig,
        timeout: Duration,
    ) -> Result<Box<dyn GeoProvider>> {
        let provider_type = config.type_name();
        let providers = read(&self.geo_providers);

        let factory = providers.get(provider_type).ok_or_else(|| {
            Error::config(format!("Unknown geolocation provider type: {}", provider_type))
        })?;

        factory.create(config, timeout)
    }

    /// Create an IP echo source from configuration
    pub fn create_ip_echo(&self, config: &IpEchoConfig, timeout: Duration) -> Result<Box<dyn IpEcho>> {
        let echo_type = config.type_name();
        let echoes = read(&self.ip_echoes);

        let factory = echoes
            .get(echo_type)
            .ok_or_else(|| Error::config(format!("Unknown IP echo type: {}", echo_type)))?;

        factory.create(config, timeout)
    }

    /// Create a reputation provider from configuration
    pub fn create_reputation_provider(
        &self,
        config: &ReputationProviderConfig,
        timeout: Duration,
    ) -> Result<Box<dyn ReputationProvider>> {
        let provider_type = config.type_name();
        let providers = read(&self.reputation_providers);

        let factory = providers.get(provider_type).ok_or_else(|| {
            Error::config(format!("Unknown reputation provider type: {}", provider_type))
        })?;

        factory.create(config, timeout)
    }

    /// Build the geolocation waterfall, in configured order
    ///
    /// Providers whose creation fails are skipped with a warning; an empty
    /// result is an error.
    pub fn create_waterfall(
        &self,
        configs: &[GeoProviderConfig],
        timeout: Duration,
    ) -> Result<Vec<Box<dyn GeoProvider>>> {
        let mut providers = Vec::with_capacity(configs.len());

        for config in configs {
            match self.create_geo_provider(config, timeout) {
                Ok(provider) => providers.push(provider),
                Err(e) => {
                    tracing::warn!("Skipping geolocation provider {}: {}", config.type_name(), e);
                }
            }
        }

        if providers.is_empty() {
            return Err(Error::config("No usable geolocation providers"));
        }

        Ok(providers)
    }

    /// List all registered geolocation provider types
    pub fn list_geo_providers(&self) -> Vec<String> {
        read(&self.geo_providers).keys().cloned().collect()
    }

    /// List all registered IP echo types
    pub fn list_ip_echoes(&self) -> Vec<String> {
        read(&self.ip_echoes).keys().cloned().collect()
    }

    /// List all registered reputation provider types
    pub fn list_reputation_providers(&self) -> Vec<String> {
        read(&self.reputation_providers).keys().cloned().collect()
    }

    /// Check if a geolocation provider type is registered
    pub fn has_geo_provider(&self, name: &str) -> bool {
        read(&self.geo_providers).contains_key(name)
    }

    /// Check if an IP echo type is registered
    pub fn has_ip_echo(&self, name: &str) -> bool {
        read(&self.ip_echoes).contains_key(name)
    }

    /// Check if a reputation provider type is registered
    pub fn has_reputation_provider(&self, name: &str) -> bool {
        read(&self.reputation_providers).contains_key(name)
    }
}
