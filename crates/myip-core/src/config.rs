//! Configuration types for the MyIP service
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// IP discovery + geolocation waterfall settings
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Reputation (VPN/proxy) lookup settings
    #[serde(default)]
    pub reputation: ReputationConfig,

    /// Which blacklist checker backs `/blacklist-check`
    #[serde(default)]
    pub blacklist: BlacklistMode,
}

impl ServiceConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self {
            resolver: ResolverConfig::default(),
            reputation: ReputationConfig::default(),
            blacklist: BlacklistMode::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.resolver.validate()?;
        self.reputation.validate()?;
        Ok(())
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Settings for the IP-info resolution flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Echo service used when no proxy header carries the address
    #[serde(default)]
    pub echo: IpEchoConfig,

    /// Geolocation providers, in waterfall order
    #[serde(default = "default_geo_providers")]
    pub providers: Vec<GeoProviderConfig>,

    /// Age below which the cached record is served without any upstream call
    #[serde(default = "default_freshness_secs")]
    pub freshness_secs: u64,

    /// Upper bound on each individual upstream call
    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,
}

impl ResolverConfig {
    /// Freshness window as a `Duration`
    pub fn freshness(&self) -> Duration {
        Duration::from_secs(self.freshness_secs)
    }

    /// Per-provider timeout as a `Duration`
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    /// Validate the resolver configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.providers.is_empty() {
            return Err(crate::Error::config("No geolocation providers configured"));
        }
        if self.provider_timeout_secs == 0 {
            return Err(crate::Error::config("Provider timeout must be > 0"));
        }

        self.echo.validate()?;
        for provider in &self.providers {
            provider.validate()?;
        }

        Ok(())
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            echo: IpEchoConfig::default(),
            providers: default_geo_providers(),
            freshness_secs: default_freshness_secs(),
            provider_timeout_secs: default_provider_timeout_secs(),
        }
    }
}

/// IP echo configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IpEchoConfig {
    /// HTTP echo service returning `{"ip": ...}` or a plain-text address
    Http {
        /// URL to fetch the address from
        url: String,
    },

    /// Custom echo source
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl IpEchoConfig {
    /// Validate the echo configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            IpEchoConfig::Http { url } => {
                if url.is_empty() {
                    return Err(crate::Error::config("Echo service URL cannot be empty"));
                }
                if !url.starts_with("https://") && !url.starts_with("http://") {
                    return Err(crate::Error::config(format!(
                        "Echo service URL must use HTTP or HTTPS scheme. Got: {}",
                        url
                    )));
                }
                Ok(())
            }
            IpEchoConfig::Custom { factory, .. } => {
                if factory.is_empty() {
                    return Err(crate::Error::config("Custom echo factory cannot be empty"));
                }
                Ok(())
            }
        }
    }

    /// Get the echo type name
    pub fn type_name(&self) -> &str {
        match self {
            IpEchoConfig::Http { .. } => "http",
            IpEchoConfig::Custom { factory, .. } => factory,
        }
    }
}

impl Default for IpEchoConfig {
    fn default() -> Self {
        IpEchoConfig::Http {
            url: "https://api.ipify.org?format=json".to_string(),
        }
    }
}

/// Geolocation provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GeoProviderConfig {
    /// ipgeolocation.io (requires an API key)
    #[serde(rename = "ipgeolocation")]
    IpGeolocation {
        /// API key, never logged
        api_key: String,
        /// Override for the API base URL
        #[serde(default)]
        base_url: Option<String>,
    },

    /// ipapi.co (keyless)
    #[serde(rename = "ipapi")]
    IpApi {
        /// Override for the API base URL
        #[serde(default)]
        base_url: Option<String>,
    },

    /// ipwho.is (keyless)
    #[serde(rename = "ipwhois")]
    IpWhois {
        /// Override for the API base URL
        #[serde(default)]
        base_url: Option<String>,
    },

    /// Custom provider
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

/// Built-in geolocation providers, in default waterfall order
pub const DEFAULT_GEO_PROVIDERS: &[&str] = &["ipgeolocation", "ipapi", "ipwhois"];

impl GeoProviderConfig {
    /// Config for a built-in provider name
    ///
    /// ipgeolocation.io needs a key; without one this returns `Ok(None)` so
    /// the waterfall simply starts at the next provider.
    ///
    /// # Returns
    ///
    /// - `Err(Error::Config)` if `name` is not a built-in provider
    pub fn builtin(
        name: &str,
        ipgeolocation_api_key: Option<&str>,
    ) -> Result<Option<Self>, crate::Error> {
        match name {
            "ipgeolocation" => Ok(ipgeolocation_api_key
                .filter(|key| !key.is_empty())
                .map(|key| GeoProviderConfig::IpGeolocation {
                    api_key: key.to_string(),
                    base_url: None,
                })),
            "ipapi" => Ok(Some(GeoProviderConfig::IpApi { base_url: None })),
            "ipwhois" => Ok(Some(GeoProviderConfig::IpWhois { base_url: None })),
            other => Err(crate::Error::config(format!(
                "Unknown geolocation provider '{}'. Supported providers: {}",
                other,
                DEFAULT_GEO_PROVIDERS.join(", ")
            ))),
        }
    }

    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            GeoProviderConfig::IpGeolocation { api_key, .. } => {
                if api_key.is_empty() {
                    return Err(crate::Error::config(
                        "ipgeolocation.io API key cannot be empty",
                    ));
                }
                Ok(())
            }
            GeoProviderConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom provider factory cannot be empty",
                    ));
                }
                if config.is_null() {
                    return Err(crate::Error::config(
                        "Custom provider config cannot be null",
                    ));
                }
                Ok(())
            }
            GeoProviderConfig::IpApi { .. } | GeoProviderConfig::IpWhois { .. } => Ok(()),
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            GeoProviderConfig::IpGeolocation { .. } => "ipgeolocation",
            GeoProviderConfig::IpApi { .. } => "ipapi",
            GeoProviderConfig::IpWhois { .. } => "ipwhois",
            GeoProviderConfig::Custom { factory, .. } => factory,
        }
    }
}

/// Settings for the reputation lookup flow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReputationConfig {
    /// The single reputation upstream
    #[serde(default)]
    pub provider: ReputationProviderConfig,

    /// How long a per-address result stays fresh
    #[serde(default = "default_reputation_ttl_secs")]
    pub ttl_secs: u64,

    /// Maximum number of cached addresses
    #[serde(default = "default_reputation_capacity")]
    pub capacity: usize,

    /// Upper bound on the upstream call
    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,
}

impl ReputationConfig {
    /// Cache TTL as a `Duration`
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Upstream timeout as a `Duration`
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }

    /// Validate the reputation configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.capacity == 0 {
            return Err(crate::Error::config("Reputation cache capacity must be > 0"));
        }
        if self.provider_timeout_secs == 0 {
            return Err(crate::Error::config("Provider timeout must be > 0"));
        }
        self.provider.validate()
    }
}

impl Default for ReputationConfig {
    fn default() -> Self {
        Self {
            provider: ReputationProviderConfig::default(),
            ttl_secs: default_reputation_ttl_secs(),
            capacity: default_reputation_capacity(),
            provider_timeout_secs: default_provider_timeout_secs(),
        }
    }
}

/// Reputation provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReputationProviderConfig {
    /// IPQualityScore
    #[serde(rename = "ipqualityscore")]
    IpQualityScore {
        /// API key, never logged
        api_key: String,
        /// Detection strictness, 0 (lenient) to 2 (strict)
        #[serde(default = "default_strictness")]
        strictness: u8,
        /// Whether public access points (cafés, libraries) count as clean
        #[serde(default = "default_enabled")]
        allow_public_access_points: bool,
        /// Override for the API base URL
        #[serde(default)]
        base_url: Option<String>,
    },

    /// Custom provider
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl ReputationProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ReputationProviderConfig::IpQualityScore { strictness, .. } => {
                if *strictness > 2 {
                    return Err(crate::Error::config(format!(
                        "IPQualityScore strictness must be between 0 and 2. Got: {}",
                        strictness
                    )));
                }
                Ok(())
            }
            ReputationProviderConfig::Custom { factory, .. } => {
                if factory.is_empty() {
                    return Err(crate::Error::config(
                        "Custom reputation factory cannot be empty",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ReputationProviderConfig::IpQualityScore { .. } => "ipqualityscore",
            ReputationProviderConfig::Custom { factory, .. } => factory,
        }
    }
}

impl Default for ReputationProviderConfig {
    fn default() -> Self {
        ReputationProviderConfig::IpQualityScore {
            api_key: String::new(),
            strictness: default_strictness(),
            allow_public_access_points: default_enabled(),
            base_url: None,
        }
    }
}

/// Blacklist checker selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlacklistMode {
    /// Deterministic fixture: addresses ending in `.100` are listed
    #[default]
    Simulated,
    /// Real DNSBL queries through the system resolver
    Dns,
}

impl std::str::FromStr for BlacklistMode {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "simulated" => Ok(BlacklistMode::Simulated),
            "dns" => Ok(BlacklistMode::Dns),
            other => Err(crate::Error::config(format!(
                "Unknown blacklist mode '{}'. Supported: simulated, dns",
                other
            ))),
        }
    }
}

// Same order as the daemon's default; no key is known here, so
// ipgeolocation.io drops out
fn default_geo_providers() -> Vec<GeoProviderConfig> {
    DEFAULT_GEO_PROVIDERS
        .iter()
        .filter_map(|name| GeoProviderConfig::builtin(name, None).ok().flatten())
        .collect()
}

fn default_freshness_secs() -> u64 {
    60
}

fn default_provider_timeout_secs() -> u64 {
    5
}

fn default_reputation_ttl_secs() -> u64 {
    300
}

fn default_reputation_capacity() -> usize {
    1024
}

fn default_strictness() -> u8 {
    1
}

fn default_enabled() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = ServiceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.resolver.freshness(), Duration::from_secs(60));
        assert_eq!(config.reputation.ttl(), Duration::from_secs(300));
        assert_eq!(config.blacklist, BlacklistMode::Simulated);
    }

    #[test]
    fn test_empty_waterfall_rejected() {
        let mut config = ServiceConfig::default();
        config.resolver.providers.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_waterfall_follows_builtin_order() {
        let names: Vec<String> = ResolverConfig::default()
            .providers
            .iter()
            .map(|p| p.type_name().to_string())
            .collect();
        assert_eq!(names, ["ipapi", "ipwhois"]);

        let keyed: Vec<String> = DEFAULT_GEO_PROVIDERS
            .iter()
            .filter_map(|name| GeoProviderConfig::builtin(name, Some("k")).unwrap())
            .map(|p| p.type_name().to_string())
            .collect();
        assert_eq!(keyed, DEFAULT_GEO_PROVIDERS);
    }

    #[test]
    fn test_builtin_rejects_unknown_name() {
        assert!(GeoProviderConfig::builtin("maxmind", None).is_err());
        assert!(GeoProviderConfig::builtin("ipgeolocation", Some("")).unwrap().is_none());
    }

    #[test]
    fn test_ipgeolocation_requires_key() {
        let provider = GeoProviderConfig::IpGeolocation {
            api_key: String::new(),
            base_url: None,
        };
        assert!(provider.validate().is_err());
        assert_eq!(provider.type_name(), "ipgeolocation");
    }

    #[test]
    fn test_strictness_range() {
        let provider = ReputationProviderConfig::IpQualityScore {
            api_key: "k".to_string(),
            strictness: 3,
            allow_public_access_points: true,
            base_url: None,
        };
        assert!(provider.validate().is_err());
    }

    #[test]
    fn test_provider_config_from_json() {
        let json = r#"[
            {"type": "ipgeolocation", "api_key": "abc"},
            {"type": "ipapi"},
            {"type": "ipwhois", "base_url": "http://127.0.0.1:9000"}
        ]"#;
        let providers: Vec<GeoProviderConfig> = serde_json::from_str(json).unwrap();
        let names: Vec<&str> = providers.iter().map(|p| p.type_name()).collect();
        assert_eq!(names, vec!["ipgeolocation", "ipapi", "ipwhois"]);
    }

    #[test]
    fn test_blacklist_mode_parse() {
        assert_eq!("DNS".parse::<BlacklistMode>().unwrap(), BlacklistMode::Dns);
        assert!("bogus".parse::<BlacklistMode>().is_err());
    }
}
