//! ipgeolocation.io provider
//!
//! ```http
//! GET /ipgeo?ip=<address>&apiKey=<key>
//! ```
//!
//! Note that this API reports `latitude` / `longitude` as strings.

use async_trait::async_trait;
use myip_core::address::parse_address;
use myip_core::config::GeoProviderConfig;
use myip_core::record::{json_f64, json_str};
use myip_core::traits::{GeoProvider, GeoProviderFactory};
use myip_core::{Error, IpRecord, Result};
use serde_json::Value;
use std::time::Duration;

use crate::http;

const NAME: &str = "ipgeolocation";

/// Default API base URL
pub const IPGEOLOCATION_API_BASE: &str = "https://api.ipgeolocation.io";

/// ipgeolocation.io client
pub struct IpGeolocationProvider {
    /// API key
    /// ⚠️ NEVER log this value
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for IpGeolocationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IpGeolocationProvider")
            .field("api_key", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl IpGeolocationProvider {
    /// Create a new provider
    ///
    /// # Returns
    ///
    /// - `Err(Error::Config)` if `api_key` is empty
    pub fn new(api_key: impl Into<String>, base_url: Option<String>, timeout: Duration) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(Error::config("ipgeolocation.io API key is required"));
        }

        Ok(Self {
            api_key,
            base_url: base_url.unwrap_or_else(|| IPGEOLOCATION_API_BASE.to_string()),
            client: http::client(timeout)?,
        })
    }
}

/// Map an ipgeolocation.io response into a normalized record
pub fn map_response(address: &str, json: &Value) -> IpRecord {
    IpRecord {
        city: json_str(json, "/city"),
        region: json_str(json, "/state_prov"),
        country: json_str(json, "/country_code2"),
        country_name: json_str(json, "/country_name"),
        postal_code: json_str(json, "/zipcode"),
        latitude: json_f64(json, "/latitude"),
        longitude: json_f64(json, "/longitude"),
        time_zone: json_str(json, "/time_zone/name"),
        organization: json_str(json, "/isp"),
        ..IpRecord::empty(address)
    }
}

#[async_trait]
impl GeoProvider for IpGeolocationProvider {
    async fn lookup(&self, address: &str) -> Result<IpRecord> {
        let address = parse_address(address)?.to_string();
        let url = format!("{}/ipgeo", http::base(&self.base_url));
        let request = self
            .client
            .get(url)
            .query(&[("ip", address.as_str()), ("apiKey", self.api_key.as_str())]);

        let json = http::get_json(NAME, request).await?;

        // Error bodies come with a 4xx, but guard against a 200 carrying one
        if let Some(message) = json.get("message").and_then(Value::as_str)
            && json.get("ip").is_none()
        {
            return Err(Error::provider(NAME, format!("Lookup rejected: {}", message)));
        }

        Ok(map_response(&address, &json))
    }

    fn provider_name(&self) -> &'static str {
        NAME
    }
}

/// Factory for creating ipgeolocation.io providers
pub struct IpGeolocationFactory;

impl GeoProviderFactory for IpGeolocationFactory {
    fn create(&self, config: &GeoProviderConfig, timeout: Duration) -> Result<Box<dyn GeoProvider>> {
        match config {
            GeoProviderConfig::IpGeolocation { api_key, base_url } => Ok(Box::new(
                IpGeolocationProvider::new(api_key.clone(), base_url.clone(), timeout)?,
            )),
            _ => Err(Error::config("Invalid config for ipgeolocation.io provider")),
        }
    }
}
