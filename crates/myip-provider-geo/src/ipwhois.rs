//! ipwho.is provider
//!
//! ```http
//! GET /<address>
//! ```
//!
//! Failures are reported in-band: `{"success": false, "message": "..."}`
//! with a 200 status.

use async_trait::async_trait;
use myip_core::address::parse_address;
use myip_core::config::GeoProviderConfig;
use myip_core::record::{json_f64, json_str};
use myip_core::traits::{GeoProvider, GeoProviderFactory};
use myip_core::{Error, IpRecord, Result};
use serde_json::Value;
use std::time::Duration;

use crate::http;

const NAME: &str = "ipwhois";

/// Default API base URL
pub const IPWHOIS_API_BASE: &str = "https://ipwho.is";

/// ipwho.is client
#[derive(Debug)]
pub struct IpWhoisProvider {
    base_url: String,
    client: reqwest::Client,
}

impl IpWhoisProvider {
    /// Create a new provider
    pub fn new(base_url: Option<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            base_url: base_url.unwrap_or_else(|| IPWHOIS_API_BASE.to_string()),
            client: http::client(timeout)?,
        })
    }
}

/// Map an ipwho.is response into a normalized record
pub fn map_response(address: &str, json: &Value) -> IpRecord {
    IpRecord {
        city: json_str(json, "/city"),
        region: json_str(json, "/region"),
        country: json_str(json, "/country_code"),
        country_name: json_str(json, "/country"),
        postal_code: json_str(json, "/postal"),
        latitude: json_f64(json, "/latitude"),
        longitude: json_f64(json, "/longitude"),
        time_zone: json_str(json, "/timezone/id"),
        organization: json_str(json, "/connection/isp"),
        ..IpRecord::empty(address)
    }
}

#[async_trait]
impl GeoProvider for IpWhoisProvider {
    async fn lookup(&self, address: &str) -> Result<IpRecord> {
        let address = parse_address(address)?.to_string();
        let url = format!("{}/{}", http::base(&self.base_url), address);
        let json = http::get_json(NAME, self.client.get(url)).await?;

        if json.get("success").and_then(Value::as_bool) == Some(false) {
            let message = json_str(&json, "/message");
            return Err(Error::provider(NAME, format!("Lookup rejected: {}", message)));
        }

        Ok(map_response(&address, &json))
    }

    fn provider_name(&self) -> &'static str {
        NAME
    }
}

/// Factory for creating ipwho.is providers
pub struct IpWhoisFactory;

impl GeoProviderFactory for IpWhoisFactory {
    fn create(&self, config: &GeoProviderConfig, timeout: Duration) -> Result<Box<dyn GeoProvider>> {
        match config {
            GeoProviderConfig::IpWhois { base_url } => {
                Ok(Box::new(IpWhoisProvider::new(base_url.clone(), timeout)?))
            }
            _ => Err(Error::config("Invalid config for ipwho.is provider")),
        }
    }
}
