//! ipapi.co provider
//!
//! ```http
//! GET /<address>/json/
//! ```
//!
//! Rate-limited or reserved-range lookups may come back as
//! `{"error": true, "reason": "..."}`, sometimes with a 200 status.

use async_trait::async_trait;
use myip_core::address::parse_address;
use myip_core::config::GeoProviderConfig;
use myip_core::record::{json_bool, json_f64, json_str};
use myip_core::traits::{GeoProvider, GeoProviderFactory};
use myip_core::{Error, IpRecord, Result};
use serde_json::Value;
use std::time::Duration;

use crate::http;

const NAME: &str = "ipapi";

/// Default API base URL
pub const IPAPI_API_BASE: &str = "https://ipapi.co";

/// ipapi.co client
#[derive(Debug)]
pub struct IpApiProvider {
    base_url: String,
    client: reqwest::Client,
}

impl IpApiProvider {
    /// Create a new provider
    pub fn new(base_url: Option<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            base_url: base_url.unwrap_or_else(|| IPAPI_API_BASE.to_string()),
            client: http::client(timeout)?,
        })
    }
}

/// Map an ipapi.co response into a normalized record
pub fn map_response(address: &str, json: &Value) -> IpRecord {
    IpRecord {
        city: json_str(json, "/city"),
        region: json_str(json, "/region"),
        country: json_str(json, "/country_code"),
        country_name: json_str(json, "/country_name"),
        postal_code: json_str(json, "/postal"),
        latitude: json_f64(json, "/latitude"),
        longitude: json_f64(json, "/longitude"),
        time_zone: json_str(json, "/timezone"),
        organization: json_str(json, "/org"),
        ..IpRecord::empty(address)
    }
}

#[async_trait]
impl GeoProvider for IpApiProvider {
    async fn lookup(&self, address: &str) -> Result<IpRecord> {
        let address = parse_address(address)?.to_string();
        let url = format!("{}/{}/json/", http::base(&self.base_url), address);
        let json = http::get_json(NAME, self.client.get(url)).await?;

        if json_bool(&json, "/error") {
            let reason = json_str(&json, "/reason");
            return Err(Error::provider(NAME, format!("Lookup rejected: {}", reason)));
        }

        Ok(map_response(&address, &json))
    }

    fn provider_name(&self) -> &'static str {
        NAME
    }
}

/// Factory for creating ipapi.co providers
pub struct IpApiFactory;

impl GeoProviderFactory for IpApiFactory {
    fn create(&self, config: &GeoProviderConfig, timeout: Duration) -> Result<Box<dyn GeoProvider>> {
        match config {
            GeoProviderConfig::IpApi { base_url } => {
                Ok(Box::new(IpApiProvider::new(base_url.clone(), timeout)?))
            }
            _ => Err(Error::config("Invalid config for ipapi.co provider")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_map_response() {
        let json = json!({
            "ip": "1.1.1.1",
            "city": "Brisbane",
            "region": "Queensland",
            "country_code": "AU",
            "country_name": "Australia",
            "postal": "4000",
            "latitude": -27.4679,
            "longitude": 153.0281,
            "timezone": "Australia/Brisbane",
            "org": "CLOUDFLARENET"
        });

        let record = map_response("1.1.1.1", &json);
        assert_eq!(record.city, "Brisbane");
        assert_eq!(record.region, "Queensland");
        assert_eq!(record.country, "AU");
        assert_eq!(record.country_name, "Australia");
        assert_eq!(record.postal_code, "4000");
        assert_eq!(record.latitude, -27.4679);
        assert_eq!(record.time_zone, "Australia/Brisbane");
        assert_eq!(record.organization, "CLOUDFLARENET");
    }

    #[tokio::test]
    async fn test_lookup_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/1.1.1.1/json/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "city": "Brisbane" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let provider =
            IpApiProvider::new(Some(format!("{}/", server.uri())), Duration::from_secs(5)).unwrap();
        let record = provider.lookup("1.1.1.1").await.unwrap();
        assert_eq!(record.city, "Brisbane");
        assert_eq!(record.country, "");
    }

    #[tokio::test]
    async fn test_soft_error_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "error": true, "reason": "RateLimited" })),
            )
            .mount(&server)
            .await;

        let provider = IpApiProvider::new(Some(server.uri()), Duration::from_secs(5)).unwrap();
        let err = provider.lookup("1.1.1.1").await.unwrap_err();
        assert!(err.to_string().contains("RateLimited"));
    }

    #[tokio::test]
    async fn test_malformed_address_never_reaches_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "city": "x" })))
            .expect(0)
            .mount(&server)
            .await;

        let provider = IpApiProvider::new(Some(server.uri()), Duration::from_secs(5)).unwrap();
        for address in ["../../admin", "1.1.1.1/../../x", "example.com"] {
            let err = provider.lookup(address).await.unwrap_err();
            assert!(err.is_invalid_input(), "{address}");
        }
    }

    #[tokio::test]
    async fn test_server_error_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let provider = IpApiProvider::new(Some(server.uri()), Duration::from_secs(5)).unwrap();
        assert!(provider.lookup("1.1.1.1").await.is_err());
    }
}
