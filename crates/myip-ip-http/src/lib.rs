// # HTTP IP Echo
//
// This crate provides an HTTP-based IP echo for the MyIP service.
//
// ## Purpose
//
// Used only when the inbound request carries no `X-Forwarded-For` /
// `X-Real-IP` header, typically in local development where the service is
// not behind a reverse proxy.
//
// ## Architecture
//
// Fetches the address from an external "what is my IP" service. Both
// response styles in common use are accepted:
// - JSON: `{"ip": "203.0.113.7"}` (ipify with `?format=json`)
// - Plain text: `203.0.113.7\n` (ifconfig.me, icanhazip.com)

use myip_core::config::IpEchoConfig;
use myip_core::traits::{IpEcho, IpEchoFactory};
use myip_core::{Error, ProviderRegistry, Result};

use std::net::IpAddr;
use std::time::Duration;

/// Default echo service
pub const DEFAULT_ECHO_URL: &str = "https://api.ipify.org?format=json";

/// HTTP-based IP echo
pub struct HttpIpEcho {
    /// URL to fetch the address from
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpEcho {
    /// Create a new HTTP IP echo
    ///
    /// # Parameters
    ///
    /// - `url`: URL to fetch the address from (e.g., "https://api.ipify.org?format=json")
    /// - `timeout`: Per-request HTTP timeout
    ///
    /// # Returns
    ///
    /// - `Err(Error::Config)` if the HTTP client cannot be built
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// URL this echo queries
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Extract an address from an echo response body
///
/// JSON bodies must carry a string `ip` field; anything else is treated as
/// plain text. The result must parse as an IP address.
pub fn parse_echo_body(body: &str) -> Result<String> {
    let body = body.trim();

    let candidate = match serde_json::from_str::<serde_json::Value>(body) {
        Ok(json) if json.is_object() => json["ip"]
            .as_str()
            .map(str::trim)
            .ok_or_else(|| Error::ip_discovery("Echo response has no \"ip\" field"))?
            .to_string(),
        _ => body.to_string(),
    };

    let ip: IpAddr = candidate
        .parse()
        .map_err(|_| Error::ip_discovery(format!("Invalid IP address: {}", candidate)))?;

    Ok(ip.to_string())
}

#[async_trait::async_trait]
impl IpEcho for HttpIpEcho {
    async fn discover(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::ip_discovery(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::ip_discovery(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::ip_discovery(format!("Failed to read response: {}", e)))?;

        let ip = parse_echo_body(&body)?;
        tracing::debug!("Echo service {} reported {}", self.url, ip);
        Ok(ip)
    }
}

/// Factory for creating HTTP IP echoes
pub struct HttpEchoFactory;

impl IpEchoFactory for HttpEchoFactory {
    fn create(&self, config: &IpEchoConfig, timeout: Duration) -> Result<Box<dyn IpEcho>> {
        match config {
            IpEchoConfig::Http { url } => {
                if url.is_empty() {
                    return Err(Error::config("Echo service URL cannot be empty"));
                }
                Ok(Box::new(HttpIpEcho::new(url.clone(), timeout)?))
            }
            _ => Err(Error::config("Invalid config for HTTP IP echo")),
        }
    }
}

/// Register the HTTP IP echo with a registry
pub fn register(registry: &ProviderRegistry) {
    registry.register_ip_echo("http", Box::new(HttpEchoFactory));
}
