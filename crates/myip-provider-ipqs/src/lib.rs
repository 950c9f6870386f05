// # IPQualityScore Provider
//
// Reputation lookups against the IPQualityScore proxy/VPN detection API.
//
// ## API Format
//
// ```http
// GET /api/json/ip/<key>/<address>?user_agent=..&user_language=..&strictness=1&allow_public_access_points=true
// ```
//
// The response reports failures in-band (`"success": false`), usually with
// a 200 status, so both the status and the body are checked.
//
// ## Security Requirements
//
// The API key is part of the request path. It NEVER appears in logs,
// errors or `Debug` output; transport errors are stripped of their URL.

use async_trait::async_trait;
use myip_core::address::parse_address;
use myip_core::config::ReputationProviderConfig;
use myip_core::record::{json_bool, json_score, json_str};
use myip_core::traits::{ReputationProvider, ReputationProviderFactory};
use myip_core::{ClientContext, Error, ProviderRegistry, ReputationRecord, Result};
use myip_provider_geo::http;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

const NAME: &str = "ipqualityscore";

/// Default API base URL
pub const IPQS_API_BASE: &str = "https://ipqualityscore.com";

/// IPQualityScore client
pub struct IpQualityScoreProvider {
    /// API key
    /// ⚠️ NEVER log this value
    api_key: String,
    strictness: u8,
    allow_public_access_points: bool,
    base_url: String,
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API key
impl std::fmt::Debug for IpQualityScoreProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IpQualityScoreProvider")
            .field("api_key", &"<REDACTED>")
            .field("strictness", &self.strictness)
            .field("allow_public_access_points", &self.allow_public_access_points)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl IpQualityScoreProvider {
    /// Create a new provider
    ///
    /// An empty `api_key` is accepted: every lookup then fails without
    /// touching the network, which the reputation service reports as a
    /// failure record.
    pub fn new(
        api_key: impl Into<String>,
        strictness: u8,
        allow_public_access_points: bool,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            api_key: api_key.into(),
            strictness,
            allow_public_access_points,
            base_url: base_url.unwrap_or_else(|| IPQS_API_BASE.to_string()),
            client: http::client(timeout)?,
        })
    }

    /// Lookup URL; `address` must already be a parsed IP address
    fn endpoint(&self, address: &str) -> String {
        format!(
            "{}/api/json/ip/{}/{}",
            http::base(&self.base_url),
            self.api_key,
            address
        )
    }
}

/// Map an IPQualityScore response into a normalized record
pub fn map_response(address: &str, json: &Value) -> ReputationRecord {
    ReputationRecord {
        ip: address.to_string(),
        is_vpn: json_bool(json, "/vpn"),
        is_proxy: json_bool(json, "/proxy"),
        is_tor: json_bool(json, "/tor"),
        is_bot: json_bool(json, "/bot_status"),
        is_crawler: json_bool(json, "/is_crawler"),
        fraud_score: json_score(json, "/fraud_score"),
        mobile: json_bool(json, "/mobile"),
        host: json_str(json, "/host"),
        isp: json_str(json, "/ISP"),
        country: json_str(json, "/country_code"),
        city: json_str(json, "/city"),
        region: json_str(json, "/region"),
        ..ReputationRecord::clean(address)
    }
    .with_summary()
}

#[async_trait]
impl ReputationProvider for IpQualityScoreProvider {
    async fn lookup(&self, address: &str, context: &ClientContext) -> Result<ReputationRecord> {
        let address = parse_address(address)?.to_string();
        if self.api_key.is_empty() {
            return Err(Error::config("IPQualityScore API key not configured"));
        }

        let strictness = self.strictness.to_string();
        let public_access = self.allow_public_access_points.to_string();
        let query = [
            ("user_agent", context.user_agent.as_deref().unwrap_or_default()),
            (
                "user_language",
                context.accept_language.as_deref().unwrap_or_default(),
            ),
            ("strictness", strictness.as_str()),
            ("allow_public_access_points", public_access.as_str()),
        ];

        debug!("Querying IPQualityScore for {}", address);

        let request = self.client.get(self.endpoint(&address)).query(&query);
        let json = http::get_json(NAME, request).await?;

        if json.get("success").and_then(Value::as_bool) != Some(true) {
            let message = json_str(&json, "/message");
            return Err(Error::provider(NAME, format!("Lookup rejected: {}", message)));
        }

        Ok(map_response(&address, &json))
    }

    fn provider_name(&self) -> &'static str {
        NAME
    }
}

/// Factory for creating IPQualityScore providers
pub struct IpQualityScoreFactory;

impl ReputationProviderFactory for IpQualityScoreFactory {
    fn create(
        &self,
        config: &ReputationProviderConfig,
        timeout: Duration,
    ) -> Result<Box<dyn ReputationProvider>> {
        match config {
            ReputationProviderConfig::IpQualityScore {
                api_key,
                strictness,
                allow_public_access_points,
                base_url,
            } => {
                if api_key.is_empty() {
                    warn!("IPQualityScore API key not set, reputation lookups will fail");
                }
                Ok(Box::new(IpQualityScoreProvider::new(
                    api_key.clone(),
                    *strictness,
                    *allow_public_access_points,
                    base_url.clone(),
                    timeout,
                )?))
            }
            _ => Err(Error::config("Invalid config for IPQualityScore provider")),
        }
    }
}

/// Register the IPQualityScore provider with a registry
pub fn register(registry: &ProviderRegistry) {
    registry.register_reputation_provider(NAME, Box::new(IpQualityScoreFactory));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(base_url: String) -> IpQualityScoreProvider {
        IpQualityScoreProvider::new("test_key", 1, true, Some(base_url), Duration::from_secs(5))
            .unwrap()
    }

    #[test]
    fn test_map_flags_and_summary() {
        let json = json!({
            "success": true,
            "proxy": true,
            "vpn": true,
            "tor": false,
            "bot_status": false,
            "is_crawler": false,
            "fraud_score": 88,
            "mobile": false,
            "host": "vpn-node.example.net",
            "ISP": "Example Hosting",
            "country_code": "NL",
            "city": "Amsterdam",
            "region": "North Holland"
        });

        let record = map_response("203.0.113.9", &json);
        assert!(record.success);
        assert!(record.is_vpn);
        assert!(record.is_proxy);
        assert_eq!(record.fraud_score, 88);
        assert_eq!(record.isp, "Example Hosting");
        assert_eq!(record.country, "NL");
        assert!(record.message.contains("anonymizing services"));
        assert!(record.is_anonymized());
    }

    #[test]
    fn test_map_clean_address() {
        let record = map_response("198.51.100.4", &json!({ "success": true, "fraud_score": 10 }));
        assert!(!record.is_anonymized());
        assert_eq!(record.message, "No anonymizing services detected.");
    }

    #[test]
    fn test_high_score_alone_counts_as_anonymized() {
        let record = map_response("198.51.100.4", &json!({ "success": true, "fraud_score": 75 }));
        assert!(record.is_anonymized());
    }

    #[test]
    fn test_api_key_not_exposed_in_debug() {
        let provider = IpQualityScoreProvider::new(
            "secret_key_12345",
            1,
            true,
            None,
            Duration::from_secs(5),
        )
        .unwrap();
        let debug_str = format!("{:?}", provider);
        assert!(!debug_str.contains("secret_key_12345"));
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let provider =
            IpQualityScoreProvider::new("", 1, true, Some(server.uri()), Duration::from_secs(5))
                .unwrap();
        let err = provider
            .lookup("203.0.113.9", &ClientContext::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not configured"));
    }

    #[tokio::test]
    async fn test_lookup_forwards_client_context() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/json/ip/test_key/203.0.113.9"))
            .and(query_param("user_agent", "Mozilla/5.0 (X11)"))
            .and(query_param("user_language", "en-US"))
            .and(query_param("strictness", "1"))
            .and(query_param("allow_public_access_points", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "tor": true,
                "fraud_score": 100
            })))
            .expect(1)
            .mount(&server)
            .await;

        let context = ClientContext {
            user_agent: Some("Mozilla/5.0 (X11)".to_string()),
            accept_language: Some("en-US".to_string()),
            ..ClientContext::default()
        };
        let record = provider(server.uri())
            .lookup("203.0.113.9", &context)
            .await
            .unwrap();

        assert!(record.is_tor);
        assert_eq!(record.ip, "203.0.113.9");
    }

    #[tokio::test]
    async fn test_address_cannot_escape_lookup_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(0)
            .mount(&server)
            .await;

        let provider = provider(server.uri());
        for address in [
            "../../../email/test_key/victim@example.com",
            "203.0.113.9/../../../account",
            "not-an-ip",
        ] {
            let err = provider
                .lookup(address, &ClientContext::default())
                .await
                .unwrap_err();
            assert!(err.is_invalid_input(), "{address}");
        }
    }

    #[tokio::test]
    async fn test_in_band_failure_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "message": "Invalid or unauthorized key."
            })))
            .mount(&server)
            .await;

        let err = provider(server.uri())
            .lookup("203.0.113.9", &ClientContext::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("unauthorized key"));
        assert!(!err.to_string().contains("test_key"));
    }

    #[tokio::test]
    async fn test_server_error_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        assert!(
            provider(server.uri())
                .lookup("203.0.113.9", &ClientContext::default())
                .await
                .is_err()
        );
    }

    #[test]
    fn test_register() {
        let registry = ProviderRegistry::new();
        register(&registry);
        assert!(registry.has_reputation_provider("ipqualityscore"));
    }
}
