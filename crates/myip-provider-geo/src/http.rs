//! Shared request plumbing for JSON-over-HTTPS providers

use myip_core::{Error, Result};
use serde_json::Value;
use std::time::Duration;

/// Build an HTTP client bounded by `timeout`
pub fn client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))
}

/// GET `request` and decode the body as JSON
///
/// `provider` names the upstream in errors. The request URL is never
/// included in errors since it may carry an API key.
pub async fn get_json(provider: &str, request: reqwest::RequestBuilder) -> Result<Value> {
    let response = request
        .send()
        .await
        .map_err(|e| Error::provider(provider, format!("HTTP request failed: {}", e.without_url())))?;

    let status = response.status();
    tracing::debug!("{} responded with {}", provider, status);
    if !status.is_success() {
        return Err(match status.as_u16() {
            401 | 403 => Error::provider(
                provider,
                format!("Authentication failed: invalid API key or plan. Status: {}", status),
            ),
            429 => Error::provider(provider, format!("Rate limit exceeded. Status: {}", status)),
            500..=599 => Error::provider(provider, format!("Server error (transient): {}", status)),
            _ => Error::provider(provider, format!("HTTP error: {}", status)),
        });
    }

    let json: Value = response
        .json()
        .await
        .map_err(|e| Error::provider(provider, format!("Failed to parse response: {}", e.without_url())))?;

    if !json.is_object() {
        return Err(Error::provider(provider, "Invalid response format: not a JSON object"));
    }

    Ok(json)
}

/// Trim a trailing slash from a configured base URL
pub fn base(url: &str) -> &str {
    url.trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_keeps_timeout_config() {
        assert!(client(Duration::from_secs(5)).is_ok());
    }

    #[test]
    fn test_base_trims_trailing_slashes() {
        assert_eq!(base("https://ipwho.is//"), "https://ipwho.is");
        assert_eq!(base("http://127.0.0.1:8080"), "http://127.0.0.1:8080");
    }
}
