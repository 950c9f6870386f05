//! Client address extraction
//!
//! The daemon copies the handful of inbound headers the service cares about
//! into a [`ClientContext`], so nothing below the HTTP layer depends on a
//! particular server framework.

use std::net::IpAddr;

use crate::error::{Error, Result};

/// Request metadata relevant to address discovery and reputation lookups
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientContext {
    /// Raw `X-Forwarded-For` value (may hold a comma-separated chain)
    pub x_forwarded_for: Option<String>,
    /// Raw `X-Real-IP` value
    pub x_real_ip: Option<String>,
    /// `User-Agent`, forwarded to reputation providers
    pub user_agent: Option<String>,
    /// `Accept-Language`, forwarded to reputation providers
    pub accept_language: Option<String>,
}

impl ClientContext {
    /// Context carrying only an `X-Forwarded-For` value
    pub fn forwarded_for(value: impl Into<String>) -> Self {
        Self {
            x_forwarded_for: Some(value.into()),
            ..Self::default()
        }
    }

    /// The caller's address as reported by proxy headers
    ///
    /// The first entry of `X-Forwarded-For` wins; `X-Real-IP` is consulted
    /// only when `X-Forwarded-For` is absent, empty or not an IP address.
    /// The result is always a well-formed address in canonical form.
    pub fn client_address(&self) -> Option<String> {
        let forwarded = self
            .x_forwarded_for
            .as_deref()
            .and_then(|chain| chain.split(',').next())
            .and_then(|entry| parse_address(entry).ok());

        forwarded
            .or_else(|| {
                self.x_real_ip
                    .as_deref()
                    .and_then(|value| parse_address(value).ok())
            })
            .map(|ip| ip.to_string())
    }
}

/// Parse a caller-supplied address
///
/// Anything that is not a bare IPv4/IPv6 address is rejected, so the value
/// is safe to place in an upstream URL path.
pub fn parse_address(raw: &str) -> Result<IpAddr> {
    let trimmed = raw.trim();
    trimmed
        .parse()
        .map_err(|_| Error::invalid_input(format!("Invalid IP address: {}", trimmed)))
}
