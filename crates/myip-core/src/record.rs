//! Normalized response records
//!
//! Every provider maps its own response shape into one of these records.
//! All fields are always present: unknown strings are empty and unknown
//! numbers are zero, so consumers never have to null-check.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// IP version, derived from the textual address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IpVersion {
    #[serde(rename = "IPv4")]
    V4,
    #[serde(rename = "IPv6")]
    V6,
}

impl IpVersion {
    /// Classify an address string: anything containing a colon is IPv6
    pub fn of(address: &str) -> Self {
        if address.contains(':') {
            IpVersion::V6
        } else {
            IpVersion::V4
        }
    }
}

/// Normalized geolocation record for one address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpRecord {
    pub ip: String,
    pub version: IpVersion,
    pub city: String,
    pub region: String,
    /// Two-letter country code
    pub country: String,
    pub country_name: String,
    pub postal_code: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Time-zone identifier (e.g. `Europe/Berlin`)
    pub time_zone: String,
    /// ISP or hosting organization
    pub organization: String,
}

impl IpRecord {
    /// A record for `address` with every optional field at its default
    pub fn empty(address: impl Into<String>) -> Self {
        let ip = address.into();
        let version = IpVersion::of(&ip);

        Self {
            ip,
            version,
            city: String::new(),
            region: String::new(),
            country: String::new(),
            country_name: String::new(),
            postal_code: String::new(),
            latitude: 0.0,
            longitude: 0.0,
            time_zone: String::new(),
            organization: String::new(),
        }
    }

    /// The fixed record served when every provider failed and nothing is cached
    pub fn placeholder() -> Self {
        Self {
            ip: "192.168.1.1".to_string(),
            version: IpVersion::V4,
            city: "New York".to_string(),
            region: "New York".to_string(),
            country: "US".to_string(),
            country_name: "United States".to_string(),
            postal_code: "10001".to_string(),
            latitude: 40.7128,
            longitude: -74.0060,
            time_zone: "America/New_York".to_string(),
            organization: "Example ISP".to_string(),
        }
    }
}

const ANONYMIZED_MESSAGE: &str = "This IP address appears to be using anonymizing services.";
const CLEAN_MESSAGE: &str = "No anonymizing services detected.";
const FAILED_MESSAGE: &str = "Failed to detect VPN";

/// Fraud score at or above which an address is reported as anonymized
pub const FRAUD_SCORE_THRESHOLD: u8 = 75;

/// Normalized anonymization / reputation record for one address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReputationRecord {
    pub ip: String,
    pub is_vpn: bool,
    pub is_proxy: bool,
    pub is_tor: bool,
    pub is_bot: bool,
    pub is_crawler: bool,
    /// 0–100
    pub fraud_score: u8,
    pub mobile: bool,
    pub host: String,
    pub isp: String,
    pub country: String,
    pub city: String,
    pub region: String,
    pub message: String,
    pub success: bool,
}

impl ReputationRecord {
    /// A successful record with every flag cleared
    pub fn clean(address: impl Into<String>) -> Self {
        Self {
            ip: address.into(),
            is_vpn: false,
            is_proxy: false,
            is_tor: false,
            is_bot: false,
            is_crawler: false,
            fraud_score: 0,
            mobile: false,
            host: String::new(),
            isp: String::new(),
            country: String::new(),
            city: String::new(),
            region: String::new(),
            message: CLEAN_MESSAGE.to_string(),
            success: true,
        }
    }

    /// The explicit failure record: all flags false, score 0, no address
    pub fn failed() -> Self {
        Self {
            message: FAILED_MESSAGE.to_string(),
            success: false,
            ..Self::clean("")
        }
    }

    /// Whether the flags indicate an anonymizing service
    pub fn is_anonymized(&self) -> bool {
        self.is_proxy || self.is_vpn || self.is_tor || self.fraud_score >= FRAUD_SCORE_THRESHOLD
    }

    /// Recompute `message` from the current flags
    pub fn with_summary(mut self) -> Self {
        self.message = if self.is_anonymized() {
            ANONYMIZED_MESSAGE
        } else {
            CLEAN_MESSAGE
        }
        .to_string();
        self
    }
}

/// String at a JSON pointer, or `""` when absent or not a string
pub fn json_str(json: &Value, pointer: &str) -> String {
    json.pointer(pointer)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Float at a JSON pointer, accepting numbers and numeric strings, else `0.0`
pub fn json_f64(json: &Value, pointer: &str) -> f64 {
    match json.pointer(pointer) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Bool at a JSON pointer, or `false` when absent or not a bool
pub fn json_bool(json: &Value, pointer: &str) -> bool {
    json.pointer(pointer)
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Score at a JSON pointer clamped to 0–100, or `0` when absent
pub fn json_score(json: &Value, pointer: &str) -> u8 {
    json_f64(json, pointer).clamp(0.0, 100.0).round() as u8
}
