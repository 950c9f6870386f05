//! Test doubles and common utilities for resolution contract tests
//!
//! These doubles count calls so tests can assert exactly which upstreams
//! were contacted, without any network I/O.

#![allow(dead_code)]

use myip_core::error::{Error, Result};
use myip_core::traits::{GeoProvider, IpEcho, ReputationProvider};
use myip_core::{ClientContext, IpRecord, ReputationRecord, ResolverConfig};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// An IpEcho that returns a fixed address, or fails on demand
pub struct MockIpEcho {
    address: Option<String>,
    call_count: Arc<AtomicUsize>,
}

impl MockIpEcho {
    pub fn returning(address: &str) -> Self {
        Self {
            address: Some(address.to_string()),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self {
            address: None,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the number of times discover() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Create a new MockIpEcho that shares counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            address: other.address.clone(),
            call_count: Arc::clone(&other.call_count),
        }
    }
}

#[async_trait::async_trait]
impl IpEcho for MockIpEcho {
    async fn discover(&self) -> Result<String> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.address
            .clone()
            .ok_or_else(|| Error::ip_discovery("echo service unavailable"))
    }
}

/// A GeoProvider that tracks calls and can be switched between success and failure
pub struct MockGeoProvider {
    pub name: &'static str,
    /// City reported on success, used to tell providers apart
    city: &'static str,
    failing: Arc<AtomicBool>,
    call_count: Arc<AtomicUsize>,
    looked_up: Arc<std::sync::Mutex<Vec<String>>>,
}

impl MockGeoProvider {
    pub fn succeeding(name: &'static str, city: &'static str) -> Self {
        Self {
            name,
            city,
            failing: Arc::new(AtomicBool::new(false)),
            call_count: Arc::new(AtomicUsize::new(0)),
            looked_up: Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }

    pub fn failing(name: &'static str) -> Self {
        let provider = Self::succeeding(name, "");
        provider.set_failing(true);
        provider
    }

    /// Switch the provider between failing and succeeding
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Get the number of times lookup() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Get the addresses passed to lookup()
    pub fn looked_up(&self) -> Vec<String> {
        self.looked_up.lock().unwrap().clone()
    }

    /// Create a new MockGeoProvider that shares state with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            name: other.name,
            city: other.city,
            failing: Arc::clone(&other.failing),
            call_count: Arc::clone(&other.call_count),
            looked_up: Arc::clone(&other.looked_up),
        }
    }
}

#[async_trait::async_trait]
impl GeoProvider for MockGeoProvider {
    async fn lookup(&self, address: &str) -> Result<IpRecord> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.looked_up.lock().unwrap().push(address.to_string());

        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::provider(self.name, "HTTP error: 503 Service Unavailable"));
        }

        Ok(IpRecord {
            city: self.city.to_string(),
            organization: format!("{} ISP", self.name),
            latitude: 52.52,
            longitude: 13.405,
            ..IpRecord::empty(address)
        })
    }

    fn provider_name(&self) -> &'static str {
        self.name
    }
}

/// A GeoProvider that never answers
pub struct HangingGeoProvider;

#[async_trait::async_trait]
impl GeoProvider for HangingGeoProvider {
    async fn lookup(&self, _address: &str) -> Result<IpRecord> {
        std::future::pending().await
    }

    fn provider_name(&self) -> &'static str {
        "hanging"
    }
}

/// A ReputationProvider that tracks calls
pub struct MockReputationProvider {
    failing: Arc<AtomicBool>,
    call_count: Arc<AtomicUsize>,
    last_context: Arc<std::sync::Mutex<Option<ClientContext>>>,
}

impl MockReputationProvider {
    pub fn new() -> Self {
        Self {
            failing: Arc::new(AtomicBool::new(false)),
            call_count: Arc::new(AtomicUsize::new(0)),
            last_context: Arc::new(std::sync::Mutex::new(None)),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn last_context(&self) -> Option<ClientContext> {
        self.last_context.lock().unwrap().clone()
    }

    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            failing: Arc::clone(&other.failing),
            call_count: Arc::clone(&other.call_count),
            last_context: Arc::clone(&other.last_context),
        }
    }
}

#[async_trait::async_trait]
impl ReputationProvider for MockReputationProvider {
    async fn lookup(&self, address: &str, context: &ClientContext) -> Result<ReputationRecord> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        *self.last_context.lock().unwrap() = Some(context.clone());

        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::provider("mock", "HTTP error: 429 Too Many Requests"));
        }

        Ok(ReputationRecord {
            is_vpn: true,
            fraud_score: 88,
            isp: "Mock Hosting".to_string(),
            ..ReputationRecord::clean(address)
        }
        .with_summary())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Resolver config with the standard 60 s window and a short timeout
pub fn resolver_config() -> ResolverConfig {
    ResolverConfig {
        freshness_secs: 60,
        provider_timeout_secs: 2,
        ..ResolverConfig::default()
    }
}
