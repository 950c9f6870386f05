//! Contract Test: Geolocation Waterfall
//!
//! Constraints verified:
//! - Providers are tried strictly in order, one at a time
//! - The first success wins and later providers are never invoked
//! - Proxy headers take precedence over the echo service
//! - A provider that does not answer in time counts as unavailable
//!
//! If this test fails, the fallback policy has leaked into providers or
//! the ordering guarantee is broken.

mod common;

use common::*;
use myip_core::{ClientContext, IpResolver, IpVersion, ResolutionSource};

#[tokio::test]
async fn primary_failure_falls_back_to_secondary_only() {
    let primary = MockGeoProvider::failing("primary");
    let secondary = MockGeoProvider::succeeding("secondary", "Lisbon");
    let tertiary = MockGeoProvider::succeeding("tertiary", "Oslo");

    let resolver = IpResolver::new(
        Box::new(MockIpEcho::returning("203.0.113.7")),
        vec![
            Box::new(MockGeoProvider::sharing_counters_with(&primary)),
            Box::new(MockGeoProvider::sharing_counters_with(&secondary)),
            Box::new(MockGeoProvider::sharing_counters_with(&tertiary)),
        ],
        &resolver_config(),
    )
    .expect("resolver construction succeeds");

    let resolution = resolver.resolve(&ClientContext::default()).await;

    assert_eq!(resolution.source, ResolutionSource::Provider("secondary"));
    assert_eq!(resolution.record.city, "Lisbon");
    assert_eq!(resolution.record.organization, "secondary ISP");

    assert_eq!(primary.call_count(), 1);
    assert_eq!(secondary.call_count(), 1);
    assert_eq!(tertiary.call_count(), 0, "tertiary must not be invoked");
}

#[tokio::test]
async fn primary_success_stops_the_waterfall() {
    let primary = MockGeoProvider::succeeding("primary", "Berlin");
    let secondary = MockGeoProvider::succeeding("secondary", "Lisbon");

    let resolver = IpResolver::new(
        Box::new(MockIpEcho::returning("203.0.113.7")),
        vec![
            Box::new(MockGeoProvider::sharing_counters_with(&primary)),
            Box::new(MockGeoProvider::sharing_counters_with(&secondary)),
        ],
        &resolver_config(),
    )
    .expect("resolver construction succeeds");

    let resolution = resolver.resolve(&ClientContext::default()).await;

    assert_eq!(resolution.record.city, "Berlin");
    assert_eq!(secondary.call_count(), 0);
}

#[tokio::test]
async fn header_address_skips_echo_service() {
    let echo = MockIpEcho::returning("198.51.100.1");
    let primary = MockGeoProvider::succeeding("primary", "Berlin");

    let resolver = IpResolver::new(
        Box::new(MockIpEcho::sharing_counters_with(&echo)),
        vec![Box::new(MockGeoProvider::sharing_counters_with(&primary))],
        &resolver_config(),
    )
    .expect("resolver construction succeeds");

    let ctx = ClientContext::forwarded_for("2001:db8::7, 10.0.0.1");
    let resolution = resolver.resolve(&ctx).await;

    assert_eq!(echo.call_count(), 0, "echo must not be called when headers carry the address");
    assert_eq!(primary.looked_up(), vec!["2001:db8::7"]);
    assert_eq!(resolution.record.ip, "2001:db8::7");
    assert_eq!(resolution.record.version, IpVersion::V6);
}

#[tokio::test]
async fn echo_address_used_without_headers() {
    let echo = MockIpEcho::returning("198.51.100.1");
    let primary = MockGeoProvider::succeeding("primary", "Berlin");

    let resolver = IpResolver::new(
        Box::new(MockIpEcho::sharing_counters_with(&echo)),
        vec![Box::new(MockGeoProvider::sharing_counters_with(&primary))],
        &resolver_config(),
    )
    .expect("resolver construction succeeds");

    let resolution = resolver.resolve(&ClientContext::default()).await;

    assert_eq!(echo.call_count(), 1);
    assert_eq!(primary.looked_up(), vec!["198.51.100.1"]);
    assert_eq!(resolution.record.version, IpVersion::V4);
}

#[tokio::test(start_paused = true)]
async fn hanging_provider_times_out_and_falls_through() {
    let secondary = MockGeoProvider::succeeding("secondary", "Lisbon");

    let resolver = IpResolver::new(
        Box::new(MockIpEcho::returning("203.0.113.7")),
        vec![
            Box::new(HangingGeoProvider),
            Box::new(MockGeoProvider::sharing_counters_with(&secondary)),
        ],
        &resolver_config(),
    )
    .expect("resolver construction succeeds");

    let resolution = resolver.resolve(&ClientContext::default()).await;

    assert_eq!(resolution.source, ResolutionSource::Provider("secondary"));
    assert_eq!(secondary.call_count(), 1);
}

#[test]
fn resolver_requires_a_provider() {
    let result = IpResolver::new(
        Box::new(MockIpEcho::returning("203.0.113.7")),
        Vec::new(),
        &resolver_config(),
    );
    assert!(result.is_err());
}
