// # myip-core
//
// Core library for the MyIP information service.
//
// ## Architecture Overview
//
// This library provides everything the daemon needs apart from the HTTP
// plumbing itself:
// - **IpEcho**: Trait for discovering the caller's address from an external service
// - **GeoProvider**: Trait for geolocation lookups (one implementation per upstream API)
// - **ReputationProvider**: Trait for VPN/proxy/fraud lookups
// - **IpResolver**: Orchestrates the echo → geolocation waterfall → cache flow
// - **ReputationService**: Per-address cached reputation lookups
// - **ProviderRegistry**: Plugin-based registry for providers
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Orchestration lives here, upstream APIs live in provider crates
// 2. **Plugin-Based**: Providers are registered by name, the waterfall order is configuration
// 3. **Library-First**: The daemon is a thin layer over this crate
// 4. **Explicit State**: Caches are owned by the services, never global

pub mod address;
pub mod blacklist;
pub mod cache;
pub mod config;
pub mod error;
pub mod probe;
pub mod record;
pub mod registry;
pub mod reputation;
pub mod resolver;
pub mod traits;

// Re-export core types for convenience
pub use address::ClientContext;
pub use blacklist::{BlacklistResult, DnsblChecker, SimulatedBlacklist};
pub use cache::{KeyedCache, RecordSlot};
pub use config::{
    BlacklistMode, GeoProviderConfig, IpEchoConfig, ReputationConfig, ReputationProviderConfig,
    ResolverConfig, ServiceConfig,
};
pub use error::{Error, Result};
pub use probe::{PingResult, SimulatedProbe, TracerouteHop, TracerouteResult};
pub use record::{IpRecord, IpVersion, ReputationRecord};
pub use registry::ProviderRegistry;
pub use reputation::ReputationService;
pub use resolver::{IpResolver, Resolution, ResolutionSource};
pub use traits::{BlacklistChecker, GeoProvider, IpEcho, NetworkProbe, ReputationProvider};
