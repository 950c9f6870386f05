// # myipd - MyIP Daemon
//
// Thin integration layer: all lookup, caching and fallback logic lives in
// myip-core and the provider crates.
//
// The daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing tracing and the runtime
// 3. Registering providers and building the services
// 4. Serving HTTP until SIGINT/SIGTERM
//
// ## Configuration
//
// ### Server
// - `MYIP_BIND`: Listen address (default `0.0.0.0:3000`)
// - `MYIP_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ### IP info
// - `MYIP_GEO_PROVIDERS`: Waterfall order (default `ipgeolocation,ipapi,ipwhois`)
// - `MYIP_IPGEOLOCATION_API_KEY`: ipgeolocation.io key; the provider is skipped without it
// - `MYIP_ECHO_URL`: Echo service used when no proxy header is present
// - `MYIP_CACHE_SECS`: Freshness window of the cached record (default 60)
// - `MYIP_PROVIDER_TIMEOUT_SECS`: Per-upstream timeout, 1-30 (default 5)
//
// ### Reputation
// - `MYIP_IPQS_API_KEY`: IPQualityScore key; lookups fail without it
// - `MYIP_IPQS_STRICTNESS`: 0-2 (default 1)
// - `MYIP_REPUTATION_CACHE_SECS`: Per-address cache TTL (default 300)
//
// ### Blacklist
// - `MYIP_BLACKLIST_MODE`: `simulated` (default) or `dns`
//
// ## Example
//
// ```bash
// export MYIP_IPGEOLOCATION_API_KEY=your_key
// export MYIP_IPQS_API_KEY=your_key
// export MYIP_BIND=127.0.0.1:8080
//
// myipd
// ```

use anyhow::{Context, Result};
use myip_core::{
    BlacklistChecker, BlacklistMode, DnsblChecker, GeoProviderConfig, IpEchoConfig, IpResolver,
    NetworkProbe, ProviderRegistry, ReputationConfig, ReputationProviderConfig,
    ReputationService, ResolverConfig, ServiceConfig, SimulatedBlacklist, SimulatedProbe,
};
use myip_core::config::DEFAULT_GEO_PROVIDERS;
use myipd::{AppState, create_router};
use std::env;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum MyipExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<MyipExitCode> for ExitCode {
    fn from(code: MyipExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    bind: String,
    log_level: String,
    geo_providers: Vec<String>,
    ipgeolocation_api_key: Option<String>,
    echo_url: String,
    cache_secs: u64,
    provider_timeout_secs: u64,
    ipqs_api_key: Option<String>,
    ipqs_strictness: u8,
    reputation_cache_secs: u64,
    blacklist_mode: BlacklistMode,
}

/// Parse an optional numeric variable, falling back to `default` when unset
fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a number. Got: {}", name, raw)),
        _ => Ok(default),
    }
}

/// Non-empty variable value
fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Ok(Self {
            bind: env::var("MYIP_BIND").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            log_level: env::var("MYIP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            geo_providers: env::var("MYIP_GEO_PROVIDERS")
                .unwrap_or_else(|_| DEFAULT_GEO_PROVIDERS.join(","))
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            ipgeolocation_api_key: non_empty_var("MYIP_IPGEOLOCATION_API_KEY"),
            echo_url: env::var("MYIP_ECHO_URL")
                .unwrap_or_else(|_| myip_ip_http::DEFAULT_ECHO_URL.to_string()),
            cache_secs: parse_var("MYIP_CACHE_SECS", 60)?,
            provider_timeout_secs: parse_var("MYIP_PROVIDER_TIMEOUT_SECS", 5)?,
            ipqs_api_key: non_empty_var("MYIP_IPQS_API_KEY"),
            ipqs_strictness: parse_var("MYIP_IPQS_STRICTNESS", 1)?,
            reputation_cache_secs: parse_var("MYIP_REPUTATION_CACHE_SECS", 300)?,
            blacklist_mode: env::var("MYIP_BLACKLIST_MODE")
                .map(|s| BlacklistMode::from_str(&s))
                .unwrap_or(Ok(BlacklistMode::Simulated))?,
        })
    }

    /// Validate the configuration
    ///
    /// Checks the values the core config types cannot see: listen address,
    /// provider names, numeric ranges and the log level.
    fn validate(&self) -> Result<()> {
        self.bind.parse::<SocketAddr>().with_context(|| {
            format!("MYIP_BIND must be a socket address like 0.0.0.0:3000. Got: {}", self.bind)
        })?;

        if self.geo_providers.is_empty() {
            anyhow::bail!(
                "MYIP_GEO_PROVIDERS must name at least one provider. \
                Supported providers: ipgeolocation, ipapi, ipwhois"
            );
        }

        for name in &self.geo_providers {
            GeoProviderConfig::builtin(name, None).context("Invalid MYIP_GEO_PROVIDERS")?;
        }

        if !(1..=30).contains(&self.provider_timeout_secs) {
            anyhow::bail!(
                "MYIP_PROVIDER_TIMEOUT_SECS must be between 1 and 30 seconds. Got: {}",
                self.provider_timeout_secs
            );
        }

        if self.ipqs_strictness > 2 {
            anyhow::bail!(
                "MYIP_IPQS_STRICTNESS must be between 0 and 2. Got: {}",
                self.ipqs_strictness
            );
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "MYIP_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    /// Geolocation waterfall, skipping ipgeolocation.io when no key is set
    fn geo_provider_configs(&self) -> Vec<GeoProviderConfig> {
        let key = self.ipgeolocation_api_key.as_deref();

        self.geo_providers
            .iter()
            .filter_map(|name| match GeoProviderConfig::builtin(name, key) {
                Ok(Some(config)) => Some(config),
                Ok(None) => {
                    warn!("MYIP_IPGEOLOCATION_API_KEY not set, skipping {}", name);
                    None
                }
                Err(_) => None,
            })
            .collect()
    }

    /// Translate into the core service configuration
    fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            resolver: ResolverConfig {
                echo: IpEchoConfig::Http {
                    url: self.echo_url.clone(),
                },
                providers: self.geo_provider_configs(),
                freshness_secs: self.cache_secs,
                provider_timeout_secs: self.provider_timeout_secs,
            },
            reputation: ReputationConfig {
                provider: ReputationProviderConfig::IpQualityScore {
                    api_key: self.ipqs_api_key.clone().unwrap_or_default(),
                    strictness: self.ipqs_strictness,
                    allow_public_access_points: true,
                    base_url: None,
                },
                ttl_secs: self.reputation_cache_secs,
                provider_timeout_secs: self.provider_timeout_secs,
                ..ReputationConfig::default()
            },
            blacklist: self.blacklist_mode,
        }
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return MyipExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return MyipExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return MyipExitCode::ConfigError.into();
    }

    info!("Starting myipd");

    // Build services before binding so bad provider setup fails fast
    let state = match build_state(&config) {
        Ok(state) => state,
        Err(e) => {
            error!("Startup error: {:#}", e);
            return MyipExitCode::ConfigError.into();
        }
    };

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return MyipExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = serve(&config.bind, state).await {
            error!("Daemon error: {:#}", e);
            MyipExitCode::RuntimeError
        } else {
            MyipExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Register providers and assemble the shared services
fn build_state(config: &Config) -> Result<AppState> {
    let service = config.service_config();
    service.validate()?;

    let registry = ProviderRegistry::new();
    myip_ip_http::register(&registry);
    myip_provider_geo::register(&registry);
    myip_provider_ipqs::register(&registry);

    let timeout = service.resolver.provider_timeout();

    let echo = registry.create_ip_echo(&service.resolver.echo, timeout)?;
    let providers = registry.create_waterfall(&service.resolver.providers, timeout)?;
    let resolver = IpResolver::new(echo, providers, &service.resolver)?;
    info!("Geolocation waterfall: {}", resolver.provider_names().join(" -> "));

    let reputation_provider = registry
        .create_reputation_provider(&service.reputation.provider, service.reputation.provider_timeout())?;
    let reputation = ReputationService::new(reputation_provider, &service.reputation);
    info!("Reputation provider: {}", reputation.provider_name());

    let blacklist: Arc<dyn BlacklistChecker> = match service.blacklist {
        BlacklistMode::Simulated => Arc::new(SimulatedBlacklist::new()),
        BlacklistMode::Dns => Arc::new(DnsblChecker::with_default_zones(timeout)),
    };
    info!("Blacklist mode: {:?}", service.blacklist);

    let probe: Arc<dyn NetworkProbe> = Arc::new(SimulatedProbe::new());

    Ok(AppState {
        resolver: Arc::new(resolver),
        reputation: Arc::new(reputation),
        probe,
        blacklist,
    })
}

/// Bind and serve until a shutdown signal arrives
async fn serve(bind: &str, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind to {}", bind))?;

    info!("Listening on {}", bind);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down daemon");
    Ok(())
}

/// Wait for SIGTERM or SIGINT
///
/// If a handler cannot be installed the error is logged and only the
/// remaining signal is awaited.
#[cfg(unix)]
async fn shutdown_signal() {
    let wait = |kind: SignalKind, name: &'static str| async move {
        match signal(kind) {
            Ok(mut stream) => {
                stream.recv().await;
                name
            }
            Err(e) => {
                error!("Failed to setup {} handler: {}", name, e);
                std::future::pending().await
            }
        }
    };

    let received = tokio::select! {
        name = wait(SignalKind::terminate(), "SIGTERM") => name,
        name = wait(SignalKind::interrupt(), "SIGINT") => name,
    };

    info!("Received shutdown signal: {}", received);
}

/// Wait for SIGINT
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal: SIGINT"),
        Err(e) => {
            error!("Failed to wait for CTRL-C: {}", e);
            std::future::pending::<()>().await
        }
    }
}
