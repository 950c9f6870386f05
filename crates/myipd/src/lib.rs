// # myipd
//
// HTTP surface of the MyIP service. The library half exposes the router so
// it can be exercised in-process; `main.rs` only wires configuration,
// providers and the listener.
//
// ## Routes
//
// | Path               | Alias                | Query     |
// |--------------------|----------------------|-----------|
// | `/ip-info`         | `/api/ip`            |           |
// | `/blacklist-check` | `/api/blacklist`     | `ip`      |
// | `/vpn-detect`      | `/api/vpn-detect`    | `ip`      |
// | `/ping`            | `/api/ping`          | `target`  |
// | `/traceroute`      | `/api/traceroute`    | `target`  |
// | `/healthz`         |                      |           |

pub mod error;
pub mod handlers;

use axum::{Router, routing::get};
use myip_core::{BlacklistChecker, IpResolver, NetworkProbe, ReputationService};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use handlers::context_from_headers;

/// Services shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<IpResolver>,
    pub reputation: Arc<ReputationService>,
    pub probe: Arc<dyn NetworkProbe>,
    pub blacklist: Arc<dyn BlacklistChecker>,
}

/// Build the application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/ip-info", get(handlers::ip_info))
        .route("/api/ip", get(handlers::ip_info))
        .route("/blacklist-check", get(handlers::blacklist_check))
        .route("/api/blacklist", get(handlers::blacklist_check))
        .route("/vpn-detect", get(handlers::vpn_detect))
        .route("/api/vpn-detect", get(handlers::vpn_detect))
        .route("/ping", get(handlers::ping))
        .route("/api/ping", get(handlers::ping))
        .route("/traceroute", get(handlers::traceroute))
        .route("/api/traceroute", get(handlers::traceroute))
        .route("/healthz", get(handlers::healthz))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
