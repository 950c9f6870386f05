//! Route handlers
//!
//! Handlers are thin: extract parameters, call into `myip-core`, serialize.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use myip_core::address::parse_address;
use myip_core::{BlacklistResult, ClientContext, IpRecord, PingResult, TracerouteResult};
use serde_json::{Value, json};
use tracing::{debug, error};

use crate::AppState;
use crate::error::ApiError;

const IP_REQUIRED: &str = "IP address is required";
const TARGET_REQUIRED: &str = "Target is required";

/// Raw query pairs, in order; repeated keys are kept
pub type QueryPairs = Vec<(String, String)>;

/// First value of `name`, matching `URLSearchParams::get`
///
/// An undecodable query string is a 400 with a JSON body rather than
/// axum's plain-text rejection.
pub fn query_param(
    query: Result<Query<QueryPairs>, QueryRejection>,
    name: &str,
) -> Result<Option<String>, ApiError> {
    let Query(pairs) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    Ok(pairs.into_iter().find(|(key, _)| key == name).map(|(_, value)| value))
}

/// Copy the headers the service cares about into a [`ClientContext`]
pub fn context_from_headers(headers: &HeaderMap) -> ClientContext {
    let value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    ClientContext {
        x_forwarded_for: value("x-forwarded-for"),
        x_real_ip: value("x-real-ip"),
        user_agent: value(header::USER_AGENT.as_str()),
        accept_language: value(header::ACCEPT_LANGUAGE.as_str()),
    }
}

/// Trimmed, non-empty parameter value
fn required(value: Option<String>, message: &str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::bad_request(message))
}

pub async fn ip_info(State(state): State<AppState>, headers: HeaderMap) -> Json<IpRecord> {
    let context = context_from_headers(&headers);
    let resolution = state.resolver.resolve(&context).await;
    debug!("ip-info served from {:?}", resolution.source);
    Json(resolution.record)
}

pub async fn blacklist_check(
    State(state): State<AppState>,
    query: Result<Query<QueryPairs>, QueryRejection>,
) -> Result<Json<BlacklistResult>, ApiError> {
    let address = required(query_param(query, "ip")?, IP_REQUIRED)?;

    match state.blacklist.check(&address).await {
        Ok(result) => Ok(Json(result)),
        Err(e) if e.is_invalid_input() => Err(ApiError::bad_request(e.to_string())),
        Err(e) => {
            error!("Blacklist check for {} failed: {}", address, e);
            Err(ApiError::Internal("Failed to check blacklist"))
        }
    }
}

/// Reputation lookup for `?ip=`, or the caller's own address from proxy
/// headers when the parameter is absent
///
/// An explicit `?ip=` must be an IP address; header values that are not
/// are ignored by [`ClientContext::client_address`].
pub async fn vpn_detect(
    State(state): State<AppState>,
    query: Result<Query<QueryPairs>, QueryRejection>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let context = context_from_headers(&headers);
    let requested = query_param(query, "ip")?.filter(|ip| !ip.trim().is_empty());

    let address = match requested {
        Some(ip) => parse_address(&ip)
            .map_err(|e| ApiError::bad_request(e.to_string()))?
            .to_string(),
        None => required(context.client_address(), IP_REQUIRED)?,
    };

    let record = state.reputation.lookup(&address, &context).await;
    let status = if record.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    Ok((status, Json(record)).into_response())
}

pub async fn ping(
    State(state): State<AppState>,
    query: Result<Query<QueryPairs>, QueryRejection>,
) -> Result<Json<PingResult>, ApiError> {
    let target = required(query_param(query, "target")?, TARGET_REQUIRED)?;

    state.probe.ping(&target).await.map(Json).map_err(|e| {
        error!("Ping to {} failed: {}", target, e);
        ApiError::Internal("Failed to execute ping")
    })
}

pub async fn traceroute(
    State(state): State<AppState>,
    query: Result<Query<QueryPairs>, QueryRejection>,
) -> Result<Json<TracerouteResult>, ApiError> {
    let target = required(query_param(query, "target")?, TARGET_REQUIRED)?;

    state.probe.traceroute(&target).await.map(Json).map_err(|e| {
        error!("Traceroute to {} failed: {}", target, e);
        ApiError::Internal("Failed to execute traceroute")
    })
}

pub async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
