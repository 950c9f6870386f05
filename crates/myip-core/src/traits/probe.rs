use async_trait::async_trait;

use crate::probe::{PingResult, TracerouteResult};

/// Network diagnostics behind the `/ping` and `/traceroute` endpoints
///
/// The only implementation today is [`crate::SimulatedProbe`], which
/// fabricates output. A real prober can be dropped in behind this trait
/// without changing the response contract.
#[async_trait]
pub trait NetworkProbe: Send + Sync {
    /// Single round-trip probe against `target`
    async fn ping(&self, target: &str) -> Result<PingResult, crate::Error>;

    /// Multi-hop path probe against `target`
    async fn traceroute(&self, target: &str) -> Result<TracerouteResult, crate::Error>;
}
