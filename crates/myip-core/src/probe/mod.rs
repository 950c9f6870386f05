//! Network diagnostics
//!
//! Response types shared by every [`crate::NetworkProbe`] implementation,
//! plus the [`SimulatedProbe`] fixture.

mod simulated;

pub use simulated::SimulatedProbe;

use serde::{Deserialize, Serialize};

/// Result of a single-target ping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingResult {
    pub target: String,
    pub success: bool,
    /// Round-trip time in milliseconds
    pub time: u32,
    /// Transcript in the style of the `ping` command-line tool
    pub output: Vec<String>,
}

/// One hop of a traceroute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TracerouteHop {
    /// 1-based hop number
    pub hop: u32,
    pub host: String,
    pub ip: String,
    /// Round-trip time in milliseconds
    pub time: u32,
}

/// Result of a traceroute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TracerouteResult {
    pub target: String,
    pub success: bool,
    pub hops: Vec<TracerouteHop>,
    /// Header line followed by one line per hop
    pub output: Vec<String>,
}
