// # Simulated Probe
//
// FIXTURE: no packets are sent. Round-trip times and hop addresses are
// drawn from a PRNG and formatted to look like the output of the standard
// `ping` / `traceroute` tools. Swap in a real `NetworkProbe` to get real
// measurements; the response shape stays the same.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

use super::{PingResult, TracerouteHop, TracerouteResult};
use crate::error::Result;
use crate::traits::NetworkProbe;

/// Probability that a simulated ping succeeds
pub const PING_SUCCESS_PROBABILITY: f64 = 0.9;

/// Inclusive hop-count range of a simulated traceroute
pub const MIN_HOPS: u32 = 5;
pub const MAX_HOPS: u32 = 12;

/// Fabricated `NetworkProbe` implementation
pub struct SimulatedProbe {
    rng: Mutex<StdRng>,
}

impl SimulatedProbe {
    /// Create a probe seeded from the OS entropy source
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Create a deterministic probe (for tests)
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        // A poisoned PRNG is still a usable PRNG
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut rng)
    }

    /// Generate a ping transcript for `target`
    pub fn simulate_ping(&self, target: &str) -> PingResult {
        let (success, time) = self.with_rng(|rng| {
            (
                rng.random_bool(PING_SUCCESS_PROBABILITY),
                rng.random_range(10..110u32),
            )
        });

        let output = if success {
            ping_transcript(target, time)
        } else {
            vec![format!("Request timed out for {}", target)]
        };

        PingResult {
            target: target.to_string(),
            success,
            time,
            output,
        }
    }

    /// Generate a traceroute transcript for `target`
    pub fn simulate_traceroute(&self, target: &str) -> TracerouteResult {
        let hops: Vec<TracerouteHop> = self.with_rng(|rng| {
            let count = rng.random_range(MIN_HOPS..=MAX_HOPS);
            (1..=count)
                .map(|hop| TracerouteHop {
                    hop,
                    host: if hop == count {
                        target.to_string()
                    } else {
                        format!("router-{}.example.com", hop)
                    },
                    ip: format!(
                        "192.168.{}.{}",
                        rng.random_range(0..255u8),
                        rng.random_range(0..255u8)
                    ),
                    time: rng.random_range(5..105u32),
                })
                .collect()
        });

        let mut output = Vec::with_capacity(hops.len() + 1);
        output.push(format!(
            "traceroute to {}, 30 hops max, 60 byte packets",
            target
        ));
        output.extend(hops.iter().map(|h| {
            format!(
                "{}  {} ({})  {}.123 ms  {}.456 ms  {}.789 ms",
                h.hop,
                h.host,
                h.ip,
                h.time,
                h.time + 1,
                h.time - 1
            )
        }));

        TracerouteResult {
            target: target.to_string(),
            success: true,
            hops,
            output,
        }
    }
}

impl Default for SimulatedProbe {
    fn default() -> Self {
        Self::new()
    }
}

fn ping_transcript(target: &str, time: u32) -> Vec<String> {
    vec![
        format!("PING {} ({}): 56 data bytes", target, target),
        format!(
            "64 bytes from {}: icmp_seq=0 ttl=55 time={}.123 ms",
            target, time
        ),
        format!(
            "64 bytes from {}: icmp_seq=1 ttl=55 time={}.456 ms",
            target,
            time + 2
        ),
        format!(
            "64 bytes from {}: icmp_seq=2 ttl=55 time={}.789 ms",
            target,
            time - 1
        ),
        format!(
            "64 bytes from {}: icmp_seq=3 ttl=55 time={}.012 ms",
            target,
            time + 1
        ),
        String::new(),
        format!("--- {} ping statistics ---", target),
        "4 packets transmitted, 4 packets received, 0.0% packet loss".to_string(),
        format!(
            "round-trip min/avg/max/stddev = {}.789/{}.845/{}.456/1.234 ms",
            time - 1,
            time,
            time + 2
        ),
    ]
}

#[async_trait]
impl NetworkProbe for SimulatedProbe {
    async fn ping(&self, target: &str) -> Result<PingResult> {
        Ok(self.simulate_ping(target))
    }

    async fn traceroute(&self, target: &str) -> Result<TracerouteResult> {
        Ok(self.simulate_traceroute(target))
    }
}
