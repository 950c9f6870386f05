// # IP Echo Trait
//
// Defines the interface for discovering the caller's public address when
// no proxy header carries it.
//
// ## Implementations
//
// - HTTP-based (ipify and compatible services): `myip-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use myip_core::IpEcho;
//
// let echo = /* IpEcho implementation */;
// let address = echo.discover().await?;
// ```

use async_trait::async_trait;

/// Trait for external IP discovery
///
/// Implementations perform exactly one upstream call per invocation.
/// Caching and fallback are owned by [`crate::IpResolver`].
#[async_trait]
pub trait IpEcho: Send + Sync {
    /// Ask the external service which address it sees
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The discovered address in textual form
    /// - `Err(Error)`: Network failure, non-success status or unparsable body
    async fn discover(&self) -> Result<String, crate::Error>;
}

/// Helper trait for constructing IP echo sources from configuration
pub trait IpEchoFactory: Send + Sync {
    /// Create an IpEcho instance from configuration
    fn create(
        &self,
        config: &crate::config::IpEchoConfig,
        timeout: std::time::Duration,
    ) -> Result<Box<dyn IpEcho>, crate::Error>;
}
