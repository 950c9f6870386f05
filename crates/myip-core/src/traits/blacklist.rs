use async_trait::async_trait;

use crate::blacklist::BlacklistResult;

/// DNSBL listing check for a single address
#[async_trait]
pub trait BlacklistChecker: Send + Sync {
    /// Check `address` against every configured blacklist
    ///
    /// # Returns
    ///
    /// - `Ok(BlacklistResult)`: Listing status (listed or not)
    /// - `Err(Error::InvalidInput)`: The checker cannot handle this address
    /// - `Err(_)`: Internal failure
    async fn check(&self, address: &str) -> Result<BlacklistResult, crate::Error>;
}
