use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::record::IpRecord;

/// Single-slot record cache
///
/// Holds at most one [`IpRecord`] together with the instant it was stored.
///
/// # Example
///
/// ```rust,no_run
/// use myip_core::cache::RecordSlot;
/// use myip_core::IpRecord;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let slot = RecordSlot::new();
///     slot.store(IpRecord::empty("203.0.113.7")).await;
///
///     let fresh = slot.fresh(Duration::from_secs(60)).await;
///     assert!(fresh.is_some());
/// }
/// ```
#[derive(Debug, Default)]
pub struct RecordSlot {
    inner: RwLock<Option<(IpRecord, Instant)>>,
}

impl RecordSlot {
    /// Create an empty slot
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached record, only if it is younger than `window`
    pub async fn fresh(&self, window: Duration) -> Option<IpRecord> {
        let guard = self.inner.read().await;
        guard
            .as_ref()
            .filter(|(_, captured)| captured.elapsed() < window)
            .map(|(record, _)| record.clone())
    }

    /// The cached record regardless of age
    pub async fn last(&self) -> Option<IpRecord> {
        let guard = self.inner.read().await;
        guard.as_ref().map(|(record, _)| record.clone())
    }

    /// Overwrite the slot, stamping it with the current instant
    pub async fn store(&self, record: IpRecord) {
        let mut guard = self.inner.write().await;
        *guard = Some((record, Instant::now()));
    }

    /// Drop the cached record
    pub async fn clear(&self) {
        let mut guard = self.inner.write().await;
        *guard = None;
    }
}
