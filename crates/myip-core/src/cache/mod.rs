// # In-Process Caches
//
// Two explicit cache objects, each owned by the service that uses it:
//
// - [`RecordSlot`]: single record + capture time (IP-info flow)
// - [`KeyedCache`]: per-address map with TTL and capacity (reputation flow)
//
// ## Crash Behavior
//
// - All entries are lost on restart
// - Nothing is persisted; the first request after a restart goes upstream
//
// ## Concurrency
//
// Concurrent writers race with last-writer-wins semantics. Locks are held
// only for the duration of a map/slot access, never across an upstream call.
// A reader may observe a record that is being replaced; the data is advisory.
//
// Timestamps use `tokio::time::Instant` so tests can drive expiry with a
// paused clock.

mod keyed;
mod slot;

pub use keyed::KeyedCache;
pub use slot::RecordSlot;
