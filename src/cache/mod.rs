/// in-memory key-value cache served by a background worker.
/// use cases:
/// * spot-cache for semi-static configuration settings shared between threads
/// * stand-in for a remote cache (e.g., redis) behind the same `KeyValueStore` interface
///
/// The worker owns the map and answers request/response commands over a channel, so
/// callers talk to it the same way they would talk to a remote store.
///
pub mod store;
pub mod worker;

pub use store::CacheStore;
