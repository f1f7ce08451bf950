//! Source data loader.

// == Getter ==
/// Loads the value for a key from the source of truth.
///
/// Called on a cache miss when no remote peer can serve the key. The call
/// may block; it runs on the blocking thread pool. Any plain function or
/// closure with the matching signature is a `Getter`.
pub trait Getter: Send + Sync + 'static {
    fn get(&self, key: &str) -> anyhow::Result<Vec<u8>>;
}

impl<F> Getter for F
where
    F: Fn(&str) -> anyhow::Result<Vec<u8>> + Send + Sync + 'static,
{
    fn get(&self, key: &str) -> anyhow::Result<Vec<u8>> {
        self(key)
    }
}
