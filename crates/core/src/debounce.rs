use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Generation-token debouncer. Every keystroke arms a fresh token and
/// invalidates all earlier ones; a token only "wins" if nothing newer was
/// armed while it waited out the quiet period. The same token is checked
/// again when a response lands, so a slow in-flight call can never
/// overwrite the result of a newer one.
pub struct Debouncer {
    delay: Duration,
    seq: AtomicU64,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            seq: AtomicU64::new(0),
        }
    }

    pub fn arm(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, token: u64) -> bool {
        self.seq.load(Ordering::SeqCst) == token
    }

    /// Wait out the quiet period; true when the token is still the latest.
    pub async fn settled(&self, token: u64) -> bool {
        tokio::time::sleep(self.delay).await;
        self.is_current(token)
    }
}
