//! Fixed-delay pacing for sequential model calls.

use std::time::Duration;

/// Enforces a fixed delay between consecutive calls in a batch loop.
///
/// The first call is never delayed; every subsequent [`pause`](Self::pause)
/// sleeps for the configured interval. Calls are strictly sequential — this
/// is a politeness delay against an external rate limit, not a concurrency
/// primitive.
#[derive(Debug)]
pub struct Pacer {
    delay: Duration,
    first: bool,
}

impl Pacer {
    #[must_use]
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            first: true,
        }
    }

    /// Wait out the inter-call delay. No-op before the first call and when
    /// the delay is zero.
    pub async fn pause(&mut self) {
        if self.first {
            self.first = false;
            return;
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}
