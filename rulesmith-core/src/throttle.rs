//! Rate scheduling for the metered classifier service.
//!
//! A single [`RateLimiter`] is instantiated per inference run and passed
//! by mutable reference into every recognizer invocation. It is never
//! process-wide state: the run owns it exclusively, and since the run is
//! strictly sequential no synchronization is needed beyond `&mut`.

use std::time::Duration;
use tokio::time::Instant;

use crate::config::DEFAULT_REQUESTS_PER_MINUTE;

/// Enforces a minimum inter-call delay for classifier requests.
///
/// Given a requests-per-minute budget, consecutive calls are separated by
/// at least `60000ms / RPM`, measured from the completion of the previous
/// call ([`mark`](RateLimiter::mark)) to the admission of the next
/// ([`acquire`](RateLimiter::acquire)).
#[derive(Debug)]
pub struct RateLimiter {
    delay: Duration,
    last_call: Option<Instant>,
}

impl RateLimiter {
    /// Creates a limiter for the given budget, falling back to the
    /// conservative default when unspecified.
    pub fn new(requests_per_minute: Option<u32>) -> Self {
        let rpm = requests_per_minute
            .filter(|rpm| *rpm > 0)
            .unwrap_or(DEFAULT_REQUESTS_PER_MINUTE);
        Self {
            delay: Duration::from_millis(60_000 / u64::from(rpm)),
            last_call: None,
        }
    }

    /// Minimum spacing between consecutive calls.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Waits until the budget admits the next call.
    ///
    /// The first call in a run is admitted immediately; subsequent calls
    /// sleep out whatever remains of the inter-call delay.
    pub async fn acquire(&mut self) {
        if let Some(last) = self.last_call {
            let elapsed = last.elapsed();
            if elapsed < self.delay {
                let wait = self.delay - elapsed;
                tracing::debug!(wait_ms = wait.as_millis() as u64, "throttling classifier call");
                tokio::time::sleep(wait).await;
            }
        }
    }

    /// Records the completion of a call. Must be called after every
    /// classifier request, whether it succeeded or failed.
    pub fn mark(&mut self) {
        self.last_call = Some(Instant::now());
    }
}
