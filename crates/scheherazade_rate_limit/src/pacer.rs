//! Fixed-interval pacing between model calls.
//!
//! Unlike window-based rate limiting, pacing only guarantees a minimum
//! gap between consecutive calls. The last-call timestamp is process-wide
//! and last-write-wins: a race between concurrent runs only affects
//! pacing precision, not correctness.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Millisecond timestamp of the most recent recorded call, measured from
/// the process epoch. Zero means no call has been recorded yet.
static LAST_CALL_MS: AtomicU64 = AtomicU64::new(0);

static PROCESS_EPOCH: OnceLock<Instant> = OnceLock::new();

fn now_ms() -> u64 {
    let epoch = PROCESS_EPOCH.get_or_init(Instant::now);
    epoch.elapsed().as_millis() as u64
}

/// Pacing configuration.
///
/// # Examples
///
/// ```
/// use scheherazade_rate_limit::PacingConfig;
///
/// let config = PacingConfig::default();
/// assert_eq!(config.min_interval_ms, 5_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PacingConfig {
    /// Minimum gap between consecutive model calls, in milliseconds
    pub min_interval_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: 5_000,
        }
    }
}

/// Enforces a minimum delay between consecutive model calls.
///
/// The delay is a blocking wait, not a retry. All pacers in a process
/// share one last-call timestamp, so two concurrent runs pace against
/// each other as the external rate limit expects.
///
/// # Example
///
/// ```no_run
/// use scheherazade_rate_limit::{Pacer, PacingConfig};
///
/// # #[tokio::main]
/// # async fn main() {
/// let pacer = Pacer::new(PacingConfig::default());
///
/// // Before each model call
/// pacer.pace().await;
/// // ... call the model ...
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Pacer {
    config: PacingConfig,
}

impl Pacer {
    /// Create a new pacer with the given configuration.
    pub fn new(config: PacingConfig) -> Self {
        debug!(
            min_interval_ms = config.min_interval_ms,
            "Creating pacer"
        );
        Self { config }
    }

    /// Wait until the minimum interval since the last recorded call has
    /// elapsed, then record this call.
    ///
    /// The first call in a process proceeds immediately.
    pub async fn pace(&self) {
        let last = LAST_CALL_MS.load(Ordering::Relaxed);
        let now = now_ms();

        if last > 0 {
            let elapsed = now.saturating_sub(last);
            if elapsed < self.config.min_interval_ms {
                let wait = self.config.min_interval_ms - elapsed;
                debug!(wait_ms = wait, "Pacing before model call");
                tokio::time::sleep(Duration::from_millis(wait)).await;
            }
        }

        // Last-write-wins; precision over strictness.
        LAST_CALL_MS.store(now_ms(), Ordering::Relaxed);
        trace!("Model call recorded for pacing");
    }

    /// Get the configured minimum interval.
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.config.min_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_call_is_immediate() {
        let pacer = Pacer::new(PacingConfig {
            min_interval_ms: 60_000,
        });
        // LAST_CALL_MS may have been touched by another test in this
        // process; only assert that an unrecorded pacer returns quickly
        // when the interval is zero.
        let zero = Pacer::new(PacingConfig { min_interval_ms: 0 });
        let start = Instant::now();
        zero.pace().await;
        assert!(start.elapsed() < Duration::from_millis(100));
        drop(pacer);
    }

    #[tokio::test]
    async fn test_second_call_waits() {
        let pacer = Pacer::new(PacingConfig {
            min_interval_ms: 50,
        });
        pacer.pace().await;
        let start = Instant::now();
        pacer.pace().await;
        assert!(
            start.elapsed() >= Duration::from_millis(40),
            "second call should wait out most of the interval"
        );
    }

    #[tokio::test]
    async fn test_interval_accessor() {
        let pacer = Pacer::new(PacingConfig {
            min_interval_ms: 250,
        });
        assert_eq!(pacer.min_interval(), Duration::from_millis(250));
    }
}
