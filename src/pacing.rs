use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;

/// Longest backoff between retries of one page
pub const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Source of every delay in a session
///
/// Rate-limit delays are drawn here and all waits go through `pause`, so a
/// session can be run without real sleeps.
#[async_trait]
pub trait Pacer: Send {
    /// Pick a delay in `[min, max]`
    fn draw(&mut self, min: Duration, max: Duration) -> Duration;

    /// Wait for `delay`
    async fn pause(&mut self, delay: Duration);
}

/// Uniformly random delays and real sleeps
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPacer;

#[async_trait]
impl Pacer for RandomPacer {
    fn draw(&mut self, min: Duration, max: Duration) -> Duration {
        if max <= min {
            return min;
        }
        let secs = rand::rng().random_range(min.as_secs_f64()..=max.as_secs_f64());
        Duration::from_secs_f64(secs)
    }

    async fn pause(&mut self, delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Exponential backoff for the `attempt`-th retry (1-based), capped at [`MAX_BACKOFF`]
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    base.checked_mul(factor).unwrap_or(MAX_BACKOFF).min(MAX_BACKOFF)
}
