use std::time::Duration;

use tokio::time::sleep;

/// Fixed delay applied between jobs in a batch so provider rate limits are
/// respected. The worker takes it as a component rather than sleeping
/// inline, which lets tests run with a zero delay or a paused clock.
#[derive(Debug, Clone)]
pub struct Pacer {
    delay: Duration,
}

impl Pacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// No-op pacer for tests.
    pub fn none() -> Self {
        Self::new(Duration::ZERO)
    }

    pub async fn pause(&self) {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn pauses_for_configured_delay() {
        let pacer = Pacer::from_millis(1500);
        let start = Instant::now();
        pacer.pause().await;
        assert!(start.elapsed() >= Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn zero_delay_returns_immediately() {
        Pacer::none().pause().await;
    }
}
