//! Courtesy pacing before provider calls.
//!
//! The delay exists to keep request timing irregular and under the
//! provider's throttling radar. It is a policy seam so tests run without
//! real sleeps.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::debug;

#[async_trait]
pub trait PacingPolicy: Send + Sync {
    async fn pause(&self);
}

/// Uniformly random delay within `[min, max]`.
#[derive(Debug, Clone)]
pub struct RandomDelay {
    min: Duration,
    max: Duration,
}

impl RandomDelay {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }
}

impl Default for RandomDelay {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(3))
    }
}

#[async_trait]
impl PacingPolicy for RandomDelay {
    async fn pause(&self) {
        let delay = {
            let mut rng = rand::thread_rng();
            rng.gen_range(self.min.as_secs_f64()..=self.max.as_secs_f64())
        };
        debug!("pacing provider call by {:.2}s", delay);
        tokio::time::sleep(Duration::from_secs_f64(delay)).await;
    }
}

/// No delay at all. For tests.
#[derive(Debug, Clone, Default)]
pub struct NoPacing;

#[async_trait]
impl PacingPolicy for NoPacing {
    async fn pause(&self) {}
}
