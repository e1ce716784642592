//! Client-side token-bucket throttle shared by every request of one client.
//!
//! Callers queue for a slot instead of failing: [`RateLimiter::acquire`]
//! waits (FIFO, via the bucket's async mutex) until a token is available.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Request budget: sustained rate plus burst capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    pub requests_per_second: u32,
    pub burst: u32,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            requests_per_second: 10,
            burst: 20,
        }
    }
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Token bucket limiter. Cheap to clone; clones share one bucket.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    bucket: Option<Arc<Mutex<Bucket>>>,
    rate: f64,
    capacity: f64,
}

impl RateLimiter {
    /// Bucket starting full, refilling at `requests_per_second`.
    ///
    /// A zero rate is treated as "unlimited".
    pub fn new(limit: RateLimit) -> Self {
        if limit.requests_per_second == 0 {
            return Self::unlimited();
        }
        let capacity = f64::from(limit.burst.max(1));
        Self {
            bucket: Some(Arc::new(Mutex::new(Bucket {
                tokens: capacity,
                last_refill: Instant::now(),
            }))),
            rate: f64::from(limit.requests_per_second),
            capacity,
        }
    }

    /// Limiter that never waits.
    pub fn unlimited() -> Self {
        Self {
            bucket: None,
            rate: 0.0,
            capacity: 0.0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.bucket.is_some()
    }

    /// Take one token, sleeping until one is available.
    ///
    /// The bucket lock is held while sleeping so waiters are served in
    /// arrival order.
    pub async fn acquire(&self) {
        let Some(bucket) = &self.bucket else {
            return;
        };

        let mut bucket = bucket.lock().await;
        self.refill(&mut bucket);

        if bucket.tokens < 1.0 {
            let wait = Duration::from_secs_f64((1.0 - bucket.tokens) / self.rate);
            debug!(wait_ms = wait.as_millis(), "rate limiter: waiting for slot");
            tokio::time::sleep(wait).await;
            self.refill(&mut bucket);
        }

        bucket.tokens = (bucket.tokens - 1.0).max(0.0);
    }

    fn refill(&self, bucket: &mut Bucket) {
        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.rate).min(self.capacity);
        bucket.last_refill = now;
    }
}
