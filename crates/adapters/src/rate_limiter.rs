// crates/adapters/src/rate_limiter.rs
use common::{Error, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;

/// Token bucket rate limiter
pub struct RateLimiter {
    tokens: Arc<Mutex<TokenBucket>>,
    semaphore: Arc<Semaphore>,
}

struct TokenBucket {
    capacity: usize,
    available: f64,
    refill_rate: f64, // tokens per second
    last_refill: Instant,
}

impl TokenBucket {
    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.available = (self.available + elapsed * self.refill_rate).min(self.capacity as f64);
        self.last_refill = now;
    }

    /// Take a token, or report how long until one is available.
    fn take(&mut self) -> std::result::Result<(), Duration> {
        self.refill();
        if self.available >= 1.0 {
            self.available -= 1.0;
            return Ok(());
        }
        if self.refill_rate <= 0.0 {
            return Err(Duration::from_secs(1));
        }
        let missing = 1.0 - self.available;
        Err(Duration::from_secs_f64(missing / self.refill_rate))
    }
}

impl RateLimiter {
    pub fn new(capacity: usize, refill_per_sec: f64) -> Self {
        let capacity = capacity.max(1);
        Self {
            tokens: Arc::new(Mutex::new(TokenBucket {
                capacity,
                available: capacity as f64,
                refill_rate: refill_per_sec,
                last_refill: Instant::now(),
            })),
            semaphore: Arc::new(Semaphore::new(capacity)),
        }
    }

    /// Acquire a token, waiting if necessary
    pub async fn acquire(&self) -> Result<RateLimitGuard> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| Error::RateLimit("rate limiter closed".to_string()))?;

        loop {
            let wait = match self.tokens.lock().take() {
                Ok(()) => break,
                Err(wait) => wait,
            };
            tracing::debug!("Rate limited, waiting {:?}", wait);
            tokio::time::sleep(wait).await;
        }

        Ok(RateLimitGuard { _permit: permit })
    }

    /// Try to acquire without waiting
    pub fn try_acquire(&self) -> Option<RateLimitGuard> {
        let permit = self.semaphore.clone().try_acquire_owned().ok()?;
        self.tokens.lock().take().ok()?;
        Some(RateLimitGuard { _permit: permit })
    }
}

/// Holds an in-flight slot until dropped
pub struct RateLimitGuard {
    _permit: tokio::sync::OwnedSemaphorePermit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rate_limiter() {
        let limiter = RateLimiter::new(10, 5.0);

        // Should acquire immediately
        let guard1 = limiter.acquire().await.unwrap();
        let guard2 = limiter.acquire().await.unwrap();

        drop(guard1);
        drop(guard2);

        // Wait for refill
        tokio::time::sleep(Duration::from_millis(200)).await;

        let _guard3 = limiter.acquire().await.unwrap();
    }

    #[test]
    fn test_try_acquire_exhausts_bucket() {
        let limiter = RateLimiter::new(2, 0.0);

        let first = limiter.try_acquire();
        assert!(first.is_some());
        drop(first);

        let second = limiter.try_acquire();
        assert!(second.is_some());
        drop(second);

        // No refill, bucket is empty even though slots are free
        assert!(limiter.try_acquire().is_none());
    }
}
