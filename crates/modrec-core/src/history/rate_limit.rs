//! Token-bucket limiter shared by every worker of a run

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Upper bound on a single reported wait
pub const MAX_WAIT: Duration = Duration::from_secs(3600);

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Token bucket guarding calls into the history host.
///
/// Holds at most `capacity` tokens and refills continuously at
/// `refill_per_sec`. This is the only mutable state shared between
/// concurrent reconciliations.
#[derive(Debug)]
pub struct RateLimiter {
    capacity: f64,
    refill_per_sec: f64,
    bucket: Mutex<Bucket>,
}

impl RateLimiter {
    /// A full bucket of `capacity` tokens refilling at `refill_per_sec`.
    ///
    /// A capacity of zero is raised to one. A non-positive rate is raised to a
    /// tiny positive rate, so an empty bucket then reports waits of
    /// [`MAX_WAIT`].
    pub fn new(capacity: u32, refill_per_sec: f64) -> Self {
        let capacity = f64::from(capacity.max(1));
        let refill_per_sec = if refill_per_sec > 0.0 {
            refill_per_sec
        } else {
            f64::MIN_POSITIVE
        };
        Self {
            capacity,
            refill_per_sec,
            bucket: Mutex::new(Bucket {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Limiter matching an hourly host quota, allowing `burst` immediate calls
    pub fn per_hour(requests_per_hour: u32, burst: u32) -> Self {
        Self::new(burst, f64::from(requests_per_hour) / 3600.0)
    }

    pub fn capacity(&self) -> u32 {
        self.capacity as u32
    }

    /// Take a token now, or report how long until one is available.
    ///
    /// # Errors
    ///
    /// Returns the wait duration when the bucket is empty.
    pub fn try_acquire(&self) -> Result<(), Duration> {
        let mut bucket = match self.bucket.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            Ok(())
        } else {
            let missing = 1.0 - bucket.tokens;
            let wait = Duration::try_from_secs_f64(missing / self.refill_per_sec)
                .unwrap_or(MAX_WAIT);
            Err(wait.min(MAX_WAIT))
        }
    }

    /// Wait until a token is available and take it.
    pub async fn acquire(&self) {
        while let Err(wait) = self.try_acquire() {
            tokio::time::sleep(wait).await;
        }
    }
}
