//! # Rate Limiter
//!
//! Per-client token buckets in front of every operation.
//!
//! ## Token Bucket
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  capacity = burst          refill = requests_per_second                 │
//! │                                                                         │
//! │  check(client):                                                         │
//! │    lock table                                                           │
//! │      bucket = table[client] or a full one                               │
//! │      tokens += elapsed × refill (capped at burst)                       │
//! │      tokens ≥ 1 ? tokens -= 1, admit : TooManyRequests                  │
//! │    unlock                                                               │
//! │                                                                         │
//! │  sweeper (every sweep_interval):                                        │
//! │    drop buckets not seen for idle_ttl                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::error::{ServiceError, ServiceResult};

/// Buckets idle for longer than this are swept.
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(3 * 60);

/// How often the sweeper runs.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Rate limiter settings.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// When false, every request is admitted.
    pub enabled: bool,
    /// Sustained rate per client (tokens per second).
    pub requests_per_second: f64,
    /// Bucket capacity.
    pub burst: u32,
    pub idle_ttl: Duration,
    pub sweep_interval: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_second: 2.0,
            burst: 4,
            idle_ttl: DEFAULT_IDLE_TTL,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

impl RateLimitConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }
}

#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn full(capacity: f64, now: Instant) -> Self {
        Self {
            tokens: capacity,
            last_refill: now,
        }
    }

    fn try_consume(&mut self, now: Instant, capacity: f64, refill_rate: f64) -> bool {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * refill_rate).min(capacity);
        self.last_refill = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Token-bucket limiter keyed by client (remote address).
///
/// Cheap to clone; clones share one bucket table.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: Arc<RateLimitConfig>,
    buckets: Arc<Mutex<HashMap<String, TokenBucket>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config: Arc::new(config),
            buckets: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Admits one request from `client` or fails with TooManyRequests.
    pub async fn check(&self, client: &str) -> ServiceResult<()> {
        if !self.config.enabled {
            return Ok(());
        }

        let now = Instant::now();
        let capacity = f64::from(self.config.burst);

        let mut buckets = self.buckets.lock().await;
        let bucket = buckets
            .entry(client.to_string())
            .or_insert_with(|| TokenBucket::full(capacity, now));

        if bucket.try_consume(now, capacity, self.config.requests_per_second) {
            Ok(())
        } else {
            debug!(client = %client, "Rate limit exceeded");
            Err(ServiceError::TooManyRequests)
        }
    }

    /// Drops buckets idle for longer than the configured TTL.
    ///
    /// Returns the number removed.
    pub async fn sweep(&self) -> usize {
        let now = Instant::now();
        let idle_ttl = self.config.idle_ttl;

        let mut buckets = self.buckets.lock().await;
        let before = buckets.len();
        buckets.retain(|_, bucket| now.saturating_duration_since(bucket.last_refill) <= idle_ttl);
        before - buckets.len()
    }

    /// Number of tracked clients.
    pub async fn len(&self) -> usize {
        self.buckets.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Starts the idle sweep; it stops once `shutdown` turns true or its
    /// sender is dropped.
    pub fn spawn_sweeper(&self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        let limiter = self.clone();
        let every = self.config.sweep_interval;

        tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + every, every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = limiter.sweep().await;
                        if removed > 0 {
                            debug!(removed, "Swept idle rate limit buckets");
                        }
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("Rate limit sweeper stopped");
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn limiter(rps: f64, burst: u32) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            requests_per_second: rps,
            burst,
            ..Default::default()
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_then_reject() {
        let limiter = limiter(1.0, 3);

        for _ in 0..3 {
            limiter.check("10.0.0.1").await.unwrap();
        }

        let err = limiter.check("10.0.0.1").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TooManyRequests);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_checks_share_one_bucket() {
        let limiter = limiter(0.001, 5);

        let tasks: Vec<_> = (0..50)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move { limiter.check("10.0.0.1").await.is_ok() })
            })
            .collect();

        let mut admitted = 0;
        for task in tasks {
            if task.await.unwrap() {
                admitted += 1;
            }
        }

        assert_eq!(admitted, 5);
        assert_eq!(limiter.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refill_over_time() {
        let limiter = limiter(2.0, 1);

        limiter.check("a").await.unwrap();
        assert!(limiter.check("a").await.is_err());

        // Half a second at 2 tokens/s buys exactly one request
        time::advance(Duration::from_millis(500)).await;
        limiter.check("a").await.unwrap();
        assert!(limiter.check("a").await.is_err());

        // Refill never exceeds the burst
        time::advance(Duration::from_secs(60)).await;
        limiter.check("a").await.unwrap();
        assert!(limiter.check("a").await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clients_are_independent() {
        let limiter = limiter(1.0, 1);

        limiter.check("a").await.unwrap();
        assert!(limiter.check("a").await.is_err());
        limiter.check("b").await.unwrap();

        assert_eq!(limiter.len().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_admits_everything() {
        let limiter = RateLimiter::new(RateLimitConfig::disabled());

        for _ in 0..100 {
            limiter.check("a").await.unwrap();
        }
        assert!(limiter.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_drops_idle_buckets() {
        let limiter = limiter(1.0, 1);

        limiter.check("idle").await.unwrap();
        time::advance(Duration::from_secs(120)).await;
        limiter.check("active").await.unwrap();
        time::advance(Duration::from_secs(61)).await;

        assert_eq!(limiter.sweep().await, 1);
        assert_eq!(limiter.len().await, 1);

        // A swept client starts over with a full bucket
        limiter.check("idle").await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_runs_and_stops() {
        let limiter = limiter(1.0, 1);
        let (tx, rx) = watch::channel(false);
        let handle = limiter.spawn_sweeper(rx);

        limiter.check("a").await.unwrap();
        assert_eq!(limiter.len().await, 1);

        // Idle past the TTL, then let the next sweep tick fire
        time::sleep(DEFAULT_IDLE_TTL + DEFAULT_SWEEP_INTERVAL + Duration::from_secs(1)).await;
        assert!(limiter.is_empty().await);

        tx.send(true).unwrap();
        handle.await.unwrap();
    }
}
