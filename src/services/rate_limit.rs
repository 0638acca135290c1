// src/services/rate_limit.rs
//! Per-user cooldown gate for the generation endpoint

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, warn};

#[derive(Debug, PartialEq, Eq)]
pub enum AcquireResult {
    Allowed,
    /// Denied; the caller should retry after this many seconds
    Denied { retry_after: u64 },
}

/// Gates one expensive operation per authenticated user to one call per
/// fixed cooldown window.
///
/// State is a map from user id to the instant of the last permitted call,
/// held in process memory. Known limitation: not durable and not shared
/// across instances, so a multi-process deployment would need an external
/// store with expiry instead.
#[derive(Debug)]
pub struct GenerationLimiter {
    cooldown: Duration,
    last_permitted: RwLock<HashMap<String, Instant>>,
}

impl GenerationLimiter {
    pub fn new(cooldown_seconds: u64) -> Self {
        Self {
            cooldown: Duration::from_secs(cooldown_seconds),
            last_permitted: RwLock::new(HashMap::new()),
        }
    }

    /// Admit or deny a generation call for the given user.
    ///
    /// Callers must already be authenticated; the limiter keys on user id
    /// only and knows nothing about anonymous traffic.
    pub async fn try_acquire(&self, user_id: &str) -> AcquireResult {
        let now = Instant::now();
        let mut map = self.last_permitted.write().await;

        if let Some(last) = map.get(user_id) {
            let elapsed = now.duration_since(*last);
            if elapsed < self.cooldown {
                let remaining = self.cooldown - elapsed;
                // Round up so the client never retries a moment too early
                let retry_after =
                    (remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0)).max(1);
                warn!(
                    user_id = %user_id,
                    retry_after = retry_after,
                    "Generation request denied by cooldown"
                );
                return AcquireResult::Denied { retry_after };
            }
        }

        map.insert(user_id.to_string(), now);
        debug!(user_id = %user_id, "Generation request admitted");
        AcquireResult::Allowed
    }

    /// Drop entries older than the cooldown window
    pub async fn cleanup_expired(&self) {
        let cooldown = self.cooldown;
        let mut map = self.last_permitted.write().await;
        map.retain(|_, last| last.elapsed() < cooldown);
    }

    /// Start a background task that periodically sweeps expired entries,
    /// so the map does not grow with every user that ever generated
    pub fn start_cleanup_task(limiter: Arc<Self>) {
        let period = limiter.cooldown.max(Duration::from_secs(60));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                limiter.cleanup_expired().await;
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_request_is_allowed() {
        let limiter = GenerationLimiter::new(30);
        assert_eq!(limiter.try_acquire("U_AAAAAA").await, AcquireResult::Allowed);
    }

    #[tokio::test]
    async fn test_second_request_within_window_is_denied() {
        let limiter = GenerationLimiter::new(30);

        assert_eq!(limiter.try_acquire("U_AAAAAA").await, AcquireResult::Allowed);

        match limiter.try_acquire("U_AAAAAA").await {
            AcquireResult::Denied { retry_after } => {
                assert!(retry_after >= 1, "retry_after must be positive");
                assert!(retry_after <= 30, "retry_after must not exceed the window");
            }
            AcquireResult::Allowed => panic!("Second request within window should be denied"),
        }
    }

    #[tokio::test]
    async fn test_retry_after_rounds_partial_seconds_up() {
        let limiter = GenerationLimiter::new(30);

        limiter.try_acquire("U_AAAAAA").await;

        // Almost the full window remains; a truncating report of 29
        // would invite a retry one moment too early
        match limiter.try_acquire("U_AAAAAA").await {
            AcquireResult::Denied { retry_after } => assert_eq!(retry_after, 30),
            AcquireResult::Allowed => panic!("Second request within window should be denied"),
        }
    }

    #[tokio::test]
    async fn test_readmitted_after_window_elapses() {
        // Short window so the test doesn't sleep for 30 seconds
        let limiter = GenerationLimiter::new(1);

        assert_eq!(limiter.try_acquire("U_AAAAAA").await, AcquireResult::Allowed);
        assert!(matches!(
            limiter.try_acquire("U_AAAAAA").await,
            AcquireResult::Denied { .. }
        ));

        tokio::time::sleep(Duration::from_millis(1100)).await;

        assert_eq!(limiter.try_acquire("U_AAAAAA").await, AcquireResult::Allowed);
    }

    #[tokio::test]
    async fn test_users_have_independent_windows() {
        let limiter = GenerationLimiter::new(30);

        assert_eq!(limiter.try_acquire("U_AAAAAA").await, AcquireResult::Allowed);
        // A different user is not affected by the first user's cooldown
        assert_eq!(limiter.try_acquire("U_BBBBBB").await, AcquireResult::Allowed);
    }

    #[tokio::test]
    async fn test_cleanup_drops_stale_entries() {
        let limiter = GenerationLimiter::new(1);

        limiter.try_acquire("U_AAAAAA").await;
        tokio::time::sleep(Duration::from_millis(1100)).await;
        limiter.cleanup_expired().await;

        assert!(limiter.last_permitted.read().await.is_empty());
    }
}
