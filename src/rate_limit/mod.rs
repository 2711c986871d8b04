pub mod memory;
pub mod mongo;

use std::sync::Arc;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use crate::audit::{AuditLevel, AuditLog};
use crate::utils::errors::{AuthError, ErrorCode};
use crate::utils::time_provider::Clock;

///
/// The outcome of a rate-limit check.
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RateLimitDecision {
    pub limited: bool,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

///
/// Read-only window introspection.
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RateLimitStatus {
    pub count: u32,
    pub reset_at: DateTime<Utc>,
}

///
/// The counter store behind the sliding window - one timestamp entry per recorded hit.
///
/// Two interchangeable implementations exist: a MongoDB-backed store shared by every
/// instance of the service, and an in-process map for single-instance deployments.
/// The limiter algorithm is identical either way.
///
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    ///
    /// Drop entries recorded before the cutoff and return how many remain.
    ///
    async fn prune_and_count(&self, key: &str, cutoff: DateTime<Utc>) -> Result<u32, AuthError>;

    ///
    /// The oldest remaining entry for the key, if any.
    ///
    async fn oldest(&self, key: &str) -> Result<Option<DateTime<Utc>>, AuthError>;

    async fn record(&self, key: &str, at: DateTime<Utc>) -> Result<(), AuthError>;

    async fn clear(&self, key: &str) -> Result<(), AuthError>;
}

///
/// Sliding-window rate limiting for sensitive endpoints.
///
/// In strict mode a store outage fails the gated request closed - unlimited traffic is
/// worse than a refused request. In permissive mode checks degrade to an in-process
/// fallback store instead.
///
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    fallback: Option<Arc<dyn RateLimitStore>>,
    clock: Clock,
    audit: AuditLog,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn RateLimitStore>, strict: bool, clock: Clock, audit: AuditLog) -> Self {
        let fallback: Option<Arc<dyn RateLimitStore>> = match strict {
            true  => None,
            false => Some(Arc::new(memory::MemoryRateLimitStore::new())),
        };

        RateLimiter { store, fallback, clock, audit }
    }

    ///
    /// Check (and count) a hit against the sliding window for the key.
    ///
    pub async fn check(&self, key: &str, max_requests: u32, window: Duration) -> Result<RateLimitDecision, AuthError> {
        match self.check_store(self.store.as_ref(), key, max_requests, window).await {
            Ok(decision) => Ok(decision),
            Err(err) => match &self.fallback {
                Some(fallback) => {
                    tracing::warn!("Rate-limit store unavailable, degrading to in-process window: {}", err.message());
                    self.check_store(fallback.as_ref(), key, max_requests, window).await
                },
                None => {
                    tracing::error!("Rate-limit store unavailable, failing closed: {}", err.message());
                    Err(ErrorCode::RateLimitStoreUnavailable.with_msg("Rate limiting service unavailable"))
                },
            },
        }
    }

    async fn check_store(&self, store: &dyn RateLimitStore, key: &str, max_requests: u32, window: Duration)
        -> Result<RateLimitDecision, AuthError> {

        let now = self.clock.now();
        let count = store.prune_and_count(key, now - window).await?;

        if count >= max_requests {
            // The window slides: it re-opens when the oldest counted hit ages out.
            let reset_at = match store.oldest(key).await? {
                Some(oldest) => oldest + window,
                None => now + window,
            };

            self.audit.log("RATE_LIMIT_EXCEEDED",
                vec![("key", key.to_string()), ("count", count.to_string())],
                AuditLevel::Warn);

            return Ok(RateLimitDecision { limited: true, remaining: 0, reset_at })
        }

        store.record(key, now).await?;

        Ok(RateLimitDecision {
            limited: false,
            remaining: max_requests - count - 1,
            reset_at: now + window,
        })
    }

    ///
    /// Clear all entries for a key - used to lift a window after a legitimate success.
    ///
    pub async fn reset(&self, key: &str) -> Result<(), AuthError> {
        self.store.clear(key).await?;

        if let Some(fallback) = &self.fallback {
            if let Err(err) = fallback.clear(key).await {
                tracing::warn!("Failed to clear fallback rate-limit window for {}: {}", key, err.message());
            }
        }

        Ok(())
    }

    ///
    /// Read-only introspection of a key's window. Store failures surface as None.
    ///
    pub async fn status(&self, key: &str, window: Duration) -> Option<RateLimitStatus> {
        let now = self.clock.now();

        match self.store.prune_and_count(key, now - window).await {
            Ok(0) => None,
            Ok(count) => {
                let reset_at = match self.store.oldest(key).await {
                    Ok(Some(oldest)) => oldest + window,
                    _ => now + window,
                };
                Some(RateLimitStatus { count, reset_at })
            },
            Err(err) => {
                tracing::error!("Rate-limit status check failed for {}: {}", key, err.message());
                None
            },
        }
    }
}
