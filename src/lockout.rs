use std::collections::HashMap;
use std::sync::Arc;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use crate::audit::{AuditLevel, AuditLog};
use crate::db::UserStore;
use crate::model::user::UserCredential;
use crate::utils::time_provider::Clock;

///
/// Brute-force protection: a per-email failed-login counter that escalates to a
/// persisted lock on the user record.
///
/// Each email moves through CLEAN -> ACCUMULATING(count) -> LOCKED(until). The counter
/// itself is in-process; only an actual lock touches the user store. All increments
/// for a key serialise through the mutex so concurrent failures can't lose updates.
///
pub struct AccountLockout {
    users: Arc<dyn UserStore>,
    clock: Clock,
    audit: AuditLog,
    max_failed_attempts: u32,
    attempt_reset_window: Duration,
    lockout_duration: Duration,
    failed_attempts: Mutex<HashMap<String, FailedAttempt>>,
}

#[derive(Clone, Copy, Debug)]
struct FailedAttempt {
    count: u32,
    timestamp: DateTime<Utc>,
}

impl AccountLockout {
    pub fn new(
        users: Arc<dyn UserStore>,
        clock: Clock,
        audit: AuditLog,
        max_failed_attempts: u32,
        attempt_reset_window: Duration,
        lockout_duration: Duration) -> Self {

        AccountLockout {
            users,
            clock,
            audit,
            max_failed_attempts,
            attempt_reset_window,
            lockout_duration,
            failed_attempts: Mutex::new(HashMap::new()),
        }
    }

    ///
    /// Record a failed login attempt, returning whether the account should now lock.
    ///
    /// Attempts older than the reset window are forgotten (the counter restarts at 1).
    /// When the threshold is reached the lock is persisted on the user record - a
    /// failed persist is logged but the caller still gets the correct answer.
    ///
    pub async fn record_failed_attempt(&self, email: &str) -> bool {
        let now = self.clock.now();

        let should_lock = {
            let mut attempts = self.failed_attempts.lock();
            let entry = attempts.entry(email.to_string())
                .or_insert(FailedAttempt { count: 0, timestamp: now });

            // A stale entry restarts the count rather than accumulating.
            if entry.count > 0 && now - entry.timestamp > self.attempt_reset_window {
                entry.count = 0;
            }

            entry.count += 1;
            entry.timestamp = now;

            entry.count >= self.max_failed_attempts
        };

        if should_lock {
            self.audit.log("ACCOUNT_LOCKED", vec![("email", email.to_string())], AuditLevel::Warn);

            if let Err(err) = self.lock_account(email, now).await {
                // The in-memory lock still applies - don't fail the login flow.
                tracing::error!("Failed to persist account lock for {}: {}", hash_for_log(email), err.message());
            }
        }

        should_lock
    }

    ///
    /// Forget any failed attempts - called on successful login. Idempotent.
    ///
    pub fn clear_failed_attempts(&self, email: &str) {
        self.failed_attempts.lock().remove(email);
    }

    ///
    /// Remaining lockout in milliseconds, computed purely from the in-memory tracker -
    /// a failed persisted lock write doesn't shorten it. Zero when there's no lock or
    /// the duration has elapsed.
    ///
    pub fn remaining_lockout_time(&self, email: &str) -> i64 {
        let attempts = self.failed_attempts.lock();

        let entry = match attempts.get(email) {
            Some(entry) => entry,
            None => return 0,
        };

        // Only a triggered lock counts - accumulating failures don't block logins.
        if entry.count < self.max_failed_attempts {
            return 0
        }

        let elapsed = self.clock.now() - entry.timestamp;

        if elapsed >= self.lockout_duration {
            return 0
        }

        (self.lockout_duration - elapsed).num_milliseconds()
    }

    ///
    /// Check the persisted lock state on a user record.
    ///
    /// An expired lock is cleared here, synchronously, so a login retried immediately
    /// afterwards can't race an in-flight unlock write.
    ///
    pub async fn is_account_locked(&self, user: &UserCredential) -> bool {
        if !user.is_locked {
            return false
        }

        match user.locked_until {
            Some(until) if until.to_chrono() > self.clock.now() => true,
            Some(_) => {
                if let Err(err) = self.unlock_account(&user.email).await {
                    tracing::error!("Failed to unlock account: {}", err.message());
                }
                false
            },
            None => false,
        }
    }

    async fn lock_account(&self, email: &str, now: DateTime<Utc>) -> Result<(), crate::utils::errors::AuthError> {
        let locked_until = now + self.lockout_duration;
        self.users.set_lock(email, locked_until).await
    }

    async fn unlock_account(&self, email: &str) -> Result<(), crate::utils::errors::AuthError> {
        self.users.clear_lock(email).await?;
        tracing::info!("Account unlocked for {}", hash_for_log(email));
        Ok(())
    }
}

///
/// Emails in ordinary log lines get the same one-way treatment as audit metadata.
///
fn hash_for_log(email: &str) -> String {
    crate::model::hashing::sha256_hex(email)[..8].to_string()
}
