use std::sync::Arc;
use chrono::{DateTime, Utc};
use crate::audit::AuditLog;
use crate::db::{ResetTokenStore, UserStore};
use crate::lockout::AccountLockout;
use crate::mailer::Mailer;
use crate::model::policy::PasswordPolicy;
use crate::rate_limit::{RateLimitStore, RateLimiter};
use crate::session::SessionIssuer;
use crate::utils::config::Configuration;
use crate::utils::time_provider::Clock;

///
/// The service context allows any component to access the current configuration,
/// the backing stores and the shared protection components.
///
pub struct ServiceContext {
    config: Configuration,
    users: Arc<dyn UserStore>,
    reset_tokens: Arc<dyn ResetTokenStore>,
    mailer: Arc<dyn Mailer>,
    audit: AuditLog,
    lockout: AccountLockout,
    rate_limiter: RateLimiter,
    sessions: SessionIssuer,
    policy: PasswordPolicy,
    clock: Clock,
}

impl ServiceContext {
    pub fn new(
        config: Configuration,
        users: Arc<dyn UserStore>,
        reset_tokens: Arc<dyn ResetTokenStore>,
        rate_limit_store: Arc<dyn RateLimitStore>,
        mailer: Arc<dyn Mailer>) -> Self {

        let clock = Clock::new();
        let audit = AuditLog::default();

        let lockout = AccountLockout::new(
            users.clone(),
            clock.clone(),
            audit.clone(),
            config.max_failed_logins,
            chrono::Duration::seconds(config.attempt_reset_window_seconds),
            chrono::Duration::seconds(config.lockout_duration_seconds));

        let rate_limiter = RateLimiter::new(
            rate_limit_store,
            config.rate_limit_strict,
            clock.clone(),
            audit.clone());

        let sessions = SessionIssuer::new(
            &config.token_secret,
            config.token_expiry_seconds,
            clock.clone());

        let policy = PasswordPolicy {
            min_length: config.min_password_length,
            ..PasswordPolicy::default()
        };

        ServiceContext {
            config,
            users,
            reset_tokens,
            mailer,
            audit,
            lockout,
            rate_limiter,
            sessions,
            policy,
            clock,
        }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn users(&self) -> &dyn UserStore {
        self.users.as_ref()
    }

    pub fn reset_tokens(&self) -> &dyn ResetTokenStore {
        self.reset_tokens.as_ref()
    }

    pub fn mailer(&self) -> &dyn Mailer {
        self.mailer.as_ref()
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    pub fn lockout(&self) -> &AccountLockout {
        &self.lockout
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    pub fn sessions(&self) -> &SessionIssuer {
        &self.sessions
    }

    pub fn policy(&self) -> &PasswordPolicy {
        &self.policy
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    ///
    /// Fix (or clear) the shared clock - tests use this to time-travel the core.
    ///
    pub fn set_now(&self, now: Option<DateTime<Utc>>) {
        self.clock.fix(now);
    }
}
