use std::sync::Arc;
use chrono::Duration;
use tracing::instrument;
use crate::audit::AuditLevel;
use crate::model::hashing;
use crate::utils::context::ServiceContext;
use crate::utils::errors::{AuthError, ErrorCode};

///
/// The successful outcome of a login - the authenticated user's public details and a
/// signed session token.
///
#[derive(Clone, Debug)]
pub struct LoginResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub is_admin: bool,
    pub access_token: String,
}

///
/// Authenticate a user with their email and password.
///
/// The gates run in a fixed order: per-client rate limit, in-memory lockout, user
/// lookup, persisted lock, then password verification. An unknown email and a wrong
/// password produce an identical error so the response can't be used to enumerate
/// accounts. `client_key` identifies the caller for rate limiting, e.g. an IP address.
///
#[instrument(name="login", skip(ctx, email, password))]
pub async fn login(ctx: Arc<ServiceContext>, client_key: &str, email: &str, password: &str)
    -> Result<LoginResponse, AuthError> {

    let email = crate::model::user::normalise_email(email);

    let decision = ctx.rate_limiter()
        .check(
            &format!("login:{}", client_key),
            ctx.config().login_rate_limit,
            Duration::seconds(ctx.config().login_rate_window_seconds))
        .await?;

    if decision.limited {
        return Err(ErrorCode::RateLimited.with_msg("Too many login attempts. Try again later"))
    }

    let remaining = ctx.lockout().remaining_lockout_time(&email);
    if remaining > 0 {
        return Err(locked_error(remaining))
    }

    let user = match ctx.users().find_by_email(&email).await? {
        Some(user) => user,
        // Unknown emails take the failed-attempt path: same error, same counter treatment.
        None => return Err(record_failure(&ctx, &email).await),
    };

    if ctx.lockout().is_account_locked(&user).await {
        let remaining = match user.locked_until {
            Some(until) => (until.to_chrono() - ctx.now()).num_milliseconds(),
            None => 0,
        };
        return Err(locked_error(remaining))
    }

    let phc = user.phc.clone();
    let candidate = password.to_string();
    let matched = tokio::task::spawn_blocking(move || hashing::verify_phc(&candidate, &phc)).await??;

    if !matched {
        return Err(record_failure(&ctx, &email).await)
    }

    ctx.lockout().clear_failed_attempts(&email);

    ctx.audit().log("LOGIN_SUCCESS",
        vec![("email", email.clone()), ("user_id", user.user_id.clone())],
        AuditLevel::Info);

    let access_token = ctx.sessions().issue(&user)?;

    Ok(LoginResponse {
        id: user.user_id,
        first_name: user.first_name,
        last_name: user.last_name,
        is_admin: user.is_admin,
        access_token,
    })
}

///
/// Audit the failure, bump the lockout counter and return the uniform credentials error.
///
async fn record_failure(ctx: &ServiceContext, email: &str) -> AuthError {
    ctx.audit().log("LOGIN_FAILED", vec![("email", email.to_string())], AuditLevel::Warn);
    ctx.lockout().record_failed_attempt(email).await;
    ErrorCode::InvalidCredentials.with_msg("Invalid email or password")
}

fn locked_error(remaining_ms: i64) -> AuthError {
    // Round the remaining time up to whole seconds for the message.
    let seconds = (remaining_ms + 999) / 1000;
    ErrorCode::AccountLocked.with_msg(&format!("Account is locked. Try again in {} seconds", seconds))
}
