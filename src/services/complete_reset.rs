use std::sync::Arc;
use tracing::instrument;
use crate::audit::AuditLevel;
use crate::model::hashing;
use crate::utils::context::ServiceContext;
use crate::utils::errors::{AuthError, ErrorCode};

///
/// Complete a password reset with the emailed token secret and a new password.
///
/// Every failure mode - unknown token, expired token, already-used token, vanished
/// user - collapses to the same error so the response can't be used to probe token
/// state. Consumption is a compare-and-swap, so of two concurrent submissions with
/// the same token exactly one can succeed. A rejected new password leaves the token
/// unconsumed for another try.
///
#[instrument(name="complete_reset", skip(ctx, secret, new_password))]
pub async fn complete_reset(ctx: Arc<ServiceContext>, secret: &str, new_password: &str)
    -> Result<(), AuthError> {

    let token_hash = hashing::sha256_hex(secret);

    let token = match ctx.reset_tokens().find_by_hash(&token_hash).await? {
        Some(token) => token,
        None => return Err(reset_failure(&ctx, "invalid_token")),
    };

    if token.used {
        return Err(reset_failure(&ctx, "token_reused"))
    }

    if token.expires_at.to_chrono() <= ctx.now() {
        return Err(reset_failure(&ctx, "token_expired"))
    }

    let user = match ctx.users().find_by_id(&token.user_id).await? {
        Some(user) => user,
        None => return Err(reset_failure(&ctx, "user_not_found")),
    };

    // Reject a weak replacement before the token is consumed.
    ctx.policy().validate_pattern(new_password)?;

    if !ctx.reset_tokens().mark_used(&token.token_id, ctx.now()).await? {
        return Err(reset_failure(&ctx, "token_reused"))
    }

    super::set_password(&ctx, &user.user_id, new_password).await?;

    ctx.audit().log("PASSWORD_RESET_SUCCESS",
        vec![("email", user.email.clone()), ("user_id", user.user_id.clone())],
        AuditLevel::Info);

    ctx.audit().log("PASSWORD_RESET_TOKEN_USED",
        vec![("user_id", user.user_id)],
        AuditLevel::Info);

    Ok(())
}

fn reset_failure(ctx: &ServiceContext, reason: &str) -> AuthError {
    ctx.audit().log("PASSWORD_RESET_FAILURE", vec![("reason", reason.to_string())], AuditLevel::Warn);
    ErrorCode::InvalidResetToken.with_msg("Invalid or expired token")
}
