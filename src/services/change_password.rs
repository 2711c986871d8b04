use std::sync::Arc;
use tracing::instrument;
use crate::audit::AuditLevel;
use crate::model::hashing;
use crate::utils::context::ServiceContext;
use crate::utils::errors::{AuthError, ErrorCode};

///
/// Change an authenticated user's password.
///
/// The current password must be re-proven even though the caller already holds a
/// session - a hijacked session must not be enough to take over the account.
///
#[instrument(name="change_password", skip(ctx, current_password, new_password))]
pub async fn change_password(ctx: Arc<ServiceContext>, user_id: &str, current_password: &str, new_password: &str)
    -> Result<(), AuthError> {

    ctx.audit().log("PASSWORD_CHANGE_REQUESTED", vec![("user_id", user_id.to_string())], AuditLevel::Info);

    let user = match ctx.users().find_by_id(user_id).await? {
        Some(user) => user,
        None => return Err(change_failure(&ctx, user_id, "user_not_found")),
    };

    let phc = user.phc.clone();
    let candidate = current_password.to_string();
    let matched = tokio::task::spawn_blocking(move || hashing::verify_phc(&candidate, &phc)).await??;

    if !matched {
        return Err(change_failure(&ctx, user_id, "invalid_current_password"))
    }

    super::set_password(&ctx, user_id, new_password).await?;

    ctx.audit().log("PASSWORD_CHANGE_SUCCESS",
        vec![("user_id", user_id.to_string()), ("email", user.email)],
        AuditLevel::Info);

    Ok(())
}

fn change_failure(ctx: &ServiceContext, user_id: &str, reason: &str) -> AuthError {
    ctx.audit().log("PASSWORD_CHANGE_FAILURE",
        vec![("user_id", user_id.to_string()), ("reason", reason.to_string())],
        AuditLevel::Warn);

    ErrorCode::InvalidCredentials.with_msg("Invalid email or password")
}
