use crate::model::hashing;
use crate::utils::context::ServiceContext;
use crate::utils::errors::AuthError;

///
/// Validate a new password against the policy, hash it and persist it.
///
/// Hashing is deliberately expensive, so it runs on a blocking thread rather than
/// stalling the async executor. The change timestamp is recorded so session tokens
/// minted before it can be treated as revoked.
///
pub async fn set_password(ctx: &ServiceContext, user_id: &str, plain_text_password: &str)
    -> Result<(), AuthError> {

    ctx.policy().validate_pattern(plain_text_password)?;

    let candidate = plain_text_password.to_string();
    let phc = tokio::task::spawn_blocking(move || hashing::hash_into_phc(&candidate)).await??;

    ctx.users().update_password_hash(user_id, &phc, ctx.now()).await?;

    Ok(())
}
