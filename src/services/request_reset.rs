use std::sync::Arc;
use chrono::Duration;
use rand::RngCore;
use tracing::instrument;
use crate::audit::AuditLevel;
use crate::db::mongo::generate_id;
use crate::mailer::MailRequest;
use crate::model::hashing;
use crate::model::reset_token::PasswordResetToken;
use crate::model::user::UserCredential;
use crate::utils::context::ServiceContext;
use crate::utils::errors::{AuthError, ErrorCode};

///
/// Begin a password reset for the given email.
///
/// Deliberately returns Ok for unknown addresses - the caller learns nothing about
/// whether an account exists. The only externally-visible difference is the email
/// that does (or doesn't) arrive. `client_key` identifies the caller for rate
/// limiting, e.g. an IP address.
///
#[instrument(name="request_reset", skip(ctx, email))]
pub async fn request_reset(ctx: Arc<ServiceContext>, client_key: &str, email: &str)
    -> Result<(), AuthError> {

    let email = crate::model::user::normalise_email(email);

    let decision = ctx.rate_limiter()
        .check(
            &format!("reset:{}", client_key),
            ctx.config().reset_request_limit,
            Duration::seconds(ctx.config().reset_request_window_seconds))
        .await?;

    if decision.limited {
        return Err(ErrorCode::RateLimited.with_msg("Too many password reset requests. Try again later"))
    }

    // Audited before the existence check so known and unknown addresses leave the
    // same trace timing-wise.
    ctx.audit().log("PASSWORD_RESET_REQUESTED", vec![("email", email.clone())], AuditLevel::Info);

    let user = match ctx.users().find_by_email(&email).await? {
        Some(user) => user,
        None => return Ok(()),
    };

    let secret = issue_reset_token(&ctx, &user).await?;

    let reset_link = match &ctx.config().frontend_url {
        Some(frontend_url) => format!("{}/reset-password?token={}", frontend_url, secret),
        None => secret,
    };

    let request = MailRequest {
        to: user.email.clone(),
        subject: String::from("Password reset instructions"),
        template: String::from("password-reset"),
        context: vec![
            (String::from("first_name"), user.first_name.clone()),
            (String::from("reset_link"), reset_link),
            (String::from("expires_in"), format!("{}", ctx.config().reset_token_ttl_seconds / 60)),
        ],
    };

    // A failed send mustn't reveal anything to the caller either - log it and move on.
    if let Err(err) = ctx.mailer().send(request).await {
        tracing::error!("Failed to send password reset mail: {}", err.message());
    }

    Ok(())
}

///
/// Mint a fresh single-use token for the user, displacing any earlier unused one.
///
/// The secret leaves this function exactly once - only its one-way hash is stored.
///
async fn issue_reset_token(ctx: &ServiceContext, user: &UserCredential) -> Result<String, AuthError> {
    let mut raw = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut raw);
    let secret = hex::encode(raw);

    let now = ctx.now();
    let token = PasswordResetToken {
        token_id: generate_id(),
        user_id: user.user_id.clone(),
        token_hash: hashing::sha256_hex(&secret),
        expires_at: bson::DateTime::from_chrono(now + Duration::seconds(ctx.config().reset_token_ttl_seconds)),
        used: false,
        used_at: None,
        created_at: bson::DateTime::from_chrono(now),
    };

    ctx.reset_tokens().delete_unused_for_user(&user.user_id).await?;
    ctx.reset_tokens().insert(&token).await?;

    Ok(secret)
}
