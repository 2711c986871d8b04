mod common;
use chrono::{Duration, Utc};
use warden::services;
use warden::session::SessionIssuer;
use warden::utils::errors::{ApiError, ErrorCode};
use warden::utils::time_provider::Clock;
use crate::common::{create_user, start_warden, test_config};


fn new_issuer(secret: &str) -> (SessionIssuer, Clock) {
    let clock = Clock::new();
    (SessionIssuer::new(secret, 3600, clock.clone()), clock)
}


#[tokio::test]
async fn test_an_issued_token_verifies_and_carries_the_claims() {
    let (ctx, _mailer) = start_warden(test_config());
    let user_id = create_user(&ctx, "tess@example.com", "Wibble123!Wobble").await;

    let response = services::login(ctx.clone(), "10.0.0.1", "tess@example.com", "Wibble123!Wobble").await.unwrap();

    let claims = ctx.sessions().verify(&response.access_token, None)
        .expect("A freshly issued token should verify");

    assert_eq!(claims.sub, user_id);
    assert_eq!(claims.username, "tess@example.com");
    assert_eq!(claims.exp - claims.iat, 3600);
}


#[tokio::test]
async fn test_garbage_tokens_are_rejected() {
    let (issuer, _clock) = new_issuer("a-test-only-signing-secret-at-least-32-chars");

    let err = issuer.verify("not.a.token", None).expect_err("Garbage should be rejected");
    assert_eq!(err.error_code(), ErrorCode::SessionTokenInvalid);

    let api: ApiError = err.into();
    assert_eq!(api.code, "AUTH_INVALID_TOKEN");
    assert_eq!(api.status, 401);
}


#[tokio::test]
async fn test_a_token_signed_with_another_secret_is_rejected() {
    let (issuer, _clock) = new_issuer("a-test-only-signing-secret-at-least-32-chars");
    let (other, _clock) = new_issuer("a-different-signing-secret-of-similar-size");

    let (ctx, _mailer) = start_warden(test_config());
    create_user(&ctx, "tess@example.com", "Wibble123!Wobble").await;
    let user = ctx.users().find_by_email("tess@example.com").await.unwrap().unwrap();

    let token = other.issue(&user).unwrap();

    let err = issuer.verify(&token, None).expect_err("A foreign signature should be rejected");
    assert_eq!(err.error_code(), ErrorCode::SessionTokenInvalid);
}


#[tokio::test]
async fn test_a_password_change_supersedes_earlier_tokens() {
    let (issuer, clock) = new_issuer("a-test-only-signing-secret-at-least-32-chars");

    let (ctx, _mailer) = start_warden(test_config());
    create_user(&ctx, "tess@example.com", "Wibble123!Wobble").await;
    let user = ctx.users().find_by_email("tess@example.com").await.unwrap().unwrap();

    // Pin the issuing instant so the change below is unambiguously later. The fixed
    // time stays close to the wall clock - expiry checks use the real time.
    let issued_at = Utc::now();
    clock.fix(Some(issued_at));

    let token = issuer.issue(&user).unwrap();

    // A change before issue doesn't revoke the token.
    issuer.verify(&token, Some(issued_at - Duration::seconds(30)))
        .expect("A token issued after the last change should verify");

    // A change after issue does.
    let err = issuer.verify(&token, Some(issued_at + Duration::seconds(30)))
        .expect_err("A token issued before the change should be revoked");
    assert_eq!(err.error_code(), ErrorCode::SessionSuperseded);

    let api: ApiError = err.into();
    assert_eq!(api.code, "AUTH_INVALID_TOKEN");
}


#[tokio::test]
async fn test_changing_a_password_revokes_the_live_session() {
    let (ctx, _mailer) = start_warden(test_config());
    let user_id = create_user(&ctx, "tess@example.com", "Wibble123!Wobble").await;

    // Pin the clock near the wall clock so the change lands a whole minute after issue.
    let issued_at = Utc::now();
    ctx.set_now(Some(issued_at));

    let response = services::login(ctx.clone(), "10.0.0.1", "tess@example.com", "Wibble123!Wobble").await.unwrap();

    ctx.set_now(Some(issued_at + Duration::seconds(60)));
    services::change_password(ctx.clone(), &user_id, "Wibble123!Wobble", "Brand-New-Passw0rd!").await
        .expect("Changing the password should succeed");

    let user = ctx.users().find_by_id(&user_id).await.unwrap().unwrap();
    let changed_at = user.password_changed_at.expect("The change should be timestamped").to_chrono();

    let err = ctx.sessions().verify(&response.access_token, Some(changed_at))
        .expect_err("The pre-change session should be revoked");
    assert_eq!(err.error_code(), ErrorCode::SessionSuperseded);
}
