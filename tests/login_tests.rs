mod common;
use warden::services;
use warden::utils::errors::{ApiError, ErrorCode};
use crate::common::{create_user, set_time, start_warden, test_config};


#[tokio::test]
async fn test_a_user_can_login_with_the_correct_password() {
    let (ctx, _mailer) = start_warden(test_config());
    let user_id = create_user(&ctx, "tess@example.com", "Wibble123!Wobble").await;

    let response = services::login(ctx.clone(), "10.0.0.1", "tess@example.com", "Wibble123!Wobble").await
        .expect("Login should succeed");

    assert_eq!(response.id, user_id);
    assert_eq!(response.first_name, "Tess");
    assert_eq!(response.last_name, "Tyre");
    assert_eq!(response.is_admin, false);
    assert_ne!(response.access_token.len(), 0);
}


#[tokio::test]
async fn test_login_normalises_the_email() {
    let (ctx, _mailer) = start_warden(test_config());
    create_user(&ctx, "tess@example.com", "Wibble123!Wobble").await;

    // Mixed case and surrounding whitespace still match the stored address.
    services::login(ctx.clone(), "10.0.0.1", "  Tess@Example.COM ", "Wibble123!Wobble").await
        .expect("Login should succeed");
}


#[tokio::test]
async fn test_unknown_email_and_wrong_password_are_indistinguishable() {
    let (ctx, _mailer) = start_warden(test_config());
    create_user(&ctx, "tess@example.com", "Wibble123!Wobble").await;

    let unknown = services::login(ctx.clone(), "10.0.0.1", "nobody@example.com", "Wibble123!Wobble").await
        .expect_err("Unknown email should be rejected");

    let wrong = services::login(ctx.clone(), "10.0.0.1", "tess@example.com", "Not-The-Password-1").await
        .expect_err("Wrong password should be rejected");

    // Identical code and message - the response can't be used to enumerate accounts.
    assert_eq!(unknown, wrong);
    assert_eq!(unknown.error_code(), ErrorCode::InvalidCredentials);

    let api: ApiError = unknown.into();
    assert_eq!(api.code, "AUTH_INVALID_CREDENTIALS");
    assert_eq!(api.status, 401);
}


#[tokio::test]
async fn test_repeated_failures_lock_the_account() {
    let (ctx, _mailer) = start_warden(test_config());
    create_user(&ctx, "tess@example.com", "Wibble123!Wobble").await;

    // The first 5 failures all report invalid credentials.
    for _ in 0..5 {
        let err = services::login(ctx.clone(), "10.0.0.1", "tess@example.com", "Not-The-Password-1").await
            .expect_err("Wrong password should be rejected");
        assert_eq!(err.error_code(), ErrorCode::InvalidCredentials);
    }

    // The lock is persisted on the user record.
    let user = ctx.users().find_by_email("tess@example.com").await.unwrap().unwrap();
    assert_eq!(user.is_locked, true);
    assert!(user.locked_until.is_some());

    // Even the correct password is now refused.
    let err = services::login(ctx.clone(), "10.0.0.1", "tess@example.com", "Wibble123!Wobble").await
        .expect_err("A locked account should refuse logins");
    assert_eq!(err.error_code(), ErrorCode::AccountLocked);

    let api: ApiError = err.into();
    assert_eq!(api.code, "AUTH_ACCOUNT_LOCKED");
}


#[tokio::test]
async fn test_a_successful_login_resets_the_failure_count() {
    let (ctx, _mailer) = start_warden(test_config());
    create_user(&ctx, "tess@example.com", "Wibble123!Wobble").await;

    // 4 failures, then a success.
    for _ in 0..4 {
        let _ = services::login(ctx.clone(), "10.0.0.1", "tess@example.com", "Not-The-Password-1").await;
    }
    services::login(ctx.clone(), "10.0.0.1", "tess@example.com", "Wibble123!Wobble").await
        .expect("Login should succeed");

    // 4 more failures don't reach the threshold - the counter restarted.
    for _ in 0..4 {
        let err = services::login(ctx.clone(), "10.0.0.1", "tess@example.com", "Not-The-Password-1").await
            .expect_err("Wrong password should be rejected");
        assert_eq!(err.error_code(), ErrorCode::InvalidCredentials);
    }

    services::login(ctx.clone(), "10.0.0.1", "tess@example.com", "Wibble123!Wobble").await
        .expect("Login should still succeed");
}


#[tokio::test]
async fn test_stale_failures_are_forgotten() {
    let (ctx, _mailer) = start_warden(test_config());
    create_user(&ctx, "tess@example.com", "Wibble123!Wobble").await;

    // 4 failures at a fixed point in time.
    set_time(&ctx, "2022-03-01T09:30:00Z");
    for _ in 0..4 {
        let _ = services::login(ctx.clone(), "10.0.0.1", "tess@example.com", "Not-The-Password-1").await;
    }

    // Time-travel past the attempt-reset window (and the rate-limit window).
    set_time(&ctx, "2022-03-01T10:30:00Z");

    // 4 more failures still don't lock - the stale count restarted at 1.
    for _ in 0..4 {
        let err = services::login(ctx.clone(), "10.0.0.1", "tess@example.com", "Not-The-Password-1").await
            .expect_err("Wrong password should be rejected");
        assert_eq!(err.error_code(), ErrorCode::InvalidCredentials);
    }

    services::login(ctx.clone(), "10.0.0.1", "tess@example.com", "Wibble123!Wobble").await
        .expect("Login should succeed");
}


#[tokio::test]
async fn test_an_expired_lock_clears_on_the_next_login() {
    let (ctx, _mailer) = start_warden(test_config());
    create_user(&ctx, "tess@example.com", "Wibble123!Wobble").await;

    // Lock the account.
    set_time(&ctx, "2022-03-01T09:30:00Z");
    for _ in 0..5 {
        let _ = services::login(ctx.clone(), "10.0.0.1", "tess@example.com", "Not-The-Password-1").await;
    }

    // Time-travel past the lockout duration.
    set_time(&ctx, "2022-03-01T09:46:00Z");

    services::login(ctx.clone(), "10.0.0.1", "tess@example.com", "Wibble123!Wobble").await
        .expect("Login should succeed once the lock has expired");

    // The persisted lock was cleared before the login returned.
    let user = ctx.users().find_by_email("tess@example.com").await.unwrap().unwrap();
    assert_eq!(user.is_locked, false);
    assert!(user.locked_until.is_none());
}


#[tokio::test]
async fn test_logins_are_rate_limited_per_client() {
    let (ctx, _mailer) = start_warden(test_config());
    create_user(&ctx, "tess@example.com", "Wibble123!Wobble").await;

    // Exhaust the window - the limit counts attempts, not failures.
    for _ in 0..10 {
        let _ = services::login(ctx.clone(), "10.0.0.1", "tess@example.com", "Wibble123!Wobble").await;
    }

    let err = services::login(ctx.clone(), "10.0.0.1", "tess@example.com", "Wibble123!Wobble").await
        .expect_err("The 11th attempt in the window should be refused");
    assert_eq!(err.error_code(), ErrorCode::RateLimited);

    let api: ApiError = err.into();
    assert_eq!(api.code, "RATE_LIMITED");
    assert_eq!(api.status, 429);

    // A different client key is unaffected.
    services::login(ctx.clone(), "10.0.0.2", "tess@example.com", "Wibble123!Wobble").await
        .expect("A different client should still be able to login");
}
