pub mod memory;
pub mod mongo;
pub mod reset_token;
pub mod user;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use crate::model::reset_token::PasswordResetToken;
use crate::model::user::UserCredential;
use crate::utils::errors::AuthError;

pub mod prelude {
    // Collection names.
    pub const USERS:        &str = "Users";
    pub const RESET_TOKENS: &str = "ResetTokens";
    pub const RATE_LIMITS:  &str = "RateLimits";

    // Field names.
    pub const USER_ID:             &str = "user_id";
    pub const EMAIL:               &str = "email";
    pub const PHC:                 &str = "phc";
    pub const PASSWORD_CHANGED_AT: &str = "password_changed_at";
    pub const IS_LOCKED:           &str = "is_locked";
    pub const LOCKED_UNTIL:        &str = "locked_until";
    pub const TOKEN_ID:            &str = "token_id";
    pub const TOKEN_HASH:          &str = "token_hash";
    pub const USED:                &str = "used";
    pub const USED_AT:             &str = "used_at";
    pub const KEY:                 &str = "key";
    pub const ENTRIES:             &str = "entries";
}

///
/// The backing store for user credentials.
///
/// Lock and password-hash mutations are targeted field updates so concurrent writers
/// for the same user cannot clobber each other with a stale read-modify-write.
///
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredential>, AuthError>;

    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserCredential>, AuthError>;

    async fn save(&self, user: &UserCredential) -> Result<(), AuthError>;

    async fn update_password_hash(&self, user_id: &str, phc: &str, changed_at: DateTime<Utc>) -> Result<(), AuthError>;

    async fn set_lock(&self, email: &str, locked_until: DateTime<Utc>) -> Result<(), AuthError>;

    async fn clear_lock(&self, email: &str) -> Result<(), AuthError>;
}

///
/// The backing store for password-reset tokens.
///
#[async_trait]
pub trait ResetTokenStore: Send + Sync {
    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<PasswordResetToken>, AuthError>;

    ///
    /// Enforces the single-active-token invariant when a new token is issued.
    ///
    async fn delete_unused_for_user(&self, user_id: &str) -> Result<(), AuthError>;

    async fn insert(&self, token: &PasswordResetToken) -> Result<(), AuthError>;

    ///
    /// Compare-and-swap consumption: flips used=false to used=true and returns whether
    /// this caller won. At most one concurrent consumer can receive true.
    ///
    async fn mark_used(&self, token_id: &str, used_at: DateTime<Utc>) -> Result<bool, AuthError>;
}
