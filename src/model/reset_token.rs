use serde::{Deserialize, Serialize};

///
/// A persisted password-reset token.
///
/// Only the one-way hash of the secret is ever stored - the raw secret exists just
/// long enough to be embedded in the reset link. At most one unused token is valid
/// per user at a time and a token can be consumed exactly once.
///
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PasswordResetToken {
    pub token_id: String,
    pub user_id: String,
    pub token_hash: String,
    pub expires_at: bson::DateTime,
    pub used: bool,
    pub used_at: Option<bson::DateTime>,
    pub created_at: bson::DateTime,
}
