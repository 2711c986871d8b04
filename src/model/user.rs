use std::fmt;
use serde::{Deserialize, Serialize};

///
/// A persisted user credential.
///
/// The lock fields are always present (defaulted when absent in the store) so callers
/// never have to probe for them. The password hash must never appear in a log line or
/// a response - Debug is implemented by hand to enforce that.
///
#[derive(Clone, Deserialize, Serialize)]
pub struct UserCredential {
    pub user_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub is_admin: bool,
    pub phc: String,
    pub password_changed_at: Option<bson::DateTime>,
    #[serde(default)]
    pub is_locked: bool,
    pub locked_until: Option<bson::DateTime>,
}

impl fmt::Debug for UserCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserCredential")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("is_admin", &self.is_admin)
            .field("phc", &"<redacted>")
            .field("password_changed_at", &self.password_changed_at)
            .field("is_locked", &self.is_locked)
            .field("locked_until", &self.locked_until)
            .finish()
    }
}

///
/// Emails are stored and compared in canonical form.
///
pub fn normalise_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}
