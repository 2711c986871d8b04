use std::collections::HashMap;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use super::{ResetTokenStore, UserStore};
use crate::model::reset_token::PasswordResetToken;
use crate::model::user::UserCredential;
use crate::utils::errors::AuthError;

///
/// In-process user store for single-instance deployments and tests.
///
/// Mutations go through a single mutex so concurrent updates for the same user
/// serialise, mirroring the targeted-update guarantees of the MongoDB store.
///
pub struct MemoryUserStore {
    users: Mutex<HashMap<String, UserCredential>>, // keyed by user_id
}

impl MemoryUserStore {
    pub fn new() -> Self {
        MemoryUserStore { users: Mutex::new(HashMap::new()) }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredential>, AuthError> {
        let users = self.users.lock();
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserCredential>, AuthError> {
        let users = self.users.lock();
        Ok(users.get(user_id).cloned())
    }

    async fn save(&self, user: &UserCredential) -> Result<(), AuthError> {
        let mut users = self.users.lock();
        users.insert(user.user_id.clone(), user.clone());
        Ok(())
    }

    async fn update_password_hash(&self, user_id: &str, phc: &str, changed_at: DateTime<Utc>) -> Result<(), AuthError> {
        let mut users = self.users.lock();
        if let Some(user) = users.get_mut(user_id) {
            user.phc = phc.to_string();
            user.password_changed_at = Some(bson::DateTime::from_chrono(changed_at));
        }
        Ok(())
    }

    async fn set_lock(&self, email: &str, locked_until: DateTime<Utc>) -> Result<(), AuthError> {
        let mut users = self.users.lock();
        if let Some(user) = users.values_mut().find(|u| u.email == email) {
            user.is_locked = true;
            user.locked_until = Some(bson::DateTime::from_chrono(locked_until));
        }
        Ok(())
    }

    async fn clear_lock(&self, email: &str) -> Result<(), AuthError> {
        let mut users = self.users.lock();
        if let Some(user) = users.values_mut().find(|u| u.email == email) {
            user.is_locked = false;
            user.locked_until = None;
        }
        Ok(())
    }
}

///
/// In-process reset-token store for single-instance deployments and tests.
///
pub struct MemoryResetTokenStore {
    tokens: Mutex<HashMap<String, PasswordResetToken>>, // keyed by token_id
}

impl MemoryResetTokenStore {
    pub fn new() -> Self {
        MemoryResetTokenStore { tokens: Mutex::new(HashMap::new()) }
    }
}

#[async_trait]
impl ResetTokenStore for MemoryResetTokenStore {
    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<PasswordResetToken>, AuthError> {
        let tokens = self.tokens.lock();
        Ok(tokens.values().find(|t| t.token_hash == token_hash).cloned())
    }

    async fn delete_unused_for_user(&self, user_id: &str) -> Result<(), AuthError> {
        let mut tokens = self.tokens.lock();
        tokens.retain(|_, t| !(t.user_id == user_id && !t.used));
        Ok(())
    }

    async fn insert(&self, token: &PasswordResetToken) -> Result<(), AuthError> {
        let mut tokens = self.tokens.lock();
        tokens.insert(token.token_id.clone(), token.clone());
        Ok(())
    }

    async fn mark_used(&self, token_id: &str, used_at: DateTime<Utc>) -> Result<bool, AuthError> {
        // Flip under the lock so only one concurrent consumer wins.
        let mut tokens = self.tokens.lock();
        match tokens.get_mut(token_id) {
            Some(token) if !token.used => {
                token.used = true;
                token.used_at = Some(bson::DateTime::from_chrono(used_at));
                Ok(true)
            },
            _ => Ok(false),
        }
    }
}
