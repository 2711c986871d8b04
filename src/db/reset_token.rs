use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::Database;
use bson::{Document, doc};
use super::ResetTokenStore;
use super::mongo::Persistable;
use super::prelude::*;
use crate::model::reset_token::PasswordResetToken;
use crate::utils::errors::AuthError;

///
/// Password-reset tokens persisted in MongoDB.
///
pub struct MongoResetTokenStore {
    db: Database,
}

impl MongoResetTokenStore {
    pub fn new(db: Database) -> Self {
        MongoResetTokenStore { db }
    }
}

#[async_trait]
impl ResetTokenStore for MongoResetTokenStore {
    async fn find_by_hash(&self, token_hash: &str) -> Result<Option<PasswordResetToken>, AuthError> {
        let filter = doc!{ TOKEN_HASH: token_hash };

        Ok(self.db.collection::<PasswordResetToken>(RESET_TOKENS).find_one(filter, None).await?)
    }

    async fn delete_unused_for_user(&self, user_id: &str) -> Result<(), AuthError> {
        let filter = doc!{ USER_ID: user_id, USED: false };

        self.db.collection::<Document>(RESET_TOKENS).delete_many(filter, None).await?;

        Ok(())
    }

    async fn insert(&self, token: &PasswordResetToken) -> Result<(), AuthError> {
        self.db.collection::<Document>(RESET_TOKENS).insert_one(token.to_doc()?, None).await?;

        Ok(())
    }

    async fn mark_used(&self, token_id: &str, used_at: DateTime<Utc>) -> Result<bool, AuthError> {
        // The used=false filter makes this a compare-and-swap: only one concurrent
        // consumer can match and flip the flag.
        let filter = doc!{ TOKEN_ID: token_id, USED: false };

        let update = doc!{
            "$set": {
                USED: true,
                USED_AT: bson::DateTime::from_chrono(used_at),
            }
        };

        let result = self.db.collection::<Document>(RESET_TOKENS).update_one(filter, update, None).await?;

        Ok(result.modified_count == 1)
    }
}
