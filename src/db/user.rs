use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::Database;
use bson::{Document, doc};
use super::UserStore;
use super::mongo::{self, Persistable};
use super::prelude::*;
use crate::model::user::UserCredential;
use crate::utils::errors::AuthError;

///
/// User credentials persisted in MongoDB - the store shared by every instance.
///
pub struct MongoUserStore {
    db: Database,
}

impl MongoUserStore {
    pub fn new(db: Database) -> Self {
        MongoUserStore { db }
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredential>, AuthError> {
        let filter = doc!{ EMAIL: email };

        Ok(self.db.collection::<UserCredential>(USERS).find_one(filter, None).await?)
    }

    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserCredential>, AuthError> {
        let filter = doc!{ USER_ID: user_id };

        Ok(self.db.collection::<UserCredential>(USERS).find_one(filter, None).await?)
    }

    async fn save(&self, user: &UserCredential) -> Result<(), AuthError> {
        let filter = doc!{ USER_ID: &user.user_id };
        let update = doc!{ "$set": user.to_doc()? };

        self.db.collection::<Document>(USERS).update_one(filter, update, mongo::upsert()).await?;

        Ok(())
    }

    async fn update_password_hash(&self, user_id: &str, phc: &str, changed_at: DateTime<Utc>) -> Result<(), AuthError> {
        let filter = doc!{ USER_ID: user_id };

        let update = doc!{
            "$set": {
                PHC: phc,
                PASSWORD_CHANGED_AT: bson::DateTime::from_chrono(changed_at),
            }
        };

        self.db.collection::<Document>(USERS).update_one(filter, update, None).await?;

        Ok(())
    }

    async fn set_lock(&self, email: &str, locked_until: DateTime<Utc>) -> Result<(), AuthError> {
        let filter = doc!{ EMAIL: email };

        let update = doc!{
            "$set": {
                IS_LOCKED: true,
                LOCKED_UNTIL: bson::DateTime::from_chrono(locked_until),
            }
        };

        self.db.collection::<Document>(USERS).update_one(filter, update, None).await?;

        Ok(())
    }

    async fn clear_lock(&self, email: &str) -> Result<(), AuthError> {
        let filter = doc!{ EMAIL: email };

        let update = doc!{
            "$set":   { IS_LOCKED: false },
            "$unset": { LOCKED_UNTIL: "" },
        };

        self.db.collection::<Document>(USERS).update_one(filter, update, None).await?;

        Ok(())
    }
}
