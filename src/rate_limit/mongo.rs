use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::{Database, bson::{Document, doc}};
use super::RateLimitStore;
use crate::db::mongo::upsert;
use crate::db::prelude::*;
use crate::utils::errors::AuthError;

///
/// MongoDB-backed sliding-window entries, shared by every instance of the service.
///
/// One document per key holding an array of hit timestamps. Prune and record are
/// targeted array updates ($pull/$push) so concurrent instances don't clobber each
/// other with stale read-modify-writes.
///
pub struct MongoRateLimitStore {
    db: Database,
}

impl MongoRateLimitStore {
    pub fn new(db: Database) -> Self {
        MongoRateLimitStore { db }
    }
}

#[async_trait]
impl RateLimitStore for MongoRateLimitStore {
    async fn prune_and_count(&self, key: &str, cutoff: DateTime<Utc>) -> Result<u32, AuthError> {
        let cutoff = bson::DateTime::from_chrono(cutoff);

        self.db.collection::<Document>(RATE_LIMITS)
            .update_one(
                doc!{ KEY: key },
                doc!{ "$pull": { ENTRIES: { "$lt": cutoff } } },
                None)
            .await?;

        let window = self.db.collection::<Document>(RATE_LIMITS)
            .find_one(doc!{ KEY: key }, None)
            .await?;

        match window {
            Some(window) => Ok(window.get_array(ENTRIES)?.len() as u32),
            None => Ok(0),
        }
    }

    async fn oldest(&self, key: &str) -> Result<Option<DateTime<Utc>>, AuthError> {
        let window = self.db.collection::<Document>(RATE_LIMITS)
            .find_one(doc!{ KEY: key }, None)
            .await?;

        // Entries are pushed in order, so the front of the array is the oldest.
        match window {
            Some(window) => {
                match window.get_array(ENTRIES)?.first() {
                    Some(entry) => Ok(entry.as_datetime().map(|dt| dt.to_chrono())),
                    None => Ok(None),
                }
            },
            None => Ok(None),
        }
    }

    async fn record(&self, key: &str, at: DateTime<Utc>) -> Result<(), AuthError> {
        let at = bson::DateTime::from_chrono(at);

        self.db.collection::<Document>(RATE_LIMITS)
            .update_one(
                doc!{ KEY: key },
                doc!{ "$push": { ENTRIES: at } },
                upsert())
            .await?;

        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<(), AuthError> {
        self.db.collection::<Document>(RATE_LIMITS)
            .delete_one(doc!{ KEY: key }, None)
            .await?;

        Ok(())
    }
}
