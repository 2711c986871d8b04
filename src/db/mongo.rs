use std::fs;
use uuid::Uuid;
use serde::Serialize;
use tracing::{debug, info};
use super::prelude::*;
use crate::utils::config::Configuration;
use crate::utils::errors::{AuthError, ErrorCode};
use mongodb::{Client, Database, bson::{self, Document, doc}, options::{ClientOptions, UpdateOptions}};

///
/// Run any schema-like updates against MongoDB that haven't been run yet.
///
pub async fn update_mongo(db: &Database) -> Result<(), AuthError> {
    create_init_indexes(db).await?;
    Ok(())
}

async fn create_init_indexes(db: &Database) -> Result<(), AuthError> {
    // Note: the current driver doesn't yet support creating indexes on collections, so the dbcommand must be used instead.
    // https://docs.mongodb.com/manual/reference/command/createIndexes/#createindexes

    db.run_command(doc! { "createIndexes": USERS,        "indexes": [{ "key": { EMAIL: 1 },      "name": "idx_email",      "unique": true }] }, None).await?;
    db.run_command(doc! { "createIndexes": RESET_TOKENS, "indexes": [{ "key": { TOKEN_HASH: 1 }, "name": "idx_token_hash", "unique": true }] }, None).await?;
    db.run_command(doc! { "createIndexes": RATE_LIMITS,  "indexes": [{ "key": { KEY: 1 },        "name": "idx_key",        "unique": true }] }, None).await?;

    Ok(())
}

pub async fn get_mongo_db(app_name: &str, config: &Configuration) -> Result<Database, AuthError> {

    let uri = match &config.mongo_credentials {
        Some(filename) => {
            debug!("Loading MongoDB credentials from secrets file {}", filename);

            // Read username and password from a secrets file.
            let credentials = fs::read_to_string(filename)
                .map_err(|err| AuthError::new(ErrorCode::UnableToReadCredentials, &format!("Unable to read credentials from {}: {}", filename, err)))?;
            let mut credentials = credentials.lines();
            let uri = config.mongo_uri.replace("$USERNAME", credentials.next().unwrap_or_default());
            uri.replace("$PASSWORD", credentials.next().unwrap_or_default())
        },
        None => config.mongo_uri.clone(),
    };

    // Parse the uri now.
    let mut client_options = ClientOptions::parse(&uri).await?;

    // Manually set an option.
    client_options.app_name = Some(app_name.to_string());

    // Get a handle to the deployment.
    let client = Client::with_options(client_options)?;

    info!("Connecting to MongoDB...");

    let db = client.database(&config.db_name);
    ping(&db).await?;

    info!("Connected to MongoDB");
    Ok(db)
}

pub async fn ping(db: &Database) -> Result<Document, AuthError> {
    Ok(db.run_command(doc! { "ping": 1 }, None).await?)
}

pub fn generate_id() -> String {
    Uuid::new_v4().to_hyphenated().to_string()
}

pub trait Persistable<T: Serialize> {
    ///
    /// Convert into a MongoDB BSON document.
    ///
    fn to_doc(&self) -> Result<Document, AuthError>;
}

impl<T: Serialize> Persistable<T> for T {
    fn to_doc(&self) -> Result<Document, AuthError> {
        let bson = bson::to_bson(self)
            .map_err(|err| AuthError::new(ErrorCode::InvalidBSON, &format!("Failed to serialise BSON: {}", err)))?;

        match bson.as_document() {
            Some(doc) => Ok(doc.to_owned()),
            None => Err(AuthError::new(ErrorCode::InvalidBSON, "Result is empty Document"))
        }
    }
}

pub fn upsert() -> UpdateOptions {
    UpdateOptions::builder().upsert(true).build()
}
