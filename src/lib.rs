pub mod audit;
pub mod db;
pub mod lockout;
pub mod mailer;
pub mod model;
pub mod rate_limit;
pub mod services;
pub mod session;
pub mod utils;

use std::sync::Arc;
use dotenv::dotenv;
use db::mongo;
use mailer::TracingMailer;
use rate_limit::{RateLimitStore, memory::MemoryRateLimitStore, mongo::MongoRateLimitStore};
use utils::config::{Configuration, self};
use utils::context::ServiceContext;
use utils::errors::AuthError;
use tracing_subscriber::{prelude::__tracing_subscriber_SubscriberExt, Registry, util::SubscriberInitExt};

pub const APP_NAME: &str = "Warden";

///
/// Initialise and wire the core from the environment - the entry point for an
/// embedding server.
///
pub async fn bootstrap() -> Result<Arc<ServiceContext>, AuthError> {

    // Load any local dev settings as environment variables from a .env file.
    dotenv().ok();

    // Default log level to INFO if it's not specified.
    config::default_env("RUST_LOG", "INFO");

    // Load the service configuration into struct.
    let config = Configuration::from_env()?;

    init_tracing();

    tracing::info!("{}\n{}", BANNER, config.fmt_console()?);

    // Create a MongoDB client and connect to it before proceeding.
    let db = mongo::get_mongo_db(APP_NAME, &config).await?;

    // Ensure the schema is in sync with the code.
    mongo::update_mongo(&db).await?;

    let users = Arc::new(db::user::MongoUserStore::new(db.clone()));
    let reset_tokens = Arc::new(db::reset_token::MongoResetTokenStore::new(db.clone()));

    let rate_limit_store: Arc<dyn RateLimitStore> = match config.rate_limit_backend.as_str() {
        "memory" => Arc::new(MemoryRateLimitStore::new()),
        _        => Arc::new(MongoRateLimitStore::new(db)),
    };

    Ok(Arc::new(ServiceContext::new(
        config,
        users,
        reset_tokens,
        rate_limit_store,
        Arc::new(TracingMailer))))
}

pub fn init_tracing() {
    if let Err(err) = Registry::default()
        .with(tracing_subscriber::EnvFilter::from_default_env()) // Set the tracing level to match RUST_LOG env variable.
        .with(tracing_subscriber::fmt::layer().with_test_writer().with_ansi(true))
        .try_init() {
            tracing::info!("Tracing already initialised: {}", err.to_string()); // Allowed error here - tests call this fn repeatedly.
    }
}

const BANNER: &str = r#"
 __      __                 .___
/  \    /  \_____ _______ __| _/____   ____
\   \/\/   /\__  \\_  __ \ __ |/ __ \ /    \
 \        /  / __ \|  | \/ /_/ \  ___/|   |  \
  \__/\  /  (____  /__|  \____ |\___  >___|  /
       \/        \/           \/    \/     \/
"#;
