use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use warden::db::memory::{MemoryResetTokenStore, MemoryUserStore};
use warden::db::mongo::generate_id;
use warden::mailer::{MailRequest, Mailer};
use warden::model::hashing;
use warden::model::user::UserCredential;
use warden::utils::config::Configuration;
use warden::utils::context::ServiceContext;
use warden::utils::errors::{AuthError, ErrorCode};

///
/// A mailer that captures every request so tests can inspect what would have been
/// sent. Flip `fail` to make sends error.
///
pub struct CaptureMailer {
    pub sent: Mutex<Vec<MailRequest>>,
    pub fail: AtomicBool,
}

impl CaptureMailer {
    pub fn new() -> Arc<Self> {
        Arc::new(CaptureMailer { sent: Mutex::new(Vec::new()), fail: AtomicBool::new(false) })
    }

    ///
    /// The reset_link template variable from the most recent captured mail.
    ///
    /// Tests run without a frontend url configured, so the link is the bare secret.
    ///
    pub fn last_reset_secret(&self) -> Option<String> {
        let sent = self.sent.lock();
        let last = sent.last()?;

        last.context.iter()
            .find(|(key, _)| key == "reset_link")
            .map(|(_, value)| value.clone())
    }
}

#[async_trait]
impl Mailer for CaptureMailer {
    async fn send(&self, request: MailRequest) -> Result<String, AuthError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ErrorCode::ConfigurationInvalid.with_msg("Mail provider rejected the send"))
        }

        self.sent.lock().push(request);
        Ok(generate_id())
    }
}

pub fn test_config() -> Configuration {
    Configuration {
        db_name: String::from("WardenTest"),
        mongo_uri: String::from("mongodb://localhost:27017"),
        mongo_credentials: None,
        rate_limit_backend: String::from("memory"),
        rate_limit_strict: true,
        token_secret: String::from("a-test-only-signing-secret-at-least-32-chars"),
        token_expiry_seconds: 3600,
        max_failed_logins: 5,
        attempt_reset_window_seconds: 15 * 60,
        lockout_duration_seconds: 15 * 60,
        reset_token_ttl_seconds: 60 * 60,
        reset_request_limit: 3,
        reset_request_window_seconds: 60 * 60,
        login_rate_limit: 10,
        login_rate_window_seconds: 15 * 60,
        min_password_length: 12,
        frontend_url: None,
    }
}

///
/// Build a fully-wired core on in-process stores, with a capturing mailer.
///
pub fn start_warden(config: Configuration) -> (Arc<ServiceContext>, Arc<CaptureMailer>) {
    warden::init_tracing();

    let mailer = CaptureMailer::new();
    let rate_limit_store = Arc::new(warden::rate_limit::memory::MemoryRateLimitStore::new());

    let ctx = Arc::new(ServiceContext::new(
        config,
        Arc::new(MemoryUserStore::new()),
        Arc::new(MemoryResetTokenStore::new()),
        rate_limit_store,
        mailer.clone()));

    (ctx, mailer)
}

///
/// Persist a user with the given credentials, returning their id.
///
pub async fn create_user(ctx: &ServiceContext, email: &str, password: &str) -> String {
    let user = UserCredential {
        user_id: generate_id(),
        email: email.to_string(),
        first_name: String::from("Tess"),
        last_name: String::from("Tyre"),
        is_admin: false,
        phc: hashing::hash_into_phc(password).expect("Unable to hash the test password"),
        password_changed_at: None,
        is_locked: false,
        locked_until: None,
    };

    ctx.users().save(&user).await.expect("Unable to save the test user");
    user.user_id
}

///
/// Fix the shared clock at an RFC3339 instant.
///
pub fn set_time(ctx: &ServiceContext, time: &str) {
    let fixed: DateTime<Utc> = DateTime::parse_from_rfc3339(time)
        .expect("Invalid test timestamp")
        .with_timezone(&Utc);

    ctx.set_now(Some(fixed));
}
