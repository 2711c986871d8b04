use derive_more::Display;
use config::ConfigError;
use tokio::task::JoinError;
use bson::document::ValueAccessError;

#[derive(Clone, Copy, Debug, Display, PartialEq)]
pub enum ErrorCode {
    HashThreadingIssue              = 0401,
    UnableToReadCredentials         = 0500,
    ConfigurationInvalid            = 0501,
    MongoDBError                    = 0503,
    InvalidBSON                     = 0504,
    InvalidJSON                     = 0505,
    BSONFieldNotFound               = 0507,
    HashingError                    = 0509,
    InvalidPHCFormat                = 0510,
    TokenSigningError               = 0511,
    RateLimitStoreUnavailable       = 0600,
    PasswordTooShort                = 2002,
    NotEnoughNumbers                = 2007,
    NotEnoughSymbols                = 2009,
    NotMixedCase                    = 2011,
    InvalidCredentials              = 2100,
    AccountLocked                   = 2102,
    SessionTokenInvalid             = 2105,
    SessionSuperseded               = 2106,
    InvalidResetToken               = 2200,
    RateLimited                     = 2500,
}

impl ErrorCode {
    pub fn with_msg(&self, message: &str) -> AuthError {
        AuthError::new(*self, message)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AuthError {
    error_code: ErrorCode,
    message: String,
}

impl AuthError {
    pub fn new(error_code: ErrorCode, message: &str) -> Self {
        AuthError { error_code, message: message.to_string() }
    }

    pub fn error_code(&self) -> ErrorCode {
        self.error_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<ConfigError> for AuthError {
    fn from(error: ConfigError) -> Self {
        ErrorCode::ConfigurationInvalid.with_msg(&format!("The service configuration is not correct: {}", error))
    }
}

impl From<argon2::Error> for AuthError {
    fn from(error: argon2::Error) -> Self {
        ErrorCode::HashingError.with_msg(&format!("Invalid configuration for algorithm: {}", error))
    }
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(error: argon2::password_hash::Error) -> Self {
        ErrorCode::HashingError.with_msg(&format!("Unable to hash password: {}", error))
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(error: serde_json::Error) -> Self {
        ErrorCode::InvalidJSON.with_msg(&format!("Unable to convert to json: {}", error))
    }
}

impl From<mongodb::error::Error> for AuthError {
    fn from(error: mongodb::error::Error) -> Self {
        ErrorCode::MongoDBError.with_msg(&format!("MongoDB error: {}", error))
    }
}

impl From<ValueAccessError> for AuthError {
    fn from(error: ValueAccessError) -> Self {
        ErrorCode::BSONFieldNotFound.with_msg(&format!("Unable to read BSON: {}", error))
    }
}

impl From<bson::ser::Error> for AuthError {
    fn from(error: bson::ser::Error) -> Self {
        ErrorCode::InvalidBSON.with_msg(&format!("Unable to serialise BSON: {}", error))
    }
}

impl From<bson::de::Error> for AuthError {
    fn from(error: bson::de::Error) -> Self {
        ErrorCode::InvalidBSON.with_msg(&format!("Unable to deserialise BSON: {}", error))
    }
}

impl From<JoinError> for AuthError {
    fn from(error: JoinError) -> Self {
        ErrorCode::HashThreadingIssue.with_msg(&format!("Unable to hash: {}", error))
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        ErrorCode::TokenSigningError.with_msg(&format!("Unable to sign session token: {}", error))
    }
}

///
/// The error shape surfaced to callers - a fixed {code, message} taxonomy with an
/// HTTP-ish status. Internal detail never leaks through this boundary.
///
#[derive(Clone, Debug, PartialEq)]
pub struct ApiError {
    pub code: &'static str,
    pub status: u16,
    pub message: String,
}

///
/// Collapse our internal error codes onto the public taxonomy.
///
impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        use ErrorCode::*;

        let (code, status) = match &error.error_code {
            BSONFieldNotFound         |
            ConfigurationInvalid      |
            HashThreadingIssue        |
            HashingError              |
            InvalidBSON               |
            InvalidJSON               |
            InvalidPHCFormat          |
            MongoDBError              |
            RateLimitStoreUnavailable |
            TokenSigningError         |
            UnableToReadCredentials => ("INTERNAL_ERROR", 500),

            NotEnoughNumbers |
            NotEnoughSymbols |
            NotMixedCase     |
            PasswordTooShort => ("WEAK_PASSWORD", 400),

            InvalidCredentials => ("AUTH_INVALID_CREDENTIALS", 401),

            AccountLocked => ("AUTH_ACCOUNT_LOCKED", 401),

            InvalidResetToken   |
            SessionSuperseded   |
            SessionTokenInvalid => ("AUTH_INVALID_TOKEN", 401),

            RateLimited => ("RATE_LIMITED", 429),
        };

        // Infrastructure failures get a blanket message - the detail stays in the logs.
        let message = match status {
            500 => String::from("Internal server error"),
            _   => error.message,
        };

        ApiError { code, status, message }
    }
}
