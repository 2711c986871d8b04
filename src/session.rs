use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use crate::model::user::UserCredential;
use crate::utils::errors::{AuthError, ErrorCode};
use crate::utils::time_provider::Clock;

///
/// The claims carried in a signed session token.
///
#[derive(Debug, Deserialize, Serialize)]
pub struct SessionClaims {
    pub sub: String,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

///
/// Issues and verifies signed session tokens (HS256 JWTs).
///
/// A token issued before the user's last password change is rejected on verify -
/// changing a password revokes every session minted before the change.
///
pub struct SessionIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_seconds: i64,
    clock: Clock,
}

impl SessionIssuer {
    pub fn new(secret: &str, expiry_seconds: i64, clock: Clock) -> Self {
        SessionIssuer {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_seconds,
            clock,
        }
    }

    ///
    /// Mint a signed token for an authenticated user.
    ///
    pub fn issue(&self, user: &UserCredential) -> Result<String, AuthError> {
        let iat = self.clock.now().timestamp();

        let claims = SessionClaims {
            sub: user.user_id.clone(),
            username: user.email.clone(),
            iat,
            exp: iat + self.expiry_seconds,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|err| AuthError::new(ErrorCode::TokenSigningError, &format!("Failed to sign session token: {}", err)))
    }

    ///
    /// Verify a token's signature and expiry and return its claims.
    ///
    /// `password_changed_at` is the user's last password change, if any - tokens
    /// issued before it are treated as revoked.
    ///
    pub fn verify(&self, token: &str, password_changed_at: Option<DateTime<Utc>>) -> Result<SessionClaims, AuthError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map_err(|_| ErrorCode::SessionTokenInvalid.with_msg("The session token is not valid"))?;

        if let Some(changed_at) = password_changed_at {
            if data.claims.iat < changed_at.timestamp() {
                return Err(ErrorCode::SessionSuperseded.with_msg("The session token has been superseded by a password change"))
            }
        }

        Ok(data.claims)
    }
}
