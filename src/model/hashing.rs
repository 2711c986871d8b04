use rand_core::OsRng;
use sha2::{Digest, Sha256};
use crate::utils::errors::{AuthError, ErrorCode};

///
/// Hash the password and build a PHC string ($argon2id$v=19$...).
///
/// ref: https://github.com/P-H-C/phc-string-format/blob/master/phc-sf-spec.md
///
pub fn hash_into_phc(plain_text_password: &str) -> Result<String, AuthError> {
    let password = plain_text_password.as_bytes();
    let salt = argon2::password_hash::SaltString::generate(&mut OsRng);

    Ok(<argon2::Argon2 as argon2::PasswordHasher>::hash_password(&argon2::Argon2::default(), password, salt.as_ref())?.to_string())
}

///
/// Verify the plain text password against a stored PHC string.
///
/// A mismatch is not an error - it's a `false`.
///
pub fn verify_phc(plain_text_password: &str, phc: &str) -> Result<bool, AuthError> {
    let parsed_hash = argon2::PasswordHash::new(phc)
        .map_err(|e| ErrorCode::InvalidPHCFormat.with_msg(&format!("The stored hash is not a valid PHC string: {}", e)))?;

    match argon2::PasswordVerifier::verify_password(&argon2::Argon2::default(), plain_text_password.as_bytes(), &parsed_hash) {
        Ok(_)  => Ok(true),
        Err(_) => Ok(false),
    }
}

///
/// One-way SHA-256 hash, hex-encoded. Used for reset-token secrets and audit hashing -
/// never for passwords.
///
pub fn sha256_hex(data: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data.as_bytes());
    hex::encode(hasher.finalize())
}
