use serde::{Deserialize, Serialize};
use crate::utils::errors::{AuthError, ErrorCode};

///
/// The password strength policy applied whenever a password is set or reset.
///
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PasswordPolicy {
    pub min_length: u32,
    pub mixed_case_required: bool,
    pub numbers_required: bool,
    pub symbols_required: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        PasswordPolicy {
            min_length: 12,
            mixed_case_required: true,
            numbers_required: true,
            symbols_required: true,
        }
    }
}

impl PasswordPolicy {
    ///
    /// Check the plain text password doesn't violate this policy's format.
    ///
    pub fn validate_pattern(&self, plain_text_password: &str) -> Result<(), AuthError> {

        if plain_text_password.chars().count() < self.min_length as usize {
            return Err(ErrorCode::PasswordTooShort
                .with_msg(&format!("passwords must be at least {} characters", self.min_length)))
        }

        if self.mixed_case_required {
            if !plain_text_password.chars().any(|c| c.is_lowercase())
                || !plain_text_password.chars().any(|c| c.is_uppercase()) {

                return Err(ErrorCode::NotMixedCase
                    .with_msg("a password must contain a mixture of upper and lower case"))
            }
        }

        if self.numbers_required {
            if !plain_text_password.chars().any(|c| c.is_numeric()) {
                return Err(ErrorCode::NotEnoughNumbers
                    .with_msg("a password must contain at least 1 number"))
            }
        }

        if self.symbols_required {
            if !plain_text_password.chars().any(|c| !c.is_alphanumeric()) {
                return Err(ErrorCode::NotEnoughSymbols
                    .with_msg("a password must contain at least 1 symbol"))
            }
        }

        Ok(())
    }
}
