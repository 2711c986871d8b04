pub mod hashing;
pub mod policy;
pub mod reset_token;
pub mod user;
