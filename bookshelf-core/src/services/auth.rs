//! Auth service - registration, login and password hashing

use std::sync::Arc;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::Rng;

use crate::adapters::duckdb::DuckDbRepository;
use crate::domain::result::{Error, Result};
use crate::domain::User;

pub const REGISTRATION_FAILED: &str = "Registration fail, user or password error";
pub const NO_SUCH_USER: &str = "No such user, try again.";
pub const WRONG_PASSWORD: &str = "Wrong password";

/// Hash a password into an Argon2id PHC string with a fresh random salt
pub fn hash_password(password: &str) -> Result<String> {
    let salt_bytes: [u8; 16] = rand::thread_rng().gen();
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| Error::Other(format!("Failed to encode salt: {}", e)))?;

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::Other(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
}

/// Check a password against a stored PHC string
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| Error::Other(format!("Stored password hash is unreadable: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Auth service for account management
pub struct AuthService {
    repository: Arc<DuckDbRepository>,
}

impl AuthService {
    pub fn new(repository: Arc<DuckDbRepository>) -> Self {
        Self { repository }
    }

    /// Register a new account
    ///
    /// Rejects empty usernames, empty passwords and taken usernames with the
    /// same message. The user is not logged in.
    pub fn register(&self, username: &str, password: &str) -> Result<User> {
        if username.is_empty() || password.is_empty() {
            return Err(Error::validation(REGISTRATION_FAILED));
        }

        if self.repository.get_user_by_username(username)?.is_some() {
            return Err(Error::validation(REGISTRATION_FAILED));
        }

        let password_hash = hash_password(password)?;

        // A concurrent registration can still win between the check and the insert
        match self.repository.insert_user(username, &password_hash) {
            Ok(user) => Ok(user),
            Err(Error::Conflict(_)) => Err(Error::validation(REGISTRATION_FAILED)),
            Err(e) => Err(e),
        }
    }

    /// Authenticate by exact username match
    ///
    /// Unknown usernames and wrong passwords produce different messages.
    pub fn login(&self, username: &str, password: &str) -> Result<User> {
        let user = self
            .repository
            .get_user_by_username(username)?
            .ok_or_else(|| Error::validation(NO_SUCH_USER))?;

        if !verify_password(password, &user.password_hash)? {
            return Err(Error::validation(WRONG_PASSWORD));
        }

        Ok(user)
    }
}
