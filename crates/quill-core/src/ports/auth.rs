//! Authentication ports.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Session, User};

/// Email/password login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Fields for a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl NewAccount {
    pub fn credentials(&self) -> Credentials {
        Credentials {
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }
}

/// Auth provider trait - the backend's account service.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The signed-in user, if any. Never fails: lookup errors collapse to
    /// `None`.
    async fn current_user(&self) -> Option<User>;

    /// Start a session.
    async fn login(&self, credentials: &Credentials) -> Result<Session, AuthError>;

    /// End the current session.
    async fn logout(&self) -> Result<(), AuthError>;

    /// Register an account. Does not sign it in.
    async fn create_account(&self, account: &NewAccount) -> Result<User, AuthError>;
}

/// Password hashing service.
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;

    /// Whether a stored hash should be replaced on the next successful login.
    fn needs_rehash(&self, _hash: &str) -> bool {
        false
    }
}

/// Session token issuing and checking.
pub trait SessionTokens: Send + Sync {
    /// Issue a token for a user.
    fn issue(&self, user: &User) -> Result<Session, AuthError>;

    /// Validate a token, returning the user id it was issued for.
    fn validate(&self, token: &str) -> Result<String, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Session expired")]
    SessionExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("No active session")]
    NoSession,

    #[error("Account already exists: {0}")]
    AccountExists(String),

    #[error("Rejected: {0}")]
    Rejected(String),

    #[error("Hashing error: {0}")]
    HashingError(String),

    #[error("Auth backend error: {0}")]
    Backend(String),
}
