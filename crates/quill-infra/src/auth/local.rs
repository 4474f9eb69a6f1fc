//! Local account service.
//!
//! Keeps accounts in memory and holds the single "current" session the
//! client is signed in with, the way a browser SDK keeps its session cookie.
//! Passwords are stored as Argon2id hashes and upgraded on login when the
//! stored hash was made with weaker parameters.

use std::collections::HashMap;
use std::sync::Arc;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use tokio::sync::RwLock;

use quill_core::domain::{Session, User};
use quill_core::ports::{
    AuthError, AuthProvider, Credentials, NewAccount, PasswordService, SessionTokens,
};

/// Argon2id password hashes for local accounts.
pub struct AccountPasswords {
    argon2: Argon2<'static>,
}

impl AccountPasswords {
    pub fn new() -> Self {
        Self::with_params(Params::default())
    }

    pub fn with_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }
}

impl Default for AccountPasswords {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordService for AccountPasswords {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AuthError::HashingError(e.to_string()))
    }

    /// A stored hash that does not parse is an error; a wrong password is
    /// `Ok(false)`. Verification uses the parameters recorded in the hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash).map_err(|e| AuthError::HashingError(e.to_string()))?;
        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    fn needs_rehash(&self, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return true;
        };
        let Ok(stored) = Params::try_from(&parsed) else {
            return true;
        };
        let current = self.argon2.params();
        parsed.algorithm != Algorithm::Argon2id.ident()
            || stored.m_cost() < current.m_cost()
            || stored.t_cost() < current.t_cost()
            || stored.p_cost() < current.p_cost()
    }
}

struct Account {
    user: User,
    password_hash: String,
}

pub struct LocalAuthProvider {
    passwords: Arc<dyn PasswordService>,
    tokens: Arc<dyn SessionTokens>,
    /// Keyed by lower-cased email.
    accounts: RwLock<HashMap<String, Account>>,
    current: RwLock<Option<Session>>,
}

impl LocalAuthProvider {
    pub fn new(passwords: Arc<dyn PasswordService>, tokens: Arc<dyn SessionTokens>) -> Self {
        Self {
            passwords,
            tokens,
            accounts: RwLock::new(HashMap::new()),
            current: RwLock::new(None),
        }
    }

    pub async fn current_session(&self) -> Option<Session> {
        self.current.read().await.clone()
    }

    async fn user_by_id(&self, id: &str) -> Option<User> {
        self.accounts
            .read()
            .await
            .values()
            .find(|a| a.user.id == id)
            .map(|a| a.user.clone())
    }
}

fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl AuthProvider for LocalAuthProvider {
    async fn current_user(&self) -> Option<User> {
        let session = self.current.read().await.clone()?;
        match self.tokens.validate(&session.token) {
            Ok(user_id) => self.user_by_id(&user_id).await,
            Err(e) => {
                tracing::debug!(error = %e, "Current session rejected");
                None
            }
        }
    }

    async fn login(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        let user = {
            let mut accounts = self.accounts.write().await;
            let account = accounts
                .get_mut(&email_key(&credentials.email))
                .ok_or(AuthError::InvalidCredentials)?;

            if !self
                .passwords
                .verify(&credentials.password, &account.password_hash)?
            {
                return Err(AuthError::InvalidCredentials);
            }

            if self.passwords.needs_rehash(&account.password_hash) {
                match self.passwords.hash(&credentials.password) {
                    Ok(hash) => {
                        account.password_hash = hash;
                        tracing::debug!(user_id = %account.user.id, "Password hash upgraded");
                    }
                    Err(e) => {
                        tracing::warn!(user_id = %account.user.id, error = %e, "Password rehash failed");
                    }
                }
            }
            account.user.clone()
        };

        let session = self.tokens.issue(&user)?;
        *self.current.write().await = Some(session.clone());
        tracing::info!(user_id = %user.id, "Signed in");
        Ok(session)
    }

    async fn logout(&self) -> Result<(), AuthError> {
        match self.current.write().await.take() {
            Some(session) => {
                tracing::info!(user_id = %session.user_id, "Signed out");
                Ok(())
            }
            None => Err(AuthError::NoSession),
        }
    }

    async fn create_account(&self, account: &NewAccount) -> Result<User, AuthError> {
        let key = email_key(&account.email);
        if key.is_empty() {
            return Err(AuthError::Rejected("email is required".to_string()));
        }

        let password_hash = self.passwords.hash(&account.password)?;

        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&key) {
            return Err(AuthError::AccountExists(account.email.clone()));
        }

        let user = User {
            id: uuid::Uuid::new_v4().simple().to_string(),
            name: account.name.trim().to_string(),
            email: account.email.trim().to_string(),
        };
        accounts.insert(
            key,
            Account {
                user: user.clone(),
                password_hash,
            },
        );
        tracing::info!(user_id = %user.id, "Account created");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{JwtConfig, JwtSessionTokens};

    fn provider() -> LocalAuthProvider {
        LocalAuthProvider::new(
            Arc::new(AccountPasswords::new()),
            Arc::new(JwtSessionTokens::new(JwtConfig::default())),
        )
    }

    fn light_params() -> Params {
        Params::new(1024, 1, 1, None).unwrap()
    }

    fn ada() -> NewAccount {
        NewAccount {
            name: "Ada".to_string(),
            email: "Ada@Example.com".to_string(),
            password: "analytical-engine".to_string(),
        }
    }

    #[tokio::test]
    async fn test_signup_login_logout() {
        let auth = provider();
        assert!(auth.current_user().await.is_none());

        let user = auth.create_account(&ada()).await.unwrap();
        assert!(auth.current_user().await.is_none());

        let creds = Credentials {
            email: "ada@example.com".to_string(),
            password: "analytical-engine".to_string(),
        };
        let session = auth.login(&creds).await.unwrap();
        assert_eq!(session.user_id, user.id);
        assert_eq!(auth.current_user().await, Some(user));

        auth.logout().await.unwrap();
        assert!(auth.current_user().await.is_none());
        assert!(matches!(auth.logout().await, Err(AuthError::NoSession)));
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let auth = provider();
        auth.create_account(&ada()).await.unwrap();

        let mut creds = ada().credentials();
        creds.password = "difference-engine".to_string();
        assert!(matches!(
            auth.login(&creds).await,
            Err(AuthError::InvalidCredentials)
        ));

        creds.email = "nobody@example.com".to_string();
        assert!(matches!(
            auth.login(&creds).await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_account() {
        let auth = provider();
        auth.create_account(&ada()).await.unwrap();
        assert!(matches!(
            auth.create_account(&ada()).await,
            Err(AuthError::AccountExists(_))
        ));
    }

    #[test]
    fn test_hashes_are_salted_and_verified() {
        let passwords = AccountPasswords::new();
        let first = passwords.hash("correct horse").unwrap();
        let second = passwords.hash("correct horse").unwrap();

        assert_ne!(first, second);
        assert!(first.starts_with("$argon2id$"));
        assert!(passwords.verify("correct horse", &first).unwrap());
        assert!(!passwords.verify("wrong horse", &first).unwrap());
        assert!(!passwords.needs_rehash(&first));

        assert!(matches!(
            passwords.verify("anything", "not-a-phc-string"),
            Err(AuthError::HashingError(_))
        ));
        assert!(passwords.needs_rehash("not-a-phc-string"));
    }

    #[test]
    fn test_weaker_hashes_need_rehash() {
        let old = AccountPasswords::with_params(light_params()).hash("pw").unwrap();
        let passwords = AccountPasswords::new();
        assert!(passwords.verify("pw", &old).unwrap());
        assert!(passwords.needs_rehash(&old));
    }

    #[tokio::test]
    async fn test_login_upgrades_weak_hash() {
        let auth = provider();
        let user = auth.create_account(&ada()).await.unwrap();

        let weak = AccountPasswords::with_params(light_params())
            .hash("analytical-engine")
            .unwrap();
        auth.accounts
            .write()
            .await
            .get_mut("ada@example.com")
            .unwrap()
            .password_hash = weak.clone();

        // A failed login leaves the stored hash alone.
        let mut wrong = ada().credentials();
        wrong.password = "difference-engine".to_string();
        assert!(auth.login(&wrong).await.is_err());
        assert_eq!(auth.accounts.read().await["ada@example.com"].password_hash, weak);

        auth.login(&ada().credentials()).await.unwrap();
        let stored = auth.accounts.read().await["ada@example.com"].password_hash.clone();
        assert_ne!(stored, weak);
        assert!(!AccountPasswords::new().needs_rehash(&stored));
        assert_eq!(auth.current_user().await.map(|u| u.id), Some(user.id));
    }
}
