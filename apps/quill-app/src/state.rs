//! Application state - the services every view is handed.

use std::sync::Arc;

use quill_core::BlogService;
use quill_core::ports::{AuthProvider, DocumentStore, FileStorage};
use quill_infra::{InMemoryDocumentStore, InMemoryFileStorage};

#[cfg(feature = "auth")]
use quill_infra::{AccountPasswords, JwtSessionTokens, LocalAuthProvider};

use crate::config::AppConfig;

/// Shared application state. Built once at startup and cloned into views.
#[derive(Clone)]
pub struct AppState {
    pub blog: BlogService,
    pub auth: Arc<dyn AuthProvider>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        files: Arc<dyn FileStorage>,
        auth: Arc<dyn AuthProvider>,
        config: &AppConfig,
    ) -> Self {
        Self {
            blog: BlogService::new(store, files, config.backend.collections()),
            auth,
        }
    }

    /// Wire up the in-process backend.
    pub fn in_memory(config: &AppConfig) -> (Self, Arc<InMemoryDocumentStore>) {
        let store = Arc::new(InMemoryDocumentStore::new(&config.backend.database_id, 256));
        let files = Arc::new(InMemoryFileStorage::new(&config.backend));

        #[cfg(feature = "auth")]
        let auth: Arc<dyn AuthProvider> = Arc::new(LocalAuthProvider::new(
            Arc::new(AccountPasswords::new()),
            Arc::new(JwtSessionTokens::new(config.jwt.clone())),
        ));

        #[cfg(not(feature = "auth"))]
        let auth: Arc<dyn AuthProvider> = {
            tracing::info!("Running without auth feature - anonymous browsing only");
            Arc::new(anonymous::AnonymousAuth)
        };

        tracing::info!("Application state initialized");
        (Self::new(store.clone(), files, auth, config), store)
    }
}

#[cfg(not(feature = "auth"))]
mod anonymous {
    use async_trait::async_trait;

    use quill_core::domain::{Session, User};
    use quill_core::ports::{AuthError, AuthProvider, Credentials, NewAccount};

    /// Auth provider for builds without account support: nobody is ever
    /// signed in.
    pub struct AnonymousAuth;

    #[async_trait]
    impl AuthProvider for AnonymousAuth {
        async fn current_user(&self) -> Option<User> {
            None
        }

        async fn login(&self, _credentials: &Credentials) -> Result<Session, AuthError> {
            tracing::warn!("Accounts not enabled - login refused");
            Err(AuthError::Backend("accounts are disabled".to_string()))
        }

        async fn logout(&self) -> Result<(), AuthError> {
            Err(AuthError::NoSession)
        }

        async fn create_account(&self, _account: &NewAccount) -> Result<User, AuthError> {
            Err(AuthError::Backend("accounts are disabled".to_string()))
        }
    }
}
