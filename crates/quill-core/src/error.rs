//! Domain-level error types.

use std::fmt;

use thiserror::Error;

use crate::ports::{AuthError, FileError, StoreError};

/// Domain errors - the four failure classes a view has to translate into
/// user-facing messaging.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Backend unavailable: {0}")]
    TransientIo(String),
}

impl DomainError {
    /// Lift a store error into the domain, naming the entity it concerned.
    pub fn from_store(entity: &'static str, id: impl Into<String>, err: StoreError) -> Self {
        match err {
            StoreError::NotFound => DomainError::NotFound {
                entity,
                id: id.into(),
            },
            other => other.into(),
        }
    }

    /// Shorthand for a single-message validation failure.
    pub fn invalid(message: impl Into<String>) -> Self {
        DomainError::Validation(ValidationErrors::single(message))
    }
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => DomainError::NotFound {
                entity: "document",
                id: String::new(),
            },
            StoreError::Conflict(id) => DomainError::Duplicate(id),
            StoreError::Forbidden => DomainError::Unauthorized,
            StoreError::InvalidPayload(msg) => DomainError::invalid(msg),
            StoreError::Connection(msg) | StoreError::Backend(msg) => {
                DomainError::TransientIo(msg)
            }
        }
    }
}

impl From<FileError> for DomainError {
    fn from(err: FileError) -> Self {
        match err {
            FileError::NotFound(id) => DomainError::NotFound { entity: "file", id },
            FileError::Rejected(msg) => DomainError::invalid(msg),
            FileError::Backend(msg) => DomainError::TransientIo(msg),
        }
    }
}

impl From<AuthError> for DomainError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::SessionExpired
            | AuthError::InvalidToken(_)
            | AuthError::NoSession => DomainError::Unauthorized,
            AuthError::AccountExists(email) => DomainError::Duplicate(email),
            AuthError::Rejected(msg) => DomainError::invalid(msg),
            AuthError::HashingError(msg) | AuthError::Backend(msg) => {
                DomainError::TransientIo(msg)
            }
        }
    }
}

/// Local form input failures, collected rather than short-circuited so a
/// form can show all of them inline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(message: impl Into<String>) -> Self {
        Self(vec![message.into()])
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn messages(&self) -> &[String] {
        &self.0
    }

    /// `Ok(())` when nothing was collected.
    pub fn into_result(self) -> Result<(), DomainError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_not_found_keeps_entity() {
        let err = DomainError::from_store("post", "hello-world", StoreError::NotFound);
        assert!(matches!(
            err,
            DomainError::NotFound { entity: "post", ref id } if id == "hello-world"
        ));
    }

    #[test]
    fn test_connection_failure_is_transient() {
        let err: DomainError = StoreError::Connection("refused".to_string()).into();
        assert!(matches!(err, DomainError::TransientIo(_)));
    }

    #[test]
    fn test_expired_session_is_unauthorized() {
        let err: DomainError = AuthError::SessionExpired.into();
        assert!(matches!(err, DomainError::Unauthorized));
    }

    #[test]
    fn test_validation_errors_collect() {
        let mut errors = ValidationErrors::new();
        assert!(errors.clone().into_result().is_ok());

        errors.push("Title is required");
        errors.push("Slug is required");
        assert_eq!(errors.messages().len(), 2);
        assert_eq!(errors.to_string(), "Title is required, Slug is required");
        assert!(errors.into_result().is_err());
    }
}
