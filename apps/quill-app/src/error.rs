//! View-level errors and how they are shown.

use std::fmt;

use quill_core::DomainError;
use quill_shared::Notice;

/// Application-level error type that converts to a user-facing notice.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    Unauthorized,
    Forbidden,
    Conflict(String),
    Validation(Vec<String>),
    Unavailable(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::Unauthorized => write!(f, "Unauthorized"),
            AppError::Forbidden => write!(f, "Forbidden"),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Validation(errors) => write!(f, "Validation errors: {}", errors.join(", ")),
            AppError::Unavailable(msg) => write!(f, "Unavailable: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    pub fn notice(&self) -> Notice {
        match self {
            AppError::NotFound(detail) => Notice::nothing_to_show(detail),
            AppError::Unauthorized => Notice::login_required(),
            AppError::Forbidden => Notice::banner("You can only change your own content."),
            AppError::Conflict(detail) => Notice::inline(vec![detail.clone()]),
            AppError::Validation(errors) => Notice::inline(errors.clone()),
            AppError::Unavailable(detail) => {
                tracing::error!("Backend unavailable: {}", detail);
                Notice::banner(detail)
            }
        }
    }
}

// Conversion from domain errors
impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity, id } => {
                AppError::NotFound(format!("{} {} not found", entity, id))
            }
            DomainError::Validation(errors) => AppError::Validation(errors.messages().to_vec()),
            DomainError::Duplicate(what) => {
                AppError::Conflict(format!("{} is already taken", what))
            }
            DomainError::Unauthorized => AppError::Unauthorized,
            DomainError::TransientIo(msg) => AppError::Unavailable(msg),
        }
    }
}

/// Result type alias for view actions.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use quill_shared::NoticeKind;

    #[test]
    fn test_taxonomy_maps_to_notices() {
        let not_found: AppError = DomainError::NotFound {
            entity: "post",
            id: "x".to_string(),
        }
        .into();
        assert_eq!(not_found.notice().kind, NoticeKind::Empty);

        let unauthorized: AppError = DomainError::Unauthorized.into();
        assert_eq!(unauthorized.notice().redirect_to.as_deref(), Some("/login"));

        let invalid: AppError = DomainError::invalid("Please type a comment.").into();
        let notice = invalid.notice();
        assert_eq!(notice.kind, NoticeKind::Inline);
        assert_eq!(notice.messages, vec!["Please type a comment."]);

        let transient: AppError = DomainError::TransientIo("timeout".to_string()).into();
        assert!(transient.notice().dismissible());
    }
}
