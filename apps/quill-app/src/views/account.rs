//! Signup, login and logout.

use quill_core::DomainError;
use quill_core::domain::{ProfileFields, Session, User};
use quill_core::error::ValidationErrors;
use quill_core::form::{password_strength, validate_credentials};
use quill_core::ports::{Credentials, NewAccount};
use quill_shared::dto::{LoginRequest, SignupRequest};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Strength meter shown under the password field.
pub fn strength_label(password: &str) -> &'static str {
    match password_strength(password) {
        0..=2 => "Weak",
        3 | 4 => "Medium",
        _ => "Strong",
    }
}

/// Register, sign in, and create the reader's profile. A failed profile
/// write does not undo the signup.
pub async fn signup(state: &AppState, request: SignupRequest) -> AppResult<User> {
    let mut errors = ValidationErrors::new();
    if request.name.trim().is_empty() {
        errors.push("Name is required");
    }
    if let Err(DomainError::Validation(credential_errors)) =
        validate_credentials(&request.email, &request.password)
    {
        for message in credential_errors.messages() {
            errors.push(message.clone());
        }
    }
    errors.into_result()?;

    let account = NewAccount {
        name: request.name,
        email: request.email,
        password: request.password,
    };
    state
        .auth
        .create_account(&account)
        .await
        .map_err(DomainError::from)?;
    state
        .auth
        .login(&account.credentials())
        .await
        .map_err(DomainError::from)?;

    let user = state
        .auth
        .current_user()
        .await
        .ok_or(AppError::Unauthorized)?;

    let profile = ProfileFields {
        user_id: user.id.clone(),
        name: user.name.clone(),
        email: user.email.clone(),
        interests: request.interests,
    };
    if let Err(e) = state.blog.create_profile(profile).await {
        tracing::warn!(user_id = %user.id, error = %e, "Failed to create profile");
    }

    tracing::info!(user_id = %user.id, "Signed up");
    Ok(user)
}

pub async fn login(state: &AppState, request: LoginRequest) -> AppResult<Session> {
    validate_credentials(&request.email, &request.password)?;
    let credentials = Credentials {
        email: request.email,
        password: request.password,
    };
    Ok(state
        .auth
        .login(&credentials)
        .await
        .map_err(DomainError::from)?)
}

/// Best effort; a failed logout is only logged.
pub async fn logout(state: &AppState) {
    if let Err(e) = state.auth.logout().await {
        tracing::warn!(error = %e, "Logout failed");
    }
}
