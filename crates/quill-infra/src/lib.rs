//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`.
//! The backend itself is external; what lives here are in-process stand-ins
//! used for local runs, demos and tests, plus backend configuration.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No hashing or token crates
//! - `auth` - Local accounts with Argon2 password hashes and JWT sessions

pub mod config;
pub mod files;
pub mod store;

#[cfg(feature = "auth")]
pub mod auth;

// Re-exports - In-Memory
pub use config::BackendConfig;
pub use files::InMemoryFileStorage;
pub use store::InMemoryDocumentStore;

#[cfg(feature = "auth")]
pub use auth::{AccountPasswords, JwtConfig, JwtSessionTokens, LocalAuthProvider};
