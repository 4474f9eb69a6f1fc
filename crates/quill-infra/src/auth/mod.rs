//! Authentication implementations.

mod jwt;
mod local;

pub use jwt::{JwtConfig, JwtSessionTokens};
pub use local::{AccountPasswords, LocalAuthProvider};
