//! # Quill Core
//!
//! The domain layer of the Quill blog client.
//! Entities, ports, and the pure view logic (feed filtering, comment
//! reconciliation, slug and form handling). No infrastructure dependencies.

pub mod comments;
pub mod domain;
pub mod error;
pub mod feed;
pub mod form;
pub mod ports;
pub mod service;
pub mod slug;

pub use error::DomainError;
pub use service::{BlogService, Collections};
