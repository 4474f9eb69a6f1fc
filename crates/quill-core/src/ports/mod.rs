//! Ports - trait definitions for the external backend.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod document_store;
mod file_storage;

pub use auth::{AuthError, AuthProvider, Credentials, NewAccount, PasswordService, SessionTokens};
pub use document_store::{
    ChangeEvent, ChangeKind, Document, DocumentList, DocumentStore, EventFilter, Filter,
    Permissions, StoreError, Subscription, accept_all,
};
pub use file_storage::{FileError, FileStorage};
