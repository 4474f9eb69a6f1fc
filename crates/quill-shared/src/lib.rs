//! # Quill Shared
//!
//! Types handed to whatever renders the views: form payloads, post card
//! projections and user-facing notices.

pub mod dto;
pub mod notice;

pub use notice::{Notice, NoticeKind};
