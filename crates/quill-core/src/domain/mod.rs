//! Domain entities - the core business objects.

mod category;
mod comment;
mod post;
mod profile;
mod user;

use serde::{Deserialize, Deserializer};

pub use category::Category;
pub use comment::{Comment, CommentFields};
pub use post::{FileRef, Post, PostFields, PostPatch, PostStatus};
pub use profile::{Profile, ProfileFields};
pub use user::{Session, User};

/// Read an explicit `null` the same as a missing field.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A list of ids. `null` reads as empty and null or blank entries are dropped.
pub(crate) fn id_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let ids = Option::<Vec<Option<String>>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(ids.into_iter().flatten().filter(|id| !id.is_empty()).collect())
}
