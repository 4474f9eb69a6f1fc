//! Typed facade over the document store and file storage ports.
//!
//! Views never build documents by hand; they go through `BlogService`, which
//! knows the collection ids and turns documents into domain entities.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::domain::{
    Category, Comment, CommentFields, FileRef, Post, PostFields, PostPatch, PostStatus, Profile,
    ProfileFields,
};
use crate::error::DomainError;
use crate::ports::{
    ChangeEvent, DocumentStore, EventFilter, FileStorage, Filter, Permissions, StoreError,
    Subscription,
};

/// Default page size for listings.
pub const PAGE_SIZE: usize = 100;

/// Backend identifiers of the collections Quill reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collections {
    pub database: String,
    pub posts: String,
    pub categories: String,
    pub comments: String,
    pub profiles: String,
}

impl Collections {
    /// Realtime channel carrying every document change in a collection.
    pub fn channel(&self, collection: &str) -> String {
        format!(
            "databases.{}.collections.{}.documents",
            self.database, collection
        )
    }
}

#[derive(Clone)]
pub struct BlogService {
    store: Arc<dyn DocumentStore>,
    files: Arc<dyn FileStorage>,
    collections: Collections,
}

impl BlogService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        files: Arc<dyn FileStorage>,
        collections: Collections,
    ) -> Self {
        Self {
            store,
            files,
            collections,
        }
    }

    pub fn collections(&self) -> &Collections {
        &self.collections
    }

    // Posts

    /// Create a post. The slug doubles as the document id.
    pub async fn create_post(&self, fields: PostFields) -> Result<Post, DomainError> {
        let id = fields.slug.clone();
        let doc = self
            .store
            .create_document(&self.collections.posts, &id, to_fields(&fields)?, None)
            .await
            .map_err(|e| DomainError::from_store("post", &id, e))?;
        Ok(doc.decode()?)
    }

    pub async fn update_post(&self, id: &str, patch: PostPatch) -> Result<Post, DomainError> {
        let doc = self
            .store
            .update_document(&self.collections.posts, id, to_fields(&patch)?)
            .await
            .map_err(|e| DomainError::from_store("post", id, e))?;
        Ok(doc.decode()?)
    }

    pub async fn delete_post(&self, id: &str) -> Result<(), DomainError> {
        self.store
            .delete_document(&self.collections.posts, id)
            .await
            .map_err(|e| DomainError::from_store("post", id, e))
    }

    pub async fn get_post(&self, id: &str) -> Result<Post, DomainError> {
        let doc = self
            .store
            .get_document(&self.collections.posts, id)
            .await
            .map_err(|e| DomainError::from_store("post", id, e))?;
        Ok(doc.decode()?)
    }

    /// Published posts, in store order.
    pub async fn list_active_posts(&self) -> Result<Vec<Post>, DomainError> {
        self.list_posts(&[Filter::equal("status", PostStatus::Active.as_str())])
            .await
    }

    pub async fn list_posts(&self, filters: &[Filter]) -> Result<Vec<Post>, DomainError> {
        let list = self
            .store
            .list_documents(&self.collections.posts, filters, PAGE_SIZE, 0)
            .await?;
        decode_all(&list.documents)
    }

    // Categories

    pub async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        let list = self
            .store
            .list_documents(&self.collections.categories, &[], PAGE_SIZE, 0)
            .await?;
        decode_all(&list.documents)
    }

    // Profiles

    /// The reader's profile, or `None` if they never got one.
    pub async fn find_profile(&self, user_id: &str) -> Result<Option<Profile>, DomainError> {
        match self
            .store
            .get_document(&self.collections.profiles, user_id)
            .await
        {
            Ok(doc) => Ok(Some(doc.decode()?)),
            Err(StoreError::NotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Create the profile document for a freshly registered user.
    pub async fn create_profile(&self, fields: ProfileFields) -> Result<Profile, DomainError> {
        let id = fields.user_id.clone();
        let doc = self
            .store
            .create_document(
                &self.collections.profiles,
                &id,
                to_fields(&fields)?,
                Some(Permissions::public_read_owner_write(&id)),
            )
            .await
            .map_err(|e| DomainError::from_store("profile", &id, e))?;
        Ok(doc.decode()?)
    }

    // Comments

    pub async fn create_comment(&self, fields: CommentFields) -> Result<Comment, DomainError> {
        let permissions = Permissions::public_read_owner_write(&fields.user_id);
        let doc = self
            .store
            .create_document(
                &self.collections.comments,
                &crate::ports::Document::unique_id(),
                to_fields(&fields)?,
                Some(permissions),
            )
            .await?;
        Ok(doc.decode()?)
    }

    pub async fn list_comments(&self, article_id: &str) -> Result<Vec<Comment>, DomainError> {
        if article_id.is_empty() {
            return Err(DomainError::invalid("Missing article id"));
        }
        let list = self
            .store
            .list_documents(
                &self.collections.comments,
                &[Filter::equal("article_id", article_id)],
                PAGE_SIZE,
                0,
            )
            .await?;
        decode_all(&list.documents)
    }

    /// Replace a comment's body and mark it edited.
    pub async fn update_comment(&self, id: &str, content: &str) -> Result<Comment, DomainError> {
        let patch = serde_json::json!({ "content": content, "edited": true });
        let doc = self
            .store
            .update_document(&self.collections.comments, id, patch)
            .await
            .map_err(|e| DomainError::from_store("comment", id, e))?;
        Ok(doc.decode()?)
    }

    pub async fn delete_comment(&self, id: &str) -> Result<(), DomainError> {
        self.store
            .delete_document(&self.collections.comments, id)
            .await
            .map_err(|e| DomainError::from_store("comment", id, e))
    }

    /// Live comment changes for one post. Changes to other posts' comments
    /// are dropped before they reach the subscription.
    pub async fn subscribe_to_comments(
        &self,
        article_id: &str,
    ) -> Result<Subscription, DomainError> {
        let channel = self.collections.channel(&self.collections.comments);
        let wanted = article_id.to_string();
        let filter: EventFilter = Arc::new(move |event: &ChangeEvent| {
            event.document.str_field("article_id") == Some(wanted.as_str())
        });
        Ok(self.store.subscribe(&channel, filter).await?)
    }

    // Files

    pub async fn upload_file(&self, name: &str, bytes: Vec<u8>) -> Result<FileRef, DomainError> {
        Ok(self.files.upload_file(name, bytes).await?)
    }

    pub async fn delete_file(&self, file: &FileRef) -> Result<(), DomainError> {
        Ok(self.files.delete_file(file).await?)
    }

    pub fn file_preview(&self, file: Option<&FileRef>) -> Option<String> {
        file.map(|f| self.files.file_view_url(f))
    }
}

fn to_fields<T: Serialize>(value: &T) -> Result<Value, DomainError> {
    serde_json::to_value(value).map_err(|e| DomainError::invalid(e.to_string()))
}

/// Decode a listing, skipping documents that do not fit the entity.
fn decode_all<T: serde::de::DeserializeOwned>(
    docs: &[crate::ports::Document],
) -> Result<Vec<T>, DomainError> {
    Ok(docs
        .iter()
        .filter_map(|doc| match doc.decode() {
            Ok(entity) => Some(entity),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed document");
                None
            }
        })
        .collect())
}
