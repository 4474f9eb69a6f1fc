//! Document store port - abstraction over the backend's collections.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A stored document: backend metadata plus free-form fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub collection: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub data: Map<String, Value>,
}

impl Document {
    /// Generate a fresh unique document id.
    pub fn unique_id() -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }

    /// Read a field as a string, if present.
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.data.get(field).and_then(Value::as_str)
    }

    /// Decode into a typed entity. `id` and `created_at` come from the
    /// document metadata and override anything of the same name in `data`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        let mut fields = self.data.clone();
        fields.insert("id".to_string(), Value::String(self.id.clone()));
        fields.insert(
            "created_at".to_string(),
            Value::String(self.created_at.to_rfc3339()),
        );
        serde_json::from_value(Value::Object(fields))
            .map_err(|e| StoreError::InvalidPayload(format!("{}/{}: {}", self.collection, self.id, e)))
    }
}

/// Equality-style filters understood by `list_documents`.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Field equals the value.
    Equal(String, Value),
    /// Array field contains the value.
    Contains(String, Value),
}

impl Filter {
    pub fn equal(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Equal(field.into(), value.into())
    }

    pub fn contains(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Contains(field.into(), value.into())
    }

    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::Equal(field, value) => doc.data.get(field) == Some(value),
            Filter::Contains(field, value) => doc
                .data
                .get(field)
                .and_then(Value::as_array)
                .is_some_and(|items| items.contains(value)),
        }
    }
}

/// Per-document access rules attached at creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    pub read: Vec<String>,
    pub write: Vec<String>,
}

impl Permissions {
    /// Anyone may read; only the given user may write.
    pub fn public_read_owner_write(user_id: &str) -> Self {
        Self {
            read: vec!["role:all".to_string()],
            write: vec![format!("users:{user_id}")],
        }
    }
}

/// One page of a listing.
#[derive(Debug, Clone, Default)]
pub struct DocumentList {
    pub total: usize,
    pub documents: Vec<Document>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// A realtime change notification. `document` is the document as it was
/// after the change (or right before removal, for deletes).
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub channel: String,
    pub document: Document,
}

/// Predicate applied by the store before an event reaches a subscriber.
pub type EventFilter = Arc<dyn Fn(&ChangeEvent) -> bool + Send + Sync>;

/// Accept every event on the channel.
pub fn accept_all() -> EventFilter {
    Arc::new(|_| true)
}

/// A live feed of change events. Closing drops the underlying stream, which
/// releases the backend subscription; closing twice is a no-op.
pub struct Subscription {
    channel: String,
    events: BoxStream<'static, ChangeEvent>,
    open: bool,
}

impl Subscription {
    pub fn new(channel: impl Into<String>, events: BoxStream<'static, ChangeEvent>) -> Self {
        Self {
            channel: channel.into(),
            events,
            open: true,
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Next event, or `None` once the subscription is closed or the backend
    /// ends the stream.
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        if !self.open {
            return None;
        }
        let event = self.events.next().await;
        if event.is_none() {
            self.open = false;
        }
        event
    }

    /// Release the subscription. Returns `true` only on the call that
    /// actually closed it.
    pub fn close(&mut self) -> bool {
        if !self.open {
            return false;
        }
        self.open = false;
        self.events = stream::empty().boxed();
        tracing::debug!(channel = %self.channel, "Subscription closed");
        true
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("channel", &self.channel)
            .field("open", &self.open)
            .finish()
    }
}

/// Document store trait - collection CRUD plus realtime subscriptions.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// List documents matching every filter, in insertion order.
    async fn list_documents(
        &self,
        collection: &str,
        filters: &[Filter],
        limit: usize,
        offset: usize,
    ) -> Result<DocumentList, StoreError>;

    /// Fetch one document. Fails with `StoreError::NotFound` when absent.
    async fn get_document(&self, collection: &str, id: &str) -> Result<Document, StoreError>;

    /// Create a document under the given id. Fails with `Conflict` if the id
    /// is taken.
    async fn create_document(
        &self,
        collection: &str,
        id: &str,
        fields: Value,
        permissions: Option<Permissions>,
    ) -> Result<Document, StoreError>;

    /// Shallow-merge `patch` into an existing document.
    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        patch: Value,
    ) -> Result<Document, StoreError>;

    /// Remove a document.
    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Subscribe to change events on a channel.
    async fn subscribe(&self, channel: &str, filter: EventFilter) -> Result<Subscription, StoreError>;
}

/// Document store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Document not found")]
    NotFound,

    #[error("Document already exists: {0}")]
    Conflict(String),

    #[error("Permission denied")]
    Forbidden,

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Backend error: {0}")]
    Backend(String),
}
