//! In-memory document store.
//!
//! Works within a single process only. Change events are fanned out through
//! one broadcast channel per collection, named the way the hosted backend
//! names its realtime channels.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use futures::StreamExt;
use futures::stream;
use serde_json::Value;
use tokio::sync::{RwLock, broadcast};

use quill_core::ports::{
    ChangeEvent, ChangeKind, Document, DocumentList, DocumentStore, EventFilter, Filter,
    Permissions, StoreError, Subscription,
};

struct StoredDocument {
    document: Document,
    permissions: Option<Permissions>,
}

pub struct InMemoryDocumentStore {
    database_id: String,
    /// Documents per collection, in insertion order.
    collections: RwLock<HashMap<String, Vec<StoredDocument>>>,
    channels: RwLock<HashMap<String, broadcast::Sender<ChangeEvent>>>,
    buffer_size: usize,
    offline: AtomicBool,
    realtime_enabled: AtomicBool,
}

impl InMemoryDocumentStore {
    pub fn new(database_id: impl Into<String>, buffer_size: usize) -> Self {
        Self {
            database_id: database_id.into(),
            collections: RwLock::new(HashMap::new()),
            channels: RwLock::new(HashMap::new()),
            buffer_size,
            offline: AtomicBool::new(false),
            realtime_enabled: AtomicBool::new(true),
        }
    }

    /// Simulate losing the backend: every call fails with a connection error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Simulate a backend with realtime turned off: `subscribe` fails, CRUD
    /// keeps working.
    pub fn set_realtime_enabled(&self, enabled: bool) {
        self.realtime_enabled.store(enabled, Ordering::SeqCst);
    }

    /// Number of live subscriptions on a channel.
    pub async fn subscriber_count(&self, channel: &str) -> usize {
        self.channels
            .read()
            .await
            .get(channel)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    pub async fn permissions_of(&self, collection: &str, id: &str) -> Option<Permissions> {
        self.collections
            .read()
            .await
            .get(collection)?
            .iter()
            .find(|stored| stored.document.id == id)?
            .permissions
            .clone()
    }

    fn channel_for(&self, collection: &str) -> String {
        format!(
            "databases.{}.collections.{}.documents",
            self.database_id, collection
        )
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Connection("backend unreachable".to_string()));
        }
        Ok(())
    }

    async fn publish(&self, kind: ChangeKind, document: &Document) {
        let channel = self.channel_for(&document.collection);
        let channels = self.channels.read().await;

        if let Some(sender) = channels.get(&channel) {
            // Ignore send errors (no subscribers)
            let _ = sender.send(ChangeEvent {
                kind,
                channel: channel.clone(),
                document: document.clone(),
            });
            tracing::debug!(channel = %channel, id = %document.id, ?kind, "Change published");
        }
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new("blog", 100)
    }
}

fn into_object(value: Value) -> Result<serde_json::Map<String, Value>, StoreError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::InvalidPayload(format!(
            "expected an object, got {other}"
        ))),
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn list_documents(
        &self,
        collection: &str,
        filters: &[Filter],
        limit: usize,
        offset: usize,
    ) -> Result<DocumentList, StoreError> {
        self.ensure_online()?;
        let collections = self.collections.read().await;
        let Some(stored) = collections.get(collection) else {
            return Ok(DocumentList::default());
        };

        let matching: Vec<&Document> = stored
            .iter()
            .map(|s| &s.document)
            .filter(|doc| filters.iter().all(|f| f.matches(doc)))
            .collect();

        Ok(DocumentList {
            total: matching.len(),
            documents: matching
                .into_iter()
                .skip(offset)
                .take(limit)
                .cloned()
                .collect(),
        })
    }

    async fn get_document(&self, collection: &str, id: &str) -> Result<Document, StoreError> {
        self.ensure_online()?;
        self.collections
            .read()
            .await
            .get(collection)
            .and_then(|docs| docs.iter().find(|s| s.document.id == id))
            .map(|s| s.document.clone())
            .ok_or(StoreError::NotFound)
    }

    async fn create_document(
        &self,
        collection: &str,
        id: &str,
        fields: Value,
        permissions: Option<Permissions>,
    ) -> Result<Document, StoreError> {
        self.ensure_online()?;
        if id.is_empty() {
            return Err(StoreError::InvalidPayload("document id is empty".to_string()));
        }
        let data = into_object(fields)?;

        let document = {
            let mut collections = self.collections.write().await;
            let docs = collections.entry(collection.to_string()).or_default();
            if docs.iter().any(|s| s.document.id == id) {
                return Err(StoreError::Conflict(id.to_string()));
            }

            let now = Utc::now();
            let document = Document {
                id: id.to_string(),
                collection: collection.to_string(),
                created_at: now,
                updated_at: now,
                data,
            };
            docs.push(StoredDocument {
                document: document.clone(),
                permissions,
            });
            document
        };

        self.publish(ChangeKind::Created, &document).await;
        Ok(document)
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        patch: Value,
    ) -> Result<Document, StoreError> {
        self.ensure_online()?;
        let patch = into_object(patch)?;

        let document = {
            let mut collections = self.collections.write().await;
            let stored = collections
                .get_mut(collection)
                .and_then(|docs| docs.iter_mut().find(|s| s.document.id == id))
                .ok_or(StoreError::NotFound)?;

            for (key, value) in patch {
                stored.document.data.insert(key, value);
            }
            stored.document.updated_at = Utc::now();
            stored.document.clone()
        };

        self.publish(ChangeKind::Updated, &document).await;
        Ok(document)
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.ensure_online()?;

        let removed = {
            let mut collections = self.collections.write().await;
            let docs = collections.get_mut(collection).ok_or(StoreError::NotFound)?;
            let pos = docs
                .iter()
                .position(|s| s.document.id == id)
                .ok_or(StoreError::NotFound)?;
            docs.remove(pos).document
        };

        self.publish(ChangeKind::Deleted, &removed).await;
        Ok(())
    }

    async fn subscribe(&self, channel: &str, filter: EventFilter) -> Result<Subscription, StoreError> {
        self.ensure_online()?;
        if !self.realtime_enabled.load(Ordering::SeqCst) {
            return Err(StoreError::Connection("realtime unavailable".to_string()));
        }

        let receiver = {
            let mut channels = self.channels.write().await;
            channels
                .entry(channel.to_string())
                .or_insert_with(|| broadcast::channel(self.buffer_size).0)
                .subscribe()
        };
        tracing::info!(channel = %channel, "Subscribed to channel");

        let channel_name = channel.to_string();
        let events = stream::unfold(receiver, move |mut receiver| {
            let channel_name = channel_name.clone();
            async move {
                loop {
                    match receiver.recv().await {
                        Ok(event) => return Some((event, receiver)),
                        Err(broadcast::error::RecvError::Lagged(count)) => {
                            tracing::warn!(
                                channel = %channel_name,
                                lagged = count,
                                "Subscriber lagged behind"
                            );
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            tracing::info!(channel = %channel_name, "Channel closed");
                            return None;
                        }
                    }
                }
            }
        })
        .filter(move |event| futures::future::ready(filter(event)))
        .boxed();

        Ok(Subscription::new(channel, events))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::ports::accept_all;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    const CHANNEL: &str = "databases.blog.collections.comments.documents";

    #[tokio::test]
    async fn test_create_get_list() {
        let store = InMemoryDocumentStore::default();
        store
            .create_document("posts", "a", json!({ "status": "active" }), None)
            .await
            .unwrap();
        store
            .create_document("posts", "b", json!({ "status": "inactive" }), None)
            .await
            .unwrap();

        let doc = store.get_document("posts", "a").await.unwrap();
        assert_eq!(doc.str_field("status"), Some("active"));

        let all = store.list_documents("posts", &[], 100, 0).await.unwrap();
        assert_eq!(all.total, 2);
        assert_eq!(all.documents[0].id, "a");

        let active = store
            .list_documents("posts", &[Filter::equal("status", "active")], 100, 0)
            .await
            .unwrap();
        assert_eq!(active.documents.len(), 1);

        let page = store.list_documents("posts", &[], 1, 1).await.unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.documents[0].id, "b");
    }

    #[tokio::test]
    async fn test_duplicate_id_conflicts() {
        let store = InMemoryDocumentStore::default();
        store.create_document("posts", "a", json!({}), None).await.unwrap();
        let err = store.create_document("posts", "a", json!({}), None).await;
        assert!(matches!(err, Err(StoreError::Conflict(id)) if id == "a"));
    }

    #[tokio::test]
    async fn test_update_merges_and_delete_removes() {
        let store = InMemoryDocumentStore::default();
        store
            .create_document("comments", "c1", json!({ "content": "a", "edited": false }), None)
            .await
            .unwrap();

        let doc = store
            .update_document("comments", "c1", json!({ "edited": true }))
            .await
            .unwrap();
        assert_eq!(doc.str_field("content"), Some("a"));
        assert_eq!(doc.data.get("edited"), Some(&json!(true)));

        store.delete_document("comments", "c1").await.unwrap();
        assert!(matches!(
            store.get_document("comments", "c1").await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.delete_document("comments", "c1").await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_offline_fails_everything() {
        let store = InMemoryDocumentStore::default();
        store.set_offline(true);
        assert!(matches!(
            store.list_documents("posts", &[], 10, 0).await,
            Err(StoreError::Connection(_))
        ));
        assert!(store.subscribe(CHANNEL, accept_all()).await.is_err());
    }

    #[tokio::test]
    async fn test_permissions_are_kept() {
        let store = InMemoryDocumentStore::default();
        let perms = Permissions::public_read_owner_write("u1");
        store
            .create_document("comments", "c1", json!({}), Some(perms.clone()))
            .await
            .unwrap();
        assert_eq!(store.permissions_of("comments", "c1").await, Some(perms));
    }

    #[tokio::test]
    async fn test_subscription_receives_filtered_changes() {
        let store = InMemoryDocumentStore::default();
        let filter: EventFilter =
            Arc::new(|event: &ChangeEvent| event.document.str_field("article_id") == Some("p1"));
        let mut sub = store.subscribe(CHANNEL, filter).await.unwrap();

        store
            .create_document("comments", "x", json!({ "article_id": "p2" }), None)
            .await
            .unwrap();
        store
            .create_document("comments", "y", json!({ "article_id": "p1" }), None)
            .await
            .unwrap();
        store.delete_document("comments", "y").await.unwrap();

        let first = tokio::time::timeout(Duration::from_secs(1), sub.next())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.kind, ChangeKind::Created);
        assert_eq!(first.document.id, "y");

        let second = tokio::time::timeout(Duration::from_secs(1), sub.next())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(second.kind, ChangeKind::Deleted);
        assert_eq!(second.document.id, "y");
    }

    #[tokio::test]
    async fn test_close_releases_receiver() {
        let store = InMemoryDocumentStore::default();
        let mut sub = store.subscribe(CHANNEL, accept_all()).await.unwrap();
        assert_eq!(store.subscriber_count(CHANNEL).await, 1);

        assert!(sub.close());
        assert_eq!(store.subscriber_count(CHANNEL).await, 0);

        let other = store.subscribe(CHANNEL, accept_all()).await.unwrap();
        assert_eq!(store.subscriber_count(CHANNEL).await, 1);
        drop(other);
        assert_eq!(store.subscriber_count(CHANNEL).await, 0);
    }

    #[tokio::test]
    async fn test_realtime_can_be_disabled() {
        let store = InMemoryDocumentStore::default();
        store.set_realtime_enabled(false);
        assert!(store.subscribe(CHANNEL, accept_all()).await.is_err());
        assert!(store.list_documents("comments", &[], 10, 0).await.is_ok());
    }
}
