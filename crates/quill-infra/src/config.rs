//! Backend identifiers, read once at startup.

use std::env;

use quill_core::Collections;

/// Endpoint and identifier strings for the backend project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Base URL, without a trailing slash.
    pub endpoint: String,
    pub project_id: String,
    pub database_id: String,
    pub posts_collection: String,
    pub categories_collection: String,
    pub comments_collection: String,
    pub profiles_collection: String,
    pub bucket_id: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost/v1".to_string(),
            project_id: "quill".to_string(),
            database_id: "blog".to_string(),
            posts_collection: "posts".to_string(),
            categories_collection: "categories".to_string(),
            comments_collection: "comments".to_string(),
            profiles_collection: "profiles".to_string(),
            bucket_id: "images".to_string(),
        }
    }
}

impl BackendConfig {
    /// Load configuration from environment variables, falling back to the
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str, default: String| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
        };

        let config = Self {
            endpoint: get("QUILL_BACKEND_URL", defaults.endpoint)
                .trim_end_matches('/')
                .to_string(),
            project_id: get("QUILL_PROJECT_ID", defaults.project_id),
            database_id: get("QUILL_DATABASE_ID", defaults.database_id),
            posts_collection: get("QUILL_POSTS_COLLECTION", defaults.posts_collection),
            categories_collection: get(
                "QUILL_CATEGORIES_COLLECTION",
                defaults.categories_collection,
            ),
            comments_collection: get("QUILL_COMMENTS_COLLECTION", defaults.comments_collection),
            profiles_collection: get("QUILL_PROFILES_COLLECTION", defaults.profiles_collection),
            bucket_id: get("QUILL_BUCKET_ID", defaults.bucket_id),
        };

        tracing::debug!(
            endpoint = %config.endpoint,
            project = %config.project_id,
            database = %config.database_id,
            "Backend configuration loaded"
        );
        config
    }

    pub fn collections(&self) -> Collections {
        Collections {
            database: self.database_id.clone(),
            posts: self.posts_collection.clone(),
            categories: self.categories_collection.clone(),
            comments: self.comments_collection.clone(),
            profiles: self.profiles_collection.clone(),
        }
    }
}
