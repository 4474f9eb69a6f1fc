use serde::{Deserialize, Serialize};

/// Category entity. Read-only from the client's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CategoryRecord")]
pub struct Category {
    pub id: String,
    pub name: String,
}

/// Category documents have carried their label under a few different
/// attributes; take the first one present.
#[derive(Deserialize)]
struct CategoryRecord {
    id: String,
    #[serde(default)]
    category_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    slug: Option<String>,
}

impl From<CategoryRecord> for Category {
    fn from(record: CategoryRecord) -> Self {
        let name = [record.category_name, record.name, record.slug]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .unwrap_or_default();
        Self {
            id: record.id,
            name,
        }
    }
}
