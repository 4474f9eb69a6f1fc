use serde::{Deserialize, Serialize};

/// Reader profile. The document id is the owning user's id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default, deserialize_with = "super::nullable")]
    pub user_id: String,
    #[serde(default, deserialize_with = "super::nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "super::nullable")]
    pub email: String,
    /// Category ids the reader follows.
    #[serde(default, deserialize_with = "super::id_list")]
    pub interests: Vec<String>,
}

impl Profile {
    pub fn has_interests(&self) -> bool {
        !self.interests.is_empty()
    }
}

/// Fields written when a profile is created at signup.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileFields {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub interests: Vec<String>,
}
