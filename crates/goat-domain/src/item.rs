use serde::{Deserialize, Serialize};

pub type ItemId = String;

/// Minimal item payload carried between stores during a drag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transferable {
    pub id: ItemId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "image_url")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Transferable {
    pub fn new(id: impl Into<ItemId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            image_url: None,
            tags: Vec::new(),
        }
    }
}

/// An item as it lives in a backlog group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacklogItem {
    pub id: ItemId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "image_url")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub matched: bool,
    /// Grid slot id ("grid-<index>") the item currently occupies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_with: Option<String>,
}

impl BacklogItem {
    pub fn new(id: impl Into<ItemId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            image_url: None,
            tags: Vec::new(),
            category: None,
            matched: false,
            matched_with: None,
        }
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn to_transferable(&self) -> Transferable {
        Transferable {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            image_url: self.image_url.clone(),
            tags: self.tags.clone(),
        }
    }
}

impl From<Transferable> for BacklogItem {
    fn from(item: Transferable) -> Self {
        Self {
            id: item.id,
            title: item.title,
            description: item.description,
            image_url: item.image_url,
            tags: item.tags,
            category: None,
            matched: false,
            matched_with: None,
        }
    }
}
