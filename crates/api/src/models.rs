use serde::{Deserialize, Serialize};

/// Returns the string when it is set and non-empty. The server encodes
/// "no value" as either an absent field or an empty string; callers treat
/// both the same.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Done,
    Pending,
}

impl StatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::Done => "done",
            StatusFilter::Pending => "pending",
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "done" => Ok(StatusFilter::Done),
            "pending" => Ok(StatusFilter::Pending),
            other => Err(format!("unknown status filter: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    pub task: String,
    pub done: bool,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
}

/// Query state for the todo list. `query_pairs` applies the omit-if-empty
/// rule: a parameter whose control is unset or blank is not sent at all.
#[derive(Debug, Clone, Default)]
pub struct TodoFilters {
    pub status: Option<StatusFilter>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub search: Option<String>,
}

impl TodoFilters {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(priority) = self.priority {
            pairs.push(("priority", priority.as_str().to_string()));
        }
        if let Some(category) = non_empty(&self.category) {
            pairs.push(("category", category.to_string()));
        }
        if let Some(search) = non_empty(&self.search) {
            pairs.push(("search", search.to_string()));
        }
        pairs
    }
}

/// Creation body. Also serves as the add-form state; the defaults are the
/// form defaults (priority medium, everything else blank).
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewTodo {
    pub task: String,
    pub priority: Priority,
    pub category: String,
    pub due_date: String,
}

/// Full-replacement body for PUT. Unlike the patch path this always
/// carries every field, including `done`.
#[derive(Debug, Clone, Serialize)]
pub struct TodoReplacement {
    pub task: String,
    pub done: bool,
    pub priority: Priority,
    pub category: String,
    pub due_date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Tweet,
    ShortVideo,
    LongVideo,
    Article,
    #[serde(other)]
    Note,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Tweet => "tweet",
            ContentType::ShortVideo => "short_video",
            ContentType::LongVideo => "long_video",
            ContentType::Article => "article",
            ContentType::Note => "note",
        }
    }
}

impl std::str::FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.replace('-', "_").as_str() {
            "tweet" => Ok(ContentType::Tweet),
            "short_video" => Ok(ContentType::ShortVideo),
            "long_video" => Ok(ContentType::LongVideo),
            "article" => Ok(ContentType::Article),
            "note" => Ok(ContentType::Note),
            other => Err(format!("unknown content type: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultItem {
    pub id: i64,
    pub content_type: ContentType,
    #[serde(default)]
    pub title: Option<String>,
    pub content: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub meta_title: Option<String>,
    #[serde(default)]
    pub meta_description: Option<String>,
    #[serde(default)]
    pub meta_thumbnail: Option<String>,
    #[serde(default)]
    pub meta_author: Option<String>,
    #[serde(default)]
    pub meta_site_name: Option<String>,
    pub pinned: bool,
    pub archived: bool,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Default)]
pub struct VaultFilters {
    pub content_type: Option<ContentType>,
    pub search: Option<String>,
}

impl VaultFilters {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(content_type) = self.content_type {
            pairs.push(("type", content_type.as_str().to_string()));
        }
        if let Some(search) = non_empty(&self.search) {
            pairs.push(("search", search.to_string()));
        }
        pairs
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewVaultItem {
    pub content: String,
    pub tags: Vec<String>,
    pub pinned: bool,
}

/// Full-replacement body for PUT. `pinned` and `archived` are not part of
/// the edit form; callers copy them from the record they hold.
#[derive(Debug, Clone, Serialize)]
pub struct VaultReplacement {
    pub title: String,
    pub content: String,
    pub pinned: bool,
    pub archived: bool,
    pub tags: Vec<String>,
}

/// Result of the stateless detection probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detected {
    pub content_type: ContentType,
    #[serde(default)]
    pub meta_title: Option<String>,
    #[serde(default)]
    pub meta_description: Option<String>,
    #[serde(default)]
    pub meta_thumbnail: Option<String>,
    #[serde(default)]
    pub meta_author: Option<String>,
    #[serde(default)]
    pub meta_site_name: Option<String>,
}
