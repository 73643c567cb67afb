//! In-memory stand-in for the server, mirroring its observable behavior.
//! Plays the role a mock transport usually does: tests drive the view
//! controllers against it and inspect exactly what went over the wire.

use crate::models::{
    non_empty, ContentType, Detected, NewTodo, NewVaultItem, Priority, StatusFilter, Tag, Todo,
    TodoFilters, TodoReplacement, VaultFilters, VaultItem, VaultReplacement,
};
use crate::{ApiError, TodoApi, VaultApi};
use std::cmp::Reverse;
use std::sync::Mutex;

/// One request as the fake saw it. List queries record their pairs as the
/// body so tests can assert which parameters were actually sent.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub path: String,
    pub body: serde_json::Value,
}

#[derive(Default)]
struct Store {
    todos: Vec<Todo>,
    items: Vec<VaultItem>,
    next_id: i64,
    calls: Vec<RecordedCall>,
}

#[derive(Default)]
pub struct InMemoryApi {
    store: Mutex<Store>,
}

impl InMemoryApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_todo(&self, todo: Todo) {
        let mut store = self.store.lock().unwrap();
        store.next_id = store.next_id.max(todo.id);
        store.todos.push(todo);
    }

    pub fn seed_item(&self, item: VaultItem) {
        let mut store = self.store.lock().unwrap();
        store.next_id = store.next_id.max(item.id);
        store.items.push(item);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.store.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.store.lock().unwrap().calls.clear();
    }
}

fn record(store: &mut Store, method: &'static str, path: String, body: serde_json::Value) {
    store.calls.push(RecordedCall { method, path, body });
}

fn pairs_json(pairs: &[(&'static str, String)]) -> serde_json::Value {
    let map: serde_json::Map<String, serde_json::Value> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.clone())))
        .collect();
    serde_json::Value::Object(map)
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn opt_contains_ci(haystack: &Option<String>, needle: &str) -> bool {
    non_empty(haystack).is_some_and(|h| contains_ci(h, needle))
}

/// The server's URL classification, reproduced so the fake's `detect` and
/// `create_item` behave like the real thing.
fn detect_content_type(input: &str) -> ContentType {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();
    if !lower.starts_with("http://") && !lower.starts_with("https://") {
        return ContentType::Note;
    }
    let rest = lower.split("://").nth(1).unwrap_or("");
    let rest = rest.strip_prefix("www.").unwrap_or(rest);
    if (rest.starts_with("twitter.com/") || rest.starts_with("x.com/"))
        && rest.contains("/status/")
    {
        ContentType::Tweet
    } else if rest.starts_with("tiktok.com/") || rest.starts_with("vm.tiktok.com/") {
        ContentType::ShortVideo
    } else if rest.starts_with("youtube.com/watch")
        || rest.starts_with("youtu.be/")
        || rest.starts_with("youtube.com/shorts/")
    {
        ContentType::LongVideo
    } else {
        ContentType::Article
    }
}

fn dedup_tags(names: &[String]) -> Vec<Tag> {
    let mut tags: Vec<Tag> = Vec::new();
    for name in names {
        let name = name.trim();
        if name.is_empty() || tags.iter().any(|t| t.name == name) {
            continue;
        }
        tags.push(Tag {
            name: name.to_string(),
        });
    }
    tags
}

#[async_trait::async_trait]
impl TodoApi for InMemoryApi {
    async fn list_todos(&self, filters: &TodoFilters) -> Result<Vec<Todo>, ApiError> {
        let mut store = self.store.lock().unwrap();
        let pairs = filters.query_pairs();
        record(&mut store, "GET", "/api/todos".to_string(), pairs_json(&pairs));

        let mut todos: Vec<Todo> = store
            .todos
            .iter()
            .filter(|t| match filters.status {
                Some(StatusFilter::Done) => t.done,
                Some(StatusFilter::Pending) => !t.done,
                None => true,
            })
            .filter(|t| filters.priority.map_or(true, |p| t.priority == p))
            .filter(|t| {
                non_empty(&filters.category).map_or(true, |c| t.category.as_deref() == Some(c))
            })
            .filter(|t| non_empty(&filters.search).map_or(true, |s| contains_ci(&t.task, s)))
            .cloned()
            .collect();
        let rank = |p: Priority| match p {
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        };
        todos.sort_by_key(|t| (t.done, rank(t.priority), Reverse(t.id)));
        Ok(todos)
    }

    async fn list_categories(&self) -> Result<Vec<String>, ApiError> {
        let mut store = self.store.lock().unwrap();
        record(
            &mut store,
            "GET",
            "/api/categories".to_string(),
            serde_json::Value::Null,
        );
        let mut categories: Vec<String> = store
            .todos
            .iter()
            .filter_map(|t| non_empty(&t.category).map(str::to_string))
            .collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    async fn create_todo(&self, todo: &NewTodo) -> Result<(), ApiError> {
        let mut store = self.store.lock().unwrap();
        record(
            &mut store,
            "POST",
            "/api/todos".to_string(),
            serde_json::to_value(todo).unwrap_or_default(),
        );
        if todo.task.trim().is_empty() {
            return Err(ApiError::Status(400));
        }
        store.next_id += 1;
        let id = store.next_id;
        store.todos.push(Todo {
            id,
            task: todo.task.clone(),
            done: false,
            priority: todo.priority,
            category: Some(todo.category.clone()).filter(|c| !c.is_empty()),
            due_date: Some(todo.due_date.clone()).filter(|d| !d.is_empty()),
        });
        Ok(())
    }

    async fn set_done(&self, id: i64, done: bool) -> Result<(), ApiError> {
        let mut store = self.store.lock().unwrap();
        record(
            &mut store,
            "PATCH",
            format!("/api/todos/{id}"),
            serde_json::json!({ "done": done }),
        );
        if let Some(todo) = store.todos.iter_mut().find(|t| t.id == id) {
            todo.done = done;
        }
        Ok(())
    }

    async fn replace_todo(&self, id: i64, todo: &TodoReplacement) -> Result<(), ApiError> {
        let mut store = self.store.lock().unwrap();
        record(
            &mut store,
            "PUT",
            format!("/api/todos/{id}"),
            serde_json::to_value(todo).unwrap_or_default(),
        );
        if let Some(existing) = store.todos.iter_mut().find(|t| t.id == id) {
            existing.task = todo.task.clone();
            existing.done = todo.done;
            existing.priority = todo.priority;
            existing.category = Some(todo.category.clone()).filter(|c| !c.is_empty());
            existing.due_date = Some(todo.due_date.clone()).filter(|d| !d.is_empty());
        }
        Ok(())
    }

    async fn delete_todo(&self, id: i64) -> Result<(), ApiError> {
        let mut store = self.store.lock().unwrap();
        record(
            &mut store,
            "DELETE",
            format!("/api/todos/{id}"),
            serde_json::Value::Null,
        );
        store.todos.retain(|t| t.id != id);
        Ok(())
    }
}

#[async_trait::async_trait]
impl VaultApi for InMemoryApi {
    async fn list_items(&self, filters: &VaultFilters) -> Result<Vec<VaultItem>, ApiError> {
        let mut store = self.store.lock().unwrap();
        let pairs = filters.query_pairs();
        record(&mut store, "GET", "/api/vault".to_string(), pairs_json(&pairs));

        let mut items: Vec<VaultItem> = store
            .items
            .iter()
            .filter(|i| !i.archived)
            .filter(|i| filters.content_type.map_or(true, |t| i.content_type == t))
            .filter(|i| {
                non_empty(&filters.search).map_or(true, |s| {
                    contains_ci(&i.content, s)
                        || opt_contains_ci(&i.title, s)
                        || opt_contains_ci(&i.meta_title, s)
                        || opt_contains_ci(&i.meta_description, s)
                })
            })
            .cloned()
            .collect();
        items.sort_by_key(|i| (Reverse(i.pinned), Reverse(i.id)));
        Ok(items)
    }

    async fn create_item(&self, item: &NewVaultItem) -> Result<VaultItem, ApiError> {
        let mut store = self.store.lock().unwrap();
        record(
            &mut store,
            "POST",
            "/api/vault".to_string(),
            serde_json::to_value(item).unwrap_or_default(),
        );
        if item.content.trim().is_empty() {
            return Err(ApiError::Status(400));
        }
        let content_type = detect_content_type(&item.content);
        store.next_id += 1;
        let created = VaultItem {
            id: store.next_id,
            content_type,
            title: None,
            content: item.content.clone(),
            url: (content_type != ContentType::Note).then(|| item.content.clone()),
            meta_title: None,
            meta_description: None,
            meta_thumbnail: None,
            meta_author: None,
            meta_site_name: None,
            pinned: item.pinned,
            archived: false,
            tags: dedup_tags(&item.tags),
        };
        store.items.push(created.clone());
        Ok(created)
    }

    async fn detect(&self, content: &str) -> Result<Detected, ApiError> {
        let mut store = self.store.lock().unwrap();
        record(
            &mut store,
            "POST",
            "/api/vault/detect".to_string(),
            serde_json::json!({ "content": content }),
        );
        Ok(Detected {
            content_type: detect_content_type(content),
            meta_title: None,
            meta_description: None,
            meta_thumbnail: None,
            meta_author: None,
            meta_site_name: None,
        })
    }

    async fn set_pinned(&self, id: i64, pinned: bool) -> Result<(), ApiError> {
        let mut store = self.store.lock().unwrap();
        record(
            &mut store,
            "PATCH",
            format!("/api/vault/{id}"),
            serde_json::json!({ "pinned": pinned }),
        );
        if let Some(item) = store.items.iter_mut().find(|i| i.id == id) {
            item.pinned = pinned;
        }
        Ok(())
    }

    async fn set_archived(&self, id: i64, archived: bool) -> Result<(), ApiError> {
        let mut store = self.store.lock().unwrap();
        record(
            &mut store,
            "PATCH",
            format!("/api/vault/{id}"),
            serde_json::json!({ "archived": archived }),
        );
        if let Some(item) = store.items.iter_mut().find(|i| i.id == id) {
            item.archived = archived;
        }
        Ok(())
    }

    async fn replace_item(&self, id: i64, item: &VaultReplacement) -> Result<(), ApiError> {
        let mut store = self.store.lock().unwrap();
        record(
            &mut store,
            "PUT",
            format!("/api/vault/{id}"),
            serde_json::to_value(item).unwrap_or_default(),
        );
        if let Some(existing) = store.items.iter_mut().find(|i| i.id == id) {
            existing.title = Some(item.title.clone()).filter(|t| !t.is_empty());
            existing.content = item.content.clone();
            existing.pinned = item.pinned;
            existing.archived = item.archived;
            existing.tags = dedup_tags(&item.tags);
        }
        Ok(())
    }

    async fn delete_item(&self, id: i64) -> Result<(), ApiError> {
        let mut store = self.store.lock().unwrap();
        record(
            &mut store,
            "DELETE",
            format!("/api/vault/{id}"),
            serde_json::Value::Null,
        );
        store.items.retain(|i| i.id != id);
        Ok(())
    }

    async fn resurface(&self) -> Result<VaultItem, ApiError> {
        let mut store = self.store.lock().unwrap();
        record(
            &mut store,
            "GET",
            "/api/vault/resurface".to_string(),
            serde_json::Value::Null,
        );
        // Deterministic candidate; the real server picks at random.
        store
            .items
            .iter()
            .find(|i| !i.archived)
            .cloned()
            .ok_or(ApiError::Status(404))
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, ApiError> {
        let mut store = self.store.lock().unwrap();
        record(
            &mut store,
            "GET",
            "/api/tags".to_string(),
            serde_json::Value::Null,
        );
        let mut names: Vec<String> = store
            .items
            .iter()
            .flat_map(|i| i.tags.iter().map(|t| t.name.clone()))
            .collect();
        names.sort();
        names.dedup();
        Ok(names.into_iter().map(|name| Tag { name }).collect())
    }
}
