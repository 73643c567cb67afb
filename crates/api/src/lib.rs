//! Typed client for the todo/vault HTTP JSON API.

use thiserror::Error;

pub mod http;
pub mod memory;
pub mod models;

use models::{
    Detected, NewTodo, NewVaultItem, Tag, Todo, TodoFilters, TodoReplacement, VaultFilters,
    VaultItem, VaultReplacement,
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("server returned status {0}")]
    Status(u16),
}

#[async_trait::async_trait]
pub trait TodoApi: Send + Sync {
    async fn list_todos(&self, filters: &TodoFilters) -> Result<Vec<Todo>, ApiError>;
    async fn list_categories(&self) -> Result<Vec<String>, ApiError>;
    async fn create_todo(&self, todo: &NewTodo) -> Result<(), ApiError>;
    /// Partial update carrying only the completion flag.
    async fn set_done(&self, id: i64, done: bool) -> Result<(), ApiError>;
    async fn replace_todo(&self, id: i64, todo: &TodoReplacement) -> Result<(), ApiError>;
    async fn delete_todo(&self, id: i64) -> Result<(), ApiError>;
}

#[async_trait::async_trait]
pub trait VaultApi: Send + Sync {
    async fn list_items(&self, filters: &VaultFilters) -> Result<Vec<VaultItem>, ApiError>;
    async fn create_item(&self, item: &NewVaultItem) -> Result<VaultItem, ApiError>;
    /// Stateless classification probe; does not persist anything.
    async fn detect(&self, content: &str) -> Result<Detected, ApiError>;
    async fn set_pinned(&self, id: i64, pinned: bool) -> Result<(), ApiError>;
    async fn set_archived(&self, id: i64, archived: bool) -> Result<(), ApiError>;
    async fn replace_item(&self, id: i64, item: &VaultReplacement) -> Result<(), ApiError>;
    async fn delete_item(&self, id: i64) -> Result<(), ApiError>;
    /// A single older item to surface again, or `Status` when the server
    /// has no candidate.
    async fn resurface(&self) -> Result<VaultItem, ApiError>;
    async fn list_tags(&self) -> Result<Vec<Tag>, ApiError>;
}
