use crate::models::{
    Detected, NewTodo, NewVaultItem, Tag, Todo, TodoFilters, TodoReplacement, VaultFilters,
    VaultItem, VaultReplacement,
};
use crate::{ApiError, TodoApi, VaultApi};
use reqwest::Client;
use tracing::debug;

/// `reqwest`-backed implementation of both API traits against a single
/// base URL.
#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn request_err(err: reqwest::Error) -> ApiError {
    ApiError::Request(err.to_string())
}

#[async_trait::async_trait]
impl TodoApi for HttpApi {
    async fn list_todos(&self, filters: &TodoFilters) -> Result<Vec<Todo>, ApiError> {
        let pairs = filters.query_pairs();
        debug!(params = pairs.len(), "listing todos");
        let resp = self
            .client
            .get(self.url("/api/todos"))
            .query(&pairs)
            .send()
            .await
            .map_err(request_err)?;
        resp.json().await.map_err(request_err)
    }

    async fn list_categories(&self) -> Result<Vec<String>, ApiError> {
        let resp = self
            .client
            .get(self.url("/api/categories"))
            .send()
            .await
            .map_err(request_err)?;
        resp.json().await.map_err(request_err)
    }

    async fn create_todo(&self, todo: &NewTodo) -> Result<(), ApiError> {
        // The created record in the response goes unused.
        self.client
            .post(self.url("/api/todos"))
            .json(todo)
            .send()
            .await
            .map_err(request_err)?;
        Ok(())
    }

    async fn set_done(&self, id: i64, done: bool) -> Result<(), ApiError> {
        self.client
            .patch(self.url(&format!("/api/todos/{id}")))
            .json(&serde_json::json!({ "done": done }))
            .send()
            .await
            .map_err(request_err)?;
        Ok(())
    }

    async fn replace_todo(&self, id: i64, todo: &TodoReplacement) -> Result<(), ApiError> {
        self.client
            .put(self.url(&format!("/api/todos/{id}")))
            .json(todo)
            .send()
            .await
            .map_err(request_err)?;
        Ok(())
    }

    async fn delete_todo(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .delete(self.url(&format!("/api/todos/{id}")))
            .send()
            .await
            .map_err(request_err)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl VaultApi for HttpApi {
    async fn list_items(&self, filters: &VaultFilters) -> Result<Vec<VaultItem>, ApiError> {
        let pairs = filters.query_pairs();
        debug!(params = pairs.len(), "listing vault items");
        let resp = self
            .client
            .get(self.url("/api/vault"))
            .query(&pairs)
            .send()
            .await
            .map_err(request_err)?;
        resp.json().await.map_err(request_err)
    }

    async fn create_item(&self, item: &NewVaultItem) -> Result<VaultItem, ApiError> {
        let resp = self
            .client
            .post(self.url("/api/vault"))
            .json(item)
            .send()
            .await
            .map_err(request_err)?;
        resp.json().await.map_err(request_err)
    }

    async fn detect(&self, content: &str) -> Result<Detected, ApiError> {
        debug!(len = content.len(), "detection probe");
        let resp = self
            .client
            .post(self.url("/api/vault/detect"))
            .json(&serde_json::json!({ "content": content }))
            .send()
            .await
            .map_err(request_err)?;
        if !resp.status().is_success() {
            return Err(ApiError::Status(resp.status().as_u16()));
        }
        resp.json().await.map_err(request_err)
    }

    async fn set_pinned(&self, id: i64, pinned: bool) -> Result<(), ApiError> {
        self.client
            .patch(self.url(&format!("/api/vault/{id}")))
            .json(&serde_json::json!({ "pinned": pinned }))
            .send()
            .await
            .map_err(request_err)?;
        Ok(())
    }

    async fn set_archived(&self, id: i64, archived: bool) -> Result<(), ApiError> {
        self.client
            .patch(self.url(&format!("/api/vault/{id}")))
            .json(&serde_json::json!({ "archived": archived }))
            .send()
            .await
            .map_err(request_err)?;
        Ok(())
    }

    async fn replace_item(&self, id: i64, item: &VaultReplacement) -> Result<(), ApiError> {
        self.client
            .put(self.url(&format!("/api/vault/{id}")))
            .json(item)
            .send()
            .await
            .map_err(request_err)?;
        Ok(())
    }

    async fn delete_item(&self, id: i64) -> Result<(), ApiError> {
        self.client
            .delete(self.url(&format!("/api/vault/{id}")))
            .send()
            .await
            .map_err(request_err)?;
        Ok(())
    }

    async fn resurface(&self) -> Result<VaultItem, ApiError> {
        let resp = self
            .client
            .get(self.url("/api/vault/resurface"))
            .send()
            .await
            .map_err(request_err)?;
        if !resp.status().is_success() {
            return Err(ApiError::Status(resp.status().as_u16()));
        }
        resp.json().await.map_err(request_err)
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, ApiError> {
        let resp = self
            .client
            .get(self.url("/api/tags"))
            .send()
            .await
            .map_err(request_err)?;
        resp.json().await.map_err(request_err)
    }
}
