//! Controller for the todo list. Owns the list, the category set, the
//! filter state, and the add-form draft; every mutation round-trips to
//! the server and then replaces the whole list with a fresh query.

use std::sync::Arc;

use anyhow::{bail, Result};
use api::models::{NewTodo, Priority, Todo, TodoFilters, TodoReplacement};
use api::TodoApi;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::render;

/// Edit-form payload. `done` is deliberately absent: the edit form does
/// not expose completion state, so the submit path copies it from the
/// record currently held in memory.
#[derive(Debug, Clone)]
pub struct TodoEdit {
    pub id: i64,
    pub task: String,
    pub priority: Priority,
    pub category: String,
    pub due_date: String,
}

pub struct TodoView {
    api: Arc<dyn TodoApi>,
    todos: Vec<Todo>,
    categories: Vec<String>,
    filters: TodoFilters,
    draft: NewTodo,
}

impl TodoView {
    pub fn new(api: Arc<dyn TodoApi>) -> Self {
        Self {
            api,
            todos: Vec::new(),
            categories: Vec::new(),
            filters: TodoFilters::default(),
            draft: NewTodo::default(),
        }
    }

    /// Page-load sequence: list plus the category filter options.
    pub async fn init(&mut self) -> Result<()> {
        self.refresh().await?;
        self.refresh_categories().await
    }

    /// Replace the in-memory list wholesale with a fresh server query.
    pub async fn refresh(&mut self) -> Result<()> {
        self.todos = self.api.list_todos(&self.filters).await?;
        debug!(count = self.todos.len(), "todo list refreshed");
        Ok(())
    }

    pub async fn refresh_categories(&mut self) -> Result<()> {
        self.categories = self.api.list_categories().await?;
        Ok(())
    }

    /// Any filter change re-queries the list.
    pub async fn set_filters(&mut self, filters: TodoFilters) -> Result<()> {
        self.filters = filters;
        self.refresh().await
    }

    pub fn draft_mut(&mut self) -> &mut NewTodo {
        &mut self.draft
    }

    /// Submit the add form. A blank task is rejected before any network
    /// call and the draft is left alone. On success the draft resets to
    /// its defaults (priority back to medium) and both the list and the
    /// category set are re-fetched.
    pub async fn submit_add(&mut self) -> Result<bool> {
        let task = self.draft.task.trim().to_string();
        if task.is_empty() {
            return Ok(false);
        }
        let new = NewTodo {
            task,
            priority: self.draft.priority,
            category: self.draft.category.trim().to_string(),
            due_date: self.draft.due_date.clone(),
        };
        self.api.create_todo(&new).await?;
        self.draft = NewTodo::default();
        self.refresh().await?;
        self.refresh_categories().await?;
        Ok(true)
    }

    /// Flip completion. Only the flag goes over the wire, and a toggle
    /// cannot introduce a new category, so only the list is re-fetched.
    pub async fn toggle(&mut self, id: i64) -> Result<()> {
        let Some(todo) = self.todos.iter().find(|t| t.id == id) else {
            bail!("no todo with id {id}");
        };
        let done = !todo.done;
        self.api.set_done(id, done).await?;
        self.refresh().await
    }

    /// Full replacement. The completion flag is copied through from the
    /// held record, not defaulted.
    pub async fn submit_edit(&mut self, edit: TodoEdit) -> Result<()> {
        let Some(current) = self.todos.iter().find(|t| t.id == edit.id) else {
            bail!("no todo with id {}", edit.id);
        };
        let replacement = TodoReplacement {
            task: edit.task,
            done: current.done,
            priority: edit.priority,
            category: edit.category,
            due_date: edit.due_date,
        };
        self.api.replace_todo(edit.id, &replacement).await?;
        self.refresh().await?;
        self.refresh_categories().await
    }

    /// Delete an already-confirmed todo; confirmation is interactive and
    /// stays with the caller.
    pub async fn delete(&mut self, id: i64) -> Result<()> {
        self.api.delete_todo(id).await?;
        self.refresh().await?;
        self.refresh_categories().await
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn filters(&self) -> &TodoFilters {
        &self.filters
    }

    pub fn render(&self, now: DateTime<Utc>) -> String {
        render::render_todo_list(&self.todos, now)
    }
}
