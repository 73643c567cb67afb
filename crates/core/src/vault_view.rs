//! Controller for the vault. Same reload-after-mutation loop as the todo
//! view, plus the tag cloud, the debounced detection preview, and the
//! one-shot resurface banner.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use api::models::{Detected, NewVaultItem, Tag, VaultFilters, VaultItem, VaultReplacement};
use api::VaultApi;
use tracing::debug;

use crate::debounce::Debouncer;
use crate::render;

pub const PREVIEW_DEBOUNCE: Duration = Duration::from_millis(500);
pub const MIN_PREVIEW_CHARS: usize = 5;
pub const RESURFACE_PROBABILITY: f64 = 0.3;

/// Add-form state: raw content, the comma-separated tag input, and the
/// pin checkbox.
#[derive(Debug, Clone, Default)]
pub struct VaultDraft {
    pub content: String,
    pub tags: String,
    pub pinned: bool,
}

/// Edit-form payload. Pin and archive state are not part of the form and
/// are copied through from the held record on submit.
#[derive(Debug, Clone)]
pub struct VaultEdit {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

/// A pending preview: the token that must still be current for the
/// response to be applied, and the input captured at keystroke time.
#[derive(Debug, Clone)]
pub struct PreviewRequest {
    pub token: u64,
    text: String,
}

/// Split a comma-separated tag input into trimmed, deduplicated names.
pub fn split_tags(input: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for part in input.split(',') {
        let name = part.trim();
        if name.is_empty() || tags.iter().any(|t| t == name) {
            continue;
        }
        tags.push(name.to_string());
    }
    tags
}

pub struct VaultView {
    api: Arc<dyn VaultApi>,
    items: Vec<VaultItem>,
    tags: Vec<Tag>,
    filters: VaultFilters,
    draft: VaultDraft,
    preview: Option<Detected>,
    resurfaced: Option<VaultItem>,
    resurface_probability: f64,
    debounce: Arc<Debouncer>,
}

impl VaultView {
    pub fn new(api: Arc<dyn VaultApi>) -> Self {
        Self::with_options(api, PREVIEW_DEBOUNCE, RESURFACE_PROBABILITY)
    }

    pub fn with_options(
        api: Arc<dyn VaultApi>,
        preview_debounce: Duration,
        resurface_probability: f64,
    ) -> Self {
        Self {
            api,
            items: Vec::new(),
            tags: Vec::new(),
            filters: VaultFilters::default(),
            draft: VaultDraft::default(),
            preview: None,
            resurfaced: None,
            resurface_probability,
            debounce: Arc::new(Debouncer::new(preview_debounce)),
        }
    }

    /// Page-load sequence: item list, tag cloud, and a probabilistic
    /// resurface. `roll` is the caller's uniform sample in [0, 1).
    pub async fn init(&mut self, roll: f64) -> Result<()> {
        self.refresh().await?;
        self.refresh_tags().await?;
        self.maybe_resurface(roll).await;
        Ok(())
    }

    pub async fn refresh(&mut self) -> Result<()> {
        self.items = self.api.list_items(&self.filters).await?;
        debug!(count = self.items.len(), "vault list refreshed");
        Ok(())
    }

    /// The tag cloud is fetched independently of the item list.
    pub async fn refresh_tags(&mut self) -> Result<()> {
        self.tags = self.api.list_tags().await?;
        Ok(())
    }

    pub async fn set_filters(&mut self, filters: VaultFilters) -> Result<()> {
        self.filters = filters;
        self.refresh().await
    }

    /// Tag chips share the free-text search channel: clicking one simply
    /// overwrites the search field with the tag's name and re-queries.
    pub async fn select_tag(&mut self, name: &str) -> Result<()> {
        self.filters.search = Some(name.to_string());
        self.refresh().await
    }

    pub fn draft_mut(&mut self) -> &mut VaultDraft {
        &mut self.draft
    }

    /// Note a keystroke in the content field. Arms a fresh debounce token
    /// (invalidating any preview still waiting or in flight) and captures
    /// the trimmed input.
    pub fn queue_preview(&self, input: &str) -> PreviewRequest {
        PreviewRequest {
            token: self.debounce.arm(),
            text: input.trim().to_string(),
        }
    }

    /// Handle to await `settled` on without borrowing the view, so new
    /// keystrokes can keep arriving during the quiet period.
    pub fn debouncer(&self) -> Arc<Debouncer> {
        self.debounce.clone()
    }

    /// Complete a debounced preview. Inputs under five characters never
    /// reach the network; failures hide the panel; a response whose token
    /// has been superseded is discarded rather than shown stale.
    pub async fn run_preview(&mut self, request: PreviewRequest) -> Result<()> {
        if !self.debounce.is_current(request.token) {
            return Ok(());
        }
        if request.text.chars().count() < MIN_PREVIEW_CHARS {
            self.preview = None;
            return Ok(());
        }
        match self.api.detect(&request.text).await {
            Ok(detected) if self.debounce.is_current(request.token) => {
                self.preview = Some(detected)
            }
            Ok(_) => {}
            Err(_) => self.preview = None,
        }
        Ok(())
    }

    /// Submit the add form. Blank content is rejected before any network
    /// call. On success the draft (including the pin checkbox) resets,
    /// the preview panel hides, and both the item list and the global tag
    /// list are re-fetched.
    pub async fn submit_add(&mut self) -> Result<bool> {
        let content = self.draft.content.trim().to_string();
        if content.is_empty() {
            return Ok(false);
        }
        let new = NewVaultItem {
            content,
            tags: split_tags(&self.draft.tags),
            pinned: self.draft.pinned,
        };
        self.api.create_item(&new).await?;
        self.draft = VaultDraft::default();
        self.preview = None;
        self.refresh().await?;
        self.refresh_tags().await?;
        Ok(true)
    }

    /// Pin or unpin; no confirmation required.
    pub async fn set_pinned(&mut self, id: i64, pinned: bool) -> Result<()> {
        self.api.set_pinned(id, pinned).await?;
        self.refresh().await
    }

    /// Archive or unarchive an already-confirmed item.
    pub async fn set_archived(&mut self, id: i64, archived: bool) -> Result<()> {
        self.api.set_archived(id, archived).await?;
        self.refresh().await
    }

    /// Full replacement; pinned and archived are copied through from the
    /// held record.
    pub async fn submit_edit(&mut self, edit: VaultEdit) -> Result<()> {
        let Some(current) = self.items.iter().find(|i| i.id == edit.id) else {
            bail!("no vault item with id {}", edit.id);
        };
        let replacement = VaultReplacement {
            title: edit.title,
            content: edit.content,
            pinned: current.pinned,
            archived: current.archived,
            tags: edit.tags,
        };
        self.api.replace_item(edit.id, &replacement).await?;
        self.refresh().await?;
        self.refresh_tags().await
    }

    pub async fn delete(&mut self, id: i64) -> Result<()> {
        self.api.delete_item(id).await?;
        self.refresh().await?;
        self.refresh_tags().await
    }

    /// Roll the dice on page load. Anything short of a successful fetch,
    /// including "no candidate", leaves the banner hidden.
    pub async fn maybe_resurface(&mut self, roll: f64) {
        if roll >= self.resurface_probability {
            return;
        }
        self.resurfaced = self.api.resurface().await.ok();
    }

    /// Unconditional fetch for an explicit "show me something" action.
    pub async fn load_resurface(&mut self) -> Result<()> {
        self.resurfaced = Some(self.api.resurface().await?);
        Ok(())
    }

    /// Local UI state only; the server is not told and nothing persists.
    pub fn dismiss_resurface(&mut self) {
        self.resurfaced = None;
    }

    pub fn items(&self) -> &[VaultItem] {
        &self.items
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn filters(&self) -> &VaultFilters {
        &self.filters
    }

    pub fn preview(&self) -> Option<&Detected> {
        self.preview.as_ref()
    }

    pub fn resurfaced(&self) -> Option<&VaultItem> {
        self.resurfaced.as_ref()
    }

    /// The whole view as one fragment: banner, tag cloud, preview panel,
    /// then the list.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if let Some(item) = &self.resurfaced {
            out.push_str(&render::render_resurface(item));
        }
        out.push_str(&render::render_tag_cloud(&self.tags));
        if let Some(preview) = &self.preview {
            out.push_str(&render::render_preview(preview));
        }
        out.push_str(&render::render_vault_list(&self.items));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_input_splits_into_trimmed_unique_names() {
        assert_eq!(split_tags("funny, x"), vec!["funny", "x"]);
        assert_eq!(split_tags(" a ,,a , b "), vec!["a", "b"]);
        assert!(split_tags("").is_empty());
        assert!(split_tags(" , ,").is_empty());
    }
}
