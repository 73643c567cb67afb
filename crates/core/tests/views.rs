use std::sync::Arc;
use std::time::Duration;

use api::memory::InMemoryApi;
use api::models::{ContentType, Priority, StatusFilter, Tag, Todo, TodoFilters, VaultItem};
use vault_core::todo_view::{TodoEdit, TodoView};
use vault_core::vault_view::{VaultEdit, VaultView};

fn seeded_todo(id: i64, task: &str, done: bool) -> Todo {
    Todo {
        id,
        task: task.to_string(),
        done,
        priority: Priority::Medium,
        category: None,
        due_date: None,
    }
}

fn seeded_item(id: i64, content: &str) -> VaultItem {
    VaultItem {
        id,
        content_type: ContentType::Note,
        title: None,
        content: content.to_string(),
        url: None,
        meta_title: None,
        meta_description: None,
        meta_thumbnail: None,
        meta_author: None,
        meta_site_name: None,
        pinned: false,
        archived: false,
        tags: vec![],
    }
}

#[tokio::test]
async fn list_query_carries_exactly_the_set_filters() {
    let api = Arc::new(InMemoryApi::new());
    let mut view = TodoView::new(api.clone());

    view.set_filters(TodoFilters {
        status: Some(StatusFilter::Pending),
        priority: None,
        category: Some(String::new()),
        search: Some("rent".to_string()),
    })
    .await
    .unwrap();

    let calls = api.calls();
    let list = calls
        .iter()
        .find(|c| c.method == "GET" && c.path == "/api/todos")
        .unwrap();
    assert_eq!(
        list.body,
        serde_json::json!({ "status": "pending", "search": "rent" })
    );
}

#[tokio::test]
async fn blank_add_stays_off_the_network() {
    let api = Arc::new(InMemoryApi::new());
    let mut view = TodoView::new(api.clone());

    view.draft_mut().task = "   ".to_string();
    let submitted = view.submit_add().await.unwrap();

    assert!(!submitted);
    assert!(api.calls().is_empty());
    // The rejected draft is left alone for the user to fix.
    assert_eq!(view.draft_mut().task, "   ");
}

#[tokio::test]
async fn successful_add_resets_the_draft_and_refreshes_categories() {
    let api = Arc::new(InMemoryApi::new());
    let mut view = TodoView::new(api.clone());

    let draft = view.draft_mut();
    draft.task = "  water plants  ".to_string();
    draft.priority = Priority::High;
    draft.category = " home ".to_string();
    let submitted = view.submit_add().await.unwrap();

    assert!(submitted);
    assert_eq!(view.draft_mut().task, "");
    assert_eq!(view.draft_mut().priority, Priority::Medium);
    assert_eq!(view.todos().len(), 1);
    assert_eq!(view.todos()[0].task, "water plants");
    assert_eq!(view.todos()[0].category.as_deref(), Some("home"));
    assert_eq!(view.categories(), ["home"]);
}

#[tokio::test]
async fn toggle_submits_only_the_done_flag() {
    let api = Arc::new(InMemoryApi::new());
    api.seed_todo(seeded_todo(7, "call dentist", false));
    let mut view = TodoView::new(api.clone());
    view.init().await.unwrap();
    api.clear_calls();

    view.toggle(7).await.unwrap();

    let calls = api.calls();
    let patch = calls.iter().find(|c| c.method == "PATCH").unwrap();
    assert_eq!(patch.path, "/api/todos/7");
    assert_eq!(patch.body, serde_json::json!({ "done": true }));
    // A toggle cannot introduce a category, so no category re-fetch.
    assert!(!calls.iter().any(|c| c.path == "/api/categories"));
    assert!(view.todos()[0].done);
}

#[tokio::test]
async fn edit_copies_the_held_done_flag_through() {
    let api = Arc::new(InMemoryApi::new());
    api.seed_todo(seeded_todo(3, "write report", true));
    let mut view = TodoView::new(api.clone());
    view.init().await.unwrap();
    api.clear_calls();

    view.submit_edit(TodoEdit {
        id: 3,
        task: "write the report".to_string(),
        priority: Priority::High,
        category: "work".to_string(),
        due_date: "2024-06-01".to_string(),
    })
    .await
    .unwrap();

    let calls = api.calls();
    let put = calls.iter().find(|c| c.method == "PUT").unwrap();
    assert_eq!(put.body["done"], serde_json::json!(true));
    assert_eq!(put.body["task"], serde_json::json!("write the report"));
    let edited = &view.todos()[0];
    assert!(edited.done);
    assert_eq!(edited.category.as_deref(), Some("work"));
}

#[tokio::test]
async fn delete_refreshes_list_and_categories() {
    let api = Arc::new(InMemoryApi::new());
    api.seed_todo(seeded_todo(1, "old task", false));
    let mut view = TodoView::new(api.clone());
    view.init().await.unwrap();
    api.clear_calls();

    view.delete(1).await.unwrap();

    assert!(view.todos().is_empty());
    let calls = api.calls();
    assert!(calls.iter().any(|c| c.method == "DELETE"));
    assert!(calls.iter().any(|c| c.path == "/api/categories"));
}

#[tokio::test]
async fn tag_chip_overwrites_the_search_field_and_requeries() {
    let api = Arc::new(InMemoryApi::new());
    let mut item = seeded_item(1, "notes about rustlang");
    item.tags = vec![Tag {
        name: "rustlang".to_string(),
    }];
    api.seed_item(item);
    api.seed_item(seeded_item(2, "unrelated"));
    let mut view = VaultView::new(api.clone());
    view.init(1.0).await.unwrap();
    api.clear_calls();

    view.select_tag("rustlang").await.unwrap();

    assert_eq!(view.filters().search.as_deref(), Some("rustlang"));
    let calls = api.calls();
    let list = calls
        .iter()
        .find(|c| c.method == "GET" && c.path == "/api/vault")
        .unwrap();
    assert_eq!(list.body, serde_json::json!({ "search": "rustlang" }));
    // The conflated text search matches on content.
    assert_eq!(view.items().len(), 1);
    assert_eq!(view.items()[0].id, 1);
}

#[tokio::test]
async fn short_input_never_issues_a_preview_request() {
    let api = Arc::new(InMemoryApi::new());
    let mut view = VaultView::with_options(api.clone(), Duration::from_millis(10), 0.3);

    let request = view.queue_preview("hey");
    assert!(view.debouncer().settled(request.token).await);
    view.run_preview(request).await.unwrap();

    assert!(view.preview().is_none());
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn rapid_keystrokes_collapse_into_one_probe() {
    let api = Arc::new(InMemoryApi::new());
    let mut view = VaultView::with_options(api.clone(), Duration::from_millis(10), 0.3);

    // Two keystrokes inside the quiet window: the first token is
    // superseded and never fires.
    let first = view.queue_preview("https://example.com/a");
    let second = view.queue_preview("https://example.com/ab");
    assert!(!view.debouncer().settled(first.token).await);
    view.run_preview(first).await.unwrap();
    assert!(view.debouncer().settled(second.token).await);
    view.run_preview(second).await.unwrap();

    let probes: Vec<_> = api
        .calls()
        .into_iter()
        .filter(|c| c.path == "/api/vault/detect")
        .collect();
    assert_eq!(probes.len(), 1);
    assert_eq!(
        probes[0].body,
        serde_json::json!({ "content": "https://example.com/ab" })
    );
    assert_eq!(
        view.preview().unwrap().content_type,
        ContentType::Article
    );
}

#[tokio::test]
async fn add_clears_draft_hides_preview_and_refreshes_tags() {
    let api = Arc::new(InMemoryApi::new());
    let mut view = VaultView::with_options(api.clone(), Duration::from_millis(10), 0.3);

    let request = view.queue_preview("https://example.com/post");
    assert!(view.debouncer().settled(request.token).await);
    view.run_preview(request).await.unwrap();
    assert!(view.preview().is_some());

    let draft = view.draft_mut();
    draft.content = "Check this out https://x.com/abc".to_string();
    draft.tags = "funny, x".to_string();
    draft.pinned = false;
    assert!(view.submit_add().await.unwrap());

    assert!(view.preview().is_none());
    assert_eq!(view.draft_mut().content, "");
    assert!(!view.draft_mut().pinned);

    // End to end: exactly one new item, tags split and deduplicated,
    // content type inferred server-side.
    assert_eq!(view.items().len(), 1);
    let item = &view.items()[0];
    assert_eq!(item.content, "Check this out https://x.com/abc");
    let names: Vec<&str> = item.tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["funny", "x"]);
    assert!(!item.pinned);
    assert_eq!(item.content_type, ContentType::Note);
    let tag_names: Vec<&str> = view.tags().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(tag_names, vec!["funny", "x"]);
}

#[tokio::test]
async fn vault_edit_copies_pin_and_archive_state_through() {
    let api = Arc::new(InMemoryApi::new());
    let mut item = seeded_item(4, "https://example.com/read-later");
    item.pinned = true;
    api.seed_item(item);
    let mut view = VaultView::new(api.clone());
    view.init(1.0).await.unwrap();
    api.clear_calls();

    view.submit_edit(VaultEdit {
        id: 4,
        title: "Read later".to_string(),
        content: "https://example.com/read-later".to_string(),
        tags: vec!["reading".to_string()],
    })
    .await
    .unwrap();

    let calls = api.calls();
    let put = calls.iter().find(|c| c.method == "PUT").unwrap();
    assert_eq!(put.body["pinned"], serde_json::json!(true));
    assert_eq!(put.body["archived"], serde_json::json!(false));
    assert_eq!(put.body["title"], serde_json::json!("Read later"));
    assert!(view.items()[0].pinned);
}

#[tokio::test]
async fn pin_patches_a_single_flag() {
    let api = Arc::new(InMemoryApi::new());
    api.seed_item(seeded_item(9, "something"));
    let mut view = VaultView::new(api.clone());
    view.init(1.0).await.unwrap();
    api.clear_calls();

    view.set_pinned(9, true).await.unwrap();

    let calls = api.calls();
    let patch = calls.iter().find(|c| c.method == "PATCH").unwrap();
    assert_eq!(patch.body, serde_json::json!({ "pinned": true }));
    assert!(view.items()[0].pinned);
}

#[tokio::test]
async fn archived_items_drop_out_of_the_list() {
    let api = Arc::new(InMemoryApi::new());
    api.seed_item(seeded_item(1, "keep"));
    api.seed_item(seeded_item(2, "shelve"));
    let mut view = VaultView::new(api.clone());
    view.init(1.0).await.unwrap();

    view.set_archived(2, true).await.unwrap();

    assert_eq!(view.items().len(), 1);
    assert_eq!(view.items()[0].id, 1);
}

#[tokio::test]
async fn losing_the_resurface_roll_skips_the_fetch() {
    let api = Arc::new(InMemoryApi::new());
    api.seed_item(seeded_item(1, "old gem"));
    let mut view = VaultView::new(api.clone());
    view.init(0.9).await.unwrap();

    assert!(view.resurfaced().is_none());
    assert!(!api
        .calls()
        .iter()
        .any(|c| c.path == "/api/vault/resurface"));
}

#[tokio::test]
async fn failed_resurface_keeps_the_banner_hidden() {
    let api = Arc::new(InMemoryApi::new());
    let mut view = VaultView::new(api.clone());
    view.init(0.1).await.unwrap();

    assert!(api
        .calls()
        .iter()
        .any(|c| c.path == "/api/vault/resurface"));
    assert!(view.resurfaced().is_none());
}

#[tokio::test]
async fn winning_roll_shows_a_dismissible_banner() {
    let api = Arc::new(InMemoryApi::new());
    api.seed_item(seeded_item(5, "an old favorite"));
    let mut view = VaultView::new(api.clone());
    view.init(0.1).await.unwrap();

    assert_eq!(view.resurfaced().unwrap().id, 5);
    assert!(view.render().contains("resurface-banner"));

    view.dismiss_resurface();
    assert!(view.resurfaced().is_none());
    // Dismissal is local only; nothing new went over the wire.
    assert!(!api.calls().iter().any(|c| c.method == "DELETE"));
}
