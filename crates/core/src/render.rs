//! HTML fragment rendering. Fragments are plain strings handed to
//! whatever hosts the view; every user-supplied field is escaped before
//! it reaches markup.

use api::models::{non_empty, ContentType, Detected, Tag, Todo, VaultItem};
use chrono::{DateTime, NaiveDate, Utc};

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Truncate to at most `max` characters, the last three becoming "...".
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let head: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{head}...")
}

/// Display-title precedence: extracted metadata, then the user-supplied
/// title, then a 60-character truncation of the raw content.
pub fn display_title(item: &VaultItem) -> String {
    if let Some(title) = non_empty(&item.meta_title) {
        return title.to_string();
    }
    if let Some(title) = non_empty(&item.title) {
        return title.to_string();
    }
    truncate(&item.content, 60)
}

/// Overdue means the due date's start of day lies before `now` and the
/// item is not done. Unparseable dates are never overdue.
pub fn is_overdue(todo: &Todo, now: DateTime<Utc>) -> bool {
    if todo.done {
        return false;
    }
    let Some(due) = non_empty(&todo.due_date) else {
        return false;
    };
    match NaiveDate::parse_from_str(due, "%Y-%m-%d") {
        Ok(date) => date
            .and_hms_opt(0, 0, 0)
            .map(|start| start.and_utc() < now)
            .unwrap_or(false),
        Err(_) => false,
    }
}

pub fn type_badge(content_type: ContentType) -> String {
    format!(
        r#"<span class="type-badge {ty}">{ty}</span>"#,
        ty = content_type.as_str()
    )
}

pub fn render_todo_item(todo: &Todo, now: DateTime<Utc>) -> String {
    let done_class = if todo.done { " done" } else { "" };
    let checked = if todo.done { " checked" } else { "" };

    let mut meta = format!(
        r#"<span class="todo-priority {p}">{p}</span>"#,
        p = todo.priority.as_str()
    );
    if let Some(category) = non_empty(&todo.category) {
        meta.push_str(&format!(
            r#"<span class="todo-category">#{}</span>"#,
            escape_html(category)
        ));
    }
    if let Some(due) = non_empty(&todo.due_date) {
        let overdue = if is_overdue(todo, now) { " overdue" } else { "" };
        meta.push_str(&format!(
            r#"<span class="todo-due{overdue}">Due: {}</span>"#,
            escape_html(due)
        ));
    }

    format!(
        concat!(
            r#"<li class="todo-item{done_class}">"#,
            r#"<button class="todo-checkbox{checked}" data-id="{id}"></button>"#,
            r#"<div class="todo-content"><div class="todo-task">{task}</div>"#,
            r#"<div class="todo-meta">{meta}</div></div>"#,
            r#"<div class="todo-actions">"#,
            r#"<button class="btn-edit" data-id="{id}">&#9998;</button>"#,
            r#"<button class="btn-delete" data-id="{id}">&#10005;</button>"#,
            r#"</div></li>"#
        ),
        done_class = done_class,
        checked = checked,
        id = todo.id,
        task = escape_html(&todo.task),
        meta = meta,
    )
}

pub fn render_todo_list(todos: &[Todo], now: DateTime<Utc>) -> String {
    if todos.is_empty() {
        return r#"<p class="empty-state">Nothing here yet.</p>"#.to_string();
    }
    let items: String = todos.iter().map(|t| render_todo_item(t, now)).collect();
    format!(r#"<ul class="todo-list">{items}</ul>"#)
}

pub fn render_vault_item(item: &VaultItem) -> String {
    let title = escape_html(&display_title(item));
    let heading = match non_empty(&item.url) {
        Some(url) => format!(r#"<a href="{}">{title}</a>"#, escape_html(url)),
        None => title,
    };
    let pin = if item.pinned {
        r#"<span class="vault-pin">pinned</span>"#
    } else {
        ""
    };
    let thumbnail = non_empty(&item.meta_thumbnail)
        .map(|src| format!(r#"<img class="vault-thumb" src="{}">"#, escape_html(src)))
        .unwrap_or_default();
    let author = non_empty(&item.meta_author)
        .map(|a| format!(r#"<span class="vault-author">by {}</span>"#, escape_html(a)))
        .unwrap_or_default();
    let tags: String = item
        .tags
        .iter()
        .map(|t| format!(r#"<span class="tag-chip">#{}</span>"#, escape_html(&t.name)))
        .collect();

    format!(
        concat!(
            r#"<div class="vault-item" data-id="{id}">{thumbnail}"#,
            r#"<div class="vault-body">{badge}{pin}"#,
            r#"<div class="vault-title">{heading}</div>{author}"#,
            r#"<div class="vault-tags">{tags}</div></div></div>"#
        ),
        id = item.id,
        thumbnail = thumbnail,
        badge = type_badge(item.content_type),
        pin = pin,
        heading = heading,
        author = author,
        tags = tags,
    )
}

pub fn render_vault_list(items: &[VaultItem]) -> String {
    if items.is_empty() {
        return r#"<p class="empty-state">Nothing in the vault yet.</p>"#.to_string();
    }
    let cards: String = items.iter().map(render_vault_item).collect();
    format!(r#"<div class="vault-list">{cards}</div>"#)
}

pub fn render_tag_cloud(tags: &[Tag]) -> String {
    let chips: String = tags
        .iter()
        .map(|t| {
            format!(
                r#"<button class="tag-chip" data-tag="{name}">#{name}</button>"#,
                name = escape_html(&t.name)
            )
        })
        .collect();
    format!(r#"<div class="tag-cloud">{chips}</div>"#)
}

pub fn render_preview(preview: &Detected) -> String {
    let thumbnail = non_empty(&preview.meta_thumbnail)
        .map(|src| format!(r#"<img class="preview-thumb" src="{}">"#, escape_html(src)))
        .unwrap_or_default();
    let title = non_empty(&preview.meta_title)
        .map(|t| format!(r#"<div class="preview-title">{}</div>"#, escape_html(t)))
        .unwrap_or_default();
    format!(
        r#"<div class="preview-panel">{}{thumbnail}{title}</div>"#,
        type_badge(preview.content_type)
    )
}

pub fn render_resurface(item: &VaultItem) -> String {
    let author = non_empty(&item.meta_author)
        .map(|a| format!(r#"<span class="resurface-author">by {}</span>"#, escape_html(a)))
        .unwrap_or_default();
    let link = non_empty(&item.url)
        .map(|u| {
            format!(
                r#"<a class="resurface-link" href="{}">open</a>"#,
                escape_html(u)
            )
        })
        .unwrap_or_default();
    format!(
        concat!(
            r#"<div class="resurface-banner">From your vault: "#,
            r#"<span class="resurface-title">{title}</span>{author}{link}"#,
            r#"<button class="resurface-dismiss">&#10005;</button></div>"#
        ),
        title = escape_html(&display_title(item)),
        author = author,
        link = link,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use api::models::Priority;
    use chrono::TimeZone;

    fn todo(due: Option<&str>, done: bool) -> Todo {
        Todo {
            id: 1,
            task: "pay rent".to_string(),
            done,
            priority: Priority::Medium,
            category: None,
            due_date: due.map(str::to_string),
        }
    }

    fn item(meta_title: Option<&str>, title: Option<&str>, content: &str) -> VaultItem {
        VaultItem {
            id: 1,
            content_type: ContentType::Note,
            title: title.map(str::to_string),
            content: content.to_string(),
            url: None,
            meta_title: meta_title.map(str::to_string),
            meta_description: None,
            meta_thumbnail: None,
            meta_author: None,
            meta_site_name: None,
            pinned: false,
            archived: false,
            tags: vec![],
        }
    }

    fn noon(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_html(r#"<b>"a" & 'b'</b>"#),
            "&lt;b&gt;&quot;a&quot; &amp; &#39;b&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn past_due_pending_item_is_overdue() {
        assert!(is_overdue(&todo(Some("2024-01-01"), false), noon(2024, 1, 2)));
    }

    #[test]
    fn done_item_is_never_overdue() {
        assert!(!is_overdue(&todo(Some("2024-01-01"), true), noon(2024, 1, 2)));
    }

    #[test]
    fn future_or_garbage_dates_are_not_overdue() {
        assert!(!is_overdue(&todo(Some("2024-03-01"), false), noon(2024, 1, 2)));
        assert!(!is_overdue(&todo(Some("soonish"), false), noon(2024, 1, 2)));
        assert!(!is_overdue(&todo(None, false), noon(2024, 1, 2)));
    }

    #[test]
    fn badges_are_omitted_when_fields_are_absent() {
        let html = render_todo_item(&todo(None, false), noon(2024, 1, 2));
        assert!(!html.contains("todo-category"));
        assert!(!html.contains("todo-due"));
        assert!(html.contains("todo-priority"));
    }

    #[test]
    fn user_text_is_escaped_in_markup() {
        let mut t = todo(None, false);
        t.task = "<script>alert(1)</script>".to_string();
        t.category = Some("a&b".to_string());
        let html = render_todo_item(&t, noon(2024, 1, 2));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("#a&amp;b"));
    }

    #[test]
    fn title_precedence_prefers_metadata() {
        let long = "z".repeat(70);
        assert_eq!(display_title(&item(Some("X"), Some("Y"), &long)), "X");
        assert_eq!(display_title(&item(None, Some("Y"), &long)), "Y");
        let fallback = display_title(&item(None, None, &long));
        assert_eq!(fallback.chars().count(), 60);
        assert_eq!(fallback, format!("{}...", "z".repeat(57)));
    }

    #[test]
    fn short_content_is_not_truncated() {
        assert_eq!(display_title(&item(None, None, "short note")), "short note");
    }

    #[test]
    fn empty_lists_render_placeholders() {
        assert!(render_todo_list(&[], noon(2024, 1, 2)).contains("empty-state"));
        assert!(render_vault_list(&[]).contains("empty-state"));
    }
}
