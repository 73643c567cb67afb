use anyhow::Result;
use api::http::HttpApi;
use api::models::{
    ContentType, Priority, StatusFilter, Todo, TodoFilters, VaultFilters, VaultItem,
};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use vault_core::config;
use vault_core::config::AppConfig;
use vault_core::render;
use vault_core::todo_view::{TodoEdit, TodoView};
use vault_core::vault_view::{split_tags, VaultEdit, VaultView};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref())?;
    tracing::debug!(base_url = %cfg.server.base_url, "config loaded");
    let http = Arc::new(HttpApi::new(&cfg.server.base_url));

    match cli.command {
        Commands::Todo { command } => run_todo(command, http).await,
        Commands::Save {
            content,
            tags,
            pin,
        } => run_save(http, cfg, content, tags, pin).await,
        Commands::Note { text, tags, pin } => run_save(http, cfg, text, tags, pin).await,
        Commands::List {
            content_type,
            search,
            json,
            html,
        } => run_vault_list(http, cfg, content_type, search, json, html).await,
        Commands::Random => run_random(http, cfg).await,
        Commands::Pin { id } => run_set_pinned(http, cfg, id, true).await,
        Commands::Unpin { id } => run_set_pinned(http, cfg, id, false).await,
        Commands::Archive { id, yes } => run_set_archived(http, cfg, id, true, yes).await,
        Commands::Unarchive { id } => run_set_archived(http, cfg, id, false, true).await,
        Commands::Edit {
            id,
            title,
            content,
            tags,
        } => run_vault_edit(http, cfg, id, title, content, tags).await,
        Commands::Tag { id, tags } => run_vault_edit(http, cfg, id, None, None, Some(tags)).await,
        Commands::Rm { id, yes } => run_vault_rm(http, cfg, id, yes).await,
        Commands::Tags { json } => run_tags(http, cfg, json).await,
        Commands::Detect { content, json } => run_detect(http, cfg, content, json).await,
    }
}

#[derive(Parser)]
#[command(name = "vault")]
#[command(about = "Terminal client for the todo and content vault server", long_about = None)]
struct Cli {
    /// Path to config TOML
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage todos
    Todo {
        #[command(subcommand)]
        command: TodoCommands,
    },
    /// Save a link or snippet; the server detects its type
    Save {
        content: String,
        /// Comma-separated tags
        #[arg(short, long, default_value = "")]
        tags: String,
        /// Pin the item
        #[arg(short, long)]
        pin: bool,
    },
    /// Save a quick note
    Note {
        text: String,
        /// Comma-separated tags
        #[arg(short, long, default_value = "")]
        tags: String,
        /// Pin the note
        #[arg(short, long)]
        pin: bool,
    },
    /// List vault items
    List {
        /// Filter by content type (tweet|short-video|long-video|article|note)
        #[arg(short = 't', long = "type")]
        content_type: Option<String>,
        /// Free-text search
        #[arg(short, long)]
        search: Option<String>,
        /// Output JSON
        #[arg(long)]
        json: bool,
        /// Output the rendered HTML fragment
        #[arg(long)]
        html: bool,
    },
    /// Resurface an item from the vault
    Random,
    /// Pin an item
    Pin { id: i64 },
    /// Unpin an item
    Unpin { id: i64 },
    /// Archive an item
    Archive {
        id: i64,
        /// Skip confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// Unarchive an item
    Unarchive { id: i64 },
    /// Edit an item; pin and archive state are preserved
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
    },
    /// Replace an item's tags
    Tag { id: i64, tags: String },
    /// Delete an item
    Rm {
        id: i64,
        /// Skip confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },
    /// List all tags
    Tags {
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Probe content classification without saving
    Detect {
        content: String,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum TodoCommands {
    /// Add a todo
    Add {
        task: String,
        /// low, medium, or high
        #[arg(short, long, default_value = "medium")]
        priority: String,
        #[arg(short, long, default_value = "")]
        category: String,
        /// Due date (YYYY-MM-DD)
        #[arg(short, long, default_value = "")]
        due: String,
    },
    /// List todos
    List {
        /// done or pending
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        search: Option<String>,
        /// Output JSON
        #[arg(long)]
        json: bool,
        /// Output the rendered HTML fragment
        #[arg(long)]
        html: bool,
    },
    /// Toggle completion
    Done { id: i64 },
    /// Edit a todo; completion state is preserved
    Edit {
        id: i64,
        #[arg(long)]
        task: Option<String>,
        /// low, medium, or high
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
    },
    /// Delete a todo
    Rm {
        id: i64,
        /// Skip confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    print!("{prompt} [y/N] ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(matches!(line.trim(), "y" | "Y" | "yes"))
}

fn type_icon(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::Tweet => "[X]",
        ContentType::ShortVideo => "[SV]",
        ContentType::LongVideo => "[LV]",
        ContentType::Article => "[ART]",
        ContentType::Note => "[NOTE]",
    }
}

fn print_todo_line(todo: &Todo, now: chrono::DateTime<chrono::Utc>) {
    let check = if todo.done { "[x]" } else { "[ ]" };
    let mut line = format!("{check} {}. {} ({})", todo.id, todo.task, todo.priority.as_str());
    if let Some(category) = api::models::non_empty(&todo.category) {
        line.push_str(&format!(" #{category}"));
    }
    if let Some(due) = api::models::non_empty(&todo.due_date) {
        line.push_str(&format!(" due {due}"));
        if render::is_overdue(todo, now) {
            line.push_str(" (overdue)");
        }
    }
    println!("  {line}");
}

fn print_item(item: &VaultItem) {
    let pin = if item.pinned { " [pinned]" } else { "" };
    println!(
        "  {} {}. {}{pin}",
        type_icon(item.content_type),
        item.id,
        render::display_title(item)
    );
    if !item.tags.is_empty() {
        let tags: Vec<String> = item.tags.iter().map(|t| format!("#{}", t.name)).collect();
        println!("     {}", tags.join(" "));
    }
}

fn vault_view(http: Arc<HttpApi>, cfg: &AppConfig) -> VaultView {
    VaultView::with_options(
        http,
        Duration::from_millis(cfg.ui.preview_debounce_ms),
        cfg.ui.resurface_probability,
    )
}

async fn run_todo(command: TodoCommands, http: Arc<HttpApi>) -> Result<()> {
    let mut view = TodoView::new(http);
    match command {
        TodoCommands::Add {
            task,
            priority,
            category,
            due,
        } => {
            let draft = view.draft_mut();
            draft.task = task;
            draft.priority = priority.parse().map_err(anyhow::Error::msg)?;
            draft.category = category;
            draft.due_date = due;
            if view.submit_add().await? {
                println!("Added.");
            } else {
                println!("Task text is empty; nothing added.");
            }
        }
        TodoCommands::List {
            status,
            priority,
            category,
            search,
            json,
            html,
        } => {
            let filters = TodoFilters {
                status: status
                    .map(|s| s.parse::<StatusFilter>())
                    .transpose()
                    .map_err(anyhow::Error::msg)?,
                priority: priority
                    .map(|p| p.parse::<Priority>())
                    .transpose()
                    .map_err(anyhow::Error::msg)?,
                category,
                search,
            };
            view.set_filters(filters).await?;
            let now = chrono::Utc::now();
            if json {
                println!("{}", serde_json::to_string_pretty(view.todos())?);
            } else if html {
                println!("{}", view.render(now));
            } else if view.todos().is_empty() {
                println!("No todos found.");
            } else {
                println!();
                for todo in view.todos() {
                    print_todo_line(todo, now);
                }
                println!();
            }
        }
        TodoCommands::Done { id } => {
            view.refresh().await?;
            view.toggle(id).await?;
            println!("Toggled [{id}].");
        }
        TodoCommands::Edit {
            id,
            task,
            priority,
            category,
            due,
        } => {
            view.refresh().await?;
            let Some(current) = view.todos().iter().find(|t| t.id == id) else {
                anyhow::bail!("no todo with id {id}");
            };
            let edit = TodoEdit {
                id,
                task: task.unwrap_or_else(|| current.task.clone()),
                priority: match priority {
                    Some(p) => p.parse().map_err(anyhow::Error::msg)?,
                    None => current.priority,
                },
                category: category.unwrap_or_else(|| {
                    current.category.clone().unwrap_or_default()
                }),
                due_date: due.unwrap_or_else(|| current.due_date.clone().unwrap_or_default()),
            };
            view.submit_edit(edit).await?;
            println!("Updated [{id}].");
        }
        TodoCommands::Rm { id, yes } => {
            if !confirm("Delete this todo?", yes)? {
                return Ok(());
            }
            view.refresh().await?;
            view.delete(id).await?;
            println!("Deleted [{id}].");
        }
    }
    Ok(())
}

async fn run_save(
    http: Arc<HttpApi>,
    cfg: AppConfig,
    content: String,
    tags: String,
    pin: bool,
) -> Result<()> {
    let mut view = vault_view(http, &cfg);
    let draft = view.draft_mut();
    draft.content = content.clone();
    draft.tags = tags;
    draft.pinned = pin;
    if !view.submit_add().await? {
        println!("Content is empty; nothing saved.");
        return Ok(());
    }
    let trimmed = content.trim();
    if let Some(item) = view.items().iter().find(|i| i.content == trimmed) {
        println!("Saved [{}] {}", item.id, item.content_type.as_str());
        if !item.tags.is_empty() {
            let names: Vec<&str> = item.tags.iter().map(|t| t.name.as_str()).collect();
            println!("  Tags: {}", names.join(", "));
        }
        if item.pinned {
            println!("  Pinned");
        }
    } else {
        println!("Saved.");
    }
    Ok(())
}

async fn run_vault_list(
    http: Arc<HttpApi>,
    cfg: AppConfig,
    content_type: Option<String>,
    search: Option<String>,
    json: bool,
    html: bool,
) -> Result<()> {
    let mut view = vault_view(http, &cfg);
    let filters = VaultFilters {
        content_type: content_type
            .map(|t| t.parse::<ContentType>())
            .transpose()
            .map_err(anyhow::Error::msg)?,
        search,
    };
    view.set_filters(filters).await?;
    view.refresh_tags().await?;
    // Listing is the closest thing to a page load, so it rolls the dice.
    view.maybe_resurface(rand::random::<f64>()).await;

    if json {
        println!("{}", serde_json::to_string_pretty(view.items())?);
        return Ok(());
    }
    if html {
        println!("{}", view.render());
        return Ok(());
    }
    if let Some(item) = view.resurfaced() {
        println!("\nFrom your vault:");
        print_item(item);
    }
    if view.items().is_empty() {
        println!("No items in vault. Save something with: vault save <url>");
        return Ok(());
    }
    println!();
    for item in view.items() {
        print_item(item);
    }
    println!();
    Ok(())
}

async fn run_random(http: Arc<HttpApi>, cfg: AppConfig) -> Result<()> {
    let mut view = vault_view(http, &cfg);
    if view.load_resurface().await.is_err() {
        println!("No items in vault to resurface");
        return Ok(());
    }
    if let Some(item) = view.resurfaced() {
        println!("\nFrom your vault:");
        print_item(item);
        if let Some(author) = api::models::non_empty(&item.meta_author) {
            println!("     by {author}");
        }
        if let Some(url) = api::models::non_empty(&item.url) {
            println!("     {url}");
        }
        println!();
    }
    Ok(())
}

async fn run_set_pinned(http: Arc<HttpApi>, cfg: AppConfig, id: i64, pinned: bool) -> Result<()> {
    let mut view = vault_view(http, &cfg);
    view.set_pinned(id, pinned).await?;
    println!("{} [{id}].", if pinned { "Pinned" } else { "Unpinned" });
    Ok(())
}

async fn run_set_archived(
    http: Arc<HttpApi>,
    cfg: AppConfig,
    id: i64,
    archived: bool,
    yes: bool,
) -> Result<()> {
    if archived && !confirm("Archive this item?", yes)? {
        return Ok(());
    }
    let mut view = vault_view(http, &cfg);
    view.set_archived(id, archived).await?;
    println!("{} [{id}].", if archived { "Archived" } else { "Unarchived" });
    Ok(())
}

async fn run_vault_edit(
    http: Arc<HttpApi>,
    cfg: AppConfig,
    id: i64,
    title: Option<String>,
    content: Option<String>,
    tags: Option<String>,
) -> Result<()> {
    let mut view = vault_view(http, &cfg);
    view.refresh().await?;
    let Some(current) = view.items().iter().find(|i| i.id == id) else {
        anyhow::bail!("no vault item with id {id}");
    };
    let edit = VaultEdit {
        id,
        title: title.unwrap_or_else(|| current.title.clone().unwrap_or_default()),
        content: content.unwrap_or_else(|| current.content.clone()),
        tags: match tags {
            Some(input) => split_tags(&input),
            None => current.tags.iter().map(|t| t.name.clone()).collect(),
        },
    };
    view.submit_edit(edit).await?;
    println!("Updated [{id}].");
    Ok(())
}

async fn run_vault_rm(http: Arc<HttpApi>, cfg: AppConfig, id: i64, yes: bool) -> Result<()> {
    if !confirm("Delete this item?", yes)? {
        return Ok(());
    }
    let mut view = vault_view(http, &cfg);
    view.refresh().await?;
    let title = view
        .items()
        .iter()
        .find(|i| i.id == id)
        .map(render::display_title);
    view.delete(id).await?;
    match title {
        Some(title) => println!("Deleted [{id}] {title}"),
        None => println!("Deleted [{id}]."),
    }
    Ok(())
}

async fn run_tags(http: Arc<HttpApi>, cfg: AppConfig, json: bool) -> Result<()> {
    let mut view = vault_view(http, &cfg);
    view.refresh_tags().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(view.tags())?);
        return Ok(());
    }
    if view.tags().is_empty() {
        println!("No tags yet");
        return Ok(());
    }
    println!("\nTags:");
    for tag in view.tags() {
        println!("  #{}", tag.name);
    }
    println!();
    Ok(())
}

async fn run_detect(http: Arc<HttpApi>, cfg: AppConfig, content: String, json: bool) -> Result<()> {
    let mut view = vault_view(http, &cfg);
    // Same path the live preview takes: debounce, then probe.
    let request = view.queue_preview(&content);
    if view.debouncer().settled(request.token).await {
        view.run_preview(request).await?;
    }
    match view.preview() {
        Some(detected) if json => println!("{}", serde_json::to_string_pretty(detected)?),
        Some(detected) => {
            println!(
                "{} {}",
                type_icon(detected.content_type),
                detected.content_type.as_str()
            );
            if let Some(title) = api::models::non_empty(&detected.meta_title) {
                println!("  {title}");
            }
            if let Some(author) = api::models::non_empty(&detected.meta_author) {
                println!("  by {author}");
            }
        }
        None => println!("No preview available."),
    }
    Ok(())
}
