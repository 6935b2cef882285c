use chrono::Local;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{bail, eyre, Result};
use todo_core::config::CATEGORY_ICONS;
use todo_core::{
    validate_color, validate_name, validate_title, AppContext, Category, CategoryPatch, Config,
    FlagKey, FlagUpdate, Task, TaskPatch,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "todo")]
#[command(about = "Keep track of tasks from the terminal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage tasks
    #[command(subcommand)]
    Tasks(TaskCommand),
    /// Manage categories
    #[command(subcommand)]
    Categories(CategoryCommand),
    /// Inspect and override feature flags
    #[command(subcommand)]
    Flags(FlagCommand),
    /// Print the default configuration
    Config,
}

#[derive(Subcommand)]
enum TaskCommand {
    /// List tasks, optionally only one category
    List {
        #[arg(long)]
        category: Option<String>,
    },
    /// Add a task
    Add {
        #[arg(required = true)]
        title: Vec<String>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Mark a task done, or open again
    Toggle { id: String },
    /// Change a task
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, conflicts_with = "no_category")]
        category: Option<String>,
        #[arg(long)]
        no_category: bool,
    },
    /// Delete a task
    Delete { id: String },
    /// Show totals
    Stats,
}

#[derive(Subcommand)]
enum CategoryCommand {
    /// List categories with their task counts
    List,
    /// Add a category
    Add {
        #[arg(required = true)]
        name: Vec<String>,
        #[arg(long)]
        color: Option<String>,
        /// One of the built-in icon names
        #[arg(long)]
        icon: Option<String>,
    },
    /// Rename a category
    Rename {
        id: String,
        #[arg(required = true)]
        name: Vec<String>,
    },
    /// Delete a category. Its tasks are kept.
    Delete { id: String },
}

#[derive(Subcommand)]
enum FlagCommand {
    /// Show all flags
    List,
    /// Show one flag
    Get { key: String },
    /// Override a flag locally
    Set { key: String, value: String },
    /// Fetch flags from the remote provider now
    Refresh,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let config = Config::load()?;
    init_tracing(&config);

    if let Commands::Config = cli.command {
        print!("{}", Config::default_config_string());
        return Ok(());
    }

    let mut ctx = AppContext::open(&config);
    let state = ctx.initialize().await;
    tracing::debug!(?state, "feature flags initialized");

    match cli.command {
        Commands::Tasks(cmd) => run_tasks(&mut ctx, cmd),
        Commands::Categories(cmd) => run_categories(&mut ctx, cmd),
        Commands::Flags(cmd) => run_flags(&mut ctx, cmd).await,
        Commands::Config => Ok(()),
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_tasks(ctx: &mut AppContext, cmd: TaskCommand) -> Result<()> {
    match cmd {
        TaskCommand::List { category } => {
            let tasks = ctx.tasks.filter_by_category(category.as_deref());
            if tasks.is_empty() {
                println!("No tasks found. Use 'todo tasks add <title>' to create one.");
            }
            for task in &tasks {
                print_task(ctx, task);
            }
        }
        TaskCommand::Add { title, category } => {
            let task = add_task(ctx, &title.join(" "), category)?;
            println!("Added task: {}", task.title);
            println!("  ID: {}", task.id);
        }
        TaskCommand::Toggle { id } => {
            let id = resolve_task(ctx, &id)?;
            ctx.tasks.toggle_complete(&id);
            if let Some(task) = ctx.tasks.get(&id) {
                print_task(ctx, task);
            }
        }
        TaskCommand::Edit {
            id,
            title,
            description,
            category,
            no_category,
        } => {
            let id = resolve_task(ctx, &id)?;
            let mut patch = TaskPatch::default();
            if let Some(title) = title {
                patch = patch.title(validate_title(&title)?);
            }
            if let Some(description) = description {
                let description = Some(description).filter(|d| !d.trim().is_empty());
                patch = patch.description(description);
            }
            if no_category {
                patch = patch.category(None);
            } else if let Some(category) = category {
                patch = patch.category(Some(category));
            }
            ctx.tasks.update(&id, patch);
            if let Some(task) = ctx.tasks.get(&id) {
                print_task(ctx, task);
            }
        }
        TaskCommand::Delete { id } => {
            let id = resolve_task(ctx, &id)?;
            ctx.tasks.delete(&id);
            println!("Deleted task {id}");
        }
        TaskCommand::Stats => {
            let stats = ctx.tasks.stats();
            println!("Total:     {}", stats.total);
            println!("Completed: {}", stats.completed);
            println!("Pending:   {}", stats.pending);
        }
    }
    Ok(())
}

fn run_categories(ctx: &mut AppContext, cmd: CategoryCommand) -> Result<()> {
    if !ctx.flags.categories_enabled() {
        bail!("Categories are disabled. Enable them with 'todo flags set enable_categories true'.");
    }

    match cmd {
        CategoryCommand::List => {
            for category in ctx.categories.get_all() {
                println!(
                    "{:<10} {} {:<20} {} task(s)",
                    category.id,
                    category.color,
                    category.name,
                    ctx.tasks.count_by_category(&category.id)
                );
            }
        }
        CategoryCommand::Add { name, color, icon } => {
            let name = validate_name(&name.join(" "))?;
            let color = color.as_deref().map(validate_color).transpose()?;
            if let Some(icon) = &icon {
                if !CATEGORY_ICONS.contains(&icon.as_str()) {
                    bail!("Unknown icon {icon}. Pick one of: {}", CATEGORY_ICONS.join(", "));
                }
            }

            let category = add_category(ctx, name, color)?;
            if let Some(icon) = icon {
                ctx.categories
                    .update(&category.id, CategoryPatch::default().icon(Some(icon)));
            }
            println!("Added category: {} ({})", category.name, category.id);
        }
        CategoryCommand::Rename { id, name } => {
            let name = validate_name(&name.join(" "))?;
            if !ctx.categories.update(&id, CategoryPatch::default().name(name)) {
                bail!("No category with id {id}");
            }
        }
        CategoryCommand::Delete { id } => {
            let remaining = ctx.tasks.count_by_category(&id);
            if !ctx.categories.delete(&id) {
                bail!("No category with id {id}");
            }
            println!("Deleted category {id}");
            if remaining > 0 {
                println!("  {remaining} task(s) still point at it and are shown uncategorized");
            }
        }
    }
    Ok(())
}

async fn run_flags(ctx: &mut AppContext, cmd: FlagCommand) -> Result<()> {
    match cmd {
        FlagCommand::List => print_flags(ctx),
        FlagCommand::Get { key } => {
            let key: FlagKey = key.parse()?;
            println!("{}", ctx.flags.get_flag(key));
        }
        FlagCommand::Set { key, value } => {
            let key: FlagKey = key.parse()?;
            ctx.flags.set_flag(FlagUpdate::parse(key, &value)?);
            println!("{key} = {}", ctx.flags.get_flag(key));
        }
        FlagCommand::Refresh => {
            if !ctx.flags.refresh().await {
                println!("Remote config unavailable, keeping local flags ({:?})", ctx.flags.state());
            }
            print_flags(ctx);
        }
    }
    Ok(())
}

fn print_flags(ctx: &AppContext) {
    for key in FlagKey::ALL {
        println!("{:<18} {}", key, ctx.flags.get_flag(key));
    }
}

fn print_task(ctx: &AppContext, task: &Task) {
    let mark = if task.completed { "x" } else { " " };
    // Orphaned references render like uncategorized tasks.
    let category = ctx
        .category_of(task)
        .map(|c| c.name.as_str())
        .unwrap_or("");
    println!(
        "[{mark}] {:<40} {:<12} {}  {}",
        task.title,
        category,
        task.created_at.with_timezone(&Local).format("%Y-%m-%d"),
        task.id
    );
}

/// Validates and adds a task, failing if the store could not save it.
fn add_task(ctx: &mut AppContext, title: &str, category: Option<String>) -> Result<Task> {
    let title = validate_title(title)?;

    let max = ctx.flags.max_tasks();
    if !ctx.can_add_task() {
        bail!("At most {max} tasks allowed");
    }

    // Without categories every task is uncategorized.
    let category = category.filter(|_| ctx.flags.categories_enabled());
    if let Some(id) = &category {
        if ctx.categories.get(id).is_none() {
            bail!("No category with id {id}");
        }
    }

    let task = ctx.tasks.add(title, category);
    if ctx.tasks.get(&task.id).is_none() {
        bail!("Could not save task {:?}, see the log for details", task.title);
    }
    Ok(task)
}

/// Adds a category, failing if the store could not save it.
fn add_category(ctx: &mut AppContext, name: String, color: Option<String>) -> Result<Category> {
    let category = ctx.categories.add(name, color);
    if ctx.categories.get(&category.id).is_none() {
        bail!("Could not save category {:?}, see the log for details", category.name);
    }
    Ok(category)
}

/// Accepts a full id or an unambiguous prefix.
fn resolve_task(ctx: &AppContext, id: &str) -> Result<String> {
    if ctx.tasks.get(id).is_some() {
        return Ok(id.to_string());
    }

    let mut matches = ctx
        .tasks
        .get_all()
        .iter()
        .filter(|t| t.id.starts_with(id));
    match (matches.next(), matches.next()) {
        (Some(task), None) => Ok(task.id.clone()),
        (Some(_), Some(_)) => Err(eyre!("Task id prefix {id} is ambiguous")),
        (None, _) => Err(eyre!("No task with id {id}")),
    }
}
