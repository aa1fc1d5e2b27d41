use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::Result;
use std::path::PathBuf;
use todostore::{Backend, Config, Filter, JsonlSlot, STATE_KEY, Slot, StoreError, Task, logging};
use tracing::info;

#[derive(Parser)]
#[command(name = "todostore")]
#[command(about = "TodoStore CLI - Task list with filtering and persistent state")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Path to a YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the persisted state (overrides config)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Storage backend: jsonl or sqlite (overrides config)
    #[arg(short, long)]
    backend: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show tasks (defaults to the active filter)
    List {
        /// all, completed or pending
        #[arg(short, long, value_parser = filter_arg)]
        filter: Option<Filter>,
    },

    /// Add a task
    Add { description: Option<String> },

    /// Flip a task between done and pending
    Toggle { id: String },

    /// Delete a task
    Delete { id: String },

    /// Delete every completed task
    ClearCompleted,

    /// Show the active filter, or set it (all, completed or pending)
    Filter {
        #[arg(value_parser = filter_arg)]
        value: Option<Filter>,
    },

    /// Drop superseded entries from the JSONL journal
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(backend) = cli.backend.as_deref() {
        config.backend = backend.parse()?;
    }

    // Setup tracing
    logging::init(&config.log_level)?;

    let mut store = config.open_store()?;

    match cli.command {
        Commands::List { filter } => {
            let filter = filter.unwrap_or(store.current_filter());
            render(&store.list_tasks(filter), filter, store.pending_count());
        }
        Commands::Add { description } => {
            store.add_task(description.as_deref().unwrap_or_default())?;
            render(&store.visible_tasks(), store.current_filter(), store.pending_count());
        }
        Commands::Toggle { id } => {
            if !store.toggle_task(&id)? {
                println!("{} no task with id {}", "note:".yellow(), id);
            }
            render(&store.visible_tasks(), store.current_filter(), store.pending_count());
        }
        Commands::Delete { id } => {
            if !store.delete_task(&id)? {
                println!("{} no task with id {}", "note:".yellow(), id);
            }
            render(&store.visible_tasks(), store.current_filter(), store.pending_count());
        }
        Commands::ClearCompleted => {
            let removed = store.delete_completed()?;
            println!("Removed {} completed task(s)", removed);
            render(&store.visible_tasks(), store.current_filter(), store.pending_count());
        }
        Commands::Filter { value } => match value {
            Some(filter) => {
                store.set_filter(filter)?;
                render(&store.visible_tasks(), filter, store.pending_count());
            }
            None => println!("{}", store.current_filter()),
        },
        Commands::Compact => compact(&config)?,
    }

    Ok(())
}

/// Command-line filter names ignore case; the store itself only knows the
/// exact snapshot names
fn filter_arg(value: &str) -> Result<Filter, StoreError> {
    match Filter::VARIANTS.into_iter().find(|f| f.as_str().eq_ignore_ascii_case(value)) {
        Some(filter) => Ok(filter),
        None => value.parse(),
    }
}

fn compact(config: &Config) -> Result<()> {
    if config.backend != Backend::Jsonl {
        println!("Nothing to compact for the {:?} backend", config.backend);
        return Ok(());
    }

    let mut slot = JsonlSlot::open(&config.data_dir)?;
    if slot.load(STATE_KEY)?.is_none() {
        println!("No journal to compact");
        return Ok(());
    }
    let dropped = slot.compact(STATE_KEY)?;
    info!(dropped, "Compaction finished");
    println!("Compacted journal, dropped {} superseded snapshot(s)", dropped);
    Ok(())
}

fn render(tasks: &[Task], filter: Filter, pending: usize) {
    if tasks.is_empty() {
        println!("{}", "(no tasks)".dimmed());
    }

    for task in tasks {
        let (mark, description) = if task.done {
            ("[x]".green(), task.description.as_str().dimmed().strikethrough())
        } else {
            ("[ ]".normal(), task.description.as_str().normal())
        };
        println!("{} {} {}", mark, description, task.id.dimmed());
    }

    println!();
    println!("{} pending {}", pending.to_string().bold(), format!("(filter: {})", filter).dimmed());
}
