use std::{
    fs::{self, OpenOptions},
    path::PathBuf,
    sync::Mutex,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use taskboard::{
    config::{expand_home, AppConfig},
    storage::{FileStorage, MemoryStorage, Storage},
    ui, Collection, Priority, TaskId, TaskStore,
};

#[derive(Parser)]
#[command(name = "taskboard", version, about = "Three-column task board")]
struct Cli {
    /// Config file (default: <config dir>/taskboard/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the board record and the log file
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Keep the board in memory only
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive board (default)
    Ui,
    /// Print every column with its count
    List,
    /// Add a task to "To Do"
    Add {
        text: String,
        #[arg(long, short, default_value = "medium")]
        priority: Priority,
    },
    /// Move a task to the end of another column
    Move {
        id: TaskId,
        /// Column currently holding the task (todo, in-progress, completed)
        from: Collection,
        to: Collection,
    },
    /// Delete a task from a column
    Remove { id: TaskId, collection: Collection },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = expand_home(&dir);
    }

    init_logging(&config)?;

    let storage: Box<dyn Storage> = if cli.ephemeral {
        Box::new(MemoryStorage::new())
    } else {
        Box::new(FileStorage::with_key(
            &config.storage.data_dir,
            config.storage.key.clone(),
        ))
    };
    storage
        .initialize()
        .await
        .context("failed to initialize board storage")?;
    let mut store = TaskStore::load(storage).await;

    match cli.command.unwrap_or(Command::Ui) {
        Command::Ui => ui::terminal::run(store, config.timings.into()).await?,
        Command::List => print_board(&store),
        Command::Add { text, priority } => {
            let task = store.add(&text, priority).await?;
            ensure_saved(&mut store)?;
            println!("Added {} to {}", task.id, Collection::Todo.human_name());
        }
        Command::Move { id, from, to } => {
            if store.move_task(&id, from, to).await {
                ensure_saved(&mut store)?;
                println!("Moved {id} to {}", to.human_name());
            } else {
                println!("Nothing moved: no task {id} in {}", from.human_name());
            }
        }
        Command::Remove { id, collection } => {
            if store.remove(&id, collection).await.is_some() {
                ensure_saved(&mut store)?;
                println!("Removed {id} from {}", collection.human_name());
            } else {
                println!("Nothing removed: no task {id} in {}", collection.human_name());
            }
        }
    }

    Ok(())
}

fn ensure_saved(store: &mut TaskStore) -> Result<()> {
    match store.take_persist_error() {
        Some(e) => Err(e).context("the board could not be saved"),
        None => Ok(()),
    }
}

fn init_logging(config: &AppConfig) -> Result<()> {
    let path = config.log_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("cannot create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();

    Ok(())
}

fn print_board(store: &TaskStore) {
    for collection in Collection::ALL {
        let tasks = store.board().tasks(collection);
        println!("{} ({})", collection.title(), tasks.len());
        for task in tasks {
            println!("  {:<8} {}  [{}]", task.priority.to_string(), task.text, task.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_arguments_parse_ids_and_columns() {
        let cli = Cli::try_parse_from(["taskboard", "move", "17", "todo", "in-progress"]).unwrap();

        match cli.command {
            Some(Command::Move { id, from, to }) => {
                assert_eq!(id, TaskId::from_millis(17));
                assert_eq!(from, Collection::Todo);
                assert_eq!(to, Collection::InProgress);
            }
            _ => panic!("expected the move command"),
        }
    }

    #[test]
    fn test_remove_accepts_done_alias() {
        let cli = Cli::try_parse_from(["taskboard", "remove", "5", "done"]).unwrap();

        assert!(matches!(
            cli.command,
            Some(Command::Remove { collection: Collection::Completed, .. })
        ));
    }

    #[test]
    fn test_bad_id_or_column_is_rejected() {
        assert!(Cli::try_parse_from(["taskboard", "move", "abc", "todo", "completed"]).is_err());
        assert!(Cli::try_parse_from(["taskboard", "remove", "5", "backlog"]).is_err());
    }

    #[test]
    fn test_no_command_defaults_to_ui() {
        let cli = Cli::try_parse_from(["taskboard", "--ephemeral"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.ephemeral);
    }
}
