//! Command execution against a file-backed board.

use crate::cli::{Cli, Commands};
use crate::config;
use crate::exit_codes::{EXIT_SUCCESS, EXIT_WARNING};
use crate::table;
use anyhow::{bail, Context, Result};
use taskboard::{
    Board, BoardConfig, BoardError, FileStore, Filter, NewTask, Priority, Status, Tags, TaskId,
    TaskPatch,
};
use tracing::debug;

type FileBoard = Board<FileStore>;

/// Run one command, returning the process exit code
pub fn run(cli: Cli) -> Result<i32> {
    let cwd = std::env::current_dir().context("cannot determine the working directory")?;
    let files = config::config_files(&cli.config_files, &cwd)?;
    debug!("Config files: {files:?}");
    let board_config = BoardConfig::load_with_preset(&files, cli.preset.map(Into::into))
        .context("invalid board configuration")?;

    if let Commands::Config = cli.command {
        print!("{}", board_config.to_yaml()?);
        return Ok(EXIT_SUCCESS);
    }

    let data_dir = config::data_dir(cli.data_dir.as_deref());
    let mut board = Board::open(board_config, FileStore::new(data_dir));
    debug!("Data directory: {}", board.store().root().display());
    for issue in &board.load_report().issues {
        eprintln!("Warning: {issue}");
    }

    let mutated = execute(&mut board, cli.command)?;

    if mutated && !board.persistence_healthy() {
        eprintln!("Warning: changes could not be saved to the data directory");
        return Ok(EXIT_WARNING);
    }
    Ok(EXIT_SUCCESS)
}

/// Returns whether the board was written to
fn execute(board: &mut FileBoard, command: Commands) -> Result<bool> {
    match command {
        Commands::Add {
            title,
            description,
            status,
            priority,
            tags,
            due,
        } => {
            let input = NewTask {
                title,
                description: description.unwrap_or_default(),
                status: status.map(Status::from),
                priority: priority.map(Priority::from),
                tags: tags.as_deref().map(Tags::parse).unwrap_or_default(),
                due_date: due,
            };
            let task = board.create(input)?;
            println!("{}", task.id());
            Ok(true)
        }
        Commands::Edit {
            id,
            title,
            description,
            status,
            priority,
            tags,
            due,
            clear_due,
        } => {
            let id = resolve_id(board, &id)?;
            let patch = TaskPatch {
                title,
                description,
                status: status.map(Status::from),
                priority: priority.map(Priority::from),
                tags: tags.as_deref().map(Tags::parse),
                due_date: if clear_due { Some(None) } else { due.map(Some) },
            };
            let task = board.update(&id, patch)?;
            println!("{}", task.id());
            Ok(true)
        }
        Commands::Rm { id } => {
            let id = resolve_id(board, &id)?;
            let task = board.delete(&id)?;
            println!("Deleted {} ({})", task.id(), task.title());
            Ok(true)
        }
        Commands::Mv { id, status, index } => {
            let id = resolve_id(board, &id)?;
            board.move_to(&id, &Status::from(status), index)?;
            if let Some(task) = board.get(&id) {
                println!(
                    "Moved {} to {} at position {}",
                    task.id(),
                    board.config().status_label(task.status()),
                    task.order()
                );
            }
            Ok(true)
        }
        Commands::Advance { id } => {
            let id = resolve_id(board, &id)?;
            let action = board
                .get(&id)
                .and_then(|t| board.config().status(t.status().as_str()))
                .and_then(|s| s.advance_label.clone());

            if board.advance_status(&id)? {
                if let Some(task) = board.get(&id) {
                    let label = board.config().status_label(task.status());
                    match action {
                        Some(action) => println!("{action}: {} is now {label}", task.id()),
                        None => println!("{} is now {label}", task.id()),
                    }
                }
                Ok(true)
            } else {
                println!("{id} is already in the final status");
                Ok(false)
            }
        }
        Commands::Clear { status } => {
            let removed = match status {
                Some(status) => board.clear_status(&Status::from(status))?,
                None => board.clear_terminal(),
            };
            println!("Removed {removed} tasks");
            Ok(removed > 0)
        }
        Commands::List {
            search,
            priority,
            status,
            due,
            tags,
            sort,
            json,
        } => {
            let mut filter = Filter::new().with_due(due);
            if let Some(search) = search {
                filter = filter.with_search(search);
            }
            if let Some(priority) = priority {
                filter = filter.with_priority(board.config().parse_priority(&priority)?);
            }
            if let Some(status) = status {
                filter = filter.with_status(board.config().parse_status(&status)?);
            }
            if let Some(tags) = tags {
                filter = filter.with_tags(Tags::parse(&tags));
            }
            board.set_filter(filter);
            board.set_sort(sort);

            if json {
                println!("{}", serde_json::to_string_pretty(&board.view())?);
            } else if board.view().total() == 0 {
                println!("No tasks");
            } else {
                println!("{}", table::board_table(board));
            }
            Ok(false)
        }
        Commands::Counts { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&board.counts())?);
            } else {
                println!("{}", table::counts_table(board));
            }
            Ok(false)
        }
        Commands::Config => Ok(false),
    }
}

/// Exact id, or a case-insensitive prefix matching exactly one task
fn resolve_id(board: &FileBoard, input: &str) -> Result<TaskId> {
    let input = input.trim();
    if let Some(task) = board.get(&TaskId::from(input)) {
        return Ok(task.id().clone());
    }
    if input.is_empty() {
        return Err(BoardError::not_found(input).into());
    }

    let prefix = input.to_lowercase();
    let matches: Vec<&TaskId> = board
        .tasks()
        .iter()
        .map(|t| t.id())
        .filter(|id| id.as_str().to_lowercase().starts_with(&prefix))
        .collect();
    match matches.as_slice() {
        [id] => Ok((*id).clone()),
        [] => Err(BoardError::not_found(input).into()),
        _ => bail!("id prefix '{input}' matches {} tasks", matches.len()),
    }
}
