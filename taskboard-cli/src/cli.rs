use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use taskboard::{DueFilter, Preset, SortMode};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum PresetArg {
    Classic,
    Urgent,
    Review,
}

impl From<PresetArg> for Preset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Classic => Preset::Classic,
            PresetArg::Urgent => Preset::Urgent,
            PresetArg::Review => Preset::Review,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "taskboard")]
#[command(version)]
#[command(about = "A personal task board with manual ordering")]
#[command(long_about = "
taskboard keeps tasks in workflow columns (backlog, in-progress, blocked,
done by default) with a manual order inside each column. Tasks are stored as
JSON in the data directory; boards written by the older todo list are
migrated on first use.

Global arguments must come before the command:
  --data-dir    Directory holding the board (default: platform data dir)
  --config      Configuration file (YAML, TOML or JSON), may repeat
  --preset      Workflow preset: classic, urgent or review

Example usage:
  taskboard add \"Write release notes\" --priority high --tags docs,release
  taskboard mv 01J9Z in-progress --index 0
  taskboard list --due overdue --sort priority
  taskboard --preset review advance 01J9Z
")]
pub struct Cli {
    /// Directory holding the board data
    #[arg(long, env = "TASKBOARD_DATA_DIR", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Configuration file; replaces the discovered ones when given
    #[arg(long = "config", value_name = "FILE")]
    pub config_files: Vec<PathBuf>,

    /// Workflow preset, overriding configuration files
    #[arg(long, value_enum)]
    pub preset: Option<PresetArg>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a task at the top of its column
    Add {
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// Column; the configured default when omitted
        #[arg(short, long)]
        status: Option<String>,
        #[arg(short, long)]
        priority: Option<String>,
        /// Comma-separated tags
        #[arg(short, long)]
        tags: Option<String>,
        /// Due date, YYYY-MM-DD
        #[arg(long, value_parser = parse_date)]
        due: Option<NaiveDate>,
    },
    /// Change fields of a task
    Edit {
        /// Task id or unique id prefix
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Moving columns keeps the task's position value
        #[arg(short, long)]
        status: Option<String>,
        #[arg(short, long)]
        priority: Option<String>,
        /// Comma-separated tags, replacing the current ones
        #[arg(short, long)]
        tags: Option<String>,
        #[arg(long, value_parser = parse_date, conflicts_with = "clear_due")]
        due: Option<NaiveDate>,
        /// Remove the due date
        #[arg(long)]
        clear_due: bool,
    },
    /// Delete a task
    Rm {
        /// Task id or unique id prefix
        id: String,
    },
    /// Move a task to a column position
    Mv {
        /// Task id or unique id prefix
        id: String,
        status: String,
        /// Position in the full column; out-of-range values are clamped
        #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
        index: i64,
    },
    /// Advance a task to its next status
    Advance {
        /// Task id or unique id prefix
        id: String,
    },
    /// Delete every task in a column
    Clear {
        /// Column to clear; the terminal status when omitted
        #[arg(short, long)]
        status: Option<String>,
    },
    /// Show the board
    List {
        /// Case-insensitive text in title, description or tags
        #[arg(long)]
        search: Option<String>,
        #[arg(short, long)]
        priority: Option<String>,
        #[arg(short, long)]
        status: Option<String>,
        /// any, none, overdue, today or week
        #[arg(long, default_value = "any", value_parser = parse_due)]
        due: DueFilter,
        /// Comma-separated tags that must all be present
        #[arg(short, long)]
        tags: Option<String>,
        /// manual, priority, due-date, created-at or title
        #[arg(long, default_value = "manual", value_parser = parse_sort)]
        sort: SortMode,
        #[arg(long)]
        json: bool,
    },
    /// Show the number of tasks per column
    Counts {
        #[arg(long)]
        json: bool,
    },
    /// Print the resolved configuration
    Config,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

fn parse_due(s: &str) -> Result<DueFilter, String> {
    DueFilter::parse(s).map_err(|e| e.to_string())
}

fn parse_sort(s: &str) -> Result<SortMode, String> {
    SortMode::parse(s).map_err(|e| e.to_string())
}
