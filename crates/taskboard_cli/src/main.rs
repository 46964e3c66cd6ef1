//! `taskboard` command-line front end.
//!
//! # Responsibility
//! - Resolve configuration from flags, environment and platform defaults.
//! - Drive one coordinator session per invocation and render it as text.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use std::rc::Rc;
use taskboard_core::{
    init_logging, seed_test_data, App, AppConfig, Priority, Project, Renderer, SqliteKvStore,
    Storage, Todo,
};

#[derive(Debug, Parser)]
#[command(name = "taskboard", version, about = "Projects and todos kept in a local key-value store")]
struct Cli {
    /// Database file holding all projects and todos.
    #[arg(long, env = "TASKBOARD_DB")]
    db: Option<PathBuf>,

    /// Minimum log level: trace|verbose|debug|info|warn|error.
    #[arg(long, env = "TASKBOARD_LOG_LEVEL")]
    log_level: Option<String>,

    /// Directory for rolling log files (absolute).
    #[arg(long, env = "TASKBOARD_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Replace all stored data with fixture projects before running.
    #[arg(long)]
    seed: bool,

    /// Delete all stored data before running.
    #[arg(long)]
    wipe: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show every project and its todos (default).
    List,
    /// Create a project.
    AddProject { name: String },
    /// Rename a project.
    RenameProject { project: String, name: String },
    /// Add a todo to a project.
    AddTodo {
        project: String,
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Due date as YYYY-MM-DD; defaults to now.
        #[arg(long)]
        due: Option<String>,
        /// none|low|medium|high or 0-3.
        #[arg(long, default_value = "none")]
        priority: String,
    },
    /// Mark a todo done (or not done with --undo).
    Done {
        project: String,
        todo: String,
        #[arg(long)]
        undo: bool,
    },
    /// Remove a todo from a project and delete it.
    DeleteTodo { project: String, todo: String },
}

/// Prints project cards to stdout.
#[derive(Debug)]
struct TextRenderer {
    now: DateTime<Utc>,
}

impl TextRenderer {
    fn print_todos(&self, project: &Project) {
        if project.is_empty() {
            println!("    (no todos)");
        }
        for todo in project.todos() {
            let mark = if todo.done() { "x" } else { " " };
            println!(
                "    [{mark}] {}  {}  priority={}  due {}",
                todo.id(),
                todo.title(),
                todo.priority().as_str(),
                describe_due(todo.due_date(), self.now)
            );
            if !todo.description().is_empty() {
                println!("          {}", todo.description());
            }
        }
    }
}

impl Renderer for TextRenderer {
    fn render_project(&mut self, project: &Project) {
        println!("{}  {}", project.id(), project.name());
        self.print_todos(project);
    }

    fn render_project_todos(&mut self, project: &Project) {
        println!("{}  {} (updated)", project.id(), project.name());
        self.print_todos(project);
    }

    fn render_empty(&mut self) {
        println!("No projects yet. Create one with `taskboard add-project <name>`.");
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli);

    if let Err(message) = init_logging(&config.log_level, &config.log_dir) {
        eprintln!("warning: logging disabled: {message}");
    }

    let store = SqliteKvStore::open(&config.db_path)
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;
    let storage = Storage::shared(store);
    let now = Utc::now();

    if cli.wipe {
        storage.delete_all().context("failed to wipe stored data")?;
        info!("event=cli_wipe module=cli status=ok");
    }
    if cli.seed {
        seed_test_data(&storage, now).context("failed to seed test data")?;
    }

    let mut app = App::load(Rc::clone(&storage), TextRenderer { now });
    run(&mut app, cli.command.unwrap_or(Command::List), now)
}

fn resolve_config(cli: &Cli) -> AppConfig {
    let mut config = AppConfig::from_platform_dirs();
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(dir) = &cli.log_dir {
        config.log_dir = dir.clone();
    }
    config
}

fn run(app: &mut App<TextRenderer>, command: Command, now: DateTime<Utc>) -> Result<()> {
    match command {
        Command::List => app.display_all(),
        Command::AddProject { name } => {
            app.create_project(name);
        }
        Command::RenameProject { project, name } => app.rename_project(&project, name)?,
        Command::AddTodo {
            project,
            title,
            description,
            due,
            priority,
        } => {
            if title.trim().is_empty() {
                bail!("todo title must not be empty");
            }
            if app.project(&project).is_none() {
                bail!("project not found: {project}");
            }
            let Some(priority) = Priority::parse(&priority) else {
                bail!("unsupported priority `{priority}`; expected none|low|medium|high or 0-3");
            };
            let due_date = match due {
                Some(raw) => parse_due_date(&raw)?,
                None => now,
            };
            let todo = Todo::new(app.storage(), title, description, due_date, priority);
            app.add_todo_to_project(&project, todo)?;
            app.refresh(&project)?;
        }
        Command::Done {
            project,
            todo,
            undo,
        } => app.set_todo_done(&project, &todo, !undo)?,
        Command::DeleteTodo { project, todo } => {
            app.delete_todo_from_project(&project, &todo)?;
            app.refresh(&project)?;
        }
    }
    Ok(())
}

/// Parses `YYYY-MM-DD` as 12:00 local time on that day.
fn parse_due_date(raw: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid due date `{raw}`; expected YYYY-MM-DD"))?;
    let Some(noon) = date.and_hms_opt(12, 0, 0) else {
        bail!("invalid due date `{raw}`");
    };
    let Some(local) = Local.from_local_datetime(&noon).earliest() else {
        bail!("due date `{raw}` does not exist in the local time zone");
    };
    Ok(local.with_timezone(&Utc))
}

/// Relative due-date wording in calendar days ("today", "in 3 days").
fn describe_due(due: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let due_day = due.with_timezone(&Local).date_naive();
    let today = now.with_timezone(&Local).date_naive();
    let days = (due_day - today).num_days();
    let plural = if days.abs() == 1 { "" } else { "s" };
    match days {
        0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        -1 => "yesterday".to_string(),
        d if d > 0 => format!("in {d} day{plural}"),
        d => format!("{} day{plural} ago (overdue)", d.abs()),
    }
}

#[cfg(test)]
mod tests {
    use super::{describe_due, parse_due_date, Cli};
    use chrono::{Duration, Local, TimeZone, Timelike, Utc};
    use clap::Parser;

    #[test]
    fn parse_due_date_uses_local_noon() {
        let parsed = parse_due_date("2024-03-15").unwrap();
        let local = parsed.with_timezone(&Local);
        assert_eq!(local.hour(), 12);
        assert_eq!(local.format("%Y-%m-%d").to_string(), "2024-03-15");
    }

    #[test]
    fn parse_due_date_rejects_other_formats() {
        assert!(parse_due_date("15/03/2024").is_err());
        assert!(parse_due_date("2024-02-30").is_err());
    }

    #[test]
    fn describe_due_counts_calendar_days() {
        let now = Local
            .with_ymd_and_hms(2024, 6, 10, 12, 0, 0)
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(describe_due(now, now), "today");
        assert_eq!(describe_due(now + Duration::days(1), now), "tomorrow");
        assert_eq!(describe_due(now - Duration::days(1), now), "yesterday");
        assert_eq!(describe_due(now + Duration::days(3), now), "in 3 days");
        assert_eq!(describe_due(now - Duration::days(2), now), "2 days ago (overdue)");
    }

    #[test]
    fn cli_parses_add_todo_flags() {
        let cli = Cli::try_parse_from([
            "taskboard",
            "--db",
            "/tmp/board.sqlite3",
            "add-todo",
            "p1",
            "Mow",
            "--priority",
            "high",
            "--due",
            "2024-06-01",
        ])
        .unwrap();
        assert!(cli.command.is_some());
        assert!(!cli.seed);
    }
}
