/// Command line front end for the habit score store
///
/// This file sets up logging, parses command line arguments, opens the score
/// database and dispatches to the tool handlers.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use habit_score_store::tools::{
    self, CreateHabitParams, InvalidateParams, ListHabitsParams, LogCheckinParams,
    ScoreHistoryParams,
};
use habit_score_store::{ScoreTracker, TrackerError};

/// Get the default database path with robust fallback strategy
fn get_default_database_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    // Try various locations in order of preference
    let potential_paths = [
        dirs::home_dir().map(|mut p| {
            p.push(".habit_scores");
            p
        }),
        dirs::data_dir().map(|mut p| {
            p.push("habit_scores");
            p
        }),
        dirs::config_dir().map(|mut p| {
            p.push("habit_scores");
            p
        }),
        std::env::current_dir().ok().map(|mut p| {
            p.push(".habit_scores");
            p
        }),
    ];

    for potential_path in potential_paths.iter().flatten() {
        if std::fs::create_dir_all(potential_path).is_ok() {
            // Test if we can write to this directory
            let test_file = potential_path.join(".test_write");
            if std::fs::write(&test_file, "test").is_ok() {
                let _ = std::fs::remove_file(&test_file);
                return Ok(potential_path.join("scores.db"));
            }
        }
    }

    // Ultimate fallback: use a temporary directory
    let mut temp_path = std::env::temp_dir();
    temp_path.push("habit_scores");
    std::fs::create_dir_all(&temp_path)?;
    temp_path.push("scores.db");

    tracing::warn!("Using temporary directory for database: {}", temp_path.display());
    Ok(temp_path)
}

/// Command line arguments for the habit score store
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    /// If not provided, uses a default location in the user's home directory
    #[arg(long)]
    database: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,

    /// Print responses as JSON instead of a short message
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a habit
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, default_value = "personal")]
        category: String,
        /// daily, weekdays, weekends, weekly:N or every:N
        #[arg(long, default_value = "daily")]
        frequency: String,
    },
    /// Log a check-in (defaults to today)
    Check {
        #[arg(long)]
        habit: i64,
        /// YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// List habits with today's score
    List {
        /// Include paused habits
        #[arg(long)]
        all: bool,
    },
    /// Show a habit's score history
    Scores {
        #[arg(long)]
        habit: i64,
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },
    /// Show today's score of a habit
    Today {
        #[arg(long)]
        habit: i64,
    },
    /// Drop cached scores from a date onward
    Invalidate {
        #[arg(long)]
        habit: i64,
        #[arg(long)]
        from: String,
    },
}

fn emit<T: Serialize>(json: bool, response: &T, message: String) -> Result<(), TrackerError> {
    if json {
        println!("{}", serde_json::to_string_pretty(response)?);
    } else {
        println!("{}", message);
    }
    Ok(())
}

fn run(tracker: &ScoreTracker, command: Command, json: bool) -> Result<(), TrackerError> {
    match command {
        Command::Create { name, description, category, frequency } => {
            let response = tools::create_habit(
                tracker,
                CreateHabitParams { name, description, category, frequency },
            )?;
            emit(json, &response, response.message.clone())
        }
        Command::Check { habit, date, notes } => {
            let response = tools::log_checkin(
                tracker,
                LogCheckinParams {
                    habit_id: habit,
                    completed_at: date,
                    value: None,
                    intensity: None,
                    notes,
                },
            )?;
            emit(json, &response, response.message.clone())
        }
        Command::List { all } => {
            let response = tools::list_habits(tracker, ListHabitsParams { active_only: Some(!all) })?;
            let message = if response.habits.is_empty() {
                "No habits found. Create one with `create --name`.".to_string()
            } else {
                response
                    .habits
                    .iter()
                    .map(|h| format!("{:>4}  {:<24} {:>6.1}%  {}", h.habit_id, h.name, h.today_score * 100.0, h.frequency))
                    .collect::<Vec<_>>()
                    .join("\n")
            };
            emit(json, &response, message)
        }
        Command::Scores { habit, from, to } => {
            let response = tools::score_history(
                tracker,
                ScoreHistoryParams { habit_id: habit, from, to },
            )?;
            let message = std::iter::once(format!("📈 {}", response.name))
                .chain(response.scores.iter().map(|p| format!("{}  {:>6.1}%", p.date, p.percentage * 100.0)))
                .collect::<Vec<_>>()
                .join("\n");
            emit(json, &response, message)
        }
        Command::Today { habit } => {
            let mut scores = tracker.habit_scores(habit.into())?;
            let value = scores.get_today_value()?;
            let percentage = value as f64 / habit_score_store::Score::MAX_VALUE as f64;
            let response = serde_json::json!({ "habit_id": habit, "value": value, "percentage": percentage });
            emit(json, &response, format!("{}: {:.1}%", scores.habit().name, percentage * 100.0))
        }
        Command::Invalidate { habit, from } => {
            let response = tools::invalidate_scores(tracker, InvalidateParams { habit_id: habit, from })?;
            emit(json, &response, response.message.clone())
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Set up logging based on command line flags
    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("habit_score_store={}", log_level))
        .with_writer(std::io::stderr) // Keep stdout for command output
        .init();

    let db_path = match args.database {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            path
        }
        None => get_default_database_path()?,
    };

    info!("Using database at: {}", db_path.display());

    let tracker = ScoreTracker::new(db_path)?;
    run(&tracker, args.command, args.json)?;

    Ok(())
}
