//! liftlog - Personal workout and body-weight tracker

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};

use liftlog::dates::{YearMonth, weekday_abbr};
use liftlog::db::Measurement;
use liftlog::exercises::{BUILTIN_EXERCISES, default_exercise};
use liftlog::export::write_export;
use liftlog::settings::MeasurementSystem;
use liftlog::stats::DEFAULT_PROGRESS_LIMIT;
use liftlog::tui::App;
use liftlog::{Database, Persistence, Session, Settings};

#[derive(Parser)]
#[command(name = "liftlog")]
#[command(author, version, about = "Workout log with calendar history and strength progress")]
struct Cli {
    /// SQLite file holding the ledger
    #[arg(long, global = true, env = "LIFTLOG_DB", default_value = "liftlog.db")]
    db: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open TUI dashboard
    Tui,

    /// Log a workout set for today
    Log {
        /// Body part (e.g., "Chest", "Legs", "Cardio")
        body_part: String,

        /// Exercise name; new names are added to the catalog.
        /// Defaults to the body part's first built-in exercise.
        exercise: Option<String>,

        /// Max weight in kg, or minutes for Cardio
        #[arg(short, long)]
        value: Option<String>,
    },

    /// List workout history
    List {
        /// Only this date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,

        /// Number of records to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Delete a workout by id
    Delete {
        id: String,
    },

    /// Show a month with workout days marked
    Calendar {
        /// Month as YYYY-MM, defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Best value per day for a body part
    Progress {
        body_part: String,

        /// Number of most recent days
        #[arg(short, long, default_value_t = DEFAULT_PROGRESS_LIMIT)]
        limit: usize,
    },

    /// Body-weight tracking
    #[command(subcommand)]
    Weight(WeightCommand),

    /// List exercises, or add a custom one
    Exercises {
        /// Only this body part
        #[arg(short, long)]
        body_part: Option<String>,

        #[command(subcommand)]
        action: Option<ExerciseCommand>,
    },

    /// Export workout history as CSV
    Export {
        /// Target directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Show or change preferences
    Settings {
        #[arg(long)]
        dark_mode: Option<bool>,

        /// metric or imperial
        #[arg(long)]
        units: Option<MeasurementSystem>,

        #[arg(long)]
        name: Option<String>,
    },
}

#[derive(Subcommand)]
enum WeightCommand {
    /// Record today's body weight in kg
    Add { kg: String },

    /// Newest readings first
    List {
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Remove a reading by its index in `weight list`
    Remove { index: usize },

    /// Readings oldest first, for a trend
    Chart {
        #[arg(short, long, default_value_t = DEFAULT_PROGRESS_LIMIT)]
        limit: usize,
    },
}

#[derive(Subcommand)]
enum ExerciseCommand {
    /// Add a custom exercise
    Add { body_part: String, name: String },
}

fn report(outcome: Persistence) {
    if let Some(notice) = outcome.notice() {
        eprintln!("Warning: {}", notice);
    }
}

fn describe(measurement: Measurement, settings: &Settings) -> String {
    match measurement {
        Measurement::Weight(kg) => format!("Max Weight: {}", settings.format_weight(kg)),
        Measurement::Duration(min) => format!("Duration: {} min", min),
        Measurement::Unmeasured => "-".to_string(),
    }
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let db = Database::open(&cli.db).with_context(|| format!("failed to open {}", cli.db))?;
    let settings = Settings::load(&db);
    let now = Local::now();
    let today = now.date_naive();
    let mut session = Session::load(db, today);

    match cli.command {
        Some(Commands::Tui) | None => {
            let mut app = App::new(session, settings);
            app.run()?;
        }

        Some(Commands::Log { body_part, exercise, value }) => {
            let exercise = match exercise {
                Some(name) => name,
                None => default_exercise(&body_part)
                    .with_context(|| format!("no default exercise for '{}', name one", body_part))?
                    .to_string(),
            };
            let outcome = session.log_workout(&body_part, &exercise, value.as_deref(), now)?;
            report(outcome);
            if let Some(w) = session.workouts().first() {
                println!(
                    "Logged: {} - {} | {} (id: {})",
                    w.body_part,
                    w.exercise_name,
                    describe(w.measurement(), &settings),
                    w.id
                );
            }
        }

        Some(Commands::List { date, limit }) => {
            let workouts: Vec<_> = match &date {
                Some(d) => session.workouts_on(d),
                None => session.workouts().iter().collect(),
            };
            println!("Recent workouts:");
            println!("{:-<72}", "");
            for w in workouts.iter().take(limit) {
                println!(
                    "{} {:>8} | {:10} | {:22} | {} | {}",
                    w.date,
                    w.timestamp,
                    w.body_part,
                    w.exercise_name,
                    describe(w.measurement(), &settings),
                    w.id
                );
            }
        }

        Some(Commands::Delete { id }) => {
            let outcome = session.delete_workout(&id)?;
            report(outcome);
            println!("Deleted workout {}", id);
        }

        Some(Commands::Calendar { month }) => {
            if let Some(raw) = month {
                let ym = YearMonth::parse(&raw).with_context(|| format!("'{}' is not YYYY-MM", raw))?;
                session.show_month(ym);
            }
            let grid = session.month_grid(today);
            println!("{}", session.month().label());
            for cell in &grid {
                let mut flags = String::new();
                if cell.has_entry {
                    flags.push_str(" *");
                }
                if cell.is_today {
                    flags.push_str(" (today)");
                }
                println!("{} {:>2}{}", weekday_abbr(cell.weekday), cell.day, flags);
            }
        }

        Some(Commands::Progress { body_part, limit }) => {
            let series = session.progress(&body_part, limit);
            if series.is_empty() {
                println!("No measured workouts for {}", body_part);
            } else {
                println!("Progress - {}", body_part);
                println!("{:-<40}", "");
                for (date, value) in series.points() {
                    let shown = if body_part == liftlog::db::CARDIO {
                        format!("{} min", value)
                    } else {
                        settings.format_weight(value)
                    };
                    println!("{} | {}", date, shown);
                }
                if let Some(change) = series.change() {
                    println!("Change: {:+.1}", change);
                }
            }
        }

        Some(Commands::Weight(cmd)) => match cmd {
            WeightCommand::Add { kg } => {
                let outcome = session.log_body_weight(&kg, now)?;
                report(outcome);
                println!("Logged body weight: {} kg", kg.trim());
            }
            WeightCommand::List { limit } => {
                for (i, entry) in session.weight_history().iter().enumerate().take(limit) {
                    let shown = entry
                        .kilograms()
                        .map(|kg| settings.format_weight(kg))
                        .unwrap_or_else(|| entry.weight.clone());
                    println!("[{}] {} {} | {}", i, entry.date, entry.timestamp, shown);
                }
            }
            WeightCommand::Remove { index } => {
                let outcome = session.delete_body_weight(index)?;
                report(outcome);
                println!("Removed weight entry {}", index);
            }
            WeightCommand::Chart { limit } => {
                let series = session.weight_trend(limit);
                for (date, kg) in series.points() {
                    println!("{} | {}", date, settings.format_weight(kg));
                }
            }
        },

        Some(Commands::Exercises { action, body_part }) => match action {
            Some(ExerciseCommand::Add { body_part, name }) => {
                report(session.add_custom_exercise(&body_part, &name));
                println!("{}: {}", body_part, name);
            }
            None => {
                let catalog = session.catalog();
                for (part, names) in catalog.iter() {
                    if body_part.as_deref().is_some_and(|bp| bp != part) {
                        continue;
                    }
                    let builtin = BUILTIN_EXERCISES.iter().any(|(p, _)| *p == part);
                    println!("{}{}", part, if builtin { "" } else { " (custom)" });
                    for name in names {
                        println!("  - {}", name);
                    }
                }
            }
        },

        Some(Commands::Export { dir }) => {
            let path = write_export(&dir, session.workouts(), today)?;
            println!("Exported {} workouts to {}", session.workouts().len(), path.display());
        }

        Some(Commands::Settings { dark_mode, units, name }) => {
            let mut settings = settings;
            let changed = dark_mode.is_some() || units.is_some() || name.is_some();
            if let Some(dark) = dark_mode {
                settings.dark_mode = dark;
            }
            if let Some(units) = units {
                settings.measurement_system = units;
            }
            if let Some(name) = name {
                settings.user_name = name;
            }
            if changed {
                settings.save(session.store())?;
            }
            println!("User name: {}", settings.user_name);
            println!("Units: {}", settings.measurement_system);
            println!("Dark mode: {}", settings.dark_mode);
        }
    }

    Ok(())
}
