use act_prep::app;
use act_prep::config::AppConfig;
use act_prep::database::db::init_database;
use act_prep::{BaselineDiagnostic, ReviewGrade, StudyMode};
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "act-prep", version, about = "ACT practice: shuffled drills, spaced review, study focus")]
struct Cli {
    /// SQLite database file (overrides the config file)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the database if it does not exist
    Init,
    /// Load a JSON array of questions
    ImportQuestions { path: PathBuf },
    /// Load a JSON array of skills, in authored cluster order
    ImportSkills { path: PathBuf },
    /// Record a baseline section score (0.0 - 1.0)
    SetBaseline {
        #[arg(long)]
        user: String,
        #[arg(long)]
        section: String,
        #[arg(long)]
        score: f64,
        #[arg(long, default_value = "self")]
        source: String,
    },
    /// Load a JSON array of baseline section scores for a user
    ImportBaselines {
        #[arg(long)]
        user: String,
        path: PathBuf,
    },
    /// Show a question's choices in shuffled order
    Shuffle {
        question: String,
        #[arg(long)]
        seed: Option<String>,
    },
    /// Answer a question by its position (1-4) in the user's shuffled view
    Answer {
        #[arg(long)]
        user: String,
        #[arg(long)]
        question: String,
        #[arg(long)]
        choice: usize,
        #[arg(long)]
        mode: Option<StudyMode>,
    },
    /// Grade a review card (again, hard, good, easy)
    Review {
        #[arg(long)]
        user: String,
        #[arg(long)]
        question: String,
        #[arg(long, conflicts_with = "accuracy", required_unless_present = "accuracy")]
        grade: Option<ReviewGrade>,
        /// Derive the grade from an accuracy percentage instead
        #[arg(long)]
        accuracy: Option<f64>,
    },
    /// List cards due today
    Due {
        #[arg(long)]
        user: String,
    },
    /// Review due cards interactively
    Drill {
        #[arg(long)]
        user: String,
    },
    /// Pick skills to emphasize in a study plan
    WeakSkills {
        #[arg(long)]
        user: String,
    },
    /// Report attempted skills below mastery
    WeakAreas {
        #[arg(long)]
        user: String,
        #[arg(long)]
        limit: Option<usize>,
        /// Split this many study minutes across the areas
        #[arg(long)]
        minutes: Option<u32>,
    },
    /// Write a user's review cards to a JSON file
    ExportReviews {
        #[arg(long)]
        user: String,
        path: PathBuf,
    },
    /// Move the simulated clock forward one day
    AdvanceDay,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> act_prep::Result<()> {
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config.database_path = db;
    }

    let conn = init_database(&config.database_path)?;
    let mut out = io::stdout().lock();

    match cli.command {
        Command::Init => {}
        Command::ImportQuestions { path } => {
            app::cmd_import_questions(&path, &conn, &mut out)?;
        }
        Command::ImportSkills { path } => {
            app::cmd_import_skills(&path, &conn, &mut out)?;
        }
        Command::SetBaseline {
            user,
            section,
            score,
            source,
        } => {
            let diagnostic = BaselineDiagnostic {
                section,
                score,
                source,
            };
            app::cmd_set_baseline(&user, &diagnostic, &conn, &mut out)?;
        }
        Command::ImportBaselines { user, path } => {
            app::cmd_import_baselines(&user, &path, &conn, &mut out)?;
        }
        Command::Shuffle { question, seed } => {
            app::cmd_shuffle(&question, seed.as_deref(), &conn, &mut out)?;
        }
        Command::Answer {
            user,
            question,
            choice,
            mode,
        } => {
            let mode = mode.unwrap_or(config.default_study_mode);
            let index = choice.checked_sub(1).ok_or(act_prep::Error::InvalidChoice(choice))?;
            app::cmd_answer(&user, &question, index, mode, &conn, &mut out)?;
        }
        Command::Review {
            user,
            question,
            grade,
            accuracy,
        } => {
            let grade = match (grade, accuracy) {
                (Some(grade), _) => grade,
                (None, Some(accuracy)) => ReviewGrade::from_accuracy(accuracy),
                (None, None) => return Err(act_prep::Error::InvalidGrade(String::new())),
            };
            app::cmd_review(&user, &question, grade, &conn, &mut out)?;
        }
        Command::Due { user } => {
            app::cmd_due(&user, &conn, &mut out)?;
        }
        Command::Drill { user } => {
            let mut input = io::stdin().lock();
            app::cmd_drill(&user, &conn, &mut input, &mut out)?;
        }
        Command::WeakSkills { user } => {
            app::cmd_weak_skills(&user, &config.weak_skills, &conn, &mut out)?;
        }
        Command::WeakAreas {
            user,
            limit,
            minutes,
        } => {
            let limit = limit.unwrap_or(config.weak_area_limit);
            app::cmd_weak_areas(&user, limit, minutes, &conn, &mut out)?;
        }
        Command::ExportReviews { user, path } => {
            app::cmd_export_reviews(&user, &path, &conn, &mut out)?;
        }
        Command::AdvanceDay => {
            app::cmd_advance_day(&conn, &mut out)?;
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    init_tracing();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
