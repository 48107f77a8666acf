//! Crate-wide error type for persistence, file and CLI failures.
//!
//! The core utilities (shuffler, scheduler, weak-skill selector) never fail;
//! only the I/O layers around them return these errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("question not found: {0}")]
    QuestionNotFound(String),

    #[error("no review card for user '{user_id}' and question '{question_id}'")]
    ReviewCardNotFound {
        user_id: String,
        question_id: String,
    },

    #[error("invalid grade '{0}' (expected again, hard, good or easy)")]
    InvalidGrade(String),

    #[error("invalid study mode '{0}' (expected mastery, crash or accel)")]
    InvalidStudyMode(String),

    #[error("choice index {0} is out of range")]
    InvalidChoice(usize),

    #[error("stored timestamp '{0}' is not valid")]
    InvalidTimestamp(String),
}

pub type Result<T> = std::result::Result<T, Error>;
