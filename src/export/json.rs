//! JSON import/export module.
//! Loads question banks, skill catalogs and baseline lists from JSON files and
//! saves a user's review cards.

use crate::error::Result;
use crate::models::{BaselineDiagnostic, Question, ReviewCard, Skill};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;
use tracing::info;

fn read_json_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path)?;
    let items: Vec<T> = serde_json::from_reader(BufReader::new(file))?;
    Ok(items)
}

/// Imports a question bank (a JSON array of questions).
pub fn import_questions(path: &Path) -> Result<Vec<Question>> {
    let questions: Vec<Question> = read_json_list(path)?;
    info!(count = questions.len(), path = %path.display(), "questions read");
    Ok(questions)
}

/// Imports a skill catalog. Array order is the authored cluster order.
pub fn import_skills(path: &Path) -> Result<Vec<Skill>> {
    let skills: Vec<Skill> = read_json_list(path)?;
    info!(count = skills.len(), path = %path.display(), "skills read");
    Ok(skills)
}

/// Imports baseline section scores. Array order is section precedence.
pub fn import_baselines(path: &Path) -> Result<Vec<BaselineDiagnostic>> {
    let baselines: Vec<BaselineDiagnostic> = read_json_list(path)?;
    info!(count = baselines.len(), path = %path.display(), "baselines read");
    Ok(baselines)
}

/// Exports review cards to a pretty-printed JSON file at the specified path.
pub fn export_review_cards_to_path(cards: &[ReviewCard], path: &Path) -> Result<()> {
    let json_string = serde_json::to_string_pretty(cards)?;
    let mut file = File::create(path)?;
    file.write_all(json_string.as_bytes())?;
    info!(count = cards.len(), path = %path.display(), "review cards exported");
    Ok(())
}
