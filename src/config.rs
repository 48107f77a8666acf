//! Runtime configuration.
//!
//! Loaded from an optional JSON file; every field has a default so a partial
//! file (or none at all) is valid.

use crate::error::Result;
use crate::models::StudyMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_DATABASE_PATH: &str = "act_prep.sqlite3";

/// Caps and thresholds for the weak-skill selector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeakSkillPolicy {
    /// Sections scoring below this fraction are considered weak.
    pub low_score_threshold: f64,
    /// A skill seen fewer times than this has too little practice data.
    pub sparse_seen_threshold: u32,
    pub clusters_per_section: usize,
    pub skills_per_cluster: usize,
    pub max_skills: usize,
}

impl Default for WeakSkillPolicy {
    fn default() -> Self {
        Self {
            low_score_threshold: 0.6,
            sparse_seen_threshold: 20,
            clusters_per_section: 2,
            skills_per_cluster: 2,
            max_skills: 5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub weak_skills: WeakSkillPolicy,
    pub default_study_mode: StudyMode,
    pub weak_area_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            weak_skills: WeakSkillPolicy::default(),
            default_study_mode: StudyMode::default(),
            weak_area_limit: 10,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// File config when a path is given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
