//! Skill catalog entries and the per-user signals used to plan study.
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub id: String,
    pub subject: String,
    /// Author-defined band; clusters appear in catalog order, easiest first.
    pub cluster: String,
    pub name: String,
}

/// Score for one ACT section, in [0, 1].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaselineDiagnostic {
    pub section: String,
    pub score: f64,
    pub source: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkillProgress {
    pub skill_id: String,
    pub seen: u32,
    pub mastery_level: u32,
    pub correct: u32,
}
