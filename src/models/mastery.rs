//! Mastery tiers and the weak-area report built from per-skill accuracy.
use super::Skill;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub const LEARNING_THRESHOLD: f64 = 60.0;
pub const PROFICIENT_THRESHOLD: f64 = 75.0;
pub const MASTERED_THRESHOLD: f64 = 90.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MasteryLevel {
    NotStarted,
    Beginner,
    Learning,
    Proficient,
    Mastered,
}

impl MasteryLevel {
    pub fn from_counts(correct: u32, total: u32) -> Self {
        if total == 0 {
            return Self::NotStarted;
        }
        Self::from_accuracy(accuracy(correct, total))
    }

    pub fn from_accuracy(accuracy: f64) -> Self {
        if accuracy >= MASTERED_THRESHOLD {
            Self::Mastered
        } else if accuracy >= PROFICIENT_THRESHOLD {
            Self::Proficient
        } else if accuracy >= LEARNING_THRESHOLD {
            Self::Learning
        } else {
            Self::Beginner
        }
    }

    /// Ordinal tier, 0 for not started up to 4 for mastered.
    pub fn tier(self) -> u32 {
        match self {
            Self::NotStarted => 0,
            Self::Beginner => 1,
            Self::Learning => 2,
            Self::Proficient => 3,
            Self::Mastered => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::Beginner => "Beginner",
            Self::Learning => "Learning",
            Self::Proficient => "Proficient",
            Self::Mastered => "Mastered",
        }
    }
}

/// Percentage in [0, 100]; zero attempts is 0.
pub fn accuracy(correct: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        f64::from(correct.min(total)) * 100.0 / f64::from(total)
    }
}

/// Attempt counts for one skill of one user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MasteryRecord {
    pub skill_id: String,
    pub correct: u32,
    pub total: u32,
}

impl MasteryRecord {
    pub fn accuracy(&self) -> f64 {
        accuracy(self.correct, self.total)
    }

    pub fn level(&self) -> MasteryLevel {
        MasteryLevel::from_counts(self.correct, self.total)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    Medium,
}

impl Priority {
    /// `None` for mastered skills, which are not weak areas.
    pub fn from_accuracy(accuracy: f64) -> Option<Self> {
        if accuracy >= MASTERED_THRESHOLD {
            None
        } else if accuracy < LEARNING_THRESHOLD {
            Some(Self::Critical)
        } else if accuracy < PROFICIENT_THRESHOLD {
            Some(Self::High)
        } else {
            Some(Self::Medium)
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Critical => "Needs Focus",
            Self::High => "Practice More",
            Self::Medium => "Almost There",
        }
    }

    fn time_share_percent(self) -> u32 {
        match self {
            Self::Critical => 50,
            Self::High => 30,
            Self::Medium => 20,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WeakArea {
    pub skill_id: String,
    pub skill_name: String,
    pub subject: String,
    pub accuracy: f64,
    pub total_attempts: u32,
    pub mastery_level: MasteryLevel,
    pub priority: Priority,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct WeakAreaStats {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub total: usize,
}

/// Attempted, not-yet-mastered skills, most urgent first.
///
/// Ordered by priority, then by ascending accuracy. Records whose skill is
/// missing from the catalog are skipped.
pub fn weak_areas(records: &[MasteryRecord], skills: &[Skill], limit: usize) -> Vec<WeakArea> {
    let mut areas: Vec<WeakArea> = records
        .iter()
        .filter(|record| record.total > 0)
        .filter_map(|record| {
            let accuracy = record.accuracy();
            let priority = Priority::from_accuracy(accuracy)?;
            let skill = skills.iter().find(|s| s.id == record.skill_id)?;
            Some(WeakArea {
                skill_id: skill.id.clone(),
                skill_name: skill.name.clone(),
                subject: skill.subject.clone(),
                accuracy,
                total_attempts: record.total,
                mastery_level: record.level(),
                priority,
            })
        })
        .collect();

    areas.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then_with(|| a.accuracy.partial_cmp(&b.accuracy).unwrap_or(Ordering::Equal))
    });
    areas.truncate(limit);
    areas
}

pub fn weak_area_stats(records: &[MasteryRecord]) -> WeakAreaStats {
    let mut stats = WeakAreaStats::default();
    for record in records.iter().filter(|r| r.total > 0) {
        match Priority::from_accuracy(record.accuracy()) {
            Some(Priority::Critical) => stats.critical += 1,
            Some(Priority::High) => stats.high += 1,
            Some(Priority::Medium) => stats.medium += 1,
            None => {}
        }
    }
    stats.total = stats.critical + stats.high + stats.medium;
    stats
}

/// Share of a study block to spend on an area of the given priority, rounded
/// to whole minutes.
pub fn recommended_minutes(priority: Priority, total_minutes: u32) -> u32 {
    let scaled = u64::from(total_minutes) * u64::from(priority.time_share_percent());
    ((scaled + 50) / 100) as u32
}
