//! Answer-time review queue cadence.
//!
//! Every answered question moves its card along a fixed interval ladder that
//! depends on the study mode. A miss sends the card back to the first rung.

use super::ReviewCard;
use super::review_card::due_after;
use super::sm2::{MAX_EASE, MIN_EASE};
use crate::error::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MASTERY_LADDER: [u32; 4] = [1, 4, 10, 21];
const CRASH_LADDER: [u32; 3] = [0, 1, 3];

const CORRECT_EASE_BONUS: u32 = 10;
const LAPSE_EASE_PENALTY: u32 = 20;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StudyMode {
    /// Long-haul preparation: 1, 4, 10, 21 days.
    #[default]
    Mastery,
    /// Test is close: 0, 1, 3 days.
    Crash,
    /// Accelerated plan; shares the crash ladder.
    Accel,
}

impl StudyMode {
    fn ladder(self) -> &'static [u32] {
        match self {
            Self::Mastery => &MASTERY_LADDER,
            Self::Crash | Self::Accel => &CRASH_LADDER,
        }
    }
}

impl FromStr for StudyMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MASTERY" => Ok(Self::Mastery),
            "CRASH" => Ok(Self::Crash),
            "ACCEL" => Ok(Self::Accel),
            _ => Err(Error::InvalidStudyMode(s.trim().to_string())),
        }
    }
}

impl fmt::Display for StudyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Mastery => "MASTERY",
            Self::Crash => "CRASH",
            Self::Accel => "ACCEL",
        })
    }
}

/// Next rung on the mode's ladder. Lapses and off-ladder intervals restart
/// at the first rung; the top rung repeats.
pub fn next_interval(mode: StudyMode, prev_interval: u32, lapse: bool) -> u32 {
    let ladder = mode.ladder();
    let first = ladder[0];
    if lapse {
        return first;
    }
    match ladder.iter().position(|&rung| rung == prev_interval) {
        Some(idx) => ladder.get(idx + 1).copied().unwrap_or(ladder[ladder.len() - 1]),
        None => first,
    }
}

/// Updates (or creates) the card for an answered question.
pub fn apply_answer(
    existing: Option<&ReviewCard>,
    user_id: &str,
    question_id: &str,
    correct: bool,
    mode: StudyMode,
    now: DateTime<Utc>,
) -> ReviewCard {
    let current = existing
        .cloned()
        .unwrap_or_else(|| ReviewCard::new(user_id, question_id, now));

    let interval_days = next_interval(mode, current.interval_days, !correct);
    let (ease, lapses) = if correct {
        ((current.ease + CORRECT_EASE_BONUS).min(MAX_EASE), current.lapses)
    } else {
        (
            current.ease.saturating_sub(LAPSE_EASE_PENALTY).max(MIN_EASE),
            current.lapses.saturating_add(1),
        )
    };

    ReviewCard {
        due_at: due_after(now, interval_days),
        interval_days,
        ease,
        lapses,
        ..current
    }
}
