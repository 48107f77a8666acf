//! SM-2 (SuperMemo 2) variant used for review cards.
//!
//! Ease is stored as an integer percentage and every formula is evaluated in
//! integer arithmetic, so `floor(interval * ease / 100)` and friends are exact:
//! - AGAIN: interval 1, ease -20, one more lapse
//! - HARD: interval max(1, floor(interval * 1.2)), ease -15
//! - GOOD: 0 -> 1, 1 -> 6, otherwise floor(interval * ease / 100)
//! - EASY: 0 -> 4, 1 -> 10, otherwise floor(interval * ease / 100 * 1.3), ease +15
//!
//! Ease always ends up within [130, 300] and the interval is at least one day.

use super::ReviewCard;
use super::review_card::due_after;
use crate::error::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

pub const MIN_EASE: u32 = 130;
pub const MAX_EASE: u32 = 300;
pub const DEFAULT_EASE: u32 = 250;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewGrade {
    Again,
    Hard,
    Good,
    Easy,
}

impl ReviewGrade {
    /// Maps an accuracy percentage onto a grade: <60 again, <80 hard, <90 good.
    pub fn from_accuracy(accuracy: f64) -> Self {
        if accuracy < 60.0 {
            Self::Again
        } else if accuracy < 80.0 {
            Self::Hard
        } else if accuracy < 90.0 {
            Self::Good
        } else {
            Self::Easy
        }
    }

    /// Same bands as [`ReviewGrade::from_accuracy`], without floating point.
    /// No attempts counts as a miss.
    pub fn from_score(correct: u32, total: u32) -> Self {
        if total == 0 {
            return Self::Again;
        }
        let scaled = u64::from(correct.min(total)) * 100;
        let total = u64::from(total);
        if scaled < 60 * total {
            Self::Again
        } else if scaled < 80 * total {
            Self::Hard
        } else if scaled < 90 * total {
            Self::Good
        } else {
            Self::Easy
        }
    }
}

impl FromStr for ReviewGrade {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "again" | "1" => Ok(Self::Again),
            "hard" | "2" => Ok(Self::Hard),
            "good" | "3" => Ok(Self::Good),
            "easy" | "4" => Ok(Self::Easy),
            _ => Err(Error::InvalidGrade(s.trim().to_string())),
        }
    }
}

impl fmt::Display for ReviewGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Again => "again",
            Self::Hard => "hard",
            Self::Good => "good",
            Self::Easy => "easy",
        })
    }
}

fn clamp_ease(ease: i64) -> u32 {
    ease.clamp(i64::from(MIN_EASE), i64::from(MAX_EASE)) as u32
}

fn to_days(days: u64) -> u32 {
    u32::try_from(days).unwrap_or(u32::MAX).max(1)
}

/// Calculates the card state after a review with the given grade.
pub fn calculate_next_review(
    card: &ReviewCard,
    grade: ReviewGrade,
    current_date: DateTime<Utc>,
) -> ReviewCard {
    let interval = u64::from(card.interval_days);
    let ease = i64::from(card.ease);
    let growth = u64::from(clamp_ease(ease));

    let (new_interval, new_ease, new_lapses) = match grade {
        ReviewGrade::Again => (1, clamp_ease(ease - 20), card.lapses.saturating_add(1)),
        ReviewGrade::Hard => (to_days(interval * 6 / 5), clamp_ease(ease - 15), card.lapses),
        ReviewGrade::Good => {
            let next = match interval {
                0 => 1,
                1 => 6,
                _ => to_days(interval * growth / 100),
            };
            (next, clamp_ease(ease), card.lapses)
        }
        ReviewGrade::Easy => {
            let next = match interval {
                0 => 4,
                1 => 10,
                _ => to_days(interval * growth * 13 / 1000),
            };
            (next, clamp_ease(ease + 15), card.lapses)
        }
    };

    debug!(
        user_id = %card.user_id,
        question_id = %card.question_id,
        %grade,
        from_interval = card.interval_days,
        to_interval = new_interval,
        ease = new_ease,
        "scheduled review"
    );

    ReviewCard {
        user_id: card.user_id.clone(),
        question_id: card.question_id.clone(),
        due_at: due_after(current_date, new_interval),
        interval_days: new_interval,
        ease: new_ease,
        lapses: new_lapses,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 10, 8, 0, 0).unwrap()
    }

    fn card(interval_days: u32, ease: u32, lapses: u32) -> ReviewCard {
        ReviewCard {
            user_id: "u1".to_string(),
            question_id: "q1".to_string(),
            due_at: now(),
            interval_days,
            ease,
            lapses,
        }
    }

    #[test]
    fn test_again_resets_interval() {
        let next = calculate_next_review(&card(10, 250, 0), ReviewGrade::Again, now());
        assert_eq!(next.interval_days, 1);
        assert_eq!(next.ease, 230);
        assert_eq!(next.lapses, 1);
        assert_eq!(next.due_at, now() + Duration::days(1));
    }

    #[test]
    fn test_hard_grows_slowly() {
        let next = calculate_next_review(&card(10, 250, 2), ReviewGrade::Hard, now());
        assert_eq!(next.interval_days, 12);
        assert_eq!(next.ease, 235);
        assert_eq!(next.lapses, 2);

        let next = calculate_next_review(&card(0, 250, 0), ReviewGrade::Hard, now());
        assert_eq!(next.interval_days, 1);
    }

    #[test]
    fn test_good_progression() {
        let first = calculate_next_review(&card(0, 250, 0), ReviewGrade::Good, now());
        assert_eq!(first.interval_days, 1);
        let second = calculate_next_review(&card(1, 250, 0), ReviewGrade::Good, now());
        assert_eq!(second.interval_days, 6);
        let third = calculate_next_review(&card(6, 250, 0), ReviewGrade::Good, now());
        assert_eq!(third.interval_days, 15);
        assert_eq!(third.ease, 250);
        assert_eq!(third.due_at, now() + Duration::days(15));
    }

    #[test]
    fn test_easy_progression() {
        assert_eq!(
            calculate_next_review(&card(0, 250, 0), ReviewGrade::Easy, now()).interval_days,
            4
        );
        assert_eq!(
            calculate_next_review(&card(1, 250, 0), ReviewGrade::Easy, now()).interval_days,
            10
        );
        // floor(6 * 2.5 * 1.3) = floor(19.5) = 19
        let next = calculate_next_review(&card(6, 250, 0), ReviewGrade::Easy, now());
        assert_eq!(next.interval_days, 19);
        assert_eq!(next.ease, 265);
    }

    #[test]
    fn test_ease_floor() {
        let mut current = card(3, 250, 0);
        for _ in 0..20 {
            current = calculate_next_review(&current, ReviewGrade::Again, now());
        }
        assert_eq!(current.ease, MIN_EASE);
        assert_eq!(current.interval_days, 1);
        assert_eq!(current.lapses, 20);
    }

    #[test]
    fn test_ease_ceiling() {
        let mut current = card(0, 250, 0);
        for _ in 0..10 {
            current = calculate_next_review(&current, ReviewGrade::Easy, now());
        }
        assert_eq!(current.ease, MAX_EASE);
    }

    #[test]
    fn test_grade_from_accuracy_bands() {
        assert_eq!(ReviewGrade::from_accuracy(59.9), ReviewGrade::Again);
        assert_eq!(ReviewGrade::from_accuracy(60.0), ReviewGrade::Hard);
        assert_eq!(ReviewGrade::from_accuracy(79.9), ReviewGrade::Hard);
        assert_eq!(ReviewGrade::from_accuracy(80.0), ReviewGrade::Good);
        assert_eq!(ReviewGrade::from_accuracy(89.9), ReviewGrade::Good);
        assert_eq!(ReviewGrade::from_accuracy(90.0), ReviewGrade::Easy);
    }

    #[test]
    fn test_grade_from_score() {
        assert_eq!(ReviewGrade::from_score(0, 0), ReviewGrade::Again);
        assert_eq!(ReviewGrade::from_score(3, 5), ReviewGrade::Hard);
        assert_eq!(ReviewGrade::from_score(4, 5), ReviewGrade::Good);
        assert_eq!(ReviewGrade::from_score(9, 10), ReviewGrade::Easy);
        assert_eq!(ReviewGrade::from_score(1, 2), ReviewGrade::Again);
    }

    #[test]
    fn test_grade_parsing() {
        assert_eq!("Good".parse::<ReviewGrade>().unwrap(), ReviewGrade::Good);
        assert_eq!("1".parse::<ReviewGrade>().unwrap(), ReviewGrade::Again);
        assert!("perfect".parse::<ReviewGrade>().is_err());
    }

    fn any_grade() -> impl Strategy<Value = ReviewGrade> {
        prop_oneof![
            Just(ReviewGrade::Again),
            Just(ReviewGrade::Hard),
            Just(ReviewGrade::Good),
            Just(ReviewGrade::Easy),
        ]
    }

    proptest! {
        #[test]
        fn prop_ease_bounded_and_interval_positive(
            interval in 0u32..10_000,
            ease in MIN_EASE..=MAX_EASE,
            lapses in 0u32..100,
            grades in proptest::collection::vec(any_grade(), 1..30),
        ) {
            let mut current = card(interval, ease, lapses);
            for grade in grades {
                current = calculate_next_review(&current, grade, now());
                prop_assert!((MIN_EASE..=MAX_EASE).contains(&current.ease));
                prop_assert!(current.interval_days >= 1);
            }
        }

        #[test]
        fn prop_again_pins_interval_and_counts_lapse(
            interval in 0u32..10_000,
            ease in MIN_EASE..=MAX_EASE,
            lapses in 0u32..1_000,
        ) {
            let next = calculate_next_review(&card(interval, ease, lapses), ReviewGrade::Again, now());
            prop_assert_eq!(next.interval_days, 1);
            prop_assert_eq!(next.lapses, lapses + 1);
        }
    }
}
