//! Per (user, question) spaced-repetition state.
use super::sm2::DEFAULT_EASE;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewCard {
    pub user_id: String,
    pub question_id: String,
    pub due_at: DateTime<Utc>,
    pub interval_days: u32,
    /// Ease factor as a percentage, kept within [130, 300].
    pub ease: u32,
    pub lapses: u32,
}

impl ReviewCard {
    /// Fresh card, due immediately.
    pub fn new(user_id: &str, question_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            question_id: question_id.to_string(),
            due_at: now,
            interval_days: 0,
            ease: DEFAULT_EASE,
            lapses: 0,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.due_at <= now
    }
}

/// `now` plus whole days, saturating at the latest representable instant.
pub fn due_after(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    now.checked_add_signed(Duration::days(i64::from(days)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
