//! Review session over due cards.
//! Handles multi-round review with the SM-2 scheduler; persistence is left to
//! the caller, which receives every updated card.

use super::sm2::{ReviewGrade, calculate_next_review};
use super::{ReviewCard, SessionCard};
use chrono::{DateTime, Utc};

/// Manages a review session with multiple rounds.
/// Cards graded AGAIN are repeated in subsequent rounds.
pub struct ReviewSession {
    pub all_cards: Vec<SessionCard>,
    pub current_round_cards: Vec<usize>,
    pub current_index: usize,
    pub round_number: usize,
}

impl ReviewSession {
    pub fn new_from_due_cards(cards: Vec<ReviewCard>) -> Self {
        let session_cards: Vec<_> = cards.into_iter().map(SessionCard::new).collect();
        let indices: Vec<usize> = (0..session_cards.len()).collect();

        Self {
            all_cards: session_cards,
            current_round_cards: indices,
            current_index: 0,
            round_number: 1,
        }
    }

    pub fn current_card(&self) -> Option<&SessionCard> {
        self.current_round_cards
            .get(self.current_index)
            .and_then(|&idx| self.all_cards.get(idx))
    }

    pub fn next_card(&mut self) {
        if self.current_index + 1 < self.current_round_cards.len() {
            self.current_index += 1;
        } else {
            self.start_next_round();
        }
    }

    /// Starts a new round with the cards graded AGAIN in this one.
    /// If none remain, the session is complete.
    fn start_next_round(&mut self) {
        let failed_indices: Vec<usize> = self
            .current_round_cards
            .iter()
            .copied()
            .filter(|&idx| {
                self.all_cards
                    .get(idx)
                    .map(|card| !card.is_passed)
                    .unwrap_or(false)
            })
            .collect();

        if !failed_indices.is_empty() {
            self.current_round_cards = failed_indices;
            self.current_index = 0;
            self.round_number += 1;
        }
    }

    /// Grades the current card and reschedules it with SM-2.
    ///
    /// Returns the updated card so the caller can persist it.
    pub fn grade_current_card(
        &mut self,
        grade: ReviewGrade,
        current_date: DateTime<Utc>,
    ) -> Option<ReviewCard> {
        let &actual_idx = self.current_round_cards.get(self.current_index)?;
        let session_card = self.all_cards.get_mut(actual_idx)?;

        if grade == ReviewGrade::Again {
            session_card.is_passed = false;
        } else {
            session_card.mark_as_passed();
        }

        let next = calculate_next_review(&session_card.card, grade, current_date);
        session_card.card = next.clone();
        Some(next)
    }

    pub fn passed_count(&self) -> usize {
        self.current_round_cards
            .iter()
            .filter(|&&idx| {
                self.all_cards
                    .get(idx)
                    .map(|card| card.is_passed)
                    .unwrap_or(false)
            })
            .count()
    }

    pub fn total_count(&self) -> usize {
        self.current_round_cards.len()
    }

    pub fn remaining_count(&self) -> usize {
        self.total_count() - self.passed_count()
    }

    /// True when every card of the current round has passed.
    pub fn is_completed(&self) -> bool {
        self.current_round_cards.is_empty() || self.passed_count() == self.total_count()
    }

    pub fn phase_message(&self) -> String {
        if self.round_number == 1 {
            format!("Round {}: {} cards", self.round_number, self.total_count())
        } else {
            format!(
                "Round {} (Review): {} cards to retry",
                self.round_number,
                self.total_count()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 2, 18, 0, 0).unwrap()
    }

    fn session(n: usize) -> ReviewSession {
        let cards = (0..n)
            .map(|i| ReviewCard::new("u1", &format!("q{i}"), now()))
            .collect();
        ReviewSession::new_from_due_cards(cards)
    }

    #[test]
    fn test_empty_session_is_completed() {
        let mut s = session(0);
        assert!(s.is_completed());
        assert!(s.current_card().is_none());
        s.next_card();
        assert!(s.grade_current_card(ReviewGrade::Good, now()).is_none());
    }

    #[test]
    fn test_all_good_finishes_in_one_round() {
        let mut s = session(3);
        assert_eq!(s.phase_message(), "Round 1: 3 cards");
        for _ in 0..3 {
            let updated = s.grade_current_card(ReviewGrade::Good, now()).unwrap();
            assert_eq!(updated.interval_days, 1);
            s.next_card();
        }
        assert!(s.is_completed());
        assert_eq!(s.round_number, 1);
        assert_eq!(s.remaining_count(), 0);
    }

    #[test]
    fn test_again_cards_repeat_next_round() {
        let mut s = session(3);
        s.grade_current_card(ReviewGrade::Good, now());
        s.next_card();
        s.grade_current_card(ReviewGrade::Again, now());
        s.next_card();
        s.grade_current_card(ReviewGrade::Easy, now());
        assert_eq!(s.remaining_count(), 1);
        s.next_card();

        assert_eq!(s.round_number, 2);
        assert_eq!(s.total_count(), 1);
        assert_eq!(s.phase_message(), "Round 2 (Review): 1 cards to retry");
        let current = s.current_card().unwrap();
        assert_eq!(current.card.question_id, "q1");
        assert_eq!(current.card.lapses, 1);

        let updated = s.grade_current_card(ReviewGrade::Hard, now()).unwrap();
        assert_eq!(updated.ease, 215);
        s.next_card();
        assert!(s.is_completed());
    }

    #[test]
    fn test_repeated_again_keeps_card_in_play() {
        let mut s = session(1);
        for round in 1..=3 {
            assert_eq!(s.round_number, round);
            s.grade_current_card(ReviewGrade::Again, now());
            s.next_card();
        }
        assert!(!s.is_completed());
        assert_eq!(s.current_card().unwrap().card.lapses, 3);
    }
}
