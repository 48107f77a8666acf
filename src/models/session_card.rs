//! Wrapper for review cards that tracks progress within one review session.
use super::ReviewCard;

#[derive(Clone, Debug)]
pub struct SessionCard {
    pub card: ReviewCard,
    pub is_passed: bool,
}

impl SessionCard {
    pub fn new(card: ReviewCard) -> Self {
        Self {
            card,
            is_passed: false,
        }
    }

    pub fn mark_as_passed(&mut self) {
        self.is_passed = true;
    }
}
