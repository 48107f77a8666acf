//! Deterministic answer-choice shuffling.
//!
//! A question's four choices are permuted with Fisher-Yates. When a seed is
//! given, draws come from [`SeededRandom`], so the same (question, seed) pair
//! always renders the same order; without a seed the thread-local RNG is used.
//!
//! `choice_order[new_index]` is the original index of the choice shown at
//! `new_index`, which lets a clicked position be mapped back to its canonical
//! letter.

use super::{ChoiceLetter, Question};
use rand::Rng;
use rand::rngs::ThreadRng;
use serde::Serialize;
use tracing::warn;

const LCG_MULTIPLIER: i64 = 9301;
const LCG_INCREMENT: i64 = 49297;
const LCG_MODULUS: i64 = 233280;

/// String-seeded linear congruential generator.
///
/// The seed's UTF-16 code units are folded into a wrapping 32-bit hash
/// (`hash * 31 + unit`), which becomes the initial LCG state.
#[derive(Clone, Debug)]
pub struct SeededRandom {
    state: i64,
}

impl SeededRandom {
    pub fn new(seed: &str) -> Self {
        let hash = seed.encode_utf16().fold(0i32, |hash, unit| {
            hash.wrapping_shl(5)
                .wrapping_sub(hash)
                .wrapping_add(i32::from(unit))
        });
        Self {
            state: i64::from(hash),
        }
    }

    fn advance(&mut self) -> i64 {
        // Euclidean remainder keeps the state non-negative for negative hashes.
        self.state = (self.state * LCG_MULTIPLIER + LCG_INCREMENT).rem_euclid(LCG_MODULUS);
        self.state
    }

    /// Next draw in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        self.advance() as f64 / LCG_MODULUS as f64
    }

    /// `floor(draw * bound)` computed exactly in integers.
    pub fn next_index(&mut self, bound: usize) -> usize {
        let state = self.advance();
        (state * bound as i64 / LCG_MODULUS) as usize
    }
}

enum Draws {
    Seeded(SeededRandom),
    Thread(ThreadRng),
}

impl Draws {
    /// An empty seed counts as no seed.
    fn from_seed(seed: Option<&str>) -> Self {
        match seed.filter(|seed| !seed.is_empty()) {
            Some(seed) => Self::Seeded(SeededRandom::new(seed)),
            None => Self::Thread(rand::thread_rng()),
        }
    }

    fn next_index(&mut self, bound: usize) -> usize {
        match self {
            Self::Seeded(rng) => rng.next_index(bound),
            Self::Thread(rng) => rng.gen_range(0..bound),
        }
    }
}

fn fisher_yates<T>(items: &mut [T], draws: &mut Draws) {
    for i in (1..items.len()).rev() {
        let j = draws.next_index(i + 1);
        items.swap(i, j);
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ShuffledQuestion<'a> {
    pub original: &'a Question,
    pub choices: [&'a str; 4],
    pub correct_index: usize,
    pub choice_order: [usize; 4],
}

impl ShuffledQuestion<'_> {
    /// Canonical letter of the choice displayed at `selected_index`.
    pub fn letter_at(&self, selected_index: usize) -> Option<ChoiceLetter> {
        map_shuffled_index_to_letter(selected_index, &self.choice_order)
    }

    pub fn is_correct(&self, selected_index: usize) -> bool {
        is_shuffled_answer_correct(selected_index, self.correct_index)
    }
}

/// Per-user seed so a learner always sees the same order for a question.
pub fn choice_seed(user_id: &str, question_id: &str) -> String {
    format!("{user_id}-{question_id}")
}

/// Shuffles a question's choices and tracks where the correct answer lands.
///
/// A malformed answer key is logged and the choices come back unpermuted with
/// the correct index defaulted to 0.
pub fn shuffle_question_choices<'a>(
    question: &'a Question,
    seed: Option<&str>,
) -> ShuffledQuestion<'a> {
    let choices = [
        question.choices[0].as_str(),
        question.choices[1].as_str(),
        question.choices[2].as_str(),
        question.choices[3].as_str(),
    ];

    let Some(answer) = question.answer_letter() else {
        warn!(
            question_id = %question.id,
            answer = %question.answer,
            "invalid answer letter, returning choices unshuffled"
        );
        return ShuffledQuestion {
            original: question,
            choices,
            correct_index: 0,
            choice_order: [0, 1, 2, 3],
        };
    };

    let mut choice_order = [0, 1, 2, 3];
    fisher_yates(&mut choice_order, &mut Draws::from_seed(seed));

    let correct_index = choice_order
        .iter()
        .position(|&original| original == answer.index())
        .unwrap_or(0);

    ShuffledQuestion {
        original: question,
        choices: choice_order.map(|original| choices[original]),
        correct_index,
        choice_order,
    }
}

/// Shuffles the order of a list of items.
pub fn shuffle_questions<T: Clone>(items: &[T], seed: Option<&str>) -> Vec<T> {
    let mut shuffled = items.to_vec();
    fisher_yates(&mut shuffled, &mut Draws::from_seed(seed));
    shuffled
}

/// Shuffles every question's choices, seeding each with `"{prefix}-{index}"`.
pub fn shuffle_all_questions<'a>(
    questions: &'a [Question],
    seed_prefix: Option<&str>,
) -> Vec<ShuffledQuestion<'a>> {
    questions
        .iter()
        .enumerate()
        .map(|(idx, question)| {
            let seed = seed_prefix
                .filter(|prefix| !prefix.is_empty())
                .map(|prefix| format!("{prefix}-{idx}"));
            shuffle_question_choices(question, seed.as_deref())
        })
        .collect()
}

pub fn map_shuffled_index_to_letter(
    selected_index: usize,
    choice_order: &[usize],
) -> Option<ChoiceLetter> {
    choice_order
        .get(selected_index)
        .and_then(|&original| ChoiceLetter::from_index(original))
}

pub fn is_shuffled_answer_correct(selected_index: usize, correct_index: usize) -> bool {
    selected_index == correct_index
}
