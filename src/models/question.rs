//! Question is a stem with four answer choices (A-D) and the author's answer key.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical answer letter of a four-choice question.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChoiceLetter {
    A,
    B,
    C,
    D,
}

impl ChoiceLetter {
    pub const ALL: [ChoiceLetter; 4] = [Self::A, Self::B, Self::C, Self::D];

    pub fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
            Self::C => 2,
            Self::D => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

impl FromStr for ChoiceLetter {
    type Err = ();

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            "C" => Ok(Self::C),
            "D" => Ok(Self::D),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ChoiceLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub section: String,
    #[serde(default)]
    pub skill_id: Option<String>,
    pub stem: String,
    pub choices: [String; 4],
    /// Raw answer key as authored. Content data may carry anything here.
    pub answer: String,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl Question {
    /// Parsed answer key, `None` when the authored value is not A-D.
    pub fn answer_letter(&self) -> Option<ChoiceLetter> {
        self.answer.parse().ok()
    }

    pub fn correct_choice(&self) -> Option<&str> {
        self.answer_letter()
            .map(|letter| self.choices[letter.index()].as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(answer: &str) -> Question {
        Question {
            id: "q1".to_string(),
            section: "math".to_string(),
            skill_id: Some("alg-1".to_string()),
            stem: "2 + 2 = ?".to_string(),
            choices: [
                "3".to_string(),
                "4".to_string(),
                "5".to_string(),
                "22".to_string(),
            ],
            answer: answer.to_string(),
            explanation: None,
        }
    }

    #[test]
    fn test_answer_letter_is_case_insensitive() {
        assert_eq!(sample("b").answer_letter(), Some(ChoiceLetter::B));
        assert_eq!(sample(" B ").answer_letter(), Some(ChoiceLetter::B));
        assert_eq!(sample("B").correct_choice(), Some("4"));
    }

    #[test]
    fn test_malformed_answer_letter() {
        assert_eq!(sample("Z").answer_letter(), None);
        assert_eq!(sample("").answer_letter(), None);
        assert_eq!(sample("AB").correct_choice(), None);
    }

    #[test]
    fn test_letter_index_mapping() {
        for (i, letter) in ChoiceLetter::ALL.iter().enumerate() {
            assert_eq!(letter.index(), i);
            assert_eq!(ChoiceLetter::from_index(i), Some(*letter));
        }
        assert_eq!(ChoiceLetter::from_index(4), None);
    }

    #[test]
    fn test_question_deserializes_without_optional_fields() {
        let json = r#"{
            "id": "q9",
            "section": "english",
            "stem": "Pick one",
            "choices": ["a", "b", "c", "d"],
            "answer": "D"
        }"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.skill_id, None);
        assert_eq!(q.correct_choice(), Some("d"));
    }
}
