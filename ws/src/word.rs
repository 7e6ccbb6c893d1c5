//! Word records and drafts

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Difficulty tag for a word
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: '{}' (expected easy, medium or hard)", other)),
        }
    }
}

/// A stored vocabulary word
///
/// The `id` is an opaque string, stable for the record's lifetime. The
/// review count only ever grows; `last_reviewed` is stamped whenever the
/// count is incremented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub id: String,
    pub word: String,
    pub meaning: String,
    pub example: Option<String>,
    pub difficulty: Difficulty,
    pub created_at: DateTime<Local>,
    pub last_reviewed: Option<DateTime<Local>>,
    pub review_count: u32,
    pub is_active: bool,
}

/// Draft for a word about to be created
///
/// The store assigns the id, creation timestamp and initial review count.
#[derive(Debug, Clone)]
pub struct NewWord {
    pub word: String,
    pub meaning: String,
    pub example: Option<String>,
    pub difficulty: Difficulty,
    pub is_active: bool,
}

impl NewWord {
    pub fn new(word: impl Into<String>, meaning: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            meaning: meaning.into(),
            example: None,
            difficulty: Difficulty::default(),
            is_active: true,
        }
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Materialize the draft into a full record
    pub fn into_word(self, id: String, created_at: DateTime<Local>) -> Word {
        Word {
            id,
            word: self.word,
            meaning: self.meaning,
            example: self.example,
            difficulty: self.difficulty,
            created_at,
            last_reviewed: None,
            review_count: 0,
            is_active: self.is_active,
        }
    }
}
