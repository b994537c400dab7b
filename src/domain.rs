//! Domain models used by the backend: question requests, the two record kinds
//! (multiple choice and word scramble), the static bucket shape and the
//! resolved-content union returned to callers.

use serde::{Deserialize, Serialize};

pub const DEFAULT_SUBJECT: &str = "Mathematics";
pub const DEFAULT_GAME_TYPE: &str = "quiz-runner";
pub const DEFAULT_GRADE: i64 = 6;
pub const WORD_BUILDER: &str = "word-builder";

/// What the caller wants generated. Wire names follow the frontend (camelCase).
///
/// Every field has a default so a partial body still resolves; only a body that
/// is not JSON at all is treated as malformed.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRequest {
  #[serde(default = "default_subject")] pub subject: String,
  #[serde(default = "default_difficulty")] pub difficulty: i64,
  #[serde(default = "default_game_type")] pub game_type: String,
  #[serde(default = "default_grade")] pub grade: i64,
  #[serde(default = "default_count")] pub count: i64,
  #[serde(default)] pub previous_questions: Vec<String>,
  #[serde(default)] pub custom_prompt: Option<String>,
}

fn default_subject() -> String { DEFAULT_SUBJECT.into() }
fn default_difficulty() -> i64 { 1 }
fn default_game_type() -> String { DEFAULT_GAME_TYPE.into() }
fn default_grade() -> i64 { DEFAULT_GRADE }
fn default_count() -> i64 { 1 }

impl Default for QuestionRequest {
  fn default() -> Self {
    Self {
      subject: default_subject(),
      difficulty: default_difficulty(),
      game_type: default_game_type(),
      grade: default_grade(),
      count: default_count(),
      previous_questions: Vec::new(),
      custom_prompt: None,
    }
  }
}

impl QuestionRequest {
  pub fn is_word_builder(&self) -> bool {
    self.game_type == WORD_BUILDER
  }

  /// Requested count clamped into `1..=max`.
  pub fn effective_count(&self, max: u32) -> u32 {
    self.count.clamp(1, i64::from(max.max(1))) as u32
  }

  /// Which record shape this request must produce.
  pub fn expected_shape(&self, max: u32) -> ContentShape {
    if self.is_word_builder() {
      ContentShape::Word
    } else if self.effective_count(max) > 1 {
      ContentShape::Batch
    } else {
      ContentShape::Single
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentShape {
  Single,
  Batch,
  Word,
}

/// Four-option quiz question. `correct` must be one of `options`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MultipleChoiceQuestion {
  pub question: String,
  pub options: Vec<String>,
  pub correct: String,
  pub explanation: String,
  pub difficulty: i64,
  pub category: String,
}

impl MultipleChoiceQuestion {
  pub fn is_well_formed(&self) -> bool {
    !self.question.trim().is_empty()
      && self.options.len() == 4
      && self.options.iter().any(|o| o == &self.correct)
  }
}

/// Word-builder challenge: uppercase word plus its letters shuffled.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WordChallenge {
  pub word: String,
  pub definition: String,
  pub category: String,
  pub difficulty: i64,
  pub scrambled: String,
  pub hint: String,
}

/// Static group of questions answering for a set of difficulty levels.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct QuestionBucket {
  pub levels: Vec<i64>,
  pub items: Vec<MultipleChoiceQuestion>,
}

impl QuestionBucket {
  /// True when any level of the bucket is within 2 of `difficulty`.
  pub fn answers_for(&self, difficulty: i64) -> bool {
    self.levels.iter().any(|l| (l - difficulty).abs() <= 2)
  }

  /// True when `difficulty` is one of the bucket's own levels.
  pub fn covers(&self, difficulty: i64) -> bool {
    self.levels.contains(&difficulty)
  }
}

/// Static word entry; difficulty, scramble and hint are filled per request.
#[derive(Clone, Debug)]
pub struct WordEntry {
  pub word: &'static str,
  pub definition: &'static str,
  pub category: &'static str,
}

/// One of the three result shapes served to callers.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ResolvedContent {
  Single(MultipleChoiceQuestion),
  Batch { questions: Vec<MultipleChoiceQuestion> },
  Word(WordChallenge),
}

impl ResolvedContent {
  pub fn shape(&self) -> ContentShape {
    match self {
      ResolvedContent::Single(_) => ContentShape::Single,
      ResolvedContent::Batch { .. } => ContentShape::Batch,
      ResolvedContent::Word(_) => ContentShape::Word,
    }
  }
}

/// Where the served content came from (logging only).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentSource {
  Remote,
  Fallback,
}

impl ContentSource {
  pub fn as_str(&self) -> &'static str {
    match self {
      ContentSource::Remote => "remote_generated",
      ContentSource::Fallback => "local_fallback",
    }
  }
}
