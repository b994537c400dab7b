//! Parsing of free-form model output into one of the known content shapes.
//!
//! The text is stripped of Markdown fences, decoded as JSON, then matched against
//! the shapes accepted for the expected format in a fixed order. Anything that
//! does not match fails closed with `GenerationError::Malformed`.

use serde::Deserialize;

use crate::domain::{ContentShape, MultipleChoiceQuestion, QuestionRequest, ResolvedContent, WordChallenge};
use crate::error::GenerationError;
use crate::util::{scramble, word_hint};

#[derive(Debug, Deserialize)]
struct RawQuestion {
  question: String,
  options: Vec<String>,
  correct: String,
  explanation: String,
  #[serde(default)] category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawBatch {
  questions: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawWord {
  word: String,
  definition: String,
  #[serde(default)] category: Option<String>,
}

/// Accepted payloads, in the order they are tried.
#[derive(Debug)]
enum RemotePayload {
  Question(RawQuestion),
  Batch(RawBatch),
  Word(RawWord),
}

/// Remove leading/trailing ```json / ``` markers around a payload.
pub fn strip_code_fences(text: &str) -> &str {
  let mut s = text.trim();
  if let Some(rest) = s.strip_prefix("```") {
    s = rest.strip_prefix("json").or_else(|| rest.strip_prefix("JSON")).unwrap_or(rest);
  }
  if let Some(rest) = s.trim_end().strip_suffix("```") {
    s = rest;
  }
  s.trim()
}

fn decode(value: &serde_json::Value, shape: ContentShape) -> Option<RemotePayload> {
  let order: &[ContentShape] = match shape {
    ContentShape::Single => &[ContentShape::Single],
    // A single object is accepted as a one-item batch.
    ContentShape::Batch => &[ContentShape::Batch, ContentShape::Single],
    ContentShape::Word => &[ContentShape::Word],
  };
  order.iter().find_map(|s| match s {
    ContentShape::Single => RawQuestion::deserialize(value).ok().map(RemotePayload::Question),
    ContentShape::Batch => RawBatch::deserialize(value).ok().map(RemotePayload::Batch),
    ContentShape::Word => RawWord::deserialize(value).ok().map(RemotePayload::Word),
  })
}

fn into_question(raw: RawQuestion, req: &QuestionRequest) -> Result<MultipleChoiceQuestion, GenerationError> {
  let q = MultipleChoiceQuestion {
    question: raw.question.trim().to_string(),
    options: raw.options.iter().map(|o| o.trim().to_string()).collect(),
    correct: raw.correct.trim().to_string(),
    explanation: raw.explanation.trim().to_string(),
    difficulty: req.difficulty,
    category: raw.category.filter(|c| !c.trim().is_empty()).unwrap_or_else(|| req.subject.clone()),
  };
  if q.explanation.is_empty() {
    return Err(GenerationError::Malformed("empty explanation".into()));
  }
  if q.options.len() != 4 {
    return Err(GenerationError::Malformed(format!("expected 4 options, got {}", q.options.len())));
  }
  if !q.is_well_formed() {
    return Err(GenerationError::Malformed("correct answer is not one of the options".into()));
  }
  Ok(q)
}

fn into_word<R: rand::Rng + ?Sized>(raw: RawWord, req: &QuestionRequest, rng: &mut R) -> Result<WordChallenge, GenerationError> {
  let word = raw.word.trim().to_uppercase();
  let definition = raw.definition.trim().to_string();
  if word.is_empty() || definition.is_empty() {
    return Err(GenerationError::Malformed("missing word or definition".into()));
  }
  if word.chars().count() < 3 || !word.chars().all(|c| c.is_ascii_uppercase()) {
    return Err(GenerationError::Malformed(format!("word '{word}' is not 3+ letters")));
  }
  let category = raw.category.filter(|c| !c.trim().is_empty()).unwrap_or_else(|| req.subject.clone());
  Ok(WordChallenge {
    scrambled: scramble(&word, rng),
    hint: word_hint(&category, &word),
    word,
    definition,
    category,
    difficulty: req.difficulty,
  })
}

/// Parse model text into content of the shape `req` expects.
pub fn parse_remote<R: rand::Rng + ?Sized>(
  text: &str,
  req: &QuestionRequest,
  shape: ContentShape,
  max_count: u32,
  rng: &mut R,
) -> Result<ResolvedContent, GenerationError> {
  let cleaned = strip_code_fences(text);
  let value: serde_json::Value = serde_json::from_str(cleaned)
    .map_err(|e| GenerationError::Malformed(format!("JSON parse error: {e}")))?;

  let payload = decode(&value, shape)
    .ok_or_else(|| GenerationError::Malformed(format!("no accepted {shape:?} shape matched")))?;

  match payload {
    RemotePayload::Question(raw) => {
      let q = into_question(raw, req)?;
      Ok(match shape {
        ContentShape::Batch => ResolvedContent::Batch { questions: vec![q] },
        _ => ResolvedContent::Single(q),
      })
    }
    RemotePayload::Batch(raw) => {
      let limit = req.effective_count(max_count) as usize;
      let questions: Vec<MultipleChoiceQuestion> = raw
        .questions
        .iter()
        .filter_map(|v| RawQuestion::deserialize(v).ok())
        .filter_map(|r| into_question(r, req).ok())
        .take(limit)
        .collect();
      if questions.is_empty() {
        return Err(GenerationError::Malformed("questions array has no valid items".into()));
      }
      Ok(ResolvedContent::Batch { questions })
    }
    RemotePayload::Word(raw) => Ok(ResolvedContent::Word(into_word(raw, req, rng)?)),
  }
}
