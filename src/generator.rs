//! Remote generation seam and prompt construction.

use async_trait::async_trait;

use crate::config::Prompts;
use crate::domain::{ContentShape, QuestionRequest};
use crate::error::GenerationError;
use crate::util::fill_template;

/// Most recent previous questions embedded in the prompt.
pub const PREVIOUS_QUESTIONS_HINT: usize = 10;

/// Text-generation collaborator: system instruction + user prompt in, free text out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
  async fn generate(&self, system: &str, prompt: &str, max_tokens: u32) -> Result<String, GenerationError>;

  /// Short label for logs.
  fn name(&self) -> &str {
    "remote"
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationPrompt {
  pub system: String,
  pub user: String,
  pub max_tokens: u32,
}

/// Build the system/user prompt pair for `req`.
pub fn build_prompt(prompts: &Prompts, req: &QuestionRequest, shape: ContentShape, count: u32) -> GenerationPrompt {
  let difficulty = req.difficulty.to_string();
  let grade = req.grade.to_string();
  let count_s = count.to_string();

  let skip = req.previous_questions.len().saturating_sub(PREVIOUS_QUESTIONS_HINT);
  let recent = &req.previous_questions[skip..];
  let previous = if recent.is_empty() { "None".to_string() } else { recent.join(", ") };

  let format = match shape {
    ContentShape::Single => &prompts.single_format,
    ContentShape::Batch => &prompts.batch_format,
    ContentShape::Word => &prompts.word_format,
  };
  let custom = req
    .custom_prompt
    .as_deref()
    .filter(|c| !c.trim().is_empty())
    .map(|c| format!("CUSTOM INSTRUCTIONS: {c}"))
    .unwrap_or_default();

  let pairs: [(&str, &str); 8] = [
    ("format", format.as_str()),
    ("subject", req.subject.as_str()),
    ("difficulty", difficulty.as_str()),
    ("game_type", req.game_type.as_str()),
    ("grade", grade.as_str()),
    ("count", count_s.as_str()),
    ("previous", previous.as_str()),
    ("custom", custom.as_str()),
  ];

  let system = fill_template(&prompts.system_template, &pairs);
  let user = match req.custom_prompt.as_deref().filter(|c| !c.trim().is_empty()) {
    Some(c) => c.to_string(),
    None => fill_template(&prompts.user_template, &pairs),
  };
  let max_tokens = if count > 1 { 1000 } else { 500 };

  GenerationPrompt { system, user, max_tokens }
}
