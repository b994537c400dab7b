//! Loading agent configuration (prompts, retry policy, extra question buckets) from TOML.
//!
//! See `AgentConfig` and `Prompts` for expected schema.

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::{MultipleChoiceQuestion, QuestionBucket};
use crate::error::ConfigError;
use crate::retry::RetryPolicy;

pub const DEFAULT_MAX_COUNT: u32 = 20;

#[derive(Clone, Debug, Deserialize)]
pub struct AgentConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub retry: RetryPolicy,
  #[serde(default = "default_max_count")]
  pub max_count: u32,
  #[serde(default)]
  pub buckets: Vec<BucketCfg>,
}

fn default_max_count() -> u32 { DEFAULT_MAX_COUNT }

impl Default for AgentConfig {
  fn default() -> Self {
    Self {
      prompts: Prompts::default(),
      retry: RetryPolicy::default(),
      max_count: DEFAULT_MAX_COUNT,
      buckets: Vec::new(),
    }
  }
}

/// Extra question bucket accepted in TOML configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct BucketCfg {
  pub subject: String,
  pub levels: Vec<i64>,
  #[serde(default)]
  pub items: Vec<MultipleChoiceQuestion>,
}

impl AgentConfig {
  /// Config buckets as (subject, bucket) pairs. Items that break the
  /// four-option/correct-answer rule are dropped with an error log.
  pub fn extra_buckets(&self) -> Vec<(String, QuestionBucket)> {
    self.buckets
      .iter()
      .map(|b| {
        let items = b.items
          .iter()
          .filter(|q| {
            let ok = q.is_well_formed();
            if !ok {
              error!(target: "question", subject = %b.subject, question = %q.question, "Skipping bank item: needs 4 options containing the correct answer.");
            }
            ok
          })
          .cloned()
          .collect();
        (b.subject.clone(), QuestionBucket { levels: b.levels.clone(), items })
      })
      .collect()
  }
}

/// Prompts used for remote generation. Placeholders: `{subject}`, `{difficulty}`,
/// `{game_type}`, `{grade}`, `{count}`, `{previous}`, `{format}`, `{custom}`.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub system_template: String,
  pub user_template: String,
  pub single_format: String,
  pub batch_format: String,
  pub word_format: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      system_template: "You are a question generator for an endless gamified learning platform. \
Questions must be unique, educational, engaging and scaled to the level.\n\n\
Subject: {subject}\nDifficulty Level: {difficulty} (scales from 1-20+ for endless gameplay)\n\
Game Type: {game_type}\nGrade Level: {grade}\nQuestions to Generate: {count}\n\
Previous Questions to AVOID: {previous}\n{custom}\n\
Levels 1-2 are elementary (Grade K-2), 9-10 high school, 13-15 college introductory, 20+ expert.\n\n\
CRITICAL: Return ONLY valid JSON in this format:\n{format}".into(),
      user_template: "Generate {count} unique Level {difficulty} {subject} question(s) for {game_type}. \
Make them progressively challenging and different from previous questions. \
Focus on grade {grade} appropriate content.".into(),
      single_format: "{\"question\": \"...\", \"options\": [\"A\", \"B\", \"C\", \"D\"], \"correct\": \"A\", \"explanation\": \"...\", \"difficulty\": {difficulty}, \"category\": \"...\"}".into(),
      batch_format: "{\"questions\": [{\"question\": \"...\", \"options\": [\"A\", \"B\", \"C\", \"D\"], \"correct\": \"A\", \"explanation\": \"...\", \"difficulty\": {difficulty}, \"category\": \"...\"}]}".into(),
      word_format: "{\"word\": \"EXAMPLE\", \"definition\": \"...\", \"category\": \"Animals, Science, etc\", \"difficulty\": {difficulty}}".into(),
    }
  }
}

pub fn load_agent_config(path: &str) -> Result<AgentConfig, ConfigError> {
  let raw = std::fs::read_to_string(path)
    .map_err(|source| ConfigError::Read { path: path.to_string(), source })?;
  toml::from_str::<AgentConfig>(&raw)
    .map_err(|source| ConfigError::Parse { path: path.to_string(), source })
}

/// Load from AGENT_CONFIG_PATH. Missing variable or any IO/parse error yields defaults.
pub fn load_agent_config_from_env() -> AgentConfig {
  let Ok(path) = std::env::var("AGENT_CONFIG_PATH") else {
    return AgentConfig::default();
  };
  match load_agent_config(&path) {
    Ok(cfg) => {
      info!(target: "questforge_backend", %path, buckets = cfg.buckets.len(), "Loaded agent config (TOML)");
      cfg
    }
    Err(e) => {
      error!(target: "questforge_backend", error = %e, "Failed to load agent config; using defaults");
      AgentConfig::default()
    }
  }
}
