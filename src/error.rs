//! Error types for remote generation, configuration and the profile store.

use thiserror::Error;

/// Retry-relevant classification of a failed remote attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
  RateLimited,
  QuotaExceeded,
  Malformed,
  NetworkError,
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum GenerationError {
  #[error("rate limited: {0}")]
  RateLimited(String),
  #[error("quota exceeded: {0}")]
  QuotaExceeded(String),
  #[error("malformed model output: {0}")]
  Malformed(String),
  #[error("request failed: {0}")]
  Network(String),
}

impl GenerationError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      GenerationError::RateLimited(_) => ErrorKind::RateLimited,
      GenerationError::QuotaExceeded(_) => ErrorKind::QuotaExceeded,
      GenerationError::Malformed(_) => ErrorKind::Malformed,
      GenerationError::Network(_) => ErrorKind::NetworkError,
    }
  }

  /// Classify a provider error from its HTTP status (if any) and message.
  /// Quota wording is checked before rate wording.
  pub fn classify(status: Option<u16>, message: impl Into<String>) -> Self {
    let message = message.into();
    let lower = message.to_lowercase();
    if ["quota", "exceeded", "billing"].iter().any(|k| lower.contains(k)) {
      GenerationError::QuotaExceeded(message)
    } else if status == Some(429) || RATE_LIMIT_MARKERS.iter().any(|k| lower.contains(k)) {
      GenerationError::RateLimited(message)
    } else {
      GenerationError::Network(message)
    }
  }
}

const RATE_LIMIT_MARKERS: [&str; 4] = ["rate limit", "rate_limit", "ratelimit", "too many requests"];

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read {path}: {source}")]
  Read { path: String, #[source] source: std::io::Error },
  #[error("failed to parse {path}: {source}")]
  Parse { path: String, #[source] source: toml::de::Error },
}

#[derive(Debug, Error, PartialEq)]
pub enum ProfileError {
  #[error("profile not found: {0}")]
  NotFound(String),
  #[error("invalid profile: {0}")]
  Invalid(String),
}
