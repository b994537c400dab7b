//! Bounded retry state machine for remote generation.
//!
//! The resolver feeds events in and acts on the returned state: call the model in
//! `Attempting(n)`, sleep `delay_for(n)` in `Backoff(n)`, serve local content in
//! `Fallback`, return the remote result in `Done`.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ErrorKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryState {
  Idle,
  Attempting(u32),
  Backoff(u32),
  Fallback,
  Done,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryEvent {
  Start,
  Succeeded,
  Failed(ErrorKind),
  BackoffElapsed,
}

/// Attempt cap and backoff base. Attempt `n` that fails with a retryable error
/// waits `base_delay * 2^(n-1)` before attempt `n + 1`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RetryPolicy {
  #[serde(default = "default_max_attempts")]
  pub max_attempts: u32,
  #[serde(default = "default_base_delay_ms")]
  pub base_delay_ms: u64,
}

fn default_max_attempts() -> u32 { 2 }
fn default_base_delay_ms() -> u64 { 1000 }

impl Default for RetryPolicy {
  fn default() -> Self {
    Self { max_attempts: default_max_attempts(), base_delay_ms: default_base_delay_ms() }
  }
}

impl RetryPolicy {
  pub fn delay_for(&self, attempt: u32) -> Duration {
    let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
    Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
  }

  fn is_retryable(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::RateLimited | ErrorKind::NetworkError)
  }

  pub fn transition(&self, state: RetryState, event: RetryEvent) -> RetryState {
    match (state, event) {
      (RetryState::Idle, RetryEvent::Start) => {
        if self.max_attempts == 0 { RetryState::Fallback } else { RetryState::Attempting(1) }
      }
      (RetryState::Attempting(_), RetryEvent::Succeeded) => RetryState::Done,
      (RetryState::Attempting(n), RetryEvent::Failed(kind)) => {
        if Self::is_retryable(kind) && n < self.max_attempts {
          RetryState::Backoff(n)
        } else {
          RetryState::Fallback
        }
      }
      (RetryState::Backoff(n), RetryEvent::BackoffElapsed) => RetryState::Attempting(n + 1),
      // Terminal states absorb everything; stray events fail closed.
      (RetryState::Done, _) => RetryState::Done,
      _ => RetryState::Fallback,
    }
  }
}
