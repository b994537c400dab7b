//! Question resolution: remote generation with bounded retries, then local fallback.
//!
//! `resolve` never fails. Every remote problem (no credential, transport error,
//! rate limit, quota, unparseable output) ends in a schema-valid record from the
//! static bank. The only way to get no record is cancellation.

use std::sync::Arc;

use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::bank::QuestionBank;
use crate::config::{AgentConfig, Prompts};
use crate::domain::{ContentShape, ContentSource, QuestionRequest, ResolvedContent};
use crate::generator::{build_prompt, TextGenerator};
use crate::parse::parse_remote;
use crate::retry::{RetryEvent, RetryPolicy, RetryState};
use crate::util::trunc_for_log;

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
  pub content: ResolvedContent,
  pub source: ContentSource,
  /// Remote attempts made (0 when no generator is configured).
  pub attempts: u32,
}

enum RemoteOutcome {
  Generated(ResolvedContent, u32),
  Exhausted(u32),
  Cancelled,
}

#[derive(Clone)]
pub struct QuestionResolver {
  bank: Arc<QuestionBank>,
  generator: Option<Arc<dyn TextGenerator>>,
  prompts: Prompts,
  policy: RetryPolicy,
  max_count: u32,
}

impl QuestionResolver {
  pub fn new(bank: Arc<QuestionBank>, generator: Option<Arc<dyn TextGenerator>>, cfg: &AgentConfig) -> Self {
    Self {
      bank,
      generator,
      prompts: cfg.prompts.clone(),
      policy: cfg.retry.clone(),
      max_count: cfg.max_count.max(1),
    }
  }

  pub fn remote_enabled(&self) -> bool {
    self.generator.is_some()
  }

  /// Resolve `req` into content. Returns `None` only when `cancel` fires first.
  #[instrument(
    level = "info",
    skip(self, req, rng, cancel),
    fields(subject = %req.subject, difficulty = req.difficulty, game_type = %req.game_type, count = req.count)
  )]
  pub async fn resolve<R: Rng + Send + ?Sized>(
    &self,
    req: &QuestionRequest,
    rng: &mut R,
    cancel: &CancellationToken,
  ) -> Option<Resolution> {
    if cancel.is_cancelled() {
      return None;
    }

    let mut attempts = 0;
    if let Some(generator) = &self.generator {
      match self.try_remote(generator.as_ref(), req, rng, cancel).await {
        RemoteOutcome::Generated(content, n) => {
          info!(target: "question", source = ContentSource::Remote.as_str(), attempts = n, "Remote content served");
          return Some(Resolution { content, source: ContentSource::Remote, attempts: n });
        }
        RemoteOutcome::Cancelled => {
          info!(target: "question", "Request cancelled during remote generation");
          return None;
        }
        RemoteOutcome::Exhausted(n) => attempts = n,
      }
    } else {
      debug!(target: "question", "No remote generator configured; using local fallback");
    }

    let content = self.fallback(req, rng);
    info!(target: "question", source = ContentSource::Fallback.as_str(), attempts, shape = ?content.shape(), "Fallback content served");
    Some(Resolution { content, source: ContentSource::Fallback, attempts })
  }

  /// Local content for `req`, no remote call.
  pub fn fallback<R: Rng + ?Sized>(&self, req: &QuestionRequest, rng: &mut R) -> ResolvedContent {
    let level = req.difficulty.max(1);
    match req.expected_shape(self.max_count) {
      ContentShape::Word => {
        let mut word = self.bank.fallback_word(level, rng);
        word.difficulty = req.difficulty;
        ResolvedContent::Word(word)
      }
      _ => {
        let count = req.effective_count(self.max_count);
        let mut content = self.bank.fallback_questions(&req.subject, level, count, rng);
        echo_difficulty(&mut content, req.difficulty);
        content
      }
    }
  }

  async fn try_remote<R: Rng + Send + ?Sized>(
    &self,
    generator: &dyn TextGenerator,
    req: &QuestionRequest,
    rng: &mut R,
    cancel: &CancellationToken,
  ) -> RemoteOutcome {
    let shape = req.expected_shape(self.max_count);
    let count = req.effective_count(self.max_count);
    let prompt = build_prompt(&self.prompts, req, shape, count);

    let mut state = self.policy.transition(RetryState::Idle, RetryEvent::Start);
    let mut attempts = 0;
    let mut produced = None;

    loop {
      match state {
        RetryState::Attempting(n) => {
          attempts = n;
          let result = tokio::select! {
            _ = cancel.cancelled() => return RemoteOutcome::Cancelled,
            r = generator.generate(&prompt.system, &prompt.user, prompt.max_tokens) => r,
          };
          match result.and_then(|text| {
            debug!(target: "question", attempt = n, preview = %trunc_for_log(&text, 80), "Remote text received");
            parse_remote(&text, req, shape, self.max_count, &mut *rng)
          }) {
            Ok(content) => {
              produced = Some(content);
              state = self.policy.transition(state, RetryEvent::Succeeded);
            }
            Err(e) => {
              warn!(target: "question", attempt = n, max_attempts = self.policy.max_attempts, generator = generator.name(), kind = ?e.kind(), error = %e, "Remote generation attempt failed");
              state = self.policy.transition(state, RetryEvent::Failed(e.kind()));
            }
          }
        }
        RetryState::Backoff(n) => {
          let delay = self.policy.delay_for(n);
          info!(target: "question", attempt = n, delay_ms = delay.as_millis() as u64, "Backing off before retry");
          tokio::select! {
            _ = cancel.cancelled() => return RemoteOutcome::Cancelled,
            _ = tokio::time::sleep(delay) => {}
          }
          state = self.policy.transition(state, RetryEvent::BackoffElapsed);
        }
        RetryState::Done => {
          return match produced.take() {
            Some(content) => RemoteOutcome::Generated(content, attempts),
            None => RemoteOutcome::Exhausted(attempts),
          };
        }
        RetryState::Fallback | RetryState::Idle => return RemoteOutcome::Exhausted(attempts),
      }
    }
  }
}

fn echo_difficulty(content: &mut ResolvedContent, difficulty: i64) {
  match content {
    ResolvedContent::Single(q) => q.difficulty = difficulty,
    ResolvedContent::Batch { questions } => questions.iter_mut().for_each(|q| q.difficulty = difficulty),
    ResolvedContent::Word(w) => w.difficulty = difficulty,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::GenerationError;
  use async_trait::async_trait;
  use rand::{rngs::StdRng, SeedableRng};
  use std::collections::VecDeque;
  use std::sync::Mutex;
  use std::time::Duration;
  use tokio::time::Instant;

  /// Replays scripted responses and records when each call happened.
  struct ScriptedGenerator {
    script: Mutex<VecDeque<Result<String, GenerationError>>>,
    calls: Mutex<Vec<Instant>>,
  }

  impl ScriptedGenerator {
    fn new(script: Vec<Result<String, GenerationError>>) -> Arc<Self> {
      Arc::new(Self { script: Mutex::new(script.into()), calls: Mutex::new(vec![]) })
    }

    fn call_times(&self) -> Vec<Instant> {
      self.calls.lock().unwrap().clone()
    }
  }

  #[async_trait]
  impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, _system: &str, _prompt: &str, _max_tokens: u32) -> Result<String, GenerationError> {
      self.calls.lock().unwrap().push(Instant::now());
      self.script
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Err(GenerationError::Network("script exhausted".into())))
    }
  }

  /// Never answers; used for cancellation.
  struct HangingGenerator;

  #[async_trait]
  impl TextGenerator for HangingGenerator {
    async fn generate(&self, _system: &str, _prompt: &str, _max_tokens: u32) -> Result<String, GenerationError> {
      std::future::pending().await
    }
  }

  fn resolver(generator: Option<Arc<dyn TextGenerator>>, cfg: AgentConfig) -> QuestionResolver {
    QuestionResolver::new(Arc::new(QuestionBank::default()), generator, &cfg)
  }

  fn rate_limited() -> Result<String, GenerationError> {
    Err(GenerationError::classify(Some(429), "Rate limit reached"))
  }

  const GOOD_QUESTION: &str = r#"```json
{"question":"What is 12 ÷ 3?","options":["4","3","5","6"],"correct":"4","explanation":"12 ÷ 3 = 4","difficulty":4,"category":"Division"}
```"#;

  #[tokio::test]
  async fn no_generator_serves_fallback() {
    let r = resolver(None, AgentConfig::default());
    let req = QuestionRequest { difficulty: 4, ..Default::default() };
    let out = r.resolve(&req, &mut StdRng::seed_from_u64(1), &CancellationToken::new()).await.unwrap();
    assert_eq!(out.source, ContentSource::Fallback);
    assert_eq!(out.attempts, 0);
    match out.content {
      ResolvedContent::Single(q) => assert!(q.category == "Multiplication" || q.category == "Division"),
      other => panic!("unexpected {other:?}"),
    }
  }

  #[tokio::test]
  async fn remote_success_is_returned() {
    let g = ScriptedGenerator::new(vec![Ok(GOOD_QUESTION.into())]);
    let r = resolver(Some(g.clone()), AgentConfig::default());
    let req = QuestionRequest { difficulty: 4, ..Default::default() };
    let out = r.resolve(&req, &mut StdRng::seed_from_u64(1), &CancellationToken::new()).await.unwrap();
    assert_eq!(out.source, ContentSource::Remote);
    assert_eq!(out.attempts, 1);
    match out.content {
      ResolvedContent::Single(q) => assert_eq!(q.correct, "4"),
      other => panic!("unexpected {other:?}"),
    }
  }

  #[tokio::test(start_paused = true)]
  async fn rate_limited_twice_waits_once_then_falls_back() {
    let g = ScriptedGenerator::new(vec![rate_limited(), rate_limited(), Ok(GOOD_QUESTION.into())]);
    let r = resolver(Some(g.clone()), AgentConfig::default());
    let out = r.resolve(&QuestionRequest::default(), &mut StdRng::seed_from_u64(1), &CancellationToken::new()).await.unwrap();

    assert_eq!(out.source, ContentSource::Fallback);
    assert_eq!(out.attempts, 2);
    let calls = g.call_times();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1] - calls[0], Duration::from_secs(1));
  }

  #[tokio::test(start_paused = true)]
  async fn backoff_grows_between_attempts() {
    let cfg = AgentConfig { retry: RetryPolicy { max_attempts: 3, base_delay_ms: 1000 }, ..Default::default() };
    let g = ScriptedGenerator::new(vec![rate_limited(), rate_limited(), rate_limited()]);
    let r = resolver(Some(g.clone()), cfg);
    let out = r.resolve(&QuestionRequest::default(), &mut StdRng::seed_from_u64(1), &CancellationToken::new()).await.unwrap();

    assert_eq!(out.source, ContentSource::Fallback);
    let calls = g.call_times();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[1] - calls[0], Duration::from_secs(1));
    assert_eq!(calls[2] - calls[1], Duration::from_secs(2));
  }

  #[tokio::test(start_paused = true)]
  async fn retry_after_rate_limit_can_succeed() {
    let g = ScriptedGenerator::new(vec![rate_limited(), Ok(GOOD_QUESTION.into())]);
    let r = resolver(Some(g.clone()), AgentConfig::default());
    let out = r.resolve(&QuestionRequest::default(), &mut StdRng::seed_from_u64(1), &CancellationToken::new()).await.unwrap();
    assert_eq!(out.source, ContentSource::Remote);
    assert_eq!(out.attempts, 2);
  }

  #[tokio::test]
  async fn quota_stops_after_one_attempt() {
    let g = ScriptedGenerator::new(vec![
      Err(GenerationError::classify(Some(429), "You exceeded your current quota")),
      Ok(GOOD_QUESTION.into()),
    ]);
    let r = resolver(Some(g.clone()), AgentConfig::default());
    let out = r.resolve(&QuestionRequest::default(), &mut StdRng::seed_from_u64(1), &CancellationToken::new()).await.unwrap();
    assert_eq!(out.source, ContentSource::Fallback);
    assert_eq!(g.call_times().len(), 1);
  }

  #[tokio::test]
  async fn malformed_output_falls_back_without_retry() {
    let g = ScriptedGenerator::new(vec![Ok("I cannot help with that".into()), Ok(GOOD_QUESTION.into())]);
    let r = resolver(Some(g.clone()), AgentConfig::default());
    let out = r.resolve(&QuestionRequest::default(), &mut StdRng::seed_from_u64(1), &CancellationToken::new()).await.unwrap();
    assert_eq!(out.source, ContentSource::Fallback);
    assert_eq!(out.attempts, 1);
    assert_eq!(g.call_times().len(), 1);
  }

  #[tokio::test]
  async fn word_builder_falls_back_to_word_shape() {
    let g = ScriptedGenerator::new(vec![Ok(GOOD_QUESTION.into())]);
    let r = resolver(Some(g.clone()), AgentConfig::default());
    let req = QuestionRequest { game_type: "word-builder".into(), difficulty: 1, grade: 1, ..Default::default() };
    let out = r.resolve(&req, &mut StdRng::seed_from_u64(2), &CancellationToken::new()).await.unwrap();
    assert_eq!(out.source, ContentSource::Fallback);
    match out.content {
      ResolvedContent::Word(w) => {
        assert!((3..=4).contains(&w.word.len()));
        assert!(["Animals", "Nature", "Objects"].contains(&w.category.as_str()));
      }
      other => panic!("unexpected {other:?}"),
    }
  }

  #[tokio::test]
  async fn fallback_shape_is_stable() {
    let r = resolver(None, AgentConfig::default());
    let cancel = CancellationToken::new();
    let mut rng = StdRng::seed_from_u64(99);
    for (req, shape) in [
      (QuestionRequest { count: 1, ..Default::default() }, ContentShape::Single),
      (QuestionRequest { count: 3, subject: "History".into(), ..Default::default() }, ContentShape::Batch),
      (QuestionRequest { game_type: "word-builder".into(), count: 3, ..Default::default() }, ContentShape::Word),
    ] {
      for _ in 0..10 {
        let out = r.resolve(&req, &mut rng, &cancel).await.unwrap();
        assert_eq!(out.content.shape(), shape);
      }
    }
  }

  #[tokio::test]
  async fn any_difficulty_terminates_with_valid_records() {
    let r = resolver(None, AgentConfig::default());
    let cancel = CancellationToken::new();
    let mut rng = StdRng::seed_from_u64(5);
    for subject in ["Mathematics", "Science", "History", "English", "Latin"] {
      for difficulty in [-3, 0, 1, 5, 9, 14, 25, 1000] {
        let req = QuestionRequest { subject: subject.into(), difficulty, count: 2, ..Default::default() };
        match r.resolve(&req, &mut rng, &cancel).await.unwrap().content {
          ResolvedContent::Batch { questions } => {
            assert!(!questions.is_empty());
            for q in questions {
              assert!(q.is_well_formed());
              assert_eq!(q.difficulty, difficulty);
            }
          }
          other => panic!("unexpected {other:?}"),
        }
      }
    }
  }

  #[tokio::test]
  async fn latin_uses_mathematics() {
    let r = resolver(None, AgentConfig::default());
    let req = QuestionRequest { subject: "Latin".into(), difficulty: 4, ..Default::default() };
    let out = r.resolve(&req, &mut StdRng::seed_from_u64(3), &CancellationToken::new()).await.unwrap();
    match out.content {
      ResolvedContent::Single(q) => assert!(q.category == "Multiplication" || q.category == "Division"),
      other => panic!("unexpected {other:?}"),
    }
  }

  #[tokio::test]
  async fn cancellation_abandons_remote_call() {
    let r = resolver(Some(Arc::new(HangingGenerator)), AgentConfig::default());
    let cancel = CancellationToken::new();
    let child = cancel.clone();
    let task = tokio::spawn(async move {
      let mut rng = StdRng::seed_from_u64(1);
      r.resolve(&QuestionRequest::default(), &mut rng, &child).await
    });
    cancel.cancel();
    assert_eq!(task.await.unwrap(), None);
  }

  #[tokio::test(start_paused = true)]
  async fn cancellation_during_backoff() {
    let g = ScriptedGenerator::new(vec![rate_limited(), Ok(GOOD_QUESTION.into())]);
    let r = resolver(Some(g.clone()), AgentConfig::default());
    let cancel = CancellationToken::new();
    let child = cancel.clone();
    let task = tokio::spawn(async move {
      let mut rng = StdRng::seed_from_u64(1);
      r.resolve(&QuestionRequest::default(), &mut rng, &child).await
    });
    tokio::time::sleep(Duration::from_millis(500)).await;
    cancel.cancel();
    assert_eq!(task.await.unwrap(), None);
    assert_eq!(g.call_times().len(), 1);
  }
}
