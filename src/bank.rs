//! Static question bank and the local fallback generators.
//!
//! The bank is built once at startup (built-in seeds plus any buckets from the
//! TOML config) and is read-only afterwards.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use crate::domain::{MultipleChoiceQuestion, QuestionBucket, ResolvedContent, WordChallenge, DEFAULT_SUBJECT};
use crate::seeds::{seed_question_buckets, universal_fallback_question, word_list_for};
use crate::util::{scramble, word_hint};

#[derive(Clone, Debug)]
pub struct QuestionBank {
  by_subject: HashMap<String, Vec<QuestionBucket>>,
}

impl QuestionBank {
  /// Built-in buckets followed by `extra` buckets (per subject, appended in order).
  pub fn new(extra: Vec<(String, QuestionBucket)>) -> Self {
    let mut by_subject = seed_question_buckets();
    for (subject, bucket) in extra {
      by_subject.entry(subject).or_default().push(bucket);
    }
    for (subject, buckets) in &by_subject {
      let items: usize = buckets.iter().map(|b| b.items.len()).sum();
      info!(target: "question", %subject, buckets = buckets.len(), items, "Question bank inventory");
    }
    Self { by_subject }
  }

  /// Buckets for `subject`; unknown subjects use Mathematics.
  pub fn buckets_for(&self, subject: &str) -> &[QuestionBucket] {
    self.by_subject
      .get(subject)
      .or_else(|| self.by_subject.get(DEFAULT_SUBJECT))
      .map(Vec::as_slice)
      .unwrap_or(&[])
  }

  /// Bucket for `difficulty`, in order of preference: the first bucket listing
  /// that exact level, the first bucket (table order) within distance 2, the
  /// subject's first bucket.
  pub fn select_bucket(&self, subject: &str, difficulty: i64) -> Option<&QuestionBucket> {
    let buckets = self.buckets_for(subject);
    buckets
      .iter()
      .find(|b| b.covers(difficulty))
      .or_else(|| buckets.iter().find(|b| b.answers_for(difficulty)))
      .or_else(|| buckets.first())
  }

  /// Draw up to `count` distinct questions for `subject`/`difficulty`.
  pub fn draw<R: Rng + ?Sized>(&self, subject: &str, difficulty: i64, count: usize, rng: &mut R) -> Vec<MultipleChoiceQuestion> {
    let Some(bucket) = self.select_bucket(subject, difficulty) else {
      return Vec::new();
    };
    let mut pool: Vec<&MultipleChoiceQuestion> = bucket.items.iter().collect();
    let mut drawn = Vec::with_capacity(count.min(pool.len()));
    while drawn.len() < count && !pool.is_empty() {
      let idx = rng.gen_range(0..pool.len());
      let mut q = pool.swap_remove(idx).clone();
      q.difficulty = difficulty;
      drawn.push(q);
    }
    debug!(target: "question", %subject, difficulty, requested = count, served = drawn.len(), "Drew fallback questions");
    drawn
  }

  /// Multiple-choice fallback: a single record for `count == 1`, a batch otherwise.
  pub fn fallback_questions<R: Rng + ?Sized>(&self, subject: &str, difficulty: i64, count: u32, rng: &mut R) -> ResolvedContent {
    let mut questions = self.draw(subject, difficulty, count as usize, rng);
    if count > 1 {
      return ResolvedContent::Batch { questions };
    }
    match questions.pop() {
      Some(q) => ResolvedContent::Single(q),
      None => ResolvedContent::Single(universal_fallback_question(difficulty)),
    }
  }

  /// Word-builder fallback from the difficulty's word list.
  pub fn fallback_word<R: Rng + ?Sized>(&self, difficulty: i64, rng: &mut R) -> WordChallenge {
    let list = word_list_for(difficulty);
    let entry = list.choose(rng).unwrap_or(&list[0]);
    WordChallenge {
      word: entry.word.to_string(),
      definition: entry.definition.to_string(),
      category: entry.category.to_string(),
      difficulty,
      scrambled: scramble(entry.word, rng),
      hint: word_hint(entry.category, entry.word),
    }
  }
}

impl Default for QuestionBank {
  fn default() -> Self {
    Self::new(Vec::new())
  }
}
