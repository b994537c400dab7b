//! Learner profiles: the store contract, an in-memory store, and the progress rule
//! (XP, level, streak, achievements) applied after each completed activity.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::domain::DEFAULT_SUBJECT;
use crate::error::ProfileError;

pub const XP_PER_LEVEL: u64 = 250;
pub const STUDY_MINUTES_PER_ACTIVITY: u64 = 5;
pub const ACHIEVEMENT_LEVEL_UP: &str = "Level Up Master";
pub const ACHIEVEMENT_XP: &str = "XP Collector";
pub const ACHIEVEMENT_STREAK: &str = "Streak Champion";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
  pub id: String,
  pub name: String,
  pub email: String,
  pub grade: u8,
  #[serde(default)] pub xp: u64,
  #[serde(default = "first_level")] pub level: u64,
  #[serde(default)] pub streak: u64,
  #[serde(default)] pub avatar: String,
  #[serde(default)] pub achievements: Vec<String>,
  #[serde(default)] pub completed_lessons: Vec<String>,
  #[serde(default = "default_subject")] pub current_subject: String,
  /// Minutes.
  #[serde(default)] pub study_time: u64,
  #[serde(default = "Utc::now")] pub last_active: DateTime<Utc>,
}

fn first_level() -> u64 { 1 }
fn default_subject() -> String { DEFAULT_SUBJECT.into() }

impl UserProfile {
  pub fn new(id: String, name: String, email: String, grade: u8) -> Self {
    Self {
      id,
      name,
      email,
      grade,
      xp: 0,
      level: 1,
      streak: 0,
      avatar: "/student-avatar.png".into(),
      achievements: Vec::new(),
      completed_lessons: Vec::new(),
      current_subject: default_subject(),
      study_time: 0,
      last_active: Utc::now(),
    }
  }

  pub fn validate(&self) -> Result<(), ProfileError> {
    if self.id.trim().is_empty() {
      return Err(ProfileError::Invalid("id must not be empty".into()));
    }
    if self.name.trim().is_empty() {
      return Err(ProfileError::Invalid("name must not be empty".into()));
    }
    if !(1..=12).contains(&self.grade) {
      return Err(ProfileError::Invalid(format!("grade {} outside 1-12", self.grade)));
    }
    Ok(())
  }

  fn award(&mut self, achievement: &str) {
    if !self.achievements.iter().any(|a| a == achievement) {
      self.achievements.push(achievement.to_string());
    }
  }

  /// Record one completed activity.
  pub fn apply_progress(&mut self, update: &ProgressUpdate, now: DateTime<Utc>) {
    let xp = self.xp.saturating_add(update.xp_gained);
    let level = xp / XP_PER_LEVEL + 1;

    if let Some(lesson) = update.lesson_id.as_deref().filter(|l| !l.is_empty()) {
      if !self.completed_lessons.iter().any(|l| l == lesson) {
        self.completed_lessons.push(lesson.to_string());
      }
    }

    if level > self.level {
      self.award(ACHIEVEMENT_LEVEL_UP);
    }
    if xp >= 1000 {
      self.award(ACHIEVEMENT_XP);
    }
    // Judged on the streak before this activity.
    if self.streak >= 10 {
      self.award(ACHIEVEMENT_STREAK);
    }

    self.xp = xp;
    self.level = level;
    self.streak += 1;
    if let Some(subject) = update.subject.as_deref().filter(|s| !s.is_empty()) {
      self.current_subject = subject.to_string();
    }
    self.study_time += STUDY_MINUTES_PER_ACTIVITY;
    self.last_active = now;
  }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
  pub xp_gained: u64,
  #[serde(default)] pub lesson_id: Option<String>,
  #[serde(default)] pub subject: Option<String>,
}

/// In-place edit applied by [`ProfileStore::update`].
pub type ProfileEdit = Box<dyn FnOnce(&mut UserProfile) + Send>;

/// Profile persistence contract. The question resolver never touches it.
#[async_trait]
pub trait ProfileStore: Send + Sync {
  async fn get(&self, id: &str) -> Result<UserProfile, ProfileError>;
  async fn put(&self, profile: UserProfile) -> Result<(), ProfileError>;
  /// Read-modify-write of one profile. Concurrent updates to the same id are
  /// serialized; an edit that leaves the profile invalid is discarded.
  async fn update(&self, id: &str, edit: ProfileEdit) -> Result<UserProfile, ProfileError>;
}

#[derive(Clone, Default)]
pub struct InMemoryProfileStore {
  by_id: Arc<RwLock<HashMap<String, UserProfile>>>,
}

impl InMemoryProfileStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
  #[instrument(level = "debug", skip(self))]
  async fn get(&self, id: &str) -> Result<UserProfile, ProfileError> {
    self.by_id
      .read()
      .await
      .get(id)
      .cloned()
      .ok_or_else(|| ProfileError::NotFound(id.to_string()))
  }

  #[instrument(level = "debug", skip(self, profile), fields(id = %profile.id))]
  async fn put(&self, profile: UserProfile) -> Result<(), ProfileError> {
    profile.validate()?;
    debug!(target: "profile", id = %profile.id, xp = profile.xp, level = profile.level, "Profile stored");
    self.by_id.write().await.insert(profile.id.clone(), profile);
    Ok(())
  }

  #[instrument(level = "debug", skip(self, edit))]
  async fn update(&self, id: &str, edit: ProfileEdit) -> Result<UserProfile, ProfileError> {
    let mut by_id = self.by_id.write().await;
    let current = by_id.get_mut(id).ok_or_else(|| ProfileError::NotFound(id.to_string()))?;
    let mut next = current.clone();
    edit(&mut next);
    if next.id != id {
      return Err(ProfileError::Invalid(format!("edit changed id {} to {}", id, next.id)));
    }
    next.validate()?;
    *current = next.clone();
    debug!(target: "profile", %id, xp = next.xp, level = next.level, "Profile updated");
    Ok(next)
  }
}

/// Apply `update` to the stored profile. Returns the updated profile.
pub async fn record_progress(store: &dyn ProfileStore, id: &str, update: &ProgressUpdate) -> Result<UserProfile, ProfileError> {
  let update = update.clone();
  let now = Utc::now();
  store.update(id, Box::new(move |p| p.apply_progress(&update, now))).await
}
