//! HTTP endpoint handlers. These are thin wrappers that forward to the resolver
//! and the profile store. Each handler is instrumented and logs basic result info.

use std::sync::Arc;

use axum::{
  body::Bytes,
  extract::{Path, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use rand::{rngs::StdRng, SeedableRng};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::QuestionRequest;
use crate::error::ProfileError;
use crate::profile::{record_progress, ProgressUpdate, UserProfile};
use crate::protocol::*;
use crate::state::AppState;

impl IntoResponse for ProfileError {
  fn into_response(self) -> Response {
    let status = match &self {
      ProfileError::NotFound(_) => StatusCode::NOT_FOUND,
      ProfileError::Invalid(_) => StatusCode::BAD_REQUEST,
    };
    (status, Json(ErrorOut { error: self.to_string(), fallback: None })).into_response()
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut { ok: true, remote: state.resolver.remote_enabled() })
}

/// The body is parsed by hand so an unparseable body still gets default content.
#[instrument(level = "info", skip(state, body), fields(body_len = body.len()))]
pub async fn http_generate_question(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
  let mut rng = StdRng::from_entropy();
  let req = match serde_json::from_slice::<QuestionRequest>(&body) {
    Ok(req) => req,
    Err(e) => {
      warn!(target: "question", error = %e, "Malformed question request; serving default fallback");
      let fallback = state.resolver.fallback(&QuestionRequest::default(), &mut rng);
      let out = ErrorOut { error: format!("Invalid JSON: {}", e), fallback: Some(fallback) };
      return (StatusCode::BAD_REQUEST, Json(out)).into_response();
    }
  };

  let cancel = state.shutdown.child_token();
  match state.resolver.resolve(&req, &mut rng, &cancel).await {
    Some(res) => {
      info!(target: "question", subject = %req.subject, difficulty = req.difficulty, origin = res.source.as_str(), attempts = res.attempts, "HTTP question served");
      Json(res.content).into_response()
    }
    None => {
      let out = ErrorOut { error: "Server is shutting down".into(), fallback: None };
      (StatusCode::SERVICE_UNAVAILABLE, Json(out)).into_response()
    }
  }
}

#[instrument(level = "info", skip(state, body), fields(grade = body.grade))]
pub async fn http_register_profile(
  State(state): State<Arc<AppState>>,
  Json(body): Json<RegisterIn>,
) -> Result<impl IntoResponse, ProfileError> {
  let profile = UserProfile::new(Uuid::new_v4().to_string(), body.name, body.email, body.grade);
  state.profiles.put(profile.clone()).await?;
  info!(target: "profile", id = %profile.id, "Profile registered");
  Ok((StatusCode::CREATED, Json(profile)))
}

#[instrument(level = "info", skip(state), fields(%id))]
pub async fn http_get_profile(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<UserProfile>, ProfileError> {
  Ok(Json(state.profiles.get(&id).await?))
}

#[instrument(level = "info", skip(state, body), fields(%id))]
pub async fn http_put_profile(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<UserProfile>,
) -> Result<Json<UserProfile>, ProfileError> {
  if body.id != id {
    return Err(ProfileError::Invalid(format!("path id {} does not match body id {}", id, body.id)));
  }
  state.profiles.put(body.clone()).await?;
  Ok(Json(body))
}

#[instrument(level = "info", skip(state, body), fields(%id, xp_gained = body.xp_gained))]
pub async fn http_post_progress(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(body): Json<ProgressUpdate>,
) -> Result<Json<UserProfile>, ProfileError> {
  let profile = record_progress(state.profiles.as_ref(), &id, &body).await?;
  info!(target: "profile", %id, xp = profile.xp, level = profile.level, streak = profile.streak, "Progress recorded");
  Ok(Json(profile))
}
