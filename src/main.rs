//! QuestForge · adaptive question backend
//!
//! - Axum HTTP API serving quiz questions and word-scramble challenges
//! - Optional OpenAI generation (via environment variables) with bounded retries
//! - Offline-safe fallback from static, difficulty-bucketed question banks
//! - In-memory learner profiles with XP/level progress
//!
//! Important env variables:
//!   PORT                : u16 (default 3000)
//!   OPENAI_API_KEY      : enables remote generation if present
//!   OPENAI_BASE_URL     : default "https://api.openai.com/v1"
//!   OPENAI_MODEL        : default "gpt-4o-mini"
//!   OPENAI_TIMEOUT_SECS : default 20
//!   AGENT_CONFIG_PATH   : path to TOML config (prompts, retry policy, extra buckets)
//!   LOG_LEVEL           : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT          : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod error;
mod config;
mod seeds;
mod bank;
mod retry;
mod parse;
mod generator;
mod openai;
mod resolver;
mod profile;
mod state;
mod protocol;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Cancelled on Ctrl-C; in-flight remote generations observe it.
  let shutdown = CancellationToken::new();
  let state = Arc::new(AppState::from_env(shutdown.clone()));

  let app = build_router(state);

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "questforge_backend", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(async move {
      if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(target: "questforge_backend", error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
      }
      info!(target: "questforge_backend", "Shutdown requested");
      shutdown.cancel();
    })
    .await?;
  Ok(())
}
