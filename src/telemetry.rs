//! Logging setup for the question service.
//!
//! Targets emitted by this crate:
//! - `question`           : resolver decisions, retry/backoff, fallback draws
//! - `profile`            : profile store writes and progress updates
//! - `questforge_backend` : boot, config loading, shutdown
//!
//! `LOG_LEVEL` takes a full EnvFilter directive and replaces [`DEFAULT_DIRECTIVES`].
//! `LOG_FORMAT=json` switches to one JSON object per event; anything else is the
//! human-readable format.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_DIRECTIVES: &str =
  "info,question=debug,profile=info,questforge_backend=debug,tower_http=info,axum=info";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
  Pretty,
  Json,
}

impl LogFormat {
  pub fn parse(value: Option<&str>) -> Self {
    match value.map(str::trim) {
      Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
      _ => LogFormat::Pretty,
    }
  }
}

fn filter_from(directives: Option<&str>) -> EnvFilter {
  directives
    .filter(|d| !d.trim().is_empty())
    .and_then(|d| EnvFilter::try_new(d).ok())
    .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVES))
}

pub fn init_tracing() {
  let directives = std::env::var("LOG_LEVEL").ok();
  let format = LogFormat::parse(std::env::var("LOG_FORMAT").ok().as_deref());

  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter_from(directives.as_deref()))
    .with_target(true)
    .with_file(true)
    .with_line_number(true);

  match format {
    LogFormat::Json => builder.json().init(),
    LogFormat::Pretty => builder.init(),
  }
}
