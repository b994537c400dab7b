//! Application state: the question resolver (static bank + optional remote
//! generator), the profile store and the shutdown token.
//!
//! Nothing on the question path is writable after startup, so handlers share
//! the resolver without locking.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use crate::bank::QuestionBank;
use crate::config::{load_agent_config_from_env, AgentConfig};
use crate::generator::TextGenerator;
use crate::openai::OpenAI;
use crate::profile::{InMemoryProfileStore, ProfileStore};
use crate::resolver::QuestionResolver;

#[derive(Clone)]
pub struct AppState {
    pub resolver: QuestionResolver,
    pub profiles: Arc<dyn ProfileStore>,
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Build state from env: load config, build the bank, init the OpenAI client.
    #[instrument(level = "info", skip_all)]
    pub fn from_env(shutdown: CancellationToken) -> Self {
        let cfg = load_agent_config_from_env();

        let generator: Option<Arc<dyn TextGenerator>> = match OpenAI::from_env() {
            Some(oa) => {
                info!(target: "questforge_backend", base_url = %oa.base_url, model = %oa.model, "OpenAI enabled.");
                Some(Arc::new(oa))
            }
            None => {
                info!(target: "questforge_backend", "OpenAI disabled (no OPENAI_API_KEY). Using local fallback questions.");
                None
            }
        };

        Self::new(&cfg, generator, Arc::new(InMemoryProfileStore::new()), shutdown)
    }

    pub fn new(
        cfg: &AgentConfig,
        generator: Option<Arc<dyn TextGenerator>>,
        profiles: Arc<dyn ProfileStore>,
        shutdown: CancellationToken,
    ) -> Self {
        let bank = Arc::new(QuestionBank::new(cfg.extra_buckets()));
        info!(
            target: "questforge_backend",
            max_attempts = cfg.retry.max_attempts,
            base_delay_ms = cfg.retry.base_delay_ms,
            max_count = cfg.max_count,
            "Question resolver configured"
        );
        Self {
            resolver: QuestionResolver::new(bank, generator, cfg),
            profiles,
            shutdown,
        }
    }
}
