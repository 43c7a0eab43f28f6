use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::cli::ProviderKind;
use crate::config::Config;

pub mod anthropic;
pub mod gemini;
pub mod ollama;
pub mod openai;
pub mod scripted;

pub use scripted::ScriptedProvider;

/// A text-generation service: one prompt in, free text out.
///
/// Calls are single request/response units; implementations do not retry.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

pub type DynProvider = Arc<dyn Provider>;

/// Extra time the HTTP client gets over the per-call bound, so that a hung
/// call is reported by the caller's timer as a timeout, not as a transport error.
const HTTP_GRACE: Duration = Duration::from_secs(5);

fn http_timeout(call_timeout_secs: u64) -> Duration {
    Duration::from_secs(call_timeout_secs) + HTTP_GRACE
}

pub fn make_provider(cfg: &Config) -> Result<DynProvider> {
    let timeout = http_timeout(cfg.timeout_secs);
    debug!(provider = ?cfg.provider, model = %cfg.model, "make_provider: called");
    match cfg.provider {
        ProviderKind::Gemini => Ok(Arc::new(gemini::Gemini::new(
            cfg.model.clone(),
            api_key("GOOGLE_API_KEY")?,
            cfg.api_base.clone().unwrap_or_else(|| gemini::DEFAULT_BASE.into()),
            cfg.temperature,
            timeout,
        )?)),
        ProviderKind::OpenAI => Ok(Arc::new(openai::OpenAIProvider::new(
            cfg.model.clone(),
            api_key("OPENAI_API_KEY")?,
            cfg.api_base.clone().unwrap_or_else(|| openai::DEFAULT_BASE.into()),
            cfg.temperature,
            timeout,
        )?)),
        ProviderKind::Anthropic => Ok(Arc::new(anthropic::Anthropic::new(
            cfg.model.clone(),
            api_key("ANTHROPIC_API_KEY")?,
            cfg.api_base.clone().unwrap_or_else(|| anthropic::DEFAULT_BASE.into()),
            timeout,
        )?)),
        ProviderKind::Ollama => Ok(Arc::new(ollama::Ollama::new(
            cfg.model.clone(),
            cfg.ollama_url.clone(),
            cfg.temperature,
            timeout,
        )?)),
    }
}

fn api_key(var: &str) -> Result<String> {
    std::env::var(var).map_err(|_| anyhow!("{var} env var is not set"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_client_outlives_the_call_bound() {
        assert!(http_timeout(120) > Duration::from_secs(120));
        assert_eq!(http_timeout(0), HTTP_GRACE);
    }

    #[test]
    fn ollama_needs_no_key() {
        let cfg = Config { provider: ProviderKind::Ollama, model: "llama3".into(), ..Config::default() };
        assert!(make_provider(&cfg).is_ok());
    }
}
