//! Resolver settings and sampling parameters

use crate::llm::Provider;
use tracing::debug;

/// Environment variable that switches the resolver into offline mode.
pub const DISABLE_LLM_VAR: &str = "DISABLE_LLM";
/// Only this exact value enables offline mode.
pub const DISABLE_LLM_SENTINEL: &str = "True";
pub const PROVIDER_VAR: &str = "LLM_PROVIDER";
pub const MODEL_VAR: &str = "LLM_MODEL";

/// Sampling parameters forwarded verbatim to the model client.
/// Ranges are not checked here; the backend rejects what it does not accept.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingConfig {
    /// Backend model name
    pub model_name: String,
    pub temperature: f32,
    /// Generation length cap
    pub max_tokens: u32,
    /// Nucleus-sampling cutoff
    pub top_p: f32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            model_name: "mistral-large-latest".to_string(),
            temperature: 0.1,
            max_tokens: 20,
            top_p: 1.0,
        }
    }
}

impl SamplingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = model_name.into();
        self
    }
}

/// Construction-time settings of an [`ActionResolver`](crate::ActionResolver).
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    /// Defaults used by `resolve_default`
    pub sampling: SamplingConfig,
    /// Skip the model entirely and pick a random legal move.
    pub disable_llm: bool,
    /// Backend used when the resolver builds its own client.
    pub provider: Provider,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            sampling: SamplingConfig::default(),
            disable_llm: false,
            provider: Provider::Mistral,
        }
    }
}

impl ResolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offline configuration: no model calls are made.
    pub fn offline() -> Self {
        Self { disable_llm: true, ..Self::default() }
    }

    /// Read `DISABLE_LLM`, `LLM_PROVIDER` and `LLM_MODEL` once.
    /// Unknown providers fall back to Mistral.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        cfg.disable_llm = lookup(DISABLE_LLM_VAR).as_deref() == Some(DISABLE_LLM_SENTINEL);
        if let Some(p) = lookup(PROVIDER_VAR) {
            cfg.provider = Provider::parse(&p).unwrap_or_else(|| {
                debug!(provider = %p, "unknown provider, using mistral");
                Provider::Mistral
            });
        }
        if let Some(model) = lookup(MODEL_VAR).filter(|m| !m.trim().is_empty()) {
            cfg.sampling.model_name = model;
        } else if cfg.provider == Provider::OpenAI {
            cfg.sampling.model_name = "gpt-4o-mini".to_string();
        }
        debug!(
            disable_llm = cfg.disable_llm,
            provider = ?cfg.provider,
            model = %cfg.sampling.model_name,
            "resolver config loaded"
        );
        cfg
    }
}
