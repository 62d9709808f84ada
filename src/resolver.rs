//! Turns a context prompt into a legal move.
//!
//! The model gets one corrective retry when it answers with something outside the
//! vocabulary. A second invalid answer is masked with a random legal move so the caller
//! always receives something it can execute. Backend errors are not masked.

use crate::config::{ResolverConfig, SamplingConfig};
use crate::llm::{ChatMessage, DisabledClient, ModelClient, OpenAiCompatClient};
use crate::moves::MoveVocabulary;
use crate::prompts::{PromptBuilder, TemplatePromptBuilder};
use color_eyre::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt::{self, Display};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

/// How a resolved action was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    /// Offline mode, random pick without a model call.
    Bypass,
    FirstAttempt,
    /// Valid after the corrective retry.
    Corrected,
    /// Both answers were invalid; random pick.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Always a key of the vocabulary.
    pub action: String,
    pub source: ResolutionSource,
    pub model_calls: usize,
    /// Trimmed answers that were rejected, in call order.
    pub rejected: Vec<String>,
}

impl Resolution {
    pub fn is_random(&self) -> bool {
        matches!(self.source, ResolutionSource::Bypass | ResolutionSource::Fallback)
    }
}

impl Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} via {:?} (calls={})", self.action, self.source, self.model_calls)?;
        if !self.rejected.is_empty() {
            write!(f, " rejected={:?}", self.rejected)?;
        }
        Ok(())
    }
}

/// Action resolver over a model client `C`, prompt builder `P` and random source `R`.
pub struct ActionResolver<C, P = TemplatePromptBuilder, R = StdRng> {
    client: C,
    prompts: P,
    vocabulary: Arc<MoveVocabulary>,
    config: ResolverConfig,
    rng: R,
}

impl ActionResolver<Box<dyn ModelClient>> {
    /// Resolver configured from the process environment, using the cardinal moves.
    /// In offline mode no API key is required.
    pub fn from_env() -> Result<Self> {
        let config = ResolverConfig::from_env();
        let client: Box<dyn ModelClient> = if config.disable_llm {
            Box::new(DisabledClient)
        } else {
            Box::new(OpenAiCompatClient::for_provider(config.provider)?)
        };
        Ok(Self::with_defaults(client, Arc::new(MoveVocabulary::cardinal()), config))
    }
}

impl<C: ModelClient> ActionResolver<C> {
    /// Template prompts and an entropy-seeded random source.
    pub fn with_defaults(
        client: C,
        vocabulary: Arc<MoveVocabulary>,
        config: ResolverConfig,
    ) -> Self {
        let prompts = TemplatePromptBuilder::new(&vocabulary);
        Self::new(client, prompts, vocabulary, config, StdRng::from_entropy())
    }
}

impl<C, P, R> ActionResolver<C, P, R>
where
    C: ModelClient,
    P: PromptBuilder,
    R: Rng,
{
    pub fn new(
        client: C,
        prompts: P,
        vocabulary: Arc<MoveVocabulary>,
        config: ResolverConfig,
        rng: R,
    ) -> Self {
        Self { client, prompts, vocabulary, config, rng }
    }

    pub fn vocabulary(&self) -> &MoveVocabulary {
        &self.vocabulary
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve with explicit sampling parameters. Returns a vocabulary key, or the
    /// client's error if a model call fails.
    pub fn resolve(&mut self, context_prompt: &str, sampling: &SamplingConfig) -> Result<String> {
        self.resolve_detailed(context_prompt, sampling).map(|r| r.action)
    }

    /// Resolve with the sampling parameters from the resolver's config.
    pub fn resolve_default(&mut self, context_prompt: &str) -> Result<String> {
        let sampling = self.config.sampling.clone();
        self.resolve(context_prompt, &sampling)
    }

    /// Resolve a context prompt into a legal move, reporting how it was obtained.
    ///
    /// Offline mode picks a random move. Otherwise the model is asked once, and once
    /// more with a correction naming its invalid answer; two invalid answers end in a
    /// random move.
    ///
    /// # Arguments
    /// * `context_prompt` - description of the current situation
    /// * `sampling` - parameters forwarded unchanged to both model calls
    ///
    /// # Returns
    /// A [`Resolution`] whose `action` is a vocabulary key, or the client's error when a
    /// model call fails
    #[instrument(
        name = "resolve_action",
        skip(self, context_prompt, sampling),
        fields(model = %sampling.model_name, context_len = context_prompt.len())
    )]
    pub fn resolve_detailed(
        &mut self,
        context_prompt: &str,
        sampling: &SamplingConfig,
    ) -> Result<Resolution> {
        if self.config.disable_llm {
            let action = self.random_action();
            debug!(target: "resolver", action = %action, "model disabled, random move");
            return Ok(Resolution {
                action,
                source: ResolutionSource::Bypass,
                model_calls: 0,
                rejected: Vec::new(),
            });
        }

        let system_prompt = self.prompts.system_prompt();
        let main_prompt = self.prompts.main_prompt(context_prompt, None);

        let first = self.attempt(&system_prompt, main_prompt, sampling)?;
        if self.vocabulary.contains(&first) {
            return Ok(Resolution {
                action: first,
                source: ResolutionSource::FirstAttempt,
                model_calls: 1,
                rejected: Vec::new(),
            });
        }
        warn!(target: "resolver", "Invalid completion: {first}");

        let corrected_prompt = self.prompts.main_prompt(context_prompt, Some(&first));
        let second = self.attempt(&system_prompt, corrected_prompt, sampling)?;
        if self.vocabulary.contains(&second) {
            return Ok(Resolution {
                action: second,
                source: ResolutionSource::Corrected,
                model_calls: 2,
                rejected: vec![first],
            });
        }
        error!(target: "resolver", "Invalid completion: {second}");

        let action = self.random_action();
        info!(target: "resolver", action = %action, "falling back to random move");
        Ok(Resolution {
            action,
            source: ResolutionSource::Fallback,
            model_calls: 2,
            rejected: vec![first, second],
        })
    }

    /// One model call; returns the trimmed text.
    fn attempt(
        &self,
        system_prompt: &str,
        user_prompt: String,
        sampling: &SamplingConfig,
    ) -> Result<String> {
        let messages = [ChatMessage::system(system_prompt), ChatMessage::user(user_prompt)];
        let start = Instant::now();
        let raw = self.client.complete(&messages, sampling)?;
        let elapsed = start.elapsed().as_secs_f64();
        debug!(target: "resolver", "LLM call to {}: {:.3} s", sampling.model_name, elapsed);
        Ok(raw.trim().to_string())
    }

    fn random_action(&mut self) -> String {
        self.vocabulary.choose(&mut self.rng).to_string()
    }
}
