//! Blocking client for OpenAI-compatible chat-completion endpoints.

use crate::config::SamplingConfig;
use crate::llm::messages::ChatMessage;
use crate::llm::request::build_chat_request;
use crate::llm::{ModelClient, Provider};
use async_openai::config::OpenAIConfig;
use async_openai::Client;
use color_eyre::{eyre::eyre, Result};
use tokio::runtime::Runtime;
use tracing::{debug, info, instrument};

/// Owns a private tokio runtime and drives each request to completion.
/// Must not be called from inside another tokio runtime.
pub struct OpenAiCompatClient {
    client: Client<OpenAIConfig>,
    runtime: Runtime,
    provider: Provider,
}

impl OpenAiCompatClient {
    /// Build a client for `provider`, reading its API key from the environment.
    ///
    /// # Arguments
    /// * `provider` - backend whose base URL and key variable are used
    ///
    /// # Returns
    /// The client, or an error when the key variable is unset
    pub fn for_provider(provider: Provider) -> Result<Self> {
        let var = provider.api_key_var();
        let key = std::env::var(var).map_err(|_| eyre!("{var} is not set"))?;
        Self::with_api_key(provider, key)
    }

    pub fn with_api_key(provider: Provider, api_key: impl Into<String>) -> Result<Self> {
        let mut config = OpenAIConfig::new().with_api_key(api_key.into());
        if let Some(base) = provider.api_base() {
            config = config.with_api_base(base);
        }
        Ok(Self {
            client: Client::with_config(config),
            runtime: Runtime::new()?,
            provider,
        })
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    async fn complete_async(
        &self,
        messages: &[ChatMessage],
        sampling: &SamplingConfig,
    ) -> Result<String> {
        let req = build_chat_request(messages, sampling)?;
        info!(
            target: "llm",
            "chat_request: provider={:?}, model={}, max_tokens={}",
            self.provider, sampling.model_name, sampling.max_tokens
        );
        let resp = self.client.chat().create(req).await?;
        debug!(target: "llm", "chat_response_choices: {}", resp.choices.len());

        resp.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| eyre!("model returned no content"))
    }
}

impl ModelClient for OpenAiCompatClient {
    #[instrument(
        name = "model_complete",
        skip_all,
        fields(model = %sampling.model_name, messages = messages.len())
    )]
    fn complete(&self, messages: &[ChatMessage], sampling: &SamplingConfig) -> Result<String> {
        self.runtime.block_on(self.complete_async(messages, sampling))
    }
}
