use crate::config::SamplingConfig;
use crate::llm::messages::{to_request_messages, ChatMessage};
use async_openai::types::{CreateChatCompletionRequest, CreateChatCompletionRequestArgs};
use color_eyre::Result;
use tracing::debug;

/// Which field carries the generation length cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenLimitStrategy {
    /// `max_tokens` (Mistral, gpt-4o family and most compatible backends)
    MaxTokens,
    /// `max_completion_tokens` (OpenAI reasoning models)
    MaxCompletionTokens,
}

/// Pick the token-limit field from the model name.
///
/// # Arguments
/// * `model` - backend model name
///
/// # Returns
/// `MaxCompletionTokens` for OpenAI reasoning models (`gpt-5*`, `o1*`, `o3*`, `o4*`),
/// `MaxTokens` for everything else
pub fn determine_token_limit_strategy(model: &str) -> TokenLimitStrategy {
    let reasoning = ["gpt-5", "o1", "o3", "o4"]
        .iter()
        .any(|prefix| model.starts_with(prefix));
    if reasoning {
        debug!(model = %model, strategy = "MaxCompletionTokens", "reasoning model family");
        TokenLimitStrategy::MaxCompletionTokens
    } else {
        debug!(model = %model, strategy = "MaxTokens", "classic model family");
        TokenLimitStrategy::MaxTokens
    }
}

/// Build a chat-completion request from an exchange and sampling parameters.
///
/// Reasoning models only accept their default temperature and top-p, so those two
/// fields are left unset for them.
///
/// # Arguments
/// * `messages` - exchange in send order
/// * `sampling` - model name, temperature, token cap and top-p
///
/// # Returns
/// The request ready for `client.chat().create`
pub fn build_chat_request(
    messages: &[ChatMessage],
    sampling: &SamplingConfig,
) -> Result<CreateChatCompletionRequest> {
    let mut builder = CreateChatCompletionRequestArgs::default();
    builder
        .model(&sampling.model_name)
        .messages(to_request_messages(messages)?);

    let req = match determine_token_limit_strategy(&sampling.model_name) {
        TokenLimitStrategy::MaxTokens => {
            debug!(max_tokens = sampling.max_tokens, "applying max_tokens with sampling");
            builder
                .temperature(sampling.temperature)
                .top_p(sampling.top_p)
                .max_tokens(sampling.max_tokens)
                .build()?
        }
        TokenLimitStrategy::MaxCompletionTokens => {
            debug!(
                max_completion_tokens = sampling.max_tokens,
                "applying max_completion_tokens, temperature/top_p left at model default"
            );
            builder.max_completion_tokens(sampling.max_tokens).build()?
        }
    };
    Ok(req)
}
