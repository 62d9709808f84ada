//! Language model boundary: message types, the client capability and the
//! OpenAI-compatible backend.

pub mod client;
pub mod messages;
pub mod request;

pub use client::OpenAiCompatClient;
pub use messages::{ChatMessage, Role};

use crate::config::SamplingConfig;
use color_eyre::Result;

/// Synchronous chat-completion capability.
///
/// Implementations return the raw generated text. Transport, authentication and quota
/// failures are returned as `Err` and are not interpreted by the resolver.
pub trait ModelClient {
    fn complete(&self, messages: &[ChatMessage], sampling: &SamplingConfig) -> Result<String>;
}

impl<C: ModelClient + ?Sized> ModelClient for &C {
    fn complete(&self, messages: &[ChatMessage], sampling: &SamplingConfig) -> Result<String> {
        (**self).complete(messages, sampling)
    }
}

impl<C: ModelClient + ?Sized> ModelClient for Box<C> {
    fn complete(&self, messages: &[ChatMessage], sampling: &SamplingConfig) -> Result<String> {
        (**self).complete(messages, sampling)
    }
}

/// Stand-in client for offline mode. Every call fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledClient;

impl ModelClient for DisabledClient {
    fn complete(&self, _messages: &[ChatMessage], _sampling: &SamplingConfig) -> Result<String> {
        Err(color_eyre::eyre::eyre!("model calls are disabled"))
    }
}

/// OpenAI-compatible backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Mistral,
    OpenAI,
}

impl Provider {
    /// Case-insensitive name lookup.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "mistral" => Some(Provider::Mistral),
            "openai" => Some(Provider::OpenAI),
            _ => None,
        }
    }

    /// `None` keeps the async-openai default base.
    pub fn api_base(self) -> Option<&'static str> {
        match self {
            Provider::Mistral => Some("https://api.mistral.ai/v1"),
            Provider::OpenAI => None,
        }
    }

    pub fn api_key_var(self) -> &'static str {
        match self {
            Provider::Mistral => "MISTRAL_API_KEY",
            Provider::OpenAI => "OPENAI_API_KEY",
        }
    }
}
