//! llm_moves
//!
//! Asks a language model for the next move of an agent and guarantees the answer is a
//! legal move: one corrective retry, then a random legal move.

pub mod config;
pub mod llm;
pub mod moves;
pub mod prompts;
pub mod resolver;

pub use config::{ResolverConfig, SamplingConfig};
pub use llm::{ChatMessage, ModelClient, OpenAiCompatClient, Provider};
pub use moves::{Direction, MoveVocabulary};
pub use prompts::{PromptBuilder, TemplatePromptBuilder};
pub use resolver::{ActionResolver, Resolution, ResolutionSource};

// Ensure .env is loaded for tests before anything else runs in the test process.
#[cfg(test)]
#[ctor::ctor]
fn load_dotenv_for_tests() {
    let _ = dotenvy::dotenv();
}
