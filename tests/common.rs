#![allow(dead_code)]

use color_eyre::{eyre::eyre, Result};
use llm_moves::{ChatMessage, ModelClient, SamplingConfig};
use once_cell::sync::Lazy;
use std::sync::{Mutex, Once};
use tracing_appender::rolling;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static START: Once = Once::new();
static _GUARD: Lazy<Mutex<Option<tracing_appender::non_blocking::WorkerGuard>>> =
    Lazy::new(|| Mutex::new(None));

/// Initialize test environment: dotenv and tracing (stderr + file).
/// Idempotent: safe to call multiple times.
pub fn init() {
    START.call_once(|| {
        let _ = dotenvy::dotenv();
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new("debug"))
            .expect("env filter");

        let file_appender = rolling::daily("logs", "tests.log");
        let (file_nb, guard) = tracing_appender::non_blocking(file_appender);
        *_GUARD.lock().unwrap() = Some(guard);

        let stderr_layer = fmt::layer()
            .with_target(true)
            .with_thread_names(true)
            .with_test_writer();

        let file_layer = fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_thread_names(true)
            .with_writer(file_nb);

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .with(file_layer)
            .try_init();

        tracing::info!(target: "test_init", "Test tracing initialized (stderr + rotating file)");
    });
}

/// Model client stub: replays scripted answers and records what it was sent.
pub struct StubClient {
    answers: Mutex<Vec<Result<String>>>,
    seen: Mutex<Vec<(Vec<ChatMessage>, SamplingConfig)>>,
}

impl StubClient {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::scripted(answers.into_iter().map(|a| Ok(a.into())).collect())
    }

    pub fn scripted(answers: Vec<Result<String>>) -> Self {
        Self { answers: Mutex::new(answers), seen: Mutex::new(Vec::new()) }
    }

    pub fn failing(msg: &str) -> Self {
        Self::scripted(vec![Err(eyre!("{msg}"))])
    }

    pub fn call_count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    /// User prompt of the n-th call.
    pub fn user_prompt(&self, n: usize) -> String {
        self.seen.lock().unwrap()[n].0[1].content.clone()
    }

    pub fn sampling(&self, n: usize) -> SamplingConfig {
        self.seen.lock().unwrap()[n].1.clone()
    }
}

impl ModelClient for StubClient {
    fn complete(&self, messages: &[ChatMessage], sampling: &SamplingConfig) -> Result<String> {
        self.seen.lock().unwrap().push((messages.to_vec(), sampling.clone()));
        let mut answers = self.answers.lock().unwrap();
        if answers.is_empty() {
            return Err(eyre!("stub exhausted"));
        }
        answers.remove(0)
    }
}
