use color_eyre::Result;
use llm_moves::ActionResolver;
use std::io::Read;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<()> {
    color_eyre::install()?;

    // Optional .env with MISTRAL_API_KEY / OPENAI_API_KEY / DISABLE_LLM.
    let _ = dotenvy::dotenv();

    let file_appender = rolling::daily("logs", "llm_moves.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    let stderr_layer = fmt::layer().with_target(true).with_writer(std::io::stderr);
    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let context = if args.is_empty() {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        args.join(" ")
    };

    let mut resolver = ActionResolver::from_env()?;
    let sampling = resolver.config().sampling.clone();
    let resolution = resolver.resolve_detailed(context.trim(), &sampling)?;
    tracing::info!(resolution = %resolution, "resolved");

    match resolver.vocabulary().get(&resolution.action) {
        Some(dir) => println!("{} {}", resolution.action, dir),
        None => println!("{}", resolution.action),
    }
    Ok(())
}
