//! explain-cli — 词语解释命令行工具
//!
//! Usage:
//!   explain-cli <word> <context>          Explain a word in context (JSON on stdout)
//!   explain-cli key <word> <context>      Print the canonical cache key only
//!
//! Configuration comes from the `OLLAMA_*`, `REDIS_*`, and `INSTANCE_ID`
//! environment variables. Log verbosity follows `RUST_LOG`.

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use word_explain::{derive_cache_key, CacheKeyGenerator, Error, ExplainerBuilder};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let outcome = match args[1].as_str() {
        "key" => cmd_key(&args[2..]),
        "version" | "--version" | "-V" => {
            cmd_version();
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        _ => cmd_explain(&args[1..]).await,
    };

    if let Err(e) = outcome {
        eprintln!("Error: {e:#}");
        let code = match e.downcast_ref::<Error>() {
            Some(err) if err.is_validation() => 2,
            Some(err) if err.is_terminal_upstream() => 3,
            _ => 1,
        };
        std::process::exit(code);
    }
}

fn print_usage() {
    println!(
        r#"explain-cli — 词语解释命令行工具

USAGE:
    explain-cli <word> <context>
    explain-cli key <word> <context>

COMMANDS:
    <word> <context>            Explain <word> as used in <context>
    key <word> <context>        Print the canonical cache key without calling the model
    version                     Show version information
    help                        Show this help message

ENVIRONMENT:
    OLLAMA_BASE_URL             Upstream base URL (default http://localhost:11434)
    OLLAMA_MODEL                Model name (default llama3.2)
    OLLAMA_TIMEOUT              Per-attempt timeout (default 30s)
    OLLAMA_CACHE_TTL            Cache entry lifetime (default 1h)
    OLLAMA_RETRY_COUNT          Retries after the first attempt (default 3)
    OLLAMA_RETRY_DELAY          Delay between attempts (default 500ms)
    REDIS_URL                   Shared cache store (requires the `redis` feature)
    REDIS_PASSWORD              Redis password
    INSTANCE_ID                 Instance id recorded in cached entries
    RUST_LOG                    Log filter (default warn)

EXIT CODES:
    1 other failure, 2 invalid input, 3 upstream unavailable"#
    );
}

fn cmd_version() {
    println!("explain-cli {}", env!("CARGO_PKG_VERSION"));
}

fn word_and_context(args: &[String]) -> anyhow::Result<(&str, &str)> {
    match args {
        [word, context] => Ok((word.as_str(), context.as_str())),
        _ => anyhow::bail!("expected exactly two arguments: <word> <context>"),
    }
}

fn cmd_key(args: &[String]) -> anyhow::Result<()> {
    let (word, context) = word_and_context(args)?;
    let key = derive_cache_key(&CacheKeyGenerator::new(), word, context)?;
    println!("{key}");
    Ok(())
}

async fn cmd_explain(args: &[String]) -> anyhow::Result<()> {
    let (word, context) = word_and_context(args)?;
    let explainer = ExplainerBuilder::from_env()?
        .build()
        .await
        .context("failed to initialize explainer")?;

    let outcome = explainer.explain_detailed(word, context).await?;
    tracing::info!(
        cache_hit = outcome.result.cache_hit,
        coalesced = outcome.result.coalesced,
        "Explanation served"
    );

    let explanation = outcome.into_explanation();
    println!("{}", serde_json::to_string_pretty(&explanation)?);
    Ok(())
}
