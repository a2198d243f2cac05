mod adapters;
mod config;
mod core;
mod error;
mod registry;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{IsTerminal, Read, Write};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{CliOverrides, Config};
use crate::registry::ModelRegistry;

#[derive(Parser)]
#[command(name = "diffreview")]
#[command(about = "Pipe a diff in, get an LLM code review out")]
#[command(
    long_about = "Reads a diff from standard input, sends it to the selected model with a fixed \
review prompt and prints the review.\n\nThe diff is transmitted verbatim to a third-party \
provider. Do not pipe in changes containing secrets you are not willing to share with it."
)]
#[command(version)]
struct Cli {
    /// Model to review with (see --list-models) [default: deepseek-chat]
    #[arg(long)]
    model: Option<String>,

    /// Largest accepted diff, in characters [default: 10000]
    #[arg(long, value_name = "CHARS")]
    max_diff_size: Option<usize>,

    /// Replace the built-in review prompt
    #[arg(long)]
    prompt: Option<String>,

    #[arg(long)]
    temperature: Option<f32>,

    #[arg(long)]
    max_tokens: Option<usize>,

    /// HTTP timeout for the provider call [default: 60]
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Print the supported model identifiers and exit
    #[arg(long)]
    list_models: bool,

    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // stdout carries only the review
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load()?;
    config.merge_with_cli(CliOverrides {
        model: cli.model,
        max_diff_size: cli.max_diff_size,
        prompt: cli.prompt,
        temperature: cli.temperature,
        max_tokens: cli.max_tokens,
        timeout_secs: cli.timeout,
    });
    config.validate()?;

    if cli.list_models {
        print!("{}", model_listing(&config.model));
        return Ok(());
    }

    let registry = ModelRegistry::from_config(&config)?;

    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        warn!("Reading diff from the terminal; finish with Ctrl-D");
    }

    run(&registry, &config, stdin.lock(), std::io::stdout().lock()).await
}

/// Validates, reviews and prints one diff.
///
/// Model id and size are checked before any credential or network access,
/// and nothing is written to `output` unless the review succeeded.
async fn run<R: Read, W: Write>(
    registry: &ModelRegistry,
    config: &Config,
    mut input: R,
    mut output: W,
) -> Result<()> {
    let spec = registry.lookup(&config.model)?;
    info!("Starting diff review with model: {}", spec.id);

    let diff = read_diff(&mut input)?;
    debug!(chars = diff.chars().count(), limit = config.max_diff_size, "read diff");
    core::check_size(&diff, config.max_diff_size)?;

    let review = registry.dispatch(spec.id, &diff).await?;

    output
        .write_all(review.as_bytes())
        .context("Failed to write review")?;
    output.flush()?;
    Ok(())
}

/// One id per line; the configured model is marked.
fn model_listing(selected: &str) -> String {
    registry::model_ids()
        .map(|id| {
            if id == selected {
                format!("{} (selected)\n", id)
            } else {
                format!("{}\n", id)
            }
        })
        .collect()
}

fn read_diff<R: Read>(input: &mut R) -> Result<String> {
    let mut buffer = Vec::new();
    input
        .read_to_end(&mut buffer)
        .context("Failed to read diff from stdin")?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReviewError;
    use crate::registry::tests::{registry_with, FixedAdapter};

    struct UnreadableInput;

    impl Read for UnreadableInput {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            panic!("input must not be read");
        }
    }

    fn review_error(err: &anyhow::Error) -> &ReviewError {
        err.downcast_ref::<ReviewError>()
            .unwrap_or_else(|| panic!("not a ReviewError: {err:#}"))
    }

    #[tokio::test]
    async fn oversized_diff_is_rejected_before_any_adapter_call() {
        let adapter = FixedAdapter::ok("LGTM");
        let registry = registry_with(adapter.clone());
        let config = Config::default();
        let input = "a".repeat(10_001);
        let mut output = Vec::new();

        let err = run(&registry, &config, input.as_bytes(), &mut output)
            .await
            .unwrap_err();

        assert!(matches!(
            review_error(&err),
            ReviewError::DiffTooLarge {
                actual: 10_001,
                max: 10_000
            }
        ));
        assert!(output.is_empty());
        assert_eq!(adapter.calls(), 0);
    }

    #[tokio::test]
    async fn unknown_model_is_rejected_before_reading_input() {
        let adapter = FixedAdapter::ok("LGTM");
        let registry = registry_with(adapter.clone());
        let config = Config {
            model: "invalid-model".to_string(),
            ..Config::default()
        };
        let mut output = Vec::new();

        let err = run(&registry, &config, UnreadableInput, &mut output)
            .await
            .unwrap_err();

        assert!(matches!(
            review_error(&err),
            ReviewError::UnknownModel { .. }
        ));
        assert!(output.is_empty());
        assert_eq!(adapter.calls(), 0);
    }

    #[tokio::test]
    async fn provider_failure_prints_nothing() {
        let adapter = FixedAdapter::failing("rate limited");
        let registry = registry_with(adapter.clone());
        let mut output = Vec::new();

        let err = run(&registry, &Config::default(), "test diff".as_bytes(), &mut output)
            .await
            .unwrap_err();

        assert!(matches!(review_error(&err), ReviewError::Provider { .. }));
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn review_is_printed_without_framing() {
        let adapter = FixedAdapter::ok("test response");
        let registry = registry_with(adapter.clone());
        let mut output = Vec::new();

        run(&registry, &Config::default(), "test diff".as_bytes(), &mut output)
            .await
            .unwrap();

        assert_eq!(String::from_utf8(output).unwrap(), "test response");
        assert_eq!(adapter.calls(), 1);
    }

    #[tokio::test]
    async fn gpt_4o_review_goes_through_openai_transport() {
        std::env::set_var("OPENAI_API_KEY", "test-key");
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"test response"}}]}"#)
            .expect(1)
            .create_async()
            .await;

        let mut config = Config {
            model: "gpt-4o".to_string(),
            ..Config::default()
        };
        config.base_urls.openai = Some(server.url());
        let registry = ModelRegistry::from_config(&config).unwrap();
        let mut output = Vec::new();

        run(&registry, &config, "test diff".as_bytes(), &mut output)
            .await
            .unwrap();

        assert_eq!(String::from_utf8(output).unwrap(), "test response");
        mock.assert_async().await;
    }

    #[test]
    fn model_listing_marks_configured_model() {
        let listing = model_listing(&Config::default().model);
        let lines: Vec<_> = listing.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines.contains(&"deepseek-chat (selected)"));
        assert!(lines.contains(&"claude-sonnet"));
    }

    #[test]
    fn invalid_utf8_is_replaced_not_rejected() {
        let mut input: &[u8] = b"+ok \xff\n";
        let diff = read_diff(&mut input).unwrap();
        assert!(diff.starts_with("+ok "));
        assert!(diff.contains('\u{FFFD}'));
    }

    #[test]
    fn cli_flags_parse() {
        let cli = Cli::try_parse_from([
            "diffreview",
            "--model",
            "claude-sonnet",
            "--max-diff-size",
            "100000",
        ])
        .unwrap();
        assert_eq!(cli.model.as_deref(), Some("claude-sonnet"));
        assert_eq!(cli.max_diff_size, Some(100_000));
        assert!(!cli.list_models);
    }
}
