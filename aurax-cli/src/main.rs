//! Aurax CLI
//!
//! Command-line interface for submitting and following Aurax image tasks.

mod commands;
mod config;

use std::time::Duration;

use anyhow::Result;
use aurax_client::config::DEFAULT_BASE_URL;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "aurax")]
#[command(about = "Aurax image task CLI", long_about = None)]
struct Cli {
    /// API key
    #[arg(long, env = "AURAX_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Key identifier sent alongside the API key
    #[arg(long, env = "AURAX_KEY_ID")]
    key_id: String,

    /// API base URL
    #[arg(long, env = "AURAX_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Per-request timeout in seconds (does not apply to streams)
    #[arg(long, env = "AURAX_REQUEST_TIMEOUT", default_value_t = 30)]
    request_timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Credentials may live in a local .env file
    dotenvy::dotenv().ok();

    // Logs go to stderr so command output can be piped
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aurax=info,aurax_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        api_key: cli.api_key,
        key_id: cli.key_id,
        base_url: cli.base_url,
        request_timeout: Duration::from_secs(cli.request_timeout),
    };

    handle_command(cli.command, &config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_task_poll() {
        let cli = Cli::try_parse_from([
            "aurax",
            "--api-key",
            "k",
            "--key-id",
            "id",
            "task",
            "poll",
            "task-1",
            "--interval-ms",
            "500",
        ])
        .unwrap();

        assert_eq!(cli.base_url, DEFAULT_BASE_URL);
        assert_eq!(cli.request_timeout, 30);
        assert!(matches!(cli.command, Commands::Task { .. }));
    }

    #[test]
    fn test_generate_accepts_width_alone() {
        let cli = Cli::try_parse_from([
            "aurax",
            "--api-key",
            "k",
            "--key-id",
            "id",
            "generate",
            "a red dress",
            "--width",
            "768",
        ])
        .unwrap();

        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.width, Some(768));
                assert_eq!(args.height, None);
            }
            _ => panic!("expected generate command"),
        }
    }

    #[test]
    fn test_wait_conflicts_with_stream() {
        let result = Cli::try_parse_from([
            "aurax",
            "--api-key",
            "k",
            "--key-id",
            "id",
            "generate",
            "a red dress",
            "--wait",
            "--stream",
        ]);

        assert!(result.is_err());
    }
}
