//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use courier_core::DEFAULT_CONFIG_PATH;

/// Courier - checks for the notification pipeline
#[derive(Parser, Debug)]
#[command(name = "courier")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the pipeline config file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    pub config: Utf8PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate the pipeline configuration
    Validate(ValidateArgs),

    /// Webhook delivery checks
    #[command(subcommand)]
    Webhook(WebhookCommands),
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Top-level key that must be present (repeatable)
    #[arg(long = "require", value_name = "KEY")]
    pub require: Vec<String>,

    /// Report every violation instead of stopping at the first
    #[arg(long)]
    pub all: bool,
}

#[derive(Subcommand, Debug)]
pub enum WebhookCommands {
    /// Send a test message through the retrying notifier
    Test(WebhookTestArgs),
}

#[derive(Args, Debug)]
pub struct WebhookTestArgs {
    /// Webhook URL (falls back to FEISHU_WEBHOOK_URL in the config file)
    #[arg(long, env = "FEISHU_WEBHOOK_URL", hide_env_values = true)]
    pub url: Option<String>,

    /// Message text
    #[arg(short, long)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_validate_flags() {
        let cli = Cli::try_parse_from([
            "courier",
            "-c",
            "custom.yaml",
            "validate",
            "--require",
            "REPORT_MODE",
            "--require",
            "PLATFORMS",
            "--all",
        ])
        .unwrap();

        assert_eq!(cli.config, "custom.yaml");
        match cli.command {
            Commands::Validate(args) => {
                assert_eq!(args.require, vec!["REPORT_MODE", "PLATFORMS"]);
                assert!(args.all);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_default_config_path() {
        let cli = Cli::try_parse_from(["courier", "validate"]).unwrap();
        assert_eq!(cli.config, DEFAULT_CONFIG_PATH);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_webhook_test_url_flag() {
        let cli = Cli::try_parse_from([
            "courier",
            "-vv",
            "webhook",
            "test",
            "--url",
            "https://example.com/hook",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Webhook(WebhookCommands::Test(args)) => {
                assert_eq!(args.url.as_deref(), Some("https://example.com/hook"));
                assert!(args.message.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
