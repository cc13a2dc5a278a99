mod commands;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use evol_kiosk::{Config, Error};
use tracing_subscriber::EnvFilter;

use commands::Commands;
use output::{ErrorResponse, print_json};

/// evol-kiosk - Evol Jewels style-survey kiosk
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ~/.config/evol-kiosk/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "info" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<Config, Error> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

fn run(cli: &Cli) -> Result<ExitCode, Error> {
    let config = load_config(cli.config.as_ref())?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(commands::execute(&cli.command, &config, cli.json))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            if cli.json {
                print_json(&ErrorResponse {
                    error: e.to_string(),
                });
            } else {
                eprintln!("Error: {}", e);
            }
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commands::WishlistCommand;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["evol-kiosk", "--verbose", "run"]);
        assert!(cli.verbose);
        assert!(!cli.json);
        assert!(matches!(cli.command, Commands::Run));
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["evol-kiosk", "passport", "abc123", "--json"]);
        assert!(cli.json);
        match cli.command {
            Commands::Passport { id } => assert_eq!(id, "abc123"),
            _ => panic!("expected passport command"),
        }
    }

    #[test]
    fn test_cli_survey_choices() {
        let cli = Cli::parse_from([
            "evol-kiosk",
            "survey",
            "--style",
            "modern",
            "--occasion",
            "1",
            "--budget",
            "popular",
            "--metal",
            "rose gold",
        ]);
        match cli.command {
            Commands::Survey {
                style,
                occasion,
                budget,
                metal,
                vibe,
            } => {
                assert_eq!(style.to_string(), "Modern");
                assert_eq!(occasion.to_string(), "Everyday");
                assert_eq!(budget.to_string(), "₹8,000–₹25,000");
                assert_eq!(metal.to_string(), "Rose Gold");
                assert!(vibe.is_none());
            }
            _ => panic!("expected survey command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_choice() {
        let result = Cli::try_parse_from([
            "evol-kiosk",
            "survey",
            "--style",
            "punk",
            "--occasion",
            "work",
            "--budget",
            "1",
            "--metal",
            "gold",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_wishlist_subcommand() {
        let cli = Cli::parse_from(["evol-kiosk", "wishlist", "toggle", "p2"]);
        match cli.command {
            Commands::Wishlist(WishlistCommand::Toggle { id }) => assert_eq!(id, "p2"),
            _ => panic!("expected wishlist toggle"),
        }
    }

    #[test]
    fn test_cli_config_path() {
        let cli = Cli::parse_from(["evol-kiosk", "--config", "/tmp/kiosk.toml", "health"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/kiosk.toml")));
    }
}
