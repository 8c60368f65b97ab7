use anyhow::Result;
use clap::Parser;
use rapidvoice::cli::{Cli, Commands, ConfigAction};
use rapidvoice::config::Config;
use std::io::{IsTerminal, Read};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    match &cli.command {
        None => {
            let config = resolve_config(&cli)?;
            if std::io::stdin().is_terminal() {
                rapidvoice::app::run_intake(config, cli.quiet).await?;
            } else {
                // Pipe mode: stdin carries one transcript
                let transcript = read_stdin()?;
                rapidvoice::app::run_extract(config, &transcript, cli.quiet).await?;
            }
        }
        Some(Commands::Intake) => {
            let config = resolve_config(&cli)?;
            rapidvoice::app::run_intake(config, cli.quiet).await?;
        }
        Some(Commands::Extract { text, file }) => {
            let config = resolve_config(&cli)?;
            let transcript = match (text, file) {
                (Some(text), _) => text.clone(),
                (None, Some(path)) => std::fs::read_to_string(path)?,
                (None, None) => read_stdin()?,
            };
            rapidvoice::app::run_extract(config, &transcript, cli.quiet).await?;
        }
        Some(Commands::Fields { all }) => {
            rapidvoice::app::run_fields(*all);
        }
        Some(Commands::Config { action }) => match action {
            ConfigAction::List => {
                let mut config = resolve_config(&cli)?;
                // Never echo a configured key back to the terminal
                if config.extraction.api_key.is_some() {
                    config.extraction.api_key = Some("<set>".to_string());
                }
                print!("{}", toml::to_string_pretty(&config)?);
            }
            ConfigAction::Path => {
                println!("{}", Config::default_path().display());
            }
            ConfigAction::Dump => {
                print!("{}", Config::dump_template());
            }
        },
    }

    Ok(())
}

/// Load configuration and fold in environment and CLI overrides.
///
/// Priority order:
/// 1. CLI flags (--model, --language, --device)
/// 2. Environment variables (GEMINI_API_KEY, RAPIDVOICE_*)
/// 3. Custom config path from CLI (--config)
/// 4. Default config path (~/.config/rapidvoice/config.toml)
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(path) = cli.config.as_deref() {
        Config::load(path)?
    } else {
        Config::load_or_default(&Config::default_path())?
    }
    .with_env_overrides();

    if let Some(model) = &cli.model {
        config.extraction.model = model.clone();
    }
    if let Some(language) = &cli.language {
        config.capture.language = language.clone();
    }
    if let Some(device) = &cli.device {
        config.capture.device = Some(device.clone());
    }

    Ok(config)
}

fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    std::io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}

/// Map the quiet/verbose flags to a tracing filter. RUST_LOG wins when
/// set.
fn init_logging(quiet: bool, verbose: u8) {
    let default_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "rapidvoice=info",
            _ => "rapidvoice=debug",
        }
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
