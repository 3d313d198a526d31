use std::{io, path::PathBuf, process::ExitCode};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use reporter_core::{Config, OpenWeatherClient, Pipeline};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-reporter", version, about = "Report and log the current weather for a city")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Config file to use instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// CSV log to append to (overrides `csv_path` from the config file).
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Print diagnostics to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key in the config file.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        match self.command {
            Some(Command::Configure) => {
                configure(self.config)?;
                Ok(ExitCode::SUCCESS)
            }
            None => report(self.config, self.csv).await,
        }
    }
}

async fn report(config: Option<PathBuf>, csv: Option<PathBuf>) -> anyhow::Result<ExitCode> {
    let mut config = Config::load(config.as_deref())?;
    if let Some(path) = csv {
        config.csv_path = path;
    }
    tracing::debug!(endpoint = %config.endpoint, csv = %config.csv_path.display(), "loaded config");

    let client = OpenWeatherClient::new(config.endpoint.clone(), config.timeout())?;
    let pipeline = Pipeline::new(&client, config.api_key.clone(), config.csv_path.clone());

    let stdin = io::stdin();
    let stdout = io::stdout();
    let outcome = pipeline
        .run(&mut stdin.lock(), &mut stdout.lock())
        .await
        .context("Terminal I/O failed")?;

    Ok(ExitCode::from(outcome.exit_code()))
}

fn configure(config: Option<PathBuf>) -> anyhow::Result<()> {
    let path = match config {
        Some(p) => p,
        None => Config::config_file_path()?,
    };
    let mut cfg = Config::from_file(&path)?;

    let key = inquire::Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_help_message("Get one at https://home.openweathermap.org/api_keys")
        .prompt()
        .context("Failed to read API key")?;

    let key = key.trim();
    if key.is_empty() {
        bail!("API key cannot be empty.");
    }

    cfg.api_key = Some(key.to_string());
    cfg.save(&path)?;

    println!("Saved API key to {}", path.display());
    Ok(())
}
