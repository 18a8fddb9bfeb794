mod commands;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "calcsv")]
#[command(about = "Convert ICS calendars to CSV spreadsheets", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a calendar file or URL to CSV
    Convert {
        /// Path to an .ics file, or an http(s)/webcal URL
        input: String,

        /// Write the CSV here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Date/time locale (en-US, en-GB, de-DE, fr-FR, iso)
        #[arg(long)]
        locale: Option<String>,

        /// IANA timezone used to display times (e.g. "Europe/Berlin")
        #[arg(long)]
        timezone: Option<String>,
    },
    /// Show config paths and effective settings
    Config {
        /// Write a default config file if none exists
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            output,
            locale,
            timezone,
        } => {
            let args = commands::convert::ConvertArgs {
                input,
                output,
                locale,
                timezone,
            };
            commands::convert::run(args).await
        }
        Commands::Config { init } => commands::config::run(init),
    }
}
