use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use calcsv_core::config::{RenderSettings, Settings};
use calcsv_core::source::{InputSource, build_client};
use calcsv_core::{CalCsvError, CalCsvResult, RenderOptions};
use owo_colors::OwoColorize;
use tracing::debug;

use super::create_spinner;

pub struct ConvertArgs {
    pub input: String,
    pub output: Option<PathBuf>,
    pub locale: Option<String>,
    pub timezone: Option<String>,
}

pub async fn run(args: ConvertArgs) -> Result<()> {
    let settings = Settings::load()?;
    let options = render_options(&settings.render, args.locale, args.timezone)?;

    let raw = match input_source(&args.input)? {
        InputSource::Url(url) => {
            let client = build_client(&settings.fetch)?;
            let spinner = create_spinner(format!("Fetching {url}"));
            let result = InputSource::Url(url).load(&client).await;
            spinner.finish_and_clear();
            result?
        }
        InputSource::Upload(bytes) => bytes,
    };

    let table = calcsv_core::parse_bytes(&raw)?;
    let csv = calcsv_core::render(&table, &options)?;
    debug!(events = table.len(), bytes = csv.len(), "rendered csv");

    match &args.output {
        Some(path) => {
            std::fs::write(path, &csv)?;
            eprintln!(
                "Converted {} to {}",
                plural(table.len(), "event").green(),
                path.display().bold()
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&csv)?;
            stdout.flush()?;
        }
    }

    Ok(())
}

/// Command-line flags take precedence over configured render settings.
fn render_options(
    configured: &RenderSettings,
    locale: Option<String>,
    timezone: Option<String>,
) -> CalCsvResult<RenderOptions> {
    RenderSettings {
        locale: locale.or_else(|| configured.locale.clone()),
        timezone: timezone.or_else(|| configured.timezone.clone()),
    }
    .options()
}

/// Anything with a scheme is fetched; everything else is read from disk.
fn input_source(input: &str) -> CalCsvResult<InputSource> {
    if input.contains("://") {
        return InputSource::select(None, Some(input.to_string()));
    }

    let path = Path::new(input);
    let bytes = std::fs::read(path).map_err(|e| {
        CalCsvError::InputUnavailable(format!("Could not read {}: {e}", path.display()))
    })?;

    InputSource::select(Some(bytes), None)
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}
