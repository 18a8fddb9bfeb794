//! Runtime settings shared by the CLI and the HTTP server.
//!
//! Sources, lowest precedence first: built-in defaults, the TOML file at
//! `~/.config/calcsv/config.toml`, then `CALCSV__SECTION__KEY` environment
//! variables. A bare `PORT` variable overrides the server port.

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::csv::RenderOptions;
use crate::error::{CalCsvError, CalCsvResult};
use crate::locale::{Locale, system_timezone};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub fetch: FetchSettings,
    #[serde(default)]
    pub render: RenderSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Largest accepted request body, in bytes
    pub max_upload_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 3000,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        FetchSettings {
            timeout_secs: 30,
            user_agent: format!("calcsv/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Display settings. Unset values follow the process locale and system timezone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl RenderSettings {
    pub fn options(&self) -> CalCsvResult<RenderOptions> {
        let locale = match &self.locale {
            Some(tag) => Locale::from_tag(tag),
            None => Locale::from_env(),
        };

        let timezone = match &self.timezone {
            Some(name) => name
                .parse::<Tz>()
                .map_err(|_| CalCsvError::Config(format!("Unknown timezone '{name}'")))?,
            None => system_timezone(),
        };

        Ok(RenderOptions { locale, timezone })
    }
}

impl Settings {
    /// `~/.config/calcsv/config.toml`
    pub fn config_path() -> CalCsvResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CalCsvError::Config("Could not determine config directory".into()))?
            .join("calcsv");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default config file and the environment.
    pub fn load() -> CalCsvResult<Self> {
        let mut settings = Self::load_from(Some(&Self::config_path()?))?;

        if let Ok(port) = std::env::var("PORT") {
            settings.server.port = port
                .trim()
                .parse()
                .map_err(|_| CalCsvError::Config(format!("Invalid PORT value '{port}'")))?;
        }

        Ok(settings)
    }

    /// Load from an optional config file (missing files are skipped) and the environment.
    pub fn load_from(path: Option<&Path>) -> CalCsvResult<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }

        builder
            .add_source(
                Environment::with_prefix("CALCSV")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| CalCsvError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CalCsvError::Config(e.to_string()))
    }

    /// Write a config file with every option commented out.
    pub fn create_default_config(path: &Path) -> CalCsvResult<()> {
        let defaults = Settings::default();
        let contents = format!(
            "\
# calcsv configuration

[server]
# host = \"{host}\"
# port = {port}
# max_upload_bytes = {max_upload}

[fetch]
# timeout_secs = {timeout}
# user_agent = \"{user_agent}\"

[render]
# Locale for dates and times (en-US, en-GB, de-DE, fr-FR, iso).
# Defaults to LC_ALL / LC_TIME / LANG.
# locale = \"en-US\"

# IANA timezone used to display times. Defaults to the system timezone.
# timezone = \"Europe/Berlin\"
",
            host = defaults.server.host,
            port = defaults.server.port,
            max_upload = defaults.server.max_upload_bytes,
            timeout = defaults.fetch.timeout_secs,
            user_agent = defaults.fetch.user_agent,
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, contents)?;

        Ok(())
    }

    /// Effective settings as TOML, for display.
    pub fn to_toml(&self) -> CalCsvResult<String> {
        toml::to_string_pretty(self).map_err(|e| CalCsvError::Config(e.to_string()))
    }
}
