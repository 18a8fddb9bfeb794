use anyhow::Result;
use calcsv_core::RenderOptions;
use calcsv_core::config::Settings;
use calcsv_core::source::build_client;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// How dates and times are written in every response
    pub render: RenderOptions,
    /// Client for fetching calendars by URL
    pub client: reqwest::Client,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(AppState {
            render: settings.render.options()?,
            client: build_client(&settings.fetch)?,
            max_upload_bytes: settings.server.max_upload_bytes,
        })
    }
}
