//! CLI command implementations.

pub mod config;
pub mod job;
pub mod resources;

use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};

use hostctl_api::ApiClient;
use hostctl_core::config::{AppConfig, ConfigHandle};
use hostctl_core::error::{HcError, HcResult};

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub async_mode: bool,
    pub timeout_secs: Option<u64>,
}

/// Apply command-line overrides on top of the loaded configuration.
pub fn apply_overrides(config: &mut AppConfig, overrides: &Overrides) {
    if let Some(endpoint) = &overrides.endpoint {
        config.server.endpoint = AppConfig::sanitize_endpoint(endpoint);
    }
    if overrides.async_mode {
        config.jobs.async_mode = true;
    }
    if let Some(secs) = overrides.timeout_secs {
        config.jobs.timeout_secs = secs;
    }
}

/// Helper to create an API client from config.
pub async fn create_api_client(config: &ConfigHandle) -> HcResult<ApiClient> {
    let cfg = config.read().await;
    if !cfg.is_endpoint_configured() {
        return Err(HcError::Config(
            "no endpoint configured; pass --endpoint or run `hostctl config set server.endpoint <url>`".into(),
        ));
    }
    ApiClient::from_config(&cfg)
}

/// Table with the shared CLI styling.
pub fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Print a value as pretty JSON.
pub fn print_json<T: serde::Serialize>(value: &T) -> HcResult<()> {
    let rendered =
        serde_json::to_string_pretty(value).map_err(|e| HcError::Encode(e.to_string()))?;
    println!("{rendered}");
    Ok(())
}
