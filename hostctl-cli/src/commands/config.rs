//! Config commands - show, get, set, and initialize the configuration file.

use std::path::Path;

use clap::Subcommand;
use console::style;

use hostctl_core::config::{AppConfig, ConfigHandle, StatusPolicy};
use hostctl_core::constants;
use hostctl_core::error::{HcError, HcResult};
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration.
    Show,
    /// Get a value by key path (e.g., "server.endpoint", "jobs.timeout_secs").
    Get {
        key: String,
    },
    /// Set a value by key path and save the file.
    Set {
        key: String,
        value: String,
    },
    /// Write a default configuration file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// Resolve a dot-separated key path to a value from the config.
fn get_setting_value(cfg: &AppConfig, key: &str) -> Option<String> {
    match key {
        "server.endpoint" => Some(cfg.server.endpoint.clone()),
        "server.api_key" => Some(cfg.server.api_key.clone()),
        "server.secret_key" => Some("********".to_string()),
        "server.request_timeout_ms" => Some(cfg.server.request_timeout_ms.to_string()),
        "server.resource_path" => Some(cfg.server.resource_path.clone()),
        "server.status_policy" => Some(policy_name(cfg.server.status_policy).to_string()),
        "jobs.async_mode" => Some(cfg.jobs.async_mode.to_string()),
        "jobs.timeout_secs" => Some(cfg.jobs.timeout_secs.to_string()),
        "jobs.poll_interval_ms" => Some(cfg.jobs.poll_interval_ms.to_string()),
        "logging.level" => Some(cfg.logging.level.clone()),
        "logging.directory" => Some(cfg.logging.directory.clone()),
        "logging.json_output" => Some(cfg.logging.json_output.to_string()),
        _ => None,
    }
}

/// Apply a value to a dot-separated key path on the config.
fn set_setting_value(cfg: &mut AppConfig, key: &str, value: &str) -> Result<(), String> {
    match key {
        "server.endpoint" => cfg.server.endpoint = AppConfig::sanitize_endpoint(value),
        "server.api_key" => cfg.server.api_key = value.to_string(),
        "server.secret_key" => cfg.server.secret_key = value.to_string(),
        "server.request_timeout_ms" => {
            cfg.server.request_timeout_ms = value.parse().map_err(|_| "invalid integer".to_string())?;
        }
        "server.resource_path" => {
            if value.trim_matches('/').is_empty() {
                return Err("resource path must not be empty".to_string());
            }
            cfg.server.resource_path = value.to_string();
        }
        "server.status_policy" => {
            cfg.server.status_policy = match value.to_lowercase().as_str() {
                "strict" => StatusPolicy::Strict,
                "permissive" => StatusPolicy::Permissive,
                _ => return Err("expected one of: strict, permissive".to_string()),
            };
        }
        "jobs.async_mode" => {
            cfg.jobs.async_mode = value.parse().map_err(|_| "expected true/false".to_string())?;
        }
        "jobs.timeout_secs" => {
            cfg.jobs.timeout_secs = value.parse().map_err(|_| "invalid integer".to_string())?;
        }
        "jobs.poll_interval_ms" => {
            let ms: u64 = value.parse().map_err(|_| "invalid integer".to_string())?;
            if ms < constants::MIN_POLL_INTERVAL_MS {
                return Err(format!("must be at least {}", constants::MIN_POLL_INTERVAL_MS));
            }
            cfg.jobs.poll_interval_ms = ms;
        }
        "logging.level" => {
            let v = value.to_lowercase();
            if !["trace", "debug", "info", "warn", "error"].contains(&v.as_str()) {
                return Err("expected one of: trace, debug, info, warn, error".to_string());
            }
            cfg.logging.level = v;
        }
        "logging.directory" => cfg.logging.directory = value.to_string(),
        "logging.json_output" => {
            cfg.logging.json_output = value.parse().map_err(|_| "expected true/false".to_string())?;
        }
        _ => return Err(format!("unknown key: {key}")),
    }
    Ok(())
}

fn policy_name(policy: StatusPolicy) -> &'static str {
    match policy {
        StatusPolicy::Strict => "strict",
        StatusPolicy::Permissive => "permissive",
    }
}

pub async fn run(
    config: ConfigHandle,
    path: &Path,
    action: ConfigAction,
    format: OutputFormat,
) -> HcResult<()> {
    match action {
        ConfigAction::Show => {
            let cfg = config.read().await;
            match format {
                OutputFormat::Json => {
                    let mut json = serde_json::to_value(&*cfg)
                        .map_err(|e| HcError::Encode(e.to_string()))?;
                    json["server"]["secret_key"] = serde_json::json!("********");
                    super::print_json(&json)?;
                }
                OutputFormat::Text => {
                    println!("{} {}", style("Config file:").bold(), path.display());
                    let mut table = super::new_table();
                    table.set_header(vec!["Key", "Value"]);
                    for key in KEYS {
                        let value = get_setting_value(&cfg, key).unwrap_or_default();
                        table.add_row(vec![key.to_string(), value]);
                    }
                    println!("{table}");
                }
            }
        }
        ConfigAction::Get { key } => {
            let cfg = config.read().await;
            let value = get_setting_value(&cfg, &key)
                .ok_or_else(|| HcError::InvalidArgument(format!("unknown key: {key}")))?;
            match format {
                OutputFormat::Json => super::print_json(&serde_json::json!({ key: value }))?,
                OutputFormat::Text => println!("{value}"),
            }
        }
        ConfigAction::Set { key, value } => {
            {
                let mut cfg = config.write().await;
                set_setting_value(&mut cfg, &key, &value).map_err(HcError::InvalidArgument)?;
            }
            config.save_to(path).await?;
            println!("{} {key} saved to {}", style("✓").green(), path.display());
        }
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                return Err(HcError::Config(format!(
                    "{} already exists; use --force to overwrite",
                    path.display()
                )));
            }
            AppConfig::default().save_to_file(path)?;
            println!("{} wrote {}", style("✓").green(), path.display());
        }
    }
    Ok(())
}

/// Keys shown by `config show`, in display order.
const KEYS: &[&str] = &[
    "server.endpoint",
    "server.api_key",
    "server.secret_key",
    "server.request_timeout_ms",
    "server.resource_path",
    "server.status_policy",
    "jobs.async_mode",
    "jobs.timeout_secs",
    "jobs.poll_interval_ms",
    "logging.level",
    "logging.directory",
    "logging.json_output",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_listed_key_resolves() {
        let cfg = AppConfig::default();
        for key in KEYS {
            assert!(get_setting_value(&cfg, key).is_some(), "{key}");
        }
    }

    #[test]
    fn test_set_and_get() {
        let mut cfg = AppConfig::default();
        set_setting_value(&mut cfg, "server.endpoint", "api.example.com/").unwrap();
        set_setting_value(&mut cfg, "server.status_policy", "Permissive").unwrap();
        set_setting_value(&mut cfg, "jobs.timeout_secs", "120").unwrap();

        assert_eq!(get_setting_value(&cfg, "server.endpoint").unwrap(), "http://api.example.com");
        assert_eq!(get_setting_value(&cfg, "server.status_policy").unwrap(), "permissive");
        assert_eq!(cfg.jobs.timeout_secs, 120);
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut cfg = AppConfig::default();
        assert!(set_setting_value(&mut cfg, "jobs.async_mode", "maybe").is_err());
        assert!(set_setting_value(&mut cfg, "logging.level", "loud").is_err());
        assert!(set_setting_value(&mut cfg, "server.resource_path", "//").is_err());
        assert!(set_setting_value(&mut cfg, "nope", "1").is_err());
        assert!(set_setting_value(&mut cfg, "jobs.poll_interval_ms", "0").is_err());
        assert_eq!(cfg.jobs.poll_interval_ms, constants::DEFAULT_POLL_INTERVAL_MS);
    }

    #[test]
    fn test_secret_is_masked() {
        let mut cfg = AppConfig::default();
        cfg.server.secret_key = "hunter2".into();
        assert_eq!(get_setting_value(&cfg, "server.secret_key").unwrap(), "********");
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let handle = ConfigHandle::new(AppConfig::default());

        run(handle.clone(), &path, ConfigAction::Init { force: false }, OutputFormat::Text)
            .await
            .unwrap();
        assert!(path.exists());

        let err = run(handle.clone(), &path, ConfigAction::Init { force: false }, OutputFormat::Text)
            .await
            .unwrap_err();
        assert!(matches!(err, HcError::Config(_)));

        run(handle, &path, ConfigAction::Init { force: true }, OutputFormat::Text)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_set_persists_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let handle = ConfigHandle::new(AppConfig::default());

        run(
            handle,
            &path,
            ConfigAction::Set {
                key: "jobs.poll_interval_ms".into(),
                value: "250".into(),
            },
            OutputFormat::Text,
        )
        .await
        .unwrap();

        let loaded = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.jobs.poll_interval_ms, 250);
    }
}
