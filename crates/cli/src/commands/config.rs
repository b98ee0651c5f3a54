use std::env;
use std::fs;
use std::path::Path;

use catalog_core::config::{resolve_config_path, AppConfig, LoadOptions};
use serde::Serialize;
use toml::Value;

use crate::commands::{CommandResult, EXIT_CONFIG};

/// One effective setting and where its value came from.
#[derive(Debug, PartialEq, Eq, Serialize)]
struct ConfigEntry {
    key: &'static str,
    value: String,
    source: String,
}

/// Reports the effective configuration (precedence flag > env > file > default).
pub fn run(options: &LoadOptions) -> CommandResult {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("configuration issue: {error}"),
                EXIT_CONFIG,
            )
        }
    };

    let file_path = resolve_config_path(options.config_path.as_deref());
    let file_doc = file_path.as_deref().and_then(load_config_file_doc);
    let source_of = |key: &str, flag_set: bool, env_keys: &[&str]| {
        if flag_set {
            return "flag".to_string();
        }
        field_source(key, env_keys, file_doc.as_ref(), file_path.as_deref())
    };

    let overrides = &options.overrides;
    let entries = vec![
        ConfigEntry {
            key: "catalog.path",
            value: config.catalog.path.display().to_string(),
            source: source_of("catalog.path", overrides.catalog_path.is_some(), &["CATALOG_PATH"]),
        },
        ConfigEntry {
            key: "logging.level",
            value: config.logging.level.clone(),
            source: source_of(
                "logging.level",
                overrides.log_level.is_some(),
                &["CATALOG_LOGGING_LEVEL", "CATALOG_LOG_LEVEL"],
            ),
        },
        ConfigEntry {
            key: "logging.format",
            value: config.logging.format.as_str().to_string(),
            source: source_of(
                "logging.format",
                overrides.log_format.is_some(),
                &["CATALOG_LOGGING_FORMAT", "CATALOG_LOG_FORMAT"],
            ),
        },
    ];

    let message = match &file_path {
        Some(path) => format!("effective config (file: {})", path.display()),
        None => "effective config (no config file found)".to_string(),
    };
    CommandResult::success_with_data("config", message, entries)
}

fn load_config_file_doc(path: &Path) -> Option<Value> {
    fs::read_to_string(path).ok()?.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    file_doc: Option<&Value>,
    file_path: Option<&Path>,
) -> String {
    let set_env_key = env_keys
        .iter()
        .find(|key| env::var(key).is_ok_and(|value| !value.trim().is_empty()));
    if let Some(env_key) = set_env_key {
        return format!("env ({env_key})");
    }

    match (file_doc, file_path) {
        (Some(doc), Some(path)) if contains_path(doc, key_path) => {
            format!("file ({})", path.display())
        }
        _ => "default".to_string(),
    }
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    key_path.split('.').try_fold(root, |current, key| current.get(key)).is_some()
}
