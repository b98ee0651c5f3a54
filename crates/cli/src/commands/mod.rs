pub mod add;
pub mod config;
pub mod delete;
pub mod demo;
pub mod get;
pub mod list;
pub mod update;

use std::path::PathBuf;

use catalog_core::config::{AppConfig, ConfigOverrides, LoadOptions, LogFormat};
use catalog_core::{ApplicationError, CatalogStore, ProductCode, ProductDraft, ProductPatch};
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_INVALID_INPUT: u8 = 3;
pub const EXIT_DUPLICATE: u8 = 4;
pub const EXIT_NOT_FOUND: u8 = 5;
pub const EXIT_PERSISTENCE: u8 = 6;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: impl Serialize,
    ) -> Self {
        let data = match serde_json::to_value(data) {
            Ok(Value::Null) => None,
            Ok(value) => Some(value),
            Err(error) => {
                return Self::failure(command, "serialization", error.to_string(), EXIT_PERSISTENCE)
            }
        };
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_error(command: &str, error: &ApplicationError) -> Self {
        Self::failure(command, error.error_class(), error.to_string(), exit_code_for(error))
    }
}

pub fn exit_code_for(error: &ApplicationError) -> u8 {
    match error.error_class() {
        "missing_field" | "invalid_price" => EXIT_INVALID_INPUT,
        "duplicate_code" => EXIT_DUPLICATE,
        "not_found" => EXIT_NOT_FOUND,
        // id_space_exhausted: the file cannot take another record
        _ => EXIT_PERSISTENCE,
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Options shared by every subcommand.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    #[arg(long, global = true, value_name = "PATH", help = "Catalog JSON file (overrides config)")]
    pub file: Option<PathBuf>,
    #[arg(long, global = true, value_name = "PATH", help = "Explicit config file path")]
    pub config: Option<PathBuf>,
    #[arg(long, global = true, value_name = "LEVEL", help = "Log level override")]
    pub log_level: Option<String>,
    #[arg(long, global = true, value_name = "FORMAT", help = "Log format: compact|pretty|json")]
    pub log_format: Option<LogFormat>,
}

impl GlobalArgs {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            config_path: self.config.clone(),
            overrides: ConfigOverrides {
                catalog_path: self.file.clone(),
                log_level: self.log_level.clone(),
                log_format: self.log_format,
            },
            ..LoadOptions::default()
        }
    }
}

/// Product fields accepted by `add` and `update`. Flags win over `--json`.
#[derive(Debug, Clone, Default, Args)]
pub struct ProductFields {
    #[arg(long, value_name = "JSON", help = "Product fields as a JSON object")]
    pub json: Option<String>,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub price: Option<Decimal>,
    #[arg(long)]
    pub thumbnail: Option<String>,
    #[arg(long)]
    pub code: Option<String>,
    #[arg(long)]
    pub stock: Option<u32>,
}

impl ProductFields {
    pub fn into_draft(self) -> Result<ProductDraft, serde_json::Error> {
        let mut draft = match &self.json {
            Some(raw) => serde_json::from_str::<ProductDraft>(raw)?,
            None => ProductDraft::default(),
        };
        draft.title = self.title.or(draft.title);
        draft.description = self.description.or(draft.description);
        draft.price = self.price.or(draft.price);
        draft.thumbnail = self.thumbnail.or(draft.thumbnail);
        draft.code = self.code.map(ProductCode::new).or(draft.code);
        draft.stock = self.stock.or(draft.stock);
        Ok(draft)
    }

    pub fn into_patch(self) -> Result<ProductPatch, serde_json::Error> {
        let mut patch = match &self.json {
            Some(raw) => serde_json::from_str::<ProductPatch>(raw)?,
            None => ProductPatch::default(),
        };
        patch.title = self.title.or(patch.title);
        patch.description = self.description.or(patch.description);
        patch.price = self.price.or(patch.price);
        patch.thumbnail = self.thumbnail.or(patch.thumbnail);
        patch.code = self.code.map(ProductCode::new).or(patch.code);
        patch.stock = self.stock.or(patch.stock);
        Ok(patch)
    }
}

/// Loads configuration and opens the configured catalog, or reports why not.
pub fn open_store(command: &str, options: &LoadOptions) -> Result<CatalogStore, CommandResult> {
    let config = AppConfig::load(options.clone()).map_err(|error| {
        CommandResult::failure(
            command,
            "config_validation",
            format!("configuration issue: {error}"),
            EXIT_CONFIG,
        )
    })?;
    Ok(CatalogStore::open(config.catalog.path))
}
