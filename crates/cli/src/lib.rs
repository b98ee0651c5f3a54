pub mod commands;

use catalog_core::config::{AppConfig, LogFormat};
use clap::{Parser, Subcommand};
use std::process::ExitCode;

use crate::commands::{GlobalArgs, ProductFields};

#[derive(Debug, Parser)]
#[command(
    name = "catalog",
    about = "Product catalog operator CLI",
    long_about = "Manage a JSON-file backed product catalog: add, list, fetch, update and delete products.",
    after_help = "Examples:\n  catalog add --title \"Code #4\" --description \"Fiesta electronica\" --price 5000 --thumbnail img.png --code 1 --stock 50\n  catalog get 1\n  catalog update 2 --price 6000 --stock 30\n  catalog --file shop.json list"
)]
pub struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Add a product; every field is required and the code must be unique")]
    Add(ProductFields),
    #[command(about = "List every product in insertion order")]
    List,
    #[command(about = "Fetch one product by id")]
    Get { id: u64 },
    #[command(about = "Merge the given fields onto an existing product")]
    Update {
        id: u64,
        #[command(flatten)]
        fields: ProductFields,
    },
    #[command(about = "Delete one product by id")]
    Delete { id: u64 },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Replay the reference walkthrough against the configured catalog file")]
    Demo,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = cli.global.load_options();

    if let Ok(config) = AppConfig::load(options.clone()) {
        init_logging(&config);
    }

    let result = match cli.command {
        Command::Add(fields) => commands::add::run(&options, fields),
        Command::List => commands::list::run(&options),
        Command::Get { id } => commands::get::run(&options, id),
        Command::Update { id, fields } => commands::update::run(&options, id, fields),
        Command::Delete { id } => commands::delete::run(&options, id),
        Command::Config => commands::config::run(&options),
        Command::Demo => commands::demo::run(&options),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

fn init_logging(config: &AppConfig) {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    match config.logging.format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use std::path::PathBuf;

    use super::{Cli, Command};

    #[test]
    fn update_accepts_global_file_after_subcommand() {
        let cli = Cli::try_parse_from([
            "catalog", "update", "2", "--price", "6000", "--stock", "30", "--file", "shop.json",
        ])
        .expect("arguments should parse");

        assert_eq!(cli.global.file, Some(PathBuf::from("shop.json")));
        match cli.command {
            Command::Update { id, fields } => {
                assert_eq!(id, 2);
                assert_eq!(fields.stock, Some(30));
                assert_eq!(fields.price.map(|price| price.to_string()), Some("6000".to_string()));
                assert!(fields.title.is_none());
            }
            other => panic!("expected update command, got {other:?}"),
        }
    }

    #[test]
    fn non_numeric_id_is_a_usage_error() {
        assert!(Cli::try_parse_from(["catalog", "get", "first"]).is_err());
    }
}
