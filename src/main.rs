//! Main entry point for Quote Translator CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quote_translator::cli::commands::{self, Commands};
use quote_translator::AppPaths;

/// Quote Translator - translate dialogue inside quotes, keep the markup intact
#[derive(Parser, Debug)]
#[command(name = "quote-translator", version, about, long_about = None)]
struct Args {
    /// Directory holding settings.json, usage.json, config.json and logs/
    /// (defaults to TRANSLATOR_DATA_DIR or the current directory)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        "debug".to_string()
    } else {
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .ok()
                .filter(|_| !args.verbose)
                .unwrap_or_else(|| {
                    format!("{}={}", env!("CARGO_CRATE_NAME"), log_level).into()
                }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let paths = AppPaths::resolve(args.data_dir);

    // Execute command
    match args.command {
        Some(Commands::Translate {
            text,
            file,
            output,
            options,
        }) => {
            commands::handle_translate(&paths, text, file, output, options).await?;
        }
        Some(Commands::Batch {
            dir,
            output,
            recursive,
            options,
        }) => {
            commands::handle_batch(&paths, dir, output, recursive, options).await?;
        }
        Some(Commands::Usage) => {
            commands::handle_usage(&paths).await?;
        }
        Some(Commands::Settings {
            theme,
            mode,
            engine,
            limit,
        }) => {
            commands::handle_settings(&paths, theme, mode, engine, limit).await?;
        }
        Some(Commands::Engines) => {
            commands::handle_engines(&paths).await?;
        }
        Some(Commands::Langs) => {
            commands::handle_langs().await?;
        }
        None => {
            println!("Please specify a command. Use --help for more information.");
        }
    }

    Ok(())
}
