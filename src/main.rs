//! DebugTools CLI
//!
//! Thin wrapper around debugtools-core for trying out logger configurations
//! and reading persisted records.
//!
//! ## Usage
//!
//! ```bash
//! # Validate a configuration and list its sinks
//! debugtools check --config logger.toml
//!
//! # Log one record through every configured sink
//! debugtools emit --config logger.toml --level warning -m user=ada "disk almost full"
//!
//! # Print records persisted by a jsonl sink
//! debugtools read logs/raw/2026-01-21_app.jsonl --min-level notice
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use debugtools_core::sinks::console::format_line;
use debugtools_core::sinks::read_entries;
use debugtools_core::{
    location, parse_pair, LogHandler, LogLevel, LogSink, LoggerConfig, Metadata,
};

/// DebugTools - multi-sink log fan-out
#[derive(Parser)]
#[command(name = "debugtools")]
#[command(version = "0.1.0")]
#[command(about = "DebugTools - multi-sink log fan-out")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a single record through the configured sinks
    Emit {
        /// Logger configuration (TOML)
        #[arg(short, long)]
        config: PathBuf,

        /// Level of the record
        #[arg(short, long, default_value = "info")]
        level: LogLevel,

        /// Per-call metadata as key=value (repeatable)
        #[arg(short, long = "metadata", value_name = "KEY=VALUE")]
        metadata: Vec<String>,

        /// Message text
        message: String,
    },

    /// Validate a configuration and show the resulting handler
    Check {
        /// Logger configuration (TOML)
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Print records from a JSONL log file
    Read {
        /// Path to a .jsonl file written by a jsonl sink
        path: PathBuf,

        /// Hide records below this level
        #[arg(long)]
        min_level: Option<LogLevel>,

        /// Print the raw JSON lines instead of formatted text
        #[arg(long)]
        json: bool,
    },
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // Records forwarded by a `tracing` sink are always shown
    let filter = format!("{},debugtools_core::forward=trace", filter);

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();
}

fn load_config(path: &Path) -> Result<LoggerConfig> {
    LoggerConfig::load(path).with_context(|| format!("Failed to load {}", path.display()))
}

fn parse_metadata(pairs: &[String]) -> Result<Option<Metadata>> {
    if pairs.is_empty() {
        return Ok(None);
    }

    let mut metadata = Metadata::new();
    for pair in pairs {
        let (key, value) = parse_pair(pair)?;
        metadata.insert(key, value);
    }
    Ok(Some(metadata))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    match cli.command {
        Commands::Emit {
            config,
            level,
            metadata,
            message,
        } => {
            let metadata = parse_metadata(&metadata)?;
            let handler = load_config(&config)?.build()?;

            let dispatch = handler.log(level, message, metadata, location!());
            handler.flush()?;

            if dispatch.filtered {
                eprintln!(
                    "Record not emitted: {} is below the handler level {}",
                    level,
                    handler.log_level()
                );
                return Ok(());
            }

            tracing::info!(
                delivered = dispatch.delivered,
                failed = dispatch.failures.len(),
                skipped = dispatch.skipped,
                "Dispatch finished"
            );

            if !dispatch.failures.is_empty() {
                for failure in &dispatch.failures {
                    eprintln!("  sink #{} ({}): {}", failure.index, failure.sink, failure.error);
                }
                anyhow::bail!(
                    "{} of {} sink(s) failed",
                    dispatch.failures.len(),
                    handler.sink_names().len()
                );
            }
        }

        Commands::Check { config } => {
            let loaded = load_config(&config)?;
            let handler = loaded.build()?;

            println!("Configuration OK: {}", config.display());
            println!();
            println!("Label: {}", handler.label());
            println!("Level: {}", handler.log_level());
            println!("Failure policy: {:?}", handler.failure_policy());
            if !handler.metadata().is_empty() {
                println!("Metadata:");
                for (key, value) in handler.metadata() {
                    println!("  {} = {}", key, value);
                }
            }
            println!("Sinks ({}):", loaded.sinks.len());
            for (i, (sink, name)) in loaded.sinks.iter().zip(handler.sink_names()).enumerate() {
                println!("  {}. {} ({})", i + 1, sink.kind(), name);
            }
        }

        Commands::Read {
            path,
            min_level,
            json,
        } => {
            let entries = read_entries(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let min_level = min_level.unwrap_or(LogLevel::Trace);

            for entry in entries.iter().filter(|e| e.level >= min_level) {
                if json {
                    println!("{}", entry.to_json_line()?);
                } else {
                    println!("{}", format_line(&entry.to_record()));
                }
            }
        }
    }

    Ok(())
}
