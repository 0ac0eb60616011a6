//! Facet CLI - Consistency repair for diagram model databases

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{repair, upgrade};
use log::{debug, LevelFilter};
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(name = "facet")]
#[command(about = "Check and repair diagram model databases", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a TOML check configuration
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check a model database and repair what is broken
    Repair {
        /// Path to the model database
        database: String,

        /// Report violations without modifying the database
        #[arg(long)]
        check_only: bool,

        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = parse_format)]
        format: String,
    },

    /// Migrate a model database to the current schema
    Upgrade {
        /// Path to the model database
        database: String,
    },
}

fn parse_format(s: &str) -> Result<String, String> {
    match s {
        "text" | "json" => Ok(s.to_string()),
        _ => Err(format!("unknown format '{}'; valid values: text, json", s)),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = LevelFilter::from_str(&cli.log_level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {}. Using 'warn' instead.", cli.log_level);
        LevelFilter::Warn
    });
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();
    debug!("Parsed arguments: {:?}", cli);

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Repair {
            database,
            check_only,
            format,
        } => repair::run(repair::RepairArgs {
            database,
            check_only,
            format,
            config,
        }),
        Commands::Upgrade { database } => upgrade::run(&database, config),
    }
}
