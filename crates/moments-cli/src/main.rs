//! Moments CLI
//!
//! Command-line interface for Moments - a journal of dated entries with
//! photos and a mood score, exportable to PDF.

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use moments_core::{Config, MomentStore};

mod commands;
mod editor;
mod output;
mod photos;

use commands::moment::{parse_emotion, EditRequest};
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "moments")]
#[command(about = "Moments - record how your days felt, export them to PDF")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Use a specific config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a new moment
    #[command(alias = "new")]
    Add {
        /// What happened (opens editor if not provided)
        #[arg(short, long)]
        description: Option<String>,
        /// Mood from 0.0 (worst) to 1.0 (best)
        #[arg(short, long, default_value = "0.5", value_parser = parse_emotion)]
        emotion: f64,
        /// Photo to attach (repeatable)
        #[arg(short, long = "image")]
        images: Vec<PathBuf>,
    },
    /// List moments, newest first
    #[command(alias = "ls")]
    List {
        /// Show at most this many
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Show a moment
    Show {
        /// Moment ID (full UUID or prefix)
        id: String,
    },
    /// Edit a moment
    Edit {
        /// Moment ID (full UUID or prefix)
        id: String,
        /// New description
        #[arg(short, long)]
        description: Option<String>,
        /// New mood from 0.0 to 1.0
        #[arg(short, long, value_parser = parse_emotion)]
        emotion: Option<f64>,
        /// Photo to append (repeatable)
        #[arg(short, long = "image")]
        images: Vec<PathBuf>,
        /// Remove existing photos before appending
        #[arg(long)]
        clear_images: bool,
    },
    /// Delete moments
    #[command(alias = "rm")]
    Delete {
        /// Moment IDs (full UUID or prefix)
        #[arg(required = true)]
        ids: Vec<String>,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Export all moments to PDF
    Export {
        /// Directory to write the PDF into
        #[arg(short, long)]
        dir: Option<PathBuf>,
        /// Open the PDF once written
        #[arg(long)]
        open: bool,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Show journal and storage status
    Status,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, store_key, export_dir, jpeg_quality)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands don't need the store
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), cli.config.as_ref(), &output);
    }

    let config = Config::load_with_cli_override(cli.config.as_ref())?;
    let mut store = MomentStore::open(&config)?;

    match cli.command {
        Commands::Add {
            description,
            emotion,
            images,
        } => commands::moment::add(&mut store, description, emotion, images, &output),
        Commands::List { limit } => commands::moment::list(&store, limit, &output),
        Commands::Show { id } => commands::moment::show(&store, id, &output),
        Commands::Edit {
            id,
            description,
            emotion,
            images,
            clear_images,
        } => {
            let request = EditRequest {
                description,
                emotion,
                add_images: images,
                clear_images,
            };
            commands::moment::edit(&mut store, id, request, &output)
        }
        Commands::Delete { ids, yes } => commands::moment::delete(&mut store, ids, yes, &output),
        Commands::Export { dir, open } => {
            commands::export::export(&store, &config, dir, open, &output).await
        }
        Commands::Config { .. } => unreachable!(), // Handled above
        Commands::Status => commands::status::show(&store, &config, &output),
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Log to stderr; RUST_LOG wins over the verbosity flag
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("moments_core={},moments_cli={}", level, level))
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
