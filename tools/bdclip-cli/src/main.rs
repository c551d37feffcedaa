//! bdclip CLI: compile subtitle streams into Blu-ray clips.
//!
//! Usage:
//!   bdclip compile -i <SUB>... -o <OUT.m2ts>   Compile a subtitle clip
//!   bdclip check                               Check the compiling service setup

use std::path::PathBuf;

use bdclip_common::config::{config_file_path, AppConfig};
use clap::{Parser, Subcommand};

mod commands;
mod exit;

#[derive(Parser)]
#[command(
    name = "bdclip",
    about = "Compile subtitle streams into Blu-ray clips",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile subtitle streams into a clip and its clip information file
    Compile(commands::compile::CompileArgs),

    /// Check the compiling service setup
    Check {
        /// Write the resolved configuration to the config file
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = exit::for_parse_error(&err);
            err.print().ok();
            std::process::exit(code);
        }
    };

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    bdclip_common::logging::init_logging(&config.logging, cli.verbose);

    match cli.command {
        Commands::Compile(args) => {
            let code = commands::compile::run(args, config).await?;
            if code != exit::SUCCESS {
                std::process::exit(code);
            }
            Ok(())
        }
        Commands::Check { save } => {
            let config_path = cli.config.unwrap_or_else(config_file_path);
            commands::check::run(&config, &config_path, save).await
        }
    }
}
