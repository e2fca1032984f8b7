//! crit - convert checkpoint image files to editable JSON and back
//!
//! This tool turns magic-tagged checkpoint image files into editable
//! JSON documents and reassembles byte-identical images from them.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crit_core::{container, Registry};
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

/// Convert checkpoint image files to editable JSON and back
#[derive(Parser, Debug)]
#[command(name = "crit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert SOURCE image file to a JSON document in DEST
    ToJson {
        /// Path to the input image file
        source: PathBuf,
        /// Path to write the JSON document to
        dest: PathBuf,
    },
    /// Convert SOURCE JSON document back to an image file in DEST
    ToImg {
        /// Path to the input JSON document
        source: PathBuf,
        /// Path to write the image file to
        dest: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .init();

    let registry = Registry::builtin().context("failed to build the image format registry")?;

    match &cli.command {
        Command::ToJson { source, dest } => {
            container::image_file_to_json_file(&registry, source, dest)
                .with_context(|| format!("failed to convert '{}' to JSON", source.display()))?;
            debug!("wrote {}", dest.display());
        }
        Command::ToImg { source, dest } => {
            container::json_file_to_image_file(&registry, source, dest)
                .with_context(|| format!("failed to convert '{}' to an image", source.display()))?;
            debug!("wrote {}", dest.display());
        }
    }

    Ok(())
}
