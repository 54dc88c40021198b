//! forvodb-prep - Dump preparation tool
//!
//! Produces the auxiliary inputs `forvodb-build` consumes: origin
//! statistics, the country mapping with downloaded flags, composite
//! pronunciation icons, and per-language title/description files.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for forvodb-prep
#[derive(Parser, Debug)]
#[command(name = "forvodb-prep")]
#[command(about = "Prepare icon and mapping inputs for forvodb-build")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log verbosity (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract unique contributor gender/country pairs from a metadata log
    Origins {
        /// Metadata log to scan
        metadata: PathBuf,
        /// Language code to keep
        language: String,
    },
    /// Map country names to ISO codes and download flag images
    Flags {
        /// Origin stats file from the origins step
        origins: PathBuf,
        /// restcountries dataset (countries.json)
        countries: PathBuf,
        /// Output mapping file
        #[arg(long, default_value = "country_mappings.json")]
        output: PathBuf,
        /// Directory for downloaded flag images
        #[arg(long, default_value = "flags")]
        flags_dir: PathBuf,
    },
    /// Composite flags and gender glyphs into pronunciation icons
    Icons {
        /// Origin stats file from the origins step
        origins: PathBuf,
        /// Country mapping file from the flags step
        mappings: PathBuf,
        /// Directory holding downloaded flag images
        flags_dir: PathBuf,
        /// Venus (female) glyph SVG
        #[arg(long, default_value = "venus.svg")]
        venus: PathBuf,
        /// Mars (male) glyph SVG
        #[arg(long, default_value = "mars.svg")]
        mars: PathBuf,
        /// Output icon directory
        #[arg(long, default_value = "icons")]
        output: PathBuf,
    },
    /// Generate title and description files for a language
    Describe {
        /// Language code to describe
        language_code: String,
        /// Language code to name table
        #[arg(long, default_value = "languages.json")]
        languages: PathBuf,
        /// Directory for the generated files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Command::Origins { metadata, language } => {
            forvodb_prep::origins::run(&metadata, &language)?;
        }
        Command::Flags {
            origins,
            countries,
            output,
            flags_dir,
        } => {
            forvodb_prep::flags::run(&origins, &countries, &output, &flags_dir).await?;
        }
        Command::Icons {
            origins,
            mappings,
            flags_dir,
            venus,
            mars,
            output,
        } => {
            forvodb_prep::compose::run(&origins, &mappings, &flags_dir, &venus, &mars, &output)?;
        }
        Command::Describe {
            language_code,
            languages,
            output_dir,
        } => {
            forvodb_prep::describe::run(&language_code, &languages, &output_dir)?;
        }
    }

    Ok(())
}
