//! CLI for the blobref content resolver.

mod commands;

use anyhow::Result;
use blobref_core::checksum::ChecksumAlgorithm;
use blobref_core::config;
use blobref_core::Resolver;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{run_classify, run_digest, run_load, run_stream};

/// Top-level CLI for blobref.
#[derive(Debug, Parser)]
#[command(name = "blobref")]
#[command(about = "blobref: load files, URLs and env:// references, with checksum verification", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Read a reference fully into memory, optionally verify it, and write it out.
    Load {
        /// File path, http(s):// URL or env://NAME.
        reference: String,
        /// Expected checksum, `[sha256:|sha512:]<hex>`.
        #[arg(long, value_name = "SPEC")]
        checksum: Option<String>,
        /// Write to this file instead of stdout.
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Copy a reference to stdout (or a file) without buffering it in memory.
    Stream {
        /// File path, http(s):// URL or env://NAME.
        reference: String,
        /// Write to this file instead of stdout.
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Print the digest of a reference's content.
    Digest {
        /// File path, http(s):// URL or env://NAME.
        reference: String,
        /// Hash algorithm: sha256 or sha512.
        #[arg(long, default_value = "sha256", value_parser = parse_algorithm)]
        algorithm: ChecksumAlgorithm,
    },

    /// Show which backend a reference resolves through, without fetching it.
    Classify {
        reference: String,
    },
}

fn parse_algorithm(s: &str) -> Result<ChecksumAlgorithm, String> {
    s.parse().map_err(|e: blobref_core::Error| e.to_string())
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let resolver = Resolver::from_config(&cfg);

        match cli.command {
            CliCommand::Load {
                reference,
                checksum,
                output,
            } => run_load(&resolver, &reference, checksum.as_deref(), output.as_deref())?,
            CliCommand::Stream { reference, output } => {
                run_stream(&resolver, &reference, output.as_deref())?
            }
            CliCommand::Digest {
                reference,
                algorithm,
            } => run_digest(&resolver, &reference, algorithm)?,
            CliCommand::Classify { reference } => run_classify(&reference),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
