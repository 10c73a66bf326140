//! `blobref load <ref>` – materialize (and optionally verify) a reference.

use super::output::Output;
use anyhow::{Context, Result};
use blobref_core::{EnvLookup, Resolver};
use std::io::Write;
use std::path::Path;

pub fn run_load<E: EnvLookup>(
    resolver: &Resolver<E>,
    reference: &str,
    checksum: Option<&str>,
    output: Option<&Path>,
) -> Result<()> {
    let content = match checksum {
        Some(spec) => resolver.load_with_checksum(reference, spec)?,
        None => resolver.load(reference)?,
    };
    let mut out = Output::open(output)?;
    out.write_all(&content).context("write output")?;
    out.finish()?;
    tracing::info!("loaded {} bytes from {}", content.len(), reference);
    Ok(())
}
