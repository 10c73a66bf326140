//! `blobref stream <ref>` – copy a reference through without buffering it.

use super::output::Output;
use anyhow::{Context, Result};
use blobref_core::{EnvLookup, Resolver};
use std::io;
use std::path::Path;

pub fn run_stream<E: EnvLookup>(
    resolver: &Resolver<E>,
    reference: &str,
    output: Option<&Path>,
) -> Result<()> {
    let mut stream = resolver.open(reference)?;
    let mut out = Output::open(output)?;
    let copied = io::copy(&mut stream, &mut out).with_context(|| format!("stream {}", reference))?;
    out.finish()?;
    tracing::info!("streamed {} bytes from {}", copied, reference);
    Ok(())
}
