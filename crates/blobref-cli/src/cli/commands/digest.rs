//! `blobref digest <ref>` – hash a reference's content.

use anyhow::{Context, Result};
use blobref_core::checksum::{self, ChecksumAlgorithm};
use blobref_core::{EnvLookup, Resolver};

/// Compute the digest of the streamed content and print it sha256sum-style.
pub fn run_digest<E: EnvLookup>(
    resolver: &Resolver<E>,
    reference: &str,
    algorithm: ChecksumAlgorithm,
) -> Result<()> {
    let digest = compute(resolver, reference, algorithm)?;
    println!("{}  {}", digest, reference);
    Ok(())
}

fn compute<E: EnvLookup>(
    resolver: &Resolver<E>,
    reference: &str,
    algorithm: ChecksumAlgorithm,
) -> Result<String> {
    let stream = resolver.open(reference)?;
    checksum::digest_reader(algorithm, stream).with_context(|| format!("read {}", reference))
}
