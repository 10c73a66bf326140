//! `blobref classify <ref>` – show the backend for a reference. No I/O.

use blobref_core::Reference;

pub fn run_classify(reference: &str) {
    let classified = Reference::parse(reference);
    println!("{}", classified);
    if let Reference::Unrecognized(_) = classified {
        tracing::warn!("{} would fail: unrecognized scheme", reference);
    }
}
