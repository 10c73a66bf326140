//! Resolve file paths, `http(s)://` URLs and `env://` references to bytes,
//! optionally verified against a SHA-256/SHA-512 checksum.

pub mod config;
pub mod logging;

pub mod checksum;
pub mod env;
pub mod error;
pub mod http;
pub mod reference;
pub mod referrers;
pub mod resolver;

pub use checksum::{ChecksumAlgorithm, ChecksumSpec};
pub use env::{EnvLookup, ProcessEnv};
pub use error::{Error, ErrorCategory, Result};
pub use reference::Reference;
pub use resolver::{load, load_with_checksum, open, ContentStream, Mode, ResolvedContent, Resolver};
