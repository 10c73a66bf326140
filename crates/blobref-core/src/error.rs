//! Error taxonomy for reference resolution and checksum verification.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using blobref-core's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the resolver and the checksum verifier.
#[derive(Debug, Error)]
pub enum Error {
    /// The reference contains `://` but the scheme token is not one we handle.
    #[error("loading URL: unrecognized scheme: {scheme}")]
    UnrecognizedScheme { scheme: String },

    /// `env://NAME` where `NAME` is not set.
    #[error("loading URL: env var ${name} not found")]
    EnvVarNotFound { name: String },

    /// Checksum specifier has more than one `:`.
    #[error("wrong checksum input format, must have at most 1 colon: {input}")]
    MalformedChecksum { input: String },

    /// Checksum specifier names an algorithm other than sha256/sha512.
    #[error("unsupported checksum algorithm: {name}")]
    UnsupportedAlgorithm { name: String },

    /// Resolved content does not hash to the expected digest.
    #[error("incorrect checksum for file {reference}: expected {expected} but got {computed}")]
    ChecksumMismatch {
        reference: String,
        expected: String,
        computed: String,
    },

    /// Local file could not be opened or read.
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Transport error from libcurl (DNS, connect, TLS, aborted transfer).
    #[error(transparent)]
    Http(#[from] curl::Error),

    /// Non-2xx response while `http.reject_error_status` is enabled.
    #[error("GET {url} returned HTTP {code}")]
    HttpStatus { url: String, code: u32 },

    /// The streaming transfer thread died before reporting a result.
    #[error("GET {url}: transfer worker exited unexpectedly")]
    Worker { url: String },
}

/// Coarse grouping of [`Error`] so callers can tell whose fault a failure is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The caller passed something we cannot work with.
    Input,
    /// The outside world (environment, filesystem, network) failed us.
    Environment,
    /// Content was fetched but did not match its checksum.
    Integrity,
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::UnrecognizedScheme { .. }
            | Error::MalformedChecksum { .. }
            | Error::UnsupportedAlgorithm { .. } => ErrorCategory::Input,
            Error::EnvVarNotFound { .. }
            | Error::Io { .. }
            | Error::Http(_)
            | Error::HttpStatus { .. }
            | Error::Worker { .. } => ErrorCategory::Environment,
            Error::ChecksumMismatch { .. } => ErrorCategory::Integrity,
        }
    }

    pub fn is_unrecognized_scheme(&self) -> bool {
        matches!(self, Error::UnrecognizedScheme { .. })
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
