//! Resolver: turn a reference string into content.
//!
//! Classification is done once by [`Reference::parse`]; the selected backend
//! then either materializes the content or hands out a stream.

use crate::checksum::ChecksumSpec;
use crate::config::{BlobrefConfig, HttpConfig};
use crate::env::{EnvLookup, ProcessEnv};
use crate::error::{Error, Result};
use crate::http::{self, HttpBody};
use crate::reference::Reference;
use std::fs::{self, File};
use std::io::{self, Cursor, Read};
use std::path::PathBuf;

/// How the caller wants the content delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Read everything into memory before returning.
    Materialize,
    /// Return a lazily read, caller-owned stream.
    Stream,
}

/// Content produced by [`Resolver::resolve`].
#[derive(Debug)]
pub enum ResolvedContent {
    Bytes(Vec<u8>),
    Stream(ContentStream),
}

impl ResolvedContent {
    /// Returns the content as bytes, draining the stream if needed.
    pub fn into_bytes(self) -> io::Result<Vec<u8>> {
        match self {
            ResolvedContent::Bytes(bytes) => Ok(bytes),
            ResolvedContent::Stream(mut stream) => {
                let mut buf = Vec::new();
                stream.read_to_end(&mut buf)?;
                Ok(buf)
            }
        }
    }
}

/// Open handle on resolved content. Dropping it closes the file or
/// aborts the HTTP transfer.
#[derive(Debug)]
pub enum ContentStream {
    File(File),
    Http(HttpBody),
    Memory(Cursor<Vec<u8>>),
}

impl Read for ContentStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            ContentStream::File(f) => f.read(buf),
            ContentStream::Http(body) => body.read(buf),
            ContentStream::Memory(cursor) => cursor.read(buf),
        }
    }
}

/// Resolves file, `http(s)://` and `env://` references.
///
/// Holds no mutable state; one instance can serve concurrent callers.
#[derive(Debug, Clone, Default)]
pub struct Resolver<E = ProcessEnv> {
    env: E,
    http: HttpConfig,
}

impl Resolver<ProcessEnv> {
    /// Resolver over the real process environment with default HTTP settings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(cfg: &BlobrefConfig) -> Self {
        Self::new().with_http_config(cfg.http.clone())
    }
}

impl<E> Resolver<E> {
    /// Resolver that looks up `env://` names in `env` instead of the process environment.
    pub fn with_env(env: E) -> Self {
        Self {
            env,
            http: HttpConfig::default(),
        }
    }

    pub fn with_http_config(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    pub fn http_config(&self) -> &HttpConfig {
        &self.http
    }
}

/// Backend selected for a reference, before any content is read.
enum Source {
    File(PathBuf),
    Http(String),
    Memory(Vec<u8>),
}

impl<E: EnvLookup> Resolver<E> {
    /// Classifies `reference` and picks its backend. Shared by both modes.
    fn source(&self, reference: &str) -> Result<Source> {
        let classified = Reference::parse(reference);
        tracing::debug!("resolving {}", classified);
        match classified {
            Reference::File(path) => Ok(Source::File(path)),
            Reference::Http(url) => Ok(Source::Http(url)),
            Reference::Env(name) => match self.env.lookup(&name) {
                Some(value) => Ok(Source::Memory(value.into_encoded_bytes())),
                None => Err(Error::EnvVarNotFound { name }),
            },
            Reference::Unrecognized(scheme) => Err(Error::UnrecognizedScheme { scheme }),
        }
    }

    /// Resolves `reference` in `mode`.
    pub fn resolve(&self, reference: &str, mode: Mode) -> Result<ResolvedContent> {
        match mode {
            Mode::Materialize => self.load(reference).map(ResolvedContent::Bytes),
            Mode::Stream => self.open(reference).map(ResolvedContent::Stream),
        }
    }

    /// Resolves `reference` fully into memory.
    pub fn load(&self, reference: &str) -> Result<Vec<u8>> {
        match self.source(reference)? {
            Source::File(path) => fs::read(&path).map_err(|e| Error::io(path, e)),
            Source::Http(url) => http::get(&url, &self.http),
            Source::Memory(bytes) => Ok(bytes),
        }
    }

    /// Resolves `reference` to an open stream; the caller reads and drops it.
    pub fn open(&self, reference: &str) -> Result<ContentStream> {
        match self.source(reference)? {
            Source::File(path) => File::open(&path)
                .map(ContentStream::File)
                .map_err(|e| Error::io(path, e)),
            Source::Http(url) => http::open(&url, &self.http).map(ContentStream::Http),
            Source::Memory(bytes) => Ok(ContentStream::Memory(Cursor::new(bytes))),
        }
    }

    /// Parses `checksum`, then loads and verifies `reference`.
    ///
    /// A malformed specifier fails before any I/O. Content is only returned
    /// once it matches.
    pub fn load_with_checksum(&self, reference: &str, checksum: &str) -> Result<Vec<u8>> {
        let spec = ChecksumSpec::parse(checksum)?;
        self.load_verified(reference, &spec)
    }

    pub fn load_verified(&self, reference: &str, spec: &ChecksumSpec) -> Result<Vec<u8>> {
        let content = self.load(reference)?;
        spec.verify(reference, &content)?;
        tracing::debug!("verified {} against {}", reference, spec);
        Ok(content)
    }
}

/// [`Resolver::load`] over the process environment.
pub fn load(reference: &str) -> Result<Vec<u8>> {
    Resolver::new().load(reference)
}

/// [`Resolver::open`] over the process environment.
pub fn open(reference: &str) -> Result<ContentStream> {
    Resolver::new().open(reference)
}

/// [`Resolver::load_with_checksum`] over the process environment.
pub fn load_with_checksum(reference: &str, checksum: &str) -> Result<Vec<u8>> {
    Resolver::new().load_with_checksum(reference, checksum)
}
