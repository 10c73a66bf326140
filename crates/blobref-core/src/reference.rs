//! Reference classification: decide which backend a reference string goes to.
//!
//! This step is pure. It never touches the filesystem, the network or the
//! environment, so every branch can be tested without I/O.

use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Separator between a scheme token and the scheme-specific body.
pub const SCHEME_SEPARATOR: &str = "://";

pub const HTTP_SCHEME: &str = "http://";
pub const HTTPS_SCHEME: &str = "https://";
pub const ENV_SCHEME: &str = "env://";

/// A classified reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// No `://` in the reference: a local path, already cleaned.
    File(PathBuf),
    /// `http://` or `https://`: the complete original reference.
    Http(String),
    /// `env://NAME`: the variable name.
    Env(String),
    /// Any other `xxx://` prefix: the scheme token including `://`.
    Unrecognized(String),
}

impl Reference {
    /// Classifies `reference` by its first `://`.
    ///
    /// Matching is syntactic and case-sensitive: `HTTP://x` and `foo://x` are
    /// both unrecognized, and are never reinterpreted as paths.
    pub fn parse(reference: &str) -> Self {
        let Some(idx) = reference.find(SCHEME_SEPARATOR) else {
            return Reference::File(clean_path(Path::new(reference)));
        };
        let split = idx + SCHEME_SEPARATOR.len();
        let (scheme, body) = reference.split_at(split);
        match scheme {
            HTTP_SCHEME | HTTPS_SCHEME => Reference::Http(reference.to_string()),
            ENV_SCHEME => Reference::Env(body.to_string()),
            other => Reference::Unrecognized(other.to_string()),
        }
    }

    /// Scheme token (`"https://"`, `"env://"`, ...) or `None` for paths.
    pub fn scheme(&self) -> Option<&str> {
        match self {
            Reference::File(_) => None,
            Reference::Http(url) => {
                if url.starts_with(HTTPS_SCHEME) {
                    Some(HTTPS_SCHEME)
                } else {
                    Some(HTTP_SCHEME)
                }
            }
            Reference::Env(_) => Some(ENV_SCHEME),
            Reference::Unrecognized(scheme) => Some(scheme.as_str()),
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::File(path) => write!(f, "file {}", path.display()),
            Reference::Http(url) => write!(f, "http {}", url),
            Reference::Env(name) => write!(f, "env ${}", name),
            Reference::Unrecognized(scheme) => write!(f, "unrecognized scheme {}", scheme),
        }
    }
}

/// Lexically cleans a path the way platform path cleaning does.
///
/// Drops `.` segments and repeated separators, resolves `..` against the
/// preceding normal segment, drops `..` directly under the root and keeps
/// leading `..` on relative paths. An empty result becomes `.`.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => match out.last().copied() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) => {}
                _ => out.push(comp),
            },
            other => out.push(other),
        }
    }
    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}
