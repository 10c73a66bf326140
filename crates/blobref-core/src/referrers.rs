//! OCI referrers lookup: the interface to an external registry client.
//!
//! Nothing here speaks the registry protocol. A [`ReferrersClient`]
//! implementation does; this module only shapes the query (digest plus an
//! optional artifact-type filter) and the returned index.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Errors from building a referrers query.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReferrersError {
    #[error("invalid digest reference {input}: {reason}")]
    InvalidDigest { input: String, reason: String },
}

/// A content-addressed reference: `repository@algorithm:hex`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DigestRef {
    pub repository: String,
    pub algorithm: String,
    pub hex: String,
}

impl DigestRef {
    pub fn parse(input: &str) -> Result<Self, ReferrersError> {
        let invalid = |reason: &str| ReferrersError::InvalidDigest {
            input: input.to_string(),
            reason: reason.to_string(),
        };
        let (repository, digest) = input
            .rsplit_once('@')
            .ok_or_else(|| invalid("missing '@'"))?;
        if repository.is_empty() {
            return Err(invalid("empty repository"));
        }
        let (algorithm, hex) = digest
            .split_once(':')
            .ok_or_else(|| invalid("digest must be algorithm:hex"))?;
        if algorithm.is_empty()
            || !algorithm
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "+._-".contains(c))
        {
            return Err(invalid("bad digest algorithm"));
        }
        if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)) {
            return Err(invalid("digest must be lowercase hex"));
        }
        Ok(Self {
            repository: repository.to_string(),
            algorithm: algorithm.to_string(),
            hex: hex.to_string(),
        })
    }

    /// `algorithm:hex` without the repository.
    pub fn digest(&self) -> String {
        format!("{}:{}", self.algorithm, self.hex)
    }
}

impl fmt::Display for DigestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.repository, self.algorithm, self.hex)
    }
}

/// Registry connection settings handed through to the client untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryOptions {
    /// Talk plain HTTP / skip TLS verification.
    pub insecure: bool,
    pub username: Option<String>,
    pub password: Option<String>,
    pub user_agent: Option<String>,
}

/// What a client is asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferrersQuery {
    pub digest: DigestRef,
    /// Only artifacts of this type, when set.
    pub artifact_type: Option<String>,
    pub options: RegistryOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
    pub media_type: String,
    pub digest: String,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<HashMap<String, String>>,
}

/// OCI image index listing the artifacts that refer to a digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexManifest {
    pub schema_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default)]
    pub manifests: Vec<Descriptor>,
}

/// A registry client able to answer referrers queries.
pub trait ReferrersClient {
    type Error: std::error::Error;

    fn referrers(&self, query: &ReferrersQuery) -> Result<IndexManifest, Self::Error>;
}

/// Asks `client` for the artifacts referring to `digest`.
///
/// An empty `artifact_type` means no filter. The client's answer (or error)
/// is returned unchanged.
pub fn referrers<C: ReferrersClient>(
    client: &C,
    digest: &DigestRef,
    artifact_type: &str,
    options: &RegistryOptions,
) -> Result<IndexManifest, C::Error> {
    let query = ReferrersQuery {
        digest: digest.clone(),
        artifact_type: (!artifact_type.is_empty()).then(|| artifact_type.to_string()),
        options: options.clone(),
    };
    tracing::debug!(
        "referrers for {} (artifact type: {})",
        query.digest,
        query.artifact_type.as_deref().unwrap_or("any")
    );
    client.referrers(&query)
}
