//! Checksum specifiers and digest verification (SHA-256 / SHA-512).
//!
//! A specifier is `[algorithm ":"] hexdigest`; without an algorithm prefix
//! SHA-256 is assumed.

use crate::error::{Error, Result};
use sha2::{Digest, Sha256, Sha512};
use std::fmt;
use std::io::{self, Read};
use std::str::FromStr;

const BUF_SIZE: usize = 64 * 1024;

/// Hash algorithms accepted in a checksum specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChecksumAlgorithm {
    #[default]
    Sha256,
    Sha512,
}

impl ChecksumAlgorithm {
    pub fn name(self) -> &'static str {
        match self {
            ChecksumAlgorithm::Sha256 => "sha256",
            ChecksumAlgorithm::Sha512 => "sha512",
        }
    }
}

impl FromStr for ChecksumAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sha256" => Ok(ChecksumAlgorithm::Sha256),
            "sha512" => Ok(ChecksumAlgorithm::Sha512),
            other => Err(Error::UnsupportedAlgorithm {
                name: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lowercase hex digest of `data`.
pub fn digest_hex(algorithm: ChecksumAlgorithm, data: &[u8]) -> String {
    match algorithm {
        ChecksumAlgorithm::Sha256 => hex::encode(Sha256::digest(data)),
        ChecksumAlgorithm::Sha512 => hex::encode(Sha512::digest(data)),
    }
}

/// Lowercase hex digest of everything `reader` yields.
/// Reads in chunks to keep memory use bounded; suitable for large streams.
pub fn digest_reader<R: Read>(algorithm: ChecksumAlgorithm, reader: R) -> io::Result<String> {
    match algorithm {
        ChecksumAlgorithm::Sha256 => hash_reader::<Sha256, R>(reader),
        ChecksumAlgorithm::Sha512 => hash_reader::<Sha512, R>(reader),
    }
}

fn hash_reader<D: Digest, R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = D::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// A parsed checksum specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumSpec {
    pub algorithm: ChecksumAlgorithm,
    /// Expected digest exactly as given by the caller.
    pub expected: String,
}

impl ChecksumSpec {
    /// Parses `[algorithm ":"] hexdigest`.
    ///
    /// More than one `:` is [`Error::MalformedChecksum`]; an algorithm other
    /// than `sha256`/`sha512` is [`Error::UnsupportedAlgorithm`].
    pub fn parse(input: &str) -> Result<Self> {
        let parts: Vec<&str> = input.split(':').collect();
        match parts.as_slice() {
            [digest] => Ok(Self {
                algorithm: ChecksumAlgorithm::Sha256,
                expected: digest.to_string(),
            }),
            [algorithm, digest] => Ok(Self {
                algorithm: algorithm.parse()?,
                expected: digest.to_string(),
            }),
            _ => Err(Error::MalformedChecksum {
                input: input.to_string(),
            }),
        }
    }

    /// Hashes `content` and compares it with the expected digest.
    ///
    /// Hex case in the expected digest is ignored. On mismatch the error
    /// carries `reference` and both digests.
    pub fn verify(&self, reference: &str, content: &[u8]) -> Result<()> {
        let computed = digest_hex(self.algorithm, content);
        if computed != self.expected.to_ascii_lowercase() {
            return Err(Error::ChecksumMismatch {
                reference: reference.to_string(),
                expected: self.expected.clone(),
                computed,
            });
        }
        Ok(())
    }
}

impl FromStr for ChecksumSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ChecksumSpec::parse(s)
    }
}

impl fmt::Display for ChecksumSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.expected)
    }
}
