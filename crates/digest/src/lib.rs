#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! Streaming digests over whole files, plus hex encode/decode. The
//! orchestrator calls [`digest_file`] once per walked file to decide
//! whether its content changed since the prior run.
//!
//! # Design
//!
//! [`DigestKind`] resolves algorithm names the way the manifest and the
//! options record reference them: case-insensitively, with `none` selecting
//! a digest that always produces an empty byte string (used by
//! configurations that want manifest entries keyed purely by path).
//!
//! # Invariants
//!
//! - [`digest_file`] reads the source in bounded chunks; it never loads
//!   the whole file into memory.
//! - [`to_hex`] always emits uppercase hex; [`from_hex`] accepts either
//!   case.
//!
//! # Errors
//!
//! [`DigestError::UnknownKind`] is a programmer error: the caller passed a
//! digest name the engine does not recognize. [`DigestError::Io`] wraps
//! failures reading the source file.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

use digest::Digest as _;

/// Minimum buffer size used when streaming a file through a digest.
pub const READ_BUFFER_LEN: usize = 64 * 1024;

/// A digest algorithm recognized by the engine.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum DigestKind {
    /// SHA-1, 20-byte output.
    Sha1,
    /// SHA-256, 32-byte output.
    Sha256,
    /// SHA-512, 64-byte output.
    Sha512,
    /// MD5, 16-byte output.
    Md5,
    /// No digest; always produces an empty byte string.
    None,
}

/// Error produced when a digest name cannot be resolved.
#[derive(Debug, thiserror::Error)]
#[error("unrecognized digest name: {0}")]
pub struct UnknownDigestKind(String);

impl FromStr for DigestKind {
    type Err = UnknownDigestKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            "sha512" => Ok(Self::Sha512),
            "md5" => Ok(Self::Md5),
            "none" => Ok(Self::None),
            other => Err(UnknownDigestKind(other.to_string())),
        }
    }
}

impl DigestKind {
    /// Returns the canonical lowercase name for this digest kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
            Self::Md5 => "md5",
            Self::None => "none",
        }
    }
}

/// Errors raised while computing a file digest.
#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    /// The digest name did not resolve to a known algorithm.
    #[error(transparent)]
    UnknownKind(#[from] UnknownDigestKind),
    /// Reading the source file failed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file being digested.
        path: std::path::PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

enum Hasher {
    Sha1(sha1::Sha1),
    Sha256(sha2::Sha256),
    Sha512(sha2::Sha512),
    Md5(md5::Md5),
    None,
}

impl Hasher {
    fn new(kind: DigestKind) -> Self {
        match kind {
            DigestKind::Sha1 => Self::Sha1(sha1::Sha1::new()),
            DigestKind::Sha256 => Self::Sha256(sha2::Sha256::new()),
            DigestKind::Sha512 => Self::Sha512(sha2::Sha512::new()),
            DigestKind::Md5 => Self::Md5(md5::Md5::new()),
            DigestKind::None => Self::None,
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha1(h) => h.update(data),
            Self::Sha256(h) => h.update(data),
            Self::Sha512(h) => h.update(data),
            Self::Md5(h) => h.update(data),
            Self::None => {}
        }
    }

    fn finalize(self) -> Vec<u8> {
        match self {
            Self::Sha1(h) => h.finalize().to_vec(),
            Self::Sha256(h) => h.finalize().to_vec(),
            Self::Sha512(h) => h.finalize().to_vec(),
            Self::Md5(h) => h.finalize().to_vec(),
            Self::None => Vec::new(),
        }
    }
}

/// Streams `path` through the digest named by `kind` and returns the raw
/// digest bytes.
pub fn digest_file(path: &Path, kind: DigestKind) -> Result<Vec<u8>, DigestError> {
    let mut file = File::open(path).map_err(|e| DigestError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut hasher = Hasher::new(kind);
    let mut buffer = [0u8; READ_BUFFER_LEN];
    loop {
        let read = file.read(&mut buffer).map_err(|e| DigestError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hasher.finalize())
}

/// Encodes `bytes` as uppercase hexadecimal.
#[must_use]
pub fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{b:02X}"));
    }
    out
}

/// Decodes a hexadecimal string, accepting either case.
///
/// Returns `None` if the string has an odd length or contains a non-hex
/// character.
#[must_use]
pub fn from_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len() / 2);
    let mut idx = 0;
    while idx < bytes.len() {
        let hi = (bytes[idx] as char).to_digit(16)?;
        let lo = (bytes[idx + 1] as char).to_digit(16)?;
        out.push(((hi << 4) | lo) as u8);
        idx += 2;
    }
    Some(out)
}
