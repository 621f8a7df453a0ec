//! The in-memory configuration record one backup run consumes.

use std::path::PathBuf;
use std::str::FromStr;

use compress::{CompFlags, Codec, Level};
use digest::DigestKind;

#[cfg(feature = "cipher")]
use cipher::{CipherKind, Secret};

/// Which cloud backend a run mirrors artifacts to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Default)]
pub enum CloudProviderKind {
    /// No cloud mirror; the local snapshot is the only copy.
    #[default]
    None,
    /// The minimal HTTP object-store backend.
    Mega,
}

/// Error returned when a cloud provider name does not resolve.
#[derive(Debug, thiserror::Error)]
#[error("unrecognized cloud provider name: {0}")]
pub struct UnknownCloudProvider(String);

impl FromStr for CloudProviderKind {
    type Err = UnknownCloudProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "mega" => Ok(Self::Mega),
            other => Err(UnknownCloudProvider(other.to_string())),
        }
    }
}

impl CloudProviderKind {
    /// Returns the canonical lowercase name for this provider kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Mega => "mega",
        }
    }
}

/// The cloud mirror destination for a run.
#[derive(Clone, Debug, Default)]
pub struct CloudTarget {
    /// Which backend to mirror to.
    pub provider: CloudProviderKind,
    /// Credentials for the backend, if it requires any.
    pub credentials: Option<(String, String)>,
    /// The remote root path artifacts are mirrored under.
    pub remote_root: String,
}

/// The full configuration for one backup run.
///
/// Constructed by the `cli` crate from arguments and/or a persisted
/// [`crate::config::BackupConfig`], then handed to
/// [`crate::run::run_backup`] once.
pub struct Options {
    /// Source directories to walk, in the order they are processed.
    pub directories: Vec<PathBuf>,
    /// Absolute path prefixes the walker will not descend into.
    pub exclude: Vec<PathBuf>,
    /// The digest algorithm used to detect file changes.
    pub digest_kind: DigestKind,
    /// The cipher applied to each artifact after compression, if any.
    #[cfg(feature = "cipher")]
    pub cipher_kind: Option<CipherKind>,
    /// The password backing [`Options::cipher_kind`], if encryption is
    /// enabled.
    #[cfg(feature = "cipher")]
    pub password: Option<Secret>,
    /// The compression codec applied to every artifact.
    pub compressor: Codec,
    /// Compression level on the normalized `0..=9` scale.
    pub comp_level: Level,
    /// Codec-specific tuning flags.
    pub comp_flags: CompFlags,
    /// The destination snapshot root.
    pub output_root: PathBuf,
    /// The cloud mirror target, if configured.
    pub cloud_target: CloudTarget,
    /// Whether to emit one line per file written.
    pub verbose: bool,
}

impl Options {
    /// Returns whether `path` falls under any configured exclude prefix.
    #[must_use]
    pub fn is_excluded(&self, path: &std::path::Path) -> bool {
        self.exclude.iter().any(|prefix| path.starts_with(prefix))
    }
}
