//! The CLI's top-level error type, wrapping every stage that can fail
//! before or after the orchestrator runs.

use std::path::PathBuf;

use digest::UnknownDigestKind;
use compress::UnknownCodec;
use orchestrator::config::ConfigError;
use orchestrator::options::UnknownCloudProvider;
use orchestrator::BackupError;

#[cfg(feature = "cipher")]
use cipher::UnknownCipherKind;

/// Everything that can go wrong resolving arguments, loading a config, or
/// running a backup.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// No destination was given, either on the command line or in a loaded
    /// config file.
    #[error("no output destination given (use --output or a config file)")]
    MissingOutput,
    /// The `--digest` value did not resolve to a known algorithm.
    #[error(transparent)]
    InvalidDigest(#[from] UnknownDigestKind),
    /// The `--compressor` value did not resolve to a known, enabled codec.
    #[error(transparent)]
    InvalidCompressor(#[from] UnknownCodec),
    /// The `--cipher` value did not resolve to a known algorithm.
    #[cfg(feature = "cipher")]
    #[error(transparent)]
    InvalidCipher(#[from] UnknownCipherKind),
    /// The `--cloud-provider` value did not resolve to a known backend.
    #[error(transparent)]
    InvalidCloudProvider(#[from] UnknownCloudProvider),
    /// Loading or saving a config file failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Reading a password from the terminal or standard input failed.
    #[cfg(feature = "cipher")]
    #[error(transparent)]
    Password(#[from] crate::password::PasswordError),
    /// The backup run itself failed fatally.
    #[error(transparent)]
    Backup(#[from] BackupError),
    /// A config file was expected to exist but its parent directory could
    /// not be created.
    #[error("failed to create parent directory of {path}: {source}")]
    CreateConfigParent {
        /// The config file path whose parent could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
