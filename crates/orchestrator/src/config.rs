//! On-disk persistence of a run's configuration.
//!
//! `BackupConfig` is a `serde_json`-serializable mirror of [`Options`]
//! (spec.md §4.12's in-memory record), excluding every secret: passwords
//! are prompted or read from the environment at run time and are never
//! written to disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use compress::{CompFlags, Codec, Level};
use digest::DigestKind;

use crate::options::{CloudProviderKind, CloudTarget, Options};

#[cfg(feature = "cipher")]
use cipher::CipherKind;

/// Errors raised while loading or saving a [`BackupConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Reading or writing the config file failed.
    #[error("{path}: {source}")]
    Io {
        /// The config file path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file's contents did not parse as a valid `BackupConfig`.
    #[error("{path}: {source}")]
    Json {
        /// The config file path.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
    /// A field's value did not resolve to a known enum variant.
    #[error("{0}")]
    InvalidField(String),
}

/// The cloud section of a persisted [`BackupConfig`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CloudConfig {
    /// Which provider to mirror to (`none` or `mega`).
    pub provider: String,
    /// The remote root path artifacts are mirrored under.
    #[serde(default)]
    pub remote_root: String,
}

/// The serializable mirror of [`Options`], excluding secrets.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BackupConfig {
    /// Source directories to walk.
    pub directories: Vec<PathBuf>,
    /// Exclude prefixes.
    #[serde(default)]
    pub exclude: Vec<PathBuf>,
    /// The digest algorithm name.
    pub digest: String,
    /// The compressor name.
    pub compressor: String,
    /// Compression level, `0..=9`.
    #[serde(default)]
    pub comp_level: u32,
    /// Whether the xz `extreme` flag is set.
    #[serde(default)]
    pub xz_extreme: bool,
    /// The cipher name, or `null` for no encryption.
    #[serde(default)]
    pub cipher: Option<String>,
    /// The destination snapshot root.
    pub output_root: PathBuf,
    /// The cloud mirror target.
    #[serde(default)]
    pub cloud: CloudConfig,
    /// The verbosity flag.
    #[serde(default)]
    pub verbose: bool,
}

impl BackupConfig {
    /// Loads a config document from `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&text).map_err(|e| ConfigError::Json {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Serializes this config as pretty-printed JSON and writes it to
    /// `path`, truncating any existing content.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = serde_json::to_string_pretty(self).map_err(|e| ConfigError::Json {
            path: path.to_path_buf(),
            source: e,
        })?;
        fs::write(path, text).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Builds the in-memory [`Options`] record this config describes.
    ///
    /// `password` is supplied separately — it is never part of the
    /// persisted document.
    #[cfg(feature = "cipher")]
    pub fn to_options(&self, password: Option<cipher::Secret>) -> Result<Options, ConfigError> {
        let digest_kind = self
            .digest
            .parse::<DigestKind>()
            .map_err(|e| ConfigError::InvalidField(e.to_string()))?;
        let compressor = self
            .compressor
            .parse::<Codec>()
            .map_err(|e| ConfigError::InvalidField(e.to_string()))?;
        let cipher_kind = self
            .cipher
            .as_deref()
            .map(str::parse::<CipherKind>)
            .transpose()
            .map_err(|e| ConfigError::InvalidField(e.to_string()))?;
        let provider = self
            .cloud
            .provider
            .parse::<CloudProviderKind>()
            .map_err(|e| ConfigError::InvalidField(e.to_string()))?;

        let mut flags = CompFlags::NONE;
        if self.xz_extreme {
            flags = flags.union(CompFlags::XZ_EXTREME);
        }

        Ok(Options {
            directories: self.directories.clone(),
            exclude: self.exclude.clone(),
            digest_kind,
            cipher_kind,
            password,
            compressor,
            comp_level: Level::new(self.comp_level),
            comp_flags: flags,
            output_root: self.output_root.clone(),
            cloud_target: CloudTarget {
                provider,
                credentials: None,
                remote_root: self.cloud.remote_root.clone(),
            },
            verbose: self.verbose,
        })
    }

    /// Builds a [`BackupConfig`] from an in-memory [`Options`] record,
    /// dropping the password (and, with the `cipher` feature disabled,
    /// always recording no cipher).
    #[cfg(feature = "cipher")]
    #[must_use]
    pub fn from_options(options: &Options) -> Self {
        let mut flags_xz_extreme = false;
        if options.comp_flags.contains(CompFlags::XZ_EXTREME) {
            flags_xz_extreme = true;
        }
        Self {
            directories: options.directories.clone(),
            exclude: options.exclude.clone(),
            digest: options.digest_kind.name().to_string(),
            compressor: options.compressor.name().to_string(),
            comp_level: options.comp_level.raw(),
            xz_extreme: flags_xz_extreme,
            cipher: options.cipher_kind.map(|k| k.name().to_string()),
            output_root: options.output_root.clone(),
            cloud: CloudConfig {
                provider: options.cloud_target.provider.name().to_string(),
                remote_root: options.cloud_target.remote_root.clone(),
            },
            verbose: options.verbose,
        }
    }

    /// Builds the in-memory [`Options`] record this config describes.
    ///
    /// Equivalent to [`BackupConfig::to_options`] with the `cipher` feature
    /// disabled, where there is no password to thread through.
    #[cfg(not(feature = "cipher"))]
    pub fn to_options(&self) -> Result<Options, ConfigError> {
        let digest_kind = self
            .digest
            .parse::<DigestKind>()
            .map_err(|e| ConfigError::InvalidField(e.to_string()))?;
        let compressor = self
            .compressor
            .parse::<Codec>()
            .map_err(|e| ConfigError::InvalidField(e.to_string()))?;
        let provider = self
            .cloud
            .provider
            .parse::<CloudProviderKind>()
            .map_err(|e| ConfigError::InvalidField(e.to_string()))?;

        let mut flags = CompFlags::NONE;
        if self.xz_extreme {
            flags = flags.union(CompFlags::XZ_EXTREME);
        }

        Ok(Options {
            directories: self.directories.clone(),
            exclude: self.exclude.clone(),
            digest_kind,
            compressor,
            comp_level: Level::new(self.comp_level),
            comp_flags: flags,
            output_root: self.output_root.clone(),
            cloud_target: CloudTarget {
                provider,
                credentials: None,
                remote_root: self.cloud.remote_root.clone(),
            },
            verbose: self.verbose,
        })
    }

    /// Builds a [`BackupConfig`] from an in-memory [`Options`] record.
    ///
    /// Equivalent to [`BackupConfig::from_options`] with the `cipher`
    /// feature disabled, where a run never carries a cipher at all.
    #[cfg(not(feature = "cipher"))]
    #[must_use]
    pub fn from_options(options: &Options) -> Self {
        let mut flags_xz_extreme = false;
        if options.comp_flags.contains(CompFlags::XZ_EXTREME) {
            flags_xz_extreme = true;
        }
        Self {
            directories: options.directories.clone(),
            exclude: options.exclude.clone(),
            digest: options.digest_kind.name().to_string(),
            compressor: options.compressor.name().to_string(),
            comp_level: options.comp_level.raw(),
            xz_extreme: flags_xz_extreme,
            cipher: None,
            output_root: options.output_root.clone(),
            cloud: CloudConfig {
                provider: options.cloud_target.provider.name().to_string(),
                remote_root: options.cloud_target.remote_root.clone(),
            },
            verbose: options.verbose,
        }
    }
}

#[cfg(all(test, feature = "cipher"))]
mod tests {
    use super::*;

    fn sample() -> BackupConfig {
        BackupConfig {
            directories: vec![PathBuf::from("/src")],
            exclude: vec![PathBuf::from("/src/skip")],
            digest: "sha256".to_string(),
            compressor: "gzip".to_string(),
            comp_level: 6,
            xz_extreme: false,
            cipher: None,
            output_root: PathBuf::from("/out"),
            cloud: CloudConfig {
                provider: "none".to_string(),
                remote_root: String::new(),
            },
            verbose: false,
        }
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = sample();
        config.save(&path).unwrap();

        let loaded = BackupConfig::load(&path).unwrap();
        assert_eq!(loaded.directories, config.directories);
        assert_eq!(loaded.digest, config.digest);
    }

    #[test]
    fn to_options_resolves_enum_fields() {
        let config = sample();
        let options = config.to_options(None).unwrap();
        assert_eq!(options.digest_kind, DigestKind::Sha256);
        assert_eq!(options.compressor, Codec::Gzip);
        assert_eq!(options.comp_level.raw(), 6);
    }

    #[test]
    fn to_options_rejects_unknown_digest() {
        let mut config = sample();
        config.digest = "sha3".to_string();
        assert!(config.to_options(None).is_err());
    }

    #[test]
    fn from_options_never_carries_a_password() {
        let config = sample();
        let options = config.to_options(Some(cipher::Secret::new(b"pw".to_vec()))).unwrap();
        let roundtrip = BackupConfig::from_options(&options);
        let json = serde_json::to_string(&roundtrip).unwrap();
        assert!(!json.contains("pw"));
    }
}
