#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! A uniform cloud-mirror contract the orchestrator drives after every
//! local artifact write. A [`CloudProvider`] resolves credentials into a
//! [`CloudSession`] exposing the raw capability set (`mkdir`, `stat`,
//! `rename`, `upload`, `download`, `remove`); [`none::NoneProvider`] is a
//! no-op implementation so the orchestrator never special-cases "no cloud
//! configured".
//!
//! # Design
//!
//! On top of the raw per-session capabilities, this crate provides the
//! mirror-layer helpers the orchestrator actually calls:
//! [`cloud_mkdir_p`] walks [`pathutil::parent_dirs`] creating each missing
//! level; [`cloud_rename_safe`] refuses a rename unless the source exists
//! and the destination does not; [`cloud_upload_artifact`] composes both
//! to rotate a remote artifact into its delta path before uploading the
//! replacement, mirroring the local `files/`/`deltas/` rotation exactly.
//!
//! # Invariants
//!
//! - Every helper here is best-effort: a failing cloud step is logged via
//!   [`logging::warn_log!`] and returned as a [`CloudError`] the caller may
//!   choose to ignore, never panics, and never blocks the local snapshot
//!   from being authoritative.
//! - [`none::NoneProvider`]'s session reports every path absent and every
//!   operation successful, so callers that loop over "does this file
//!   exist remotely" never need a `provider == none` branch.
//!
//! # Errors
//!
//! [`CloudError`] distinguishes a transport failure from a contract
//! violation (rename onto an existing destination, rename of a missing
//! source) so callers can decide whether a retry is meaningful.

pub mod none;

#[cfg(feature = "mega")]
pub mod mega;

use std::path::Path;

pub use none::NoneProvider;

#[cfg(feature = "mega")]
pub use mega::MegaProvider;

/// Errors raised by a cloud provider or the mirror-layer helpers.
#[derive(Debug, thiserror::Error)]
pub enum CloudError {
    /// The provider could not establish a session with the given
    /// credentials.
    #[error("cloud login failed: {0}")]
    Login(String),
    /// A transport-level failure (network, HTTP status, timeout).
    #[error("{path}: {reason}")]
    Transport {
        /// The remote path the failing operation targeted.
        path: String,
        /// A human-readable description of the failure.
        reason: String,
    },
    /// [`CloudSession::rename`] was asked to rename a path that does not
    /// exist.
    #[error("rename source does not exist: {0}")]
    RenameSourceMissing(String),
    /// [`CloudSession::rename`] was asked to rename onto a path that
    /// already exists.
    #[error("rename destination already exists: {0}")]
    RenameDestinationExists(String),
    /// A local filesystem operation backing the provider failed.
    #[error(transparent)]
    Fs(#[from] fsutil::FsError),
}

/// Metadata about one remote entry, as returned by [`CloudSession::stat`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CloudStat {
    /// Whether the entry is a directory.
    pub is_dir: bool,
    /// Size in bytes (meaningless for directories).
    pub size: u64,
    /// Last-modified time, as a Unix epoch second count.
    pub mtime: u64,
}

/// Credentials used to establish a [`CloudSession`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Credentials {
    /// The account username or access key.
    pub user: String,
    /// The account password or secret key.
    pub pass: String,
}

impl Credentials {
    /// Builds a credential pair.
    #[must_use]
    pub fn new(user: impl Into<String>, pass: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            pass: pass.into(),
        }
    }
}

/// An established session with a cloud provider.
///
/// Every method takes `&mut self` rather than the pseudocode's explicit
/// `session` parameter — the session itself carries whatever per-request
/// client/token state the provider needs.
pub trait CloudSession {
    /// Creates a single directory level at `path`. The parent must already
    /// exist; callers requiring a full path should use [`cloud_mkdir_p`].
    fn mkdir(&mut self, path: &str) -> Result<(), CloudError>;

    /// Lists the entries directly under `path`.
    fn readdir(&mut self, path: &str) -> Result<Vec<String>, CloudError>;

    /// Returns metadata for `path`, or `None` if it does not exist.
    fn stat(&mut self, path: &str) -> Result<Option<CloudStat>, CloudError>;

    /// Renames `old` to `new`. Requires `old` to exist and `new` to be
    /// absent; violating either is a [`CloudError`], not a silent no-op.
    fn rename(&mut self, old: &str, new: &str) -> Result<(), CloudError>;

    /// Uploads `local_src` to `remote_dst`.
    fn upload(&mut self, local_src: &Path, remote_dst: &str) -> Result<(), CloudError>;

    /// Downloads `remote_src` to `local_dst`.
    fn download(&mut self, remote_src: &str, local_dst: &Path) -> Result<(), CloudError>;

    /// Removes the entry at `remote_path`.
    fn remove(&mut self, remote_path: &str) -> Result<(), CloudError>;

    /// Tears down the session. Consumes `self` since most providers cannot
    /// be usefully reused after logout.
    fn logout(self: Box<Self>) -> Result<(), CloudError>;
}

/// A cloud backend, resolving credentials into a live [`CloudSession`].
pub trait CloudProvider {
    /// Logs in with `creds` (or anonymously, for providers that support
    /// it) and returns an open session.
    fn login(&self, creds: Option<&Credentials>) -> Result<Box<dyn CloudSession>, CloudError>;
}

/// Walks [`pathutil::parent_dirs`] of `remote_path` from shortest to
/// longest, creating each missing level.
///
/// Existing prefixes are skipped via [`CloudSession::stat`]; a failure to
/// create one level is logged and the walk continues with the next,
/// matching spec.md's "continues past failures with a warning" mkdir -p
/// semantics (a later `mkdir` of a child level may still succeed even if
/// an ancestor's `mkdir` raced with another writer and failed).
pub fn cloud_mkdir_p(session: &mut dyn CloudSession, remote_path: &str) -> Result<(), CloudError> {
    for level in pathutil::parent_dirs(remote_path) {
        match session.stat(level) {
            Ok(Some(_)) => continue,
            Ok(None) => {
                if let Err(e) = session.mkdir(level) {
                    logging::warn_log!("cloud mkdir {level}: {e}");
                }
            }
            Err(e) => {
                logging::warn_log!("cloud stat {level}: {e}");
            }
        }
    }
    Ok(())
}

/// Renames `old` to `new`, refusing if `new` already exists or `old` is
/// absent rather than silently overwriting or no-op'ing.
pub fn cloud_rename_safe(session: &mut dyn CloudSession, old: &str, new: &str) -> Result<(), CloudError> {
    if session.stat(old)?.is_none() {
        return Err(CloudError::RenameSourceMissing(old.to_string()));
    }
    if session.stat(new)?.is_some() {
        return Err(CloudError::RenameDestinationExists(new.to_string()));
    }
    session.rename(old, new)
}

/// Mirrors a locally-written artifact to the cloud, rotating any existing
/// remote artifact into its delta path first.
///
/// 1. `cloud_mkdir_p(parent(remote_files_path))`.
/// 2. If `remote_files_path` exists, rename it to `remote_deltas_path`
///    (creating that path's parent first).
/// 3. Upload `local` to `remote_files_path`.
pub fn cloud_upload_artifact(
    session: &mut dyn CloudSession,
    local: &Path,
    remote_files_path: &str,
    remote_deltas_path: &str,
) -> Result<(), CloudError> {
    if let Some(parent) = pathutil::parent(remote_files_path) {
        cloud_mkdir_p(session, parent)?;
    }

    if session.stat(remote_files_path)?.is_some() {
        if let Some(parent) = pathutil::parent(remote_deltas_path) {
            cloud_mkdir_p(session, parent)?;
        }
        if let Err(e) = cloud_rename_safe(session, remote_files_path, remote_deltas_path) {
            logging::warn_log!("cloud rename {remote_files_path} -> {remote_deltas_path}: {e}");
        }
    }

    session.upload(local, remote_files_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeSession {
        entries: Mutex<HashMap<String, Vec<u8>>>,
        mkdir_calls: Mutex<Vec<String>>,
    }

    impl CloudSession for FakeSession {
        fn mkdir(&mut self, path: &str) -> Result<(), CloudError> {
            self.mkdir_calls.lock().unwrap().push(path.to_string());
            self.entries.lock().unwrap().entry(path.to_string()).or_default();
            Ok(())
        }

        fn readdir(&mut self, path: &str) -> Result<Vec<String>, CloudError> {
            let prefix = format!("{path}/");
            Ok(self
                .entries
                .lock()
                .unwrap()
                .keys()
                .filter(|k| k.starts_with(&prefix))
                .cloned()
                .collect())
        }

        fn stat(&mut self, path: &str) -> Result<Option<CloudStat>, CloudError> {
            Ok(self.entries.lock().unwrap().get(path).map(|bytes| CloudStat {
                is_dir: bytes.is_empty(),
                size: bytes.len() as u64,
                mtime: 0,
            }))
        }

        fn rename(&mut self, old: &str, new: &str) -> Result<(), CloudError> {
            let mut entries = self.entries.lock().unwrap();
            let value = entries
                .remove(old)
                .ok_or_else(|| CloudError::RenameSourceMissing(old.to_string()))?;
            entries.insert(new.to_string(), value);
            Ok(())
        }

        fn upload(&mut self, local_src: &Path, remote_dst: &str) -> Result<(), CloudError> {
            let bytes = std::fs::read(local_src).map_err(|e| CloudError::Transport {
                path: remote_dst.to_string(),
                reason: e.to_string(),
            })?;
            self.entries.lock().unwrap().insert(remote_dst.to_string(), bytes);
            Ok(())
        }

        fn download(&mut self, remote_src: &str, local_dst: &Path) -> Result<(), CloudError> {
            let entries = self.entries.lock().unwrap();
            let bytes = entries.get(remote_src).ok_or_else(|| CloudError::Transport {
                path: remote_src.to_string(),
                reason: "not found".to_string(),
            })?;
            std::fs::write(local_dst, bytes).map_err(|e| CloudError::Transport {
                path: remote_src.to_string(),
                reason: e.to_string(),
            })
        }

        fn remove(&mut self, remote_path: &str) -> Result<(), CloudError> {
            self.entries.lock().unwrap().remove(remote_path);
            Ok(())
        }

        fn logout(self: Box<Self>) -> Result<(), CloudError> {
            Ok(())
        }
    }

    #[test]
    fn mkdir_p_creates_every_missing_level() {
        let mut session = FakeSession::default();
        cloud_mkdir_p(&mut session, "/a/b/c").unwrap();
        assert_eq!(
            *session.mkdir_calls.lock().unwrap(),
            vec!["/a".to_string(), "/a/b".to_string(), "/a/b/c".to_string()]
        );
    }

    #[test]
    fn mkdir_p_skips_existing_prefixes() {
        let mut session = FakeSession::default();
        session.mkdir("/a").unwrap();
        cloud_mkdir_p(&mut session, "/a/b").unwrap();
        assert_eq!(*session.mkdir_calls.lock().unwrap(), vec!["/a/b".to_string()]);
    }

    #[test]
    fn rename_safe_rejects_missing_source() {
        let mut session = FakeSession::default();
        let err = cloud_rename_safe(&mut session, "/missing", "/new").unwrap_err();
        assert!(matches!(err, CloudError::RenameSourceMissing(_)));
    }

    #[test]
    fn rename_safe_rejects_existing_destination() {
        let mut session = FakeSession::default();
        session.mkdir("/old").unwrap();
        session.mkdir("/new").unwrap();
        let err = cloud_rename_safe(&mut session, "/old", "/new").unwrap_err();
        assert!(matches!(err, CloudError::RenameDestinationExists(_)));
    }

    #[test]
    fn upload_artifact_rotates_existing_remote_into_delta() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("artifact.bin");
        std::fs::write(&local, b"version 2").unwrap();

        let mut session = FakeSession::default();
        session.upload(&{
            let first = dir.path().join("v1.bin");
            std::fs::write(&first, b"version 1").unwrap();
            first
        }, "/remote/files/a.txt").unwrap();

        cloud_upload_artifact(&mut session, &local, "/remote/files/a.txt", "/remote/deltas/a.txt.100").unwrap();

        let entries = session.entries.lock().unwrap();
        assert_eq!(entries.get("/remote/files/a.txt").unwrap(), b"version 2");
        assert_eq!(entries.get("/remote/deltas/a.txt.100").unwrap(), b"version 1");
    }

    #[test]
    fn upload_artifact_with_no_prior_remote_just_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("artifact.bin");
        std::fs::write(&local, b"only version").unwrap();

        let mut session = FakeSession::default();
        cloud_upload_artifact(&mut session, &local, "/remote/files/a.txt", "/remote/deltas/a.txt.100").unwrap();

        let entries = session.entries.lock().unwrap();
        assert_eq!(entries.get("/remote/files/a.txt").unwrap(), b"only version");
        assert!(!entries.contains_key("/remote/deltas/a.txt.100"));
    }
}
