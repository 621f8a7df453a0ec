//! The top-level error a backup run can fail with.
//!
//! Only failures that invalidate the whole snapshot reach here — per-file
//! and per-cloud-operation failures are logged at their call site and the
//! run continues, per spec.md §7's taxonomy.

/// A failure fatal to the whole run: the destination could not be
/// prepared, the manifest could not be opened, or every configured source
/// root failed to open.
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    /// The destination snapshot root could not be created.
    #[error("failed to create destination root {path}: {source}")]
    CreateDestRoot {
        /// The snapshot root that failed to create.
        path: std::path::PathBuf,
        /// The underlying error.
        #[source]
        source: fsutil::FsError,
    },
    /// The new manifest file could not be opened for writing.
    #[error("failed to open manifest {path}: {source}")]
    OpenManifest {
        /// The manifest path.
        path: std::path::PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Every configured source root failed to open; there was nothing to
    /// walk.
    #[error("no configured source directory could be opened")]
    NoSourcesOpened,
    /// Sorting the completed manifest failed.
    #[error("failed to sort manifest: {0}")]
    Sort(#[from] manifest::ManifestError),
}
