#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! The backup pipeline's external-memory checksum manifest: one
//! `path NUL hex_digest LF` entry per tracked file, sorted lexicographically
//! by path once a run completes. The orchestrator consults it to decide
//! which files changed since the last run, and a sorted manifest from one
//! run becomes the "prior manifest" the next run searches against.
//!
//! # Design
//!
//! The manifest is assumed too large to sort in memory. [`Manifest::sort_in_place`]
//! implements a two-phase external merge sort: [`sort::generate_runs`] buffers
//! entries up to [`Manifest::max_run_bytes`], sorts each batch with a
//! quicksort using median-of-three pivot selection, and spills it to a
//! temp file; [`sort::merge_runs`] then k-way merges the runs through a
//! min-heap. [`Manifest::search`] bisects a sorted manifest by byte offset,
//! falling back to a linear scan once the window shrinks below
//! [`Manifest::bsearch_threshold`] bytes, since variable-length entries mean
//! bisection alone can straddle the target near a window's edges.
//!
//! # Invariants
//!
//! - [`Manifest::sort_in_place`] leaves `path` sorted on success and
//!   byte-identical to its pre-call contents on failure.
//! - A sorted manifest's entries are in non-decreasing order by path; all
//!   other operations in this crate assume that invariant holds for any
//!   manifest they search.
//!
//! # Errors
//!
//! Every fallible operation returns [`ManifestError`], which distinguishes
//! a path-attributed I/O failure from a malformed manifest stream.

mod entry;
mod removed;
mod search;
mod sort;

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use digest::DigestKind;
use fsutil::TempFile;

pub use entry::{read_entry, serialized_len, write_entry, Entry};
pub use removed::{write_removed_entry, RemovedIter};
pub use sort::{generate_runs, merge_runs, quicksort};

/// Default run-generation budget for [`Manifest::default`]: 64 MiB.
pub const DEFAULT_MAX_RUN_BYTES: usize = 64 * 1024 * 1024;

/// Default binary-search-to-linear-scan threshold for [`Manifest::default`]:
/// 512 bytes.
pub const DEFAULT_BSEARCH_THRESHOLD: u64 = 512;

/// Errors raised by manifest operations.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// An I/O operation on `path` failed.
    #[error("{path}: {source}")]
    Io {
        /// The manifest or scratch file the failing operation targeted.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// A read or write against an in-flight stream failed, independent of
    /// any single named path (e.g. the manifest writer the orchestrator
    /// is actively appending to).
    #[error(transparent)]
    Stream(#[from] io::Error),
    /// Computing a file's digest failed.
    #[error(transparent)]
    Digest(#[from] digest::DigestError),
    /// A filesystem helper (rename, temp file) failed.
    #[error(transparent)]
    Fs(#[from] fsutil::FsError),
}

impl ManifestError {
    fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// The outcome of [`Manifest::incremental_write`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Decision {
    /// The file's digest matched the prior manifest; nothing was written.
    Unchanged,
    /// The file is new or its digest changed; a fresh entry was written.
    Changed,
}

/// The manifest engine's tunable parameters.
///
/// Construct with [`Manifest::new`], or use [`Manifest::default`] for the
/// production defaults ([`DEFAULT_MAX_RUN_BYTES`], [`DEFAULT_BSEARCH_THRESHOLD`]).
/// Tests typically construct a [`Manifest`] with a much smaller
/// `max_run_bytes` to exercise multiple runs without huge fixtures.
#[derive(Clone, Copy, Debug)]
pub struct Manifest {
    max_run_bytes: usize,
    bsearch_threshold: u64,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            max_run_bytes: DEFAULT_MAX_RUN_BYTES,
            bsearch_threshold: DEFAULT_BSEARCH_THRESHOLD,
        }
    }
}

impl Manifest {
    /// Builds a manifest engine with explicit tuning parameters.
    #[must_use]
    pub const fn new(max_run_bytes: usize, bsearch_threshold: u64) -> Self {
        Self {
            max_run_bytes,
            bsearch_threshold,
        }
    }

    /// Sorts the manifest at `path` in place.
    ///
    /// `path` is renamed aside first; the sorted output is built fresh at
    /// the original path. On any failure, the original contents are
    /// restored by renaming the scratch copy back, and the error is
    /// returned.
    pub fn sort_in_place(&self, path: &Path) -> Result<(), ManifestError> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        let scratch = TempFile::new(Some(parent))?;
        fsutil::rename_file(path, scratch.path())?;

        if let Err(e) = self.rebuild_sorted(path, scratch.path(), parent) {
            let _ = fsutil::rename_file(scratch.path(), path);
            return Err(e);
        }
        Ok(())
    }

    fn rebuild_sorted(&self, path: &Path, scratch: &Path, run_dir: &Path) -> Result<(), ManifestError> {
        let mut input =
            BufReader::new(File::open(scratch).map_err(|e| ManifestError::io(scratch, e))?);
        let runs = sort::generate_runs(&mut input, self.max_run_bytes, run_dir)
            .map_err(|e| ManifestError::io(scratch, e))?;

        let mut output =
            BufWriter::new(File::create(path).map_err(|e| ManifestError::io(path, e))?);
        sort::merge_runs(&runs, &mut output).map_err(|e| ManifestError::io(path, e))?;
        output.flush().map_err(|e| ManifestError::io(path, e))?;
        Ok(())
    }

    /// Searches the sorted manifest at `path` for `key`.
    pub fn search(&self, path: &Path, key: &str) -> Result<Option<String>, ManifestError> {
        let mut file = File::open(path).map_err(|e| ManifestError::io(path, e))?;
        search::search(&mut file, key, self.bsearch_threshold).map_err(|e| ManifestError::io(path, e))
    }

    /// Decides whether `source_file` (recorded under `manifest_path`) has
    /// changed since `prior_manifest`, writing a fresh entry to
    /// `stream_out` when it has.
    ///
    /// `manifest_path` is the path as it will be recorded in the manifest
    /// (typically relative to a configured source root); `source_file` is
    /// the absolute path to read and digest.
    pub fn incremental_write<W: Write>(
        &self,
        stream_out: &mut W,
        manifest_path: &str,
        source_file: &Path,
        digest_kind: DigestKind,
        prior_manifest: Option<&Path>,
    ) -> Result<Decision, ManifestError> {
        let digest_bytes = digest::digest_file(source_file, digest_kind)?;
        let hex_digest = digest::to_hex(&digest_bytes);

        if let Some(prior_path) = prior_manifest {
            if prior_path.exists() {
                if let Some(prior_digest) = self.search(prior_path, manifest_path)? {
                    if prior_digest == hex_digest {
                        return Ok(Decision::Unchanged);
                    }
                }
            }
        }

        write_entry(
            stream_out,
            &Entry {
                path: manifest_path.to_string(),
                hex_digest,
            },
        )?;
        Ok(Decision::Changed)
    }
}
