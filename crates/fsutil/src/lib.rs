#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! Filesystem primitives the orchestrator leans on for every artifact
//! write: a buffered copy, a rename that falls back to copy+unlink across
//! devices, a temp file that unlinks itself on drop, and recursive
//! mkdir/rmdir.
//!
//! # Invariants
//!
//! - [`TempFile`] unlinks its path on [`Drop`], whether or not the caller
//!   consumed the handle successfully.
//! - [`rename_file`] is atomic when source and destination share a device;
//!   otherwise it degrades to copy-then-unlink-source, which is not atomic
//!   and may leave both paths present if interrupted between the copy and
//!   the unlink.
//!
//! # Errors
//!
//! All fallible operations return [`FsError`], which wraps the underlying
//! [`std::io::Error`] with the path that failed.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Size of the buffer used by [`copy_file`].
pub const COPY_BUFFER_LEN: usize = 64 * 1024;

/// Errors produced by filesystem helpers.
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    /// An I/O operation on `path` failed.
    #[error("{path}: {source}")]
    Io {
        /// The path the failing operation targeted.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl FsError {
    fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Copies `src` to `dst` via a single buffered read/write loop, truncating
/// `dst` if it already exists.
pub fn copy_file(src: &Path, dst: &Path) -> Result<u64, FsError> {
    if src == dst {
        return fs::metadata(src)
            .map(|m| m.len())
            .map_err(|e| FsError::io(src, e));
    }
    let input = File::open(src).map_err(|e| FsError::io(src, e))?;
    let output = File::create(dst).map_err(|e| FsError::io(dst, e))?;
    let mut reader = BufReader::with_capacity(COPY_BUFFER_LEN, input);
    let mut writer = BufWriter::with_capacity(COPY_BUFFER_LEN, output);
    let mut buffer = [0u8; COPY_BUFFER_LEN];
    let mut total = 0u64;
    loop {
        let read = reader.read(&mut buffer).map_err(|e| FsError::io(src, e))?;
        if read == 0 {
            break;
        }
        writer
            .write_all(&buffer[..read])
            .map_err(|e| FsError::io(dst, e))?;
        total += read as u64;
    }
    writer.flush().map_err(|e| FsError::io(dst, e))?;
    Ok(total)
}

/// Renames `src` to `dst`, attempting a same-device rename first and
/// falling back to copy-then-unlink on cross-device failure.
pub fn rename_file(src: &Path, dst: &Path) -> Result<(), FsError> {
    if src == dst {
        return Ok(());
    }
    match fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(_) => {
            copy_file(src, dst)?;
            fs::remove_file(src).map_err(|e| FsError::io(src, e))?;
            Ok(())
        }
    }
}

/// Creates missing parent directories of `path`, equivalent to `mkdir -p`
/// on `path` itself (treating `path` as a directory, not a file).
pub fn mkdir_p(path: &Path) -> Result<(), FsError> {
    fs::create_dir_all(path).map_err(|e| FsError::io(path, e))
}

/// Removes a directory tree recursively. A missing `path` is not an error.
pub fn rmdir_recursive(path: &Path) -> Result<(), FsError> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(FsError::io(path, e)),
    }
}

/// A uniquely-named file in a scratch directory, unlinked on [`Drop`].
///
/// The file is created with [`tempfile`]-equivalent atomicity: the create
/// and open happen in one syscall, so no other process can race it onto
/// the same name.
pub struct TempFile {
    file: Option<File>,
    path: PathBuf,
}

impl TempFile {
    /// Creates a new uniquely-named file under `dir` (or the platform's
    /// scratch directory, if `dir` is `None`).
    ///
    /// Prefer a scratch directory that is not a RAM-backed filesystem when
    /// spilling large intermediate data (e.g. `/var/tmp` rather than
    /// `/tmp` on systems where the latter is `tmpfs`).
    pub fn new(dir: Option<&Path>) -> Result<Self, FsError> {
        let dir = dir.map_or_else(std::env::temp_dir, Path::to_path_buf);
        let mut builder = tempfile_handle(&dir)?;
        let path = builder.1;
        let file = builder.0.take().expect("just created");
        Ok(Self {
            file: Some(file),
            path,
        })
    }

    /// Returns the path of the temp file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns a mutable reference to the open file handle.
    pub fn file_mut(&mut self) -> &mut File {
        self.file.as_mut().expect("temp file handle already taken")
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        self.file.take();
        let _ = fs::remove_file(&self.path);
    }
}

fn tempfile_handle(dir: &Path) -> Result<(Option<File>, PathBuf), FsError> {
    use std::time::{SystemTime, UNIX_EPOCH};
    mkdir_p(dir)?;
    let pid = std::process::id();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    for attempt in 0u32..1024 {
        let candidate = dir.join(format!("snapvault-{pid}-{nanos}-{attempt}.tmp"));
        match fs::OpenOptions::new()
            .write(true)
            .read(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(file) => return Ok((Some(file), candidate)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(FsError::io(candidate, e)),
        }
    }
    Err(FsError::io(
        dir,
        io::Error::new(io::ErrorKind::AlreadyExists, "exhausted temp file attempts"),
    ))
}
