#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! A depth-first directory walker that yields one non-directory file per
//! [`DirWalker::next`] call, lazily, without building a full file list up
//! front. The orchestrator drives one walker per configured source root.
//!
//! # Design
//!
//! The walker is a stack of open [`std::fs::ReadDir`] handles, one per
//! directory on the current path from the root. `next` repeatedly pulls
//! the next directory entry off the top of the stack: a subdirectory is
//! pushed (descended into immediately, depth-first) and a file is returned.
//! When a directory's entries are exhausted, its handle is popped and the
//! walk resumes in the parent.
//!
//! # Invariants
//!
//! - Symbolic links are reported as ordinary files, never followed: the
//!   walker uses [`std::fs::symlink_metadata`] (`lstat`), not
//!   [`std::fs::metadata`] (`stat`), to classify each entry.
//! - Entries within one directory are yielded in the underlying
//!   filesystem's enumeration order; the walker never sorts them.
//! - A directory that fails to open is logged and skipped; the walk
//!   continues with the remaining stack.

use std::fs::{self, ReadDir};
use std::path::{Path, PathBuf};

/// A depth-first, lazily-advancing directory walker.
pub struct DirWalker {
    stack: Vec<ReadDir>,
}

impl DirWalker {
    /// Starts a walk rooted at `root`.
    ///
    /// If `root` itself cannot be opened as a directory, the walker starts
    /// empty and the first [`DirWalker::next`] call returns `None` — the
    /// caller is expected to have already validated that `root` is usable,
    /// or to treat an immediately-empty walker as "this source root failed
    /// to open".
    #[must_use]
    pub fn start(root: &Path) -> Self {
        let mut stack = Vec::new();
        match fs::read_dir(root) {
            Ok(entries) => stack.push(entries),
            Err(e) => {
                logging::warn_log!("{}: failed to open directory: {e}", root.display());
            }
        }
        Self { stack }
    }

    /// Pops the directory currently being walked, resuming in its parent.
    ///
    /// A no-op if the stack is already empty (the walk is already
    /// exhausted).
    pub fn skip_current_dir(&mut self) {
        self.stack.pop();
    }

    /// Returns the next non-directory file's absolute path, or `None` when
    /// every directory on the stack has been exhausted.
    pub fn next(&mut self) -> Option<PathBuf> {
        loop {
            let top = self.stack.last_mut()?;
            match top.next() {
                None => {
                    self.stack.pop();
                }
                Some(Err(e)) => {
                    logging::warn_log!("failed to read directory entry: {e}");
                }
                Some(Ok(entry)) => {
                    let path = entry.path();
                    match fs::symlink_metadata(&path) {
                        Ok(meta) if meta.is_dir() => match fs::read_dir(&path) {
                            Ok(entries) => self.stack.push(entries),
                            Err(e) => {
                                logging::warn_log!("{}: failed to open directory: {e}", path.display());
                            }
                        },
                        Ok(_) => return Some(path),
                        Err(e) => {
                            logging::warn_log!("{}: failed to stat entry: {e}", path.display());
                        }
                    }
                }
            }
        }
    }
}

impl Iterator for DirWalker {
    type Item = PathBuf;

    fn next(&mut self) -> Option<Self::Item> {
        Self::next(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as stdfs;
    use std::os::unix::fs::symlink;

    fn sorted(mut v: Vec<PathBuf>) -> Vec<PathBuf> {
        v.sort();
        v
    }

    #[test]
    fn walks_nested_directories_depth_first() {
        let dir = tempfile::tempdir().unwrap();
        stdfs::create_dir_all(dir.path().join("a/b")).unwrap();
        stdfs::write(dir.path().join("a/b/f1.txt"), b"1").unwrap();
        stdfs::write(dir.path().join("a/f2.txt"), b"2").unwrap();
        stdfs::write(dir.path().join("f3.txt"), b"3").unwrap();

        let walker = DirWalker::start(dir.path());
        let found = sorted(walker.collect());

        assert_eq!(
            found,
            sorted(vec![
                dir.path().join("a/b/f1.txt"),
                dir.path().join("a/f2.txt"),
                dir.path().join("f3.txt"),
            ])
        );
    }

    #[test]
    fn symlinks_are_reported_not_followed() {
        let dir = tempfile::tempdir().unwrap();
        stdfs::write(dir.path().join("real.txt"), b"data").unwrap();
        symlink(dir.path().join("real.txt"), dir.path().join("link.txt")).unwrap();

        let walker = DirWalker::start(dir.path());
        let found = sorted(walker.collect());

        assert_eq!(
            found,
            sorted(vec![dir.path().join("real.txt"), dir.path().join("link.txt")])
        );
    }

    #[test]
    fn symlink_to_directory_is_not_descended_into() {
        let dir = tempfile::tempdir().unwrap();
        stdfs::create_dir(dir.path().join("real_dir")).unwrap();
        stdfs::write(dir.path().join("real_dir/inner.txt"), b"data").unwrap();
        symlink(dir.path().join("real_dir"), dir.path().join("link_dir")).unwrap();

        let walker = DirWalker::start(dir.path());
        let found = sorted(walker.collect());

        assert_eq!(
            found,
            sorted(vec![
                dir.path().join("real_dir/inner.txt"),
                dir.path().join("link_dir"),
            ])
        );
    }

    #[test]
    fn empty_directory_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut walker = DirWalker::start(dir.path());
        assert_eq!(walker.next(), None);
    }

    #[test]
    fn missing_root_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut walker = DirWalker::start(&dir.path().join("does-not-exist"));
        assert_eq!(walker.next(), None);
    }

    #[test]
    fn skip_current_dir_pops_the_top_of_the_stack() {
        let dir = tempfile::tempdir().unwrap();
        stdfs::write(dir.path().join("top.txt"), b"2").unwrap();

        let mut walker = DirWalker::start(dir.path());
        walker.skip_current_dir();
        assert_eq!(walker.next(), None);
    }

    #[test]
    fn sibling_directories_are_both_descended() {
        let dir = tempfile::tempdir().unwrap();
        stdfs::create_dir(dir.path().join("a")).unwrap();
        stdfs::create_dir(dir.path().join("b")).unwrap();
        stdfs::write(dir.path().join("a/one.txt"), b"1").unwrap();
        stdfs::write(dir.path().join("b/two.txt"), b"2").unwrap();

        let walker = DirWalker::start(dir.path());
        let found = sorted(walker.collect());

        assert_eq!(
            found,
            sorted(vec![dir.path().join("a/one.txt"), dir.path().join("b/two.txt")])
        );
    }
}
