//! Removed-list builder: scans a prior manifest for paths whose source
//! file no longer exists.

use std::fs::{self, File};
use std::io::{BufReader, Read, Write};
use std::path::Path;

use crate::entry::read_entry;

/// A streaming reader that yields one removed path per call.
///
/// Built over a prior manifest plus the directory each recorded path is
/// relative to; a path is yielded when [`std::fs::symlink_metadata`]
/// (`l-stat`) on the reconstructed absolute path returns "not found".
pub struct RemovedIter<R> {
    reader: R,
    source_root: std::path::PathBuf,
}

impl RemovedIter<BufReader<File>> {
    /// Opens `prior_manifest` and scans it against `source_root`.
    pub fn open(prior_manifest: &Path, source_root: &Path) -> std::io::Result<Self> {
        Ok(Self {
            reader: BufReader::new(File::open(prior_manifest)?),
            source_root: source_root.to_path_buf(),
        })
    }
}

impl<R: Read> RemovedIter<R> {
    /// Returns the next removed path, or `None` once the manifest is
    /// exhausted.
    pub fn next_removed(&mut self) -> std::io::Result<Option<String>> {
        loop {
            match read_entry(&mut self.reader)? {
                None => return Ok(None),
                Some(entry) => {
                    let absolute = self.source_root.join(&entry.path);
                    if fs::symlink_metadata(&absolute).is_err() {
                        return Ok(Some(entry.path));
                    }
                }
            }
        }
    }
}

/// Writes one removed-list entry: `path NUL LF`, the same framing as a
/// manifest entry with an empty digest.
pub fn write_removed_entry<W: Write>(stream: &mut W, path: &str) -> std::io::Result<()> {
    stream.write_all(path.as_bytes())?;
    stream.write_all(b"\0\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{write_entry, Entry};

    #[test]
    fn yields_only_paths_missing_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let source_root = dir.path().join("src");
        fs::create_dir_all(&source_root).unwrap();
        fs::write(source_root.join("kept.txt"), b"x").unwrap();

        let manifest_path = dir.path().join("checksums.txt.123");
        let mut manifest = File::create(&manifest_path).unwrap();
        for path in ["kept.txt", "gone.txt"] {
            write_entry(
                &mut manifest,
                &Entry {
                    path: path.to_string(),
                    hex_digest: "00".to_string(),
                },
            )
            .unwrap();
        }
        drop(manifest);

        let mut iter = RemovedIter::open(&manifest_path, &source_root).unwrap();
        assert_eq!(iter.next_removed().unwrap(), Some("gone.txt".to_string()));
        assert_eq!(iter.next_removed().unwrap(), None);
    }

    #[test]
    fn empty_manifest_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let manifest_path = dir.path().join("checksums.txt.123");
        File::create(&manifest_path).unwrap();

        let mut iter = RemovedIter::open(&manifest_path, dir.path()).unwrap();
        assert_eq!(iter.next_removed().unwrap(), None);
    }

    #[test]
    fn write_removed_entry_matches_expected_framing() {
        let mut buf = Vec::new();
        write_removed_entry(&mut buf, "a/b.txt").unwrap();
        assert_eq!(buf, b"a/b.txt\0\n");
    }
}
