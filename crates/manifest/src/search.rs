//! Binary search over a sorted manifest, falling back to a linear scan
//! once the remaining window is small.

use std::cmp::Ordering;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};

use crate::entry::read_entry;

/// Seeks `file` to `pos`, then scans forward byte-by-byte for the next
/// `LF`. Returns the offset just past it, or `None` if `limit` is
/// reached (or EOF hit) before one is found.
fn align_to_next_entry(file: &mut File, pos: u64, limit: u64) -> std::io::Result<Option<u64>> {
    file.seek(SeekFrom::Start(pos))?;
    let mut cursor = pos;
    let mut one = [0u8; 1];
    while cursor < limit {
        if file.read(&mut one)? == 0 {
            return Ok(None);
        }
        cursor += 1;
        if one[0] == b'\n' {
            return Ok(Some(cursor));
        }
    }
    Ok(None)
}

/// Scans entries starting at the (already entry-aligned) offset `lo`,
/// stopping at `hi` or as soon as a path sorts past `key`.
fn linear_scan(file: &mut File, lo: u64, hi: u64, key: &str) -> std::io::Result<Option<String>> {
    file.seek(SeekFrom::Start(lo))?;
    loop {
        let pos = file.stream_position()?;
        if pos >= hi {
            return Ok(None);
        }
        match read_entry(file)? {
            None => return Ok(None),
            Some(entry) => match entry.path.as_str().cmp(key) {
                Ordering::Equal => return Ok(Some(entry.hex_digest)),
                Ordering::Greater => return Ok(None),
                Ordering::Less => {}
            },
        }
    }
}

/// Searches a sorted manifest at `path` for `key`, returning its hex
/// digest if present.
///
/// Bisects by byte offset until the remaining window is smaller than
/// `threshold` bytes, then falls back to a linear scan — entries are
/// variable-length, so bisection alone can straddle the target near the
/// window's ends.
pub fn search(file: &mut File, key: &str, threshold: u64) -> std::io::Result<Option<String>> {
    let len = file.metadata()?.len();
    let mut lo = 0u64;
    let mut hi = len;

    while hi.saturating_sub(lo) >= threshold {
        let mid = lo + (hi - lo) / 2;
        if mid <= lo {
            break;
        }
        let (prev_lo, prev_hi) = (lo, hi);
        match align_to_next_entry(file, mid, hi)? {
            None => hi = mid,
            Some(entry_start) => {
                file.seek(SeekFrom::Start(entry_start))?;
                match read_entry(file)? {
                    None => hi = mid,
                    Some(entry) => match entry.path.as_str().cmp(key) {
                        Ordering::Equal => return Ok(Some(entry.hex_digest)),
                        Ordering::Less => lo = file.stream_position()?,
                        Ordering::Greater => hi = entry_start,
                    },
                }
            }
        }
        // A boundary landing exactly on the window's edge can leave both
        // bounds unchanged; fall through to the linear scan rather than
        // spin without making progress.
        if lo == prev_lo && hi == prev_hi {
            break;
        }
    }

    linear_scan(file, lo, hi, key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{write_entry, Entry};
    use std::io::Write;

    fn build_manifest(paths: &[&str]) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checksums.txt");
        let mut file = File::create(&path).unwrap();
        for (i, p) in paths.iter().enumerate() {
            write_entry(
                &mut file,
                &Entry {
                    path: (*p).to_string(),
                    hex_digest: format!("{i:08X}"),
                },
            )
            .unwrap();
        }
        file.flush().unwrap();
        (dir, path)
    }

    #[test]
    fn finds_present_key_with_small_threshold() {
        let (_dir, path) = build_manifest(&["a", "b", "c", "d", "e", "f", "g"]);
        let mut file = File::open(&path).unwrap();
        let found = search(&mut file, "d", 1).unwrap();
        assert_eq!(found, Some("00000003".to_string()));
    }

    #[test]
    fn returns_none_for_absent_key() {
        let (_dir, path) = build_manifest(&["a", "c", "e", "g"]);
        let mut file = File::open(&path).unwrap();
        assert_eq!(search(&mut file, "d", 1).unwrap(), None);
        assert_eq!(search(&mut file, "z", 1).unwrap(), None);
        assert_eq!(search(&mut file, "", 1).unwrap(), None);
    }

    #[test]
    fn finds_first_and_last_entries() {
        let (_dir, path) = build_manifest(&["a", "b", "c", "d", "e"]);
        let mut file = File::open(&path).unwrap();
        assert_eq!(search(&mut file, "a", 1).unwrap(), Some("00000000".to_string()));
        assert_eq!(search(&mut file, "e", 1).unwrap(), Some("00000004".to_string()));
    }

    #[test]
    fn large_threshold_degrades_to_pure_linear_scan() {
        let (_dir, path) = build_manifest(&["a", "b", "c", "d", "e"]);
        let mut file = File::open(&path).unwrap();
        // threshold larger than the whole file forces the bisection loop
        // to never run.
        let found = search(&mut file, "c", 1_000_000).unwrap();
        assert_eq!(found, Some("00000002".to_string()));
    }

    #[test]
    fn empty_manifest_has_no_matches() {
        let (_dir, path) = build_manifest(&[]);
        let mut file = File::open(&path).unwrap();
        assert_eq!(search(&mut file, "anything", 512).unwrap(), None);
    }

    #[test]
    fn exhaustive_search_over_sorted_manifest() {
        let mut paths: Vec<String> = (0..500).map(|i| format!("file-{i:04}")).collect();
        paths.sort();
        let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
        let (_dir, path) = build_manifest(&refs);

        let mut file = File::open(&path).unwrap();
        for (i, p) in paths.iter().enumerate() {
            let found = search(&mut file, p, 64).unwrap();
            assert_eq!(found, Some(format!("{i:08X}")));
        }
        assert_eq!(search(&mut file, "file-9999", 64).unwrap(), None);
        assert_eq!(search(&mut file, "", 64).unwrap(), None);
    }
}
