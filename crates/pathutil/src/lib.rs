#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! Lexical path and string helpers shared by every stage of the backup
//! pipeline: the directory walker, the manifest store, and the cloud mirror
//! all need the same small set of byte-oriented operations on absolute
//! paths.
//!
//! # Design
//!
//! Every function here is pure and operates on bytes, not on
//! [`std::path::Path`] semantics — the pipeline treats a path as an opaque
//! string with `/` separators, since manifest entries and cloud remote paths
//! are not necessarily valid local filesystem paths on the host running the
//! backup.
//!
//! # Invariants
//!
//! - `parent`/`filename`/`extension` are purely lexical: they never touch
//!   the filesystem.
//! - `join` never produces a doubled separator.
//! - `null_safe_cmp` orders `NUL` strictly before any other byte, matching
//!   the ordering used when comparing manifest entries that may contain a
//!   raw `NUL` terminator boundary.
//!
//! # Examples
//!
//! ```
//! use pathutil::{join, parent, filename, extension};
//!
//! assert_eq!(join("a/b/", "/c"), "a/b/c");
//! assert_eq!(parent("a/b/c"), Some("a/b"));
//! assert_eq!(filename("a/b/c.txt"), "c.txt");
//! assert_eq!(extension("a/b/c.txt"), Some("txt"));
//! ```

const SEP: u8 = b'/';

/// Returns the substring of `p` up to (and excluding) the final separator.
///
/// Returns `None` if `p` contains no separator (i.e. `p` is already a root
/// component).
#[must_use]
pub fn parent(p: &str) -> Option<&str> {
    let bytes = p.as_bytes();
    let idx = bytes.iter().rposition(|&b| b == SEP)?;
    Some(&p[..idx])
}

/// Returns the substring of `p` after the final separator.
///
/// If `p` contains no separator, returns `p` itself.
#[must_use]
pub fn filename(p: &str) -> &str {
    let bytes = p.as_bytes();
    match bytes.iter().rposition(|&b| b == SEP) {
        Some(idx) => &p[idx + 1..],
        None => p,
    }
}

/// Returns the suffix after the final `.` of `filename(p)`.
///
/// Returns `None` if the filename has no `.`, or if the `.` is the first
/// byte of the filename (a dotfile has no extension).
#[must_use]
pub fn extension(p: &str) -> Option<&str> {
    let name = filename(p);
    let idx = name.as_bytes().iter().rposition(|&b| b == b'.')?;
    if idx == 0 {
        return None;
    }
    Some(&name[idx + 1..])
}

/// Joins `a` and `b` with exactly one separator between them.
///
/// A trailing separator on `a` and a leading separator on `b` are treated
/// as redundant rather than doubled.
#[must_use]
pub fn join(a: &str, b: &str) -> String {
    let a_trimmed = a.trim_end_matches('/');
    let b_trimmed = b.trim_start_matches('/');
    if a_trimmed.is_empty() {
        return format!("/{b_trimmed}");
    }
    let mut out = String::with_capacity(a_trimmed.len() + 1 + b_trimmed.len());
    out.push_str(a_trimmed);
    out.push('/');
    out.push_str(b_trimmed);
    out
}

/// Returns whether `haystack` begins with `needle`, as a byte prefix.
#[must_use]
pub fn starts_with(haystack: &str, needle: &str) -> bool {
    haystack.as_bytes().starts_with(needle.as_bytes())
}

/// Compares two optional bytes the way a `NUL`-terminated scan would:
/// a `None` ("ran off the end of the string") sorts strictly before `Some`.
#[must_use]
pub fn null_safe_cmp(a: Option<u8>, b: Option<u8>) -> std::cmp::Ordering {
    match (a, b) {
        (None, None) => std::cmp::Ordering::Equal,
        (None, Some(_)) => std::cmp::Ordering::Less,
        (Some(_), None) => std::cmp::Ordering::Greater,
        (Some(x), Some(y)) => x.cmp(&y),
    }
}

/// Returns the ordered list of ancestor prefixes of `p`, shortest first,
/// ending with `p` itself.
///
/// Used by the cloud mirror's `mkdir -p` emulation: each prefix is a
/// directory level that may need to be created in order.
///
/// ```
/// use pathutil::parent_dirs;
///
/// assert_eq!(parent_dirs("/a/b/c"), vec!["/a", "/a/b", "/a/b/c"]);
/// ```
#[must_use]
pub fn parent_dirs(p: &str) -> Vec<&str> {
    let bytes = p.as_bytes();
    let mut out = Vec::new();
    for (idx, &b) in bytes.iter().enumerate() {
        if b == SEP && idx > 0 {
            out.push(&p[..idx]);
        }
    }
    if !p.is_empty() {
        out.push(p);
    }
    out
}
