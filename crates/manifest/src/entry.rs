//! Manifest entry serialization: `path NUL hex_digest LF`.

use std::io::{self, Read, Write};

use databuf::DataBuf;

/// One `(path, hex_digest)` pair in a manifest.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entry {
    /// The source path, relative to a configured source root.
    pub path: String,
    /// The uppercase hex digest of the file's content at the time it was
    /// recorded.
    pub hex_digest: String,
}

/// Reads the next entry from `stream`.
///
/// Scans for the next `NUL` byte (terminating the path), then the next
/// `LF` byte (terminating the hex digest). Returns `Ok(None)` if the
/// stream is exhausted before any byte of a new entry is read. A stream
/// that ends mid-entry (after the path's `NUL` but before a terminating
/// `LF`, or with no `NUL` at all) is malformed.
pub fn read_entry<R: Read>(stream: &mut R) -> io::Result<Option<Entry>> {
    let mut path_buf = DataBuf::new();
    let mut one = [0u8; 1];
    loop {
        match stream.read(&mut one)? {
            0 if path_buf.is_empty() => return Ok(None),
            0 => return Err(malformed("manifest truncated before path terminator")),
            _ if one[0] == 0 => break,
            _ => path_buf.append_byte(one[0]),
        }
    }

    let mut digest_buf = DataBuf::new();
    loop {
        match stream.read(&mut one)? {
            0 => return Err(malformed("manifest truncated before digest terminator")),
            _ if one[0] == b'\n' => break,
            _ => digest_buf.append_byte(one[0]),
        }
    }

    let path = String::from_utf8(path_buf.into_vec())
        .map_err(|_| malformed("manifest path is not valid UTF-8"))?;
    let hex_digest = String::from_utf8(digest_buf.into_vec())
        .map_err(|_| malformed("manifest digest is not valid UTF-8"))?;
    Ok(Some(Entry { path, hex_digest }))
}

/// Writes `entry` to `stream` in the inverse of [`read_entry`]'s format.
pub fn write_entry<W: Write>(stream: &mut W, entry: &Entry) -> io::Result<()> {
    stream.write_all(entry.path.as_bytes())?;
    stream.write_all(&[0])?;
    stream.write_all(entry.hex_digest.as_bytes())?;
    stream.write_all(b"\n")?;
    Ok(())
}

/// The serialized length of `entry`, in bytes, as written by
/// [`write_entry`].
#[must_use]
pub fn serialized_len(entry: &Entry) -> usize {
    entry.path.len() + 1 + entry.hex_digest.len() + 1
}

fn malformed(reason: &'static str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, reason)
}
