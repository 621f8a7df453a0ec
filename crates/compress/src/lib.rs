#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! One streaming compress/decompress contract backed by four codecs —
//! gzip, bzip2, xz, and lz4 — plus a `none` pass-through. The orchestrator
//! calls [`compress_file`] to write an artifact and [`decompress_file`] (via
//! the restore path, or tests) to read one back.
//!
//! # Design
//!
//! Each codec module (`gzip`, `bz2`, `xz`, `lz4`) wraps its crate's
//! reader/writer behind a small counting adapter used when a caller wants to
//! track compressed size. [`compress_file`] and [`decompress_file`] are
//! buffered read/write loops over those adapters, bounded to
//! [`CHUNK_LEN`]-sized chunks per the streaming contract.
//!
//! `codec = none` is a pass-through equivalent to a buffered copy. For lz4,
//! the framed format is used (not the raw block format) so output stays
//! interoperable with the reference `lz4` CLI.
//!
//! # Invariants
//!
//! - Level `0` always means "codec default"; `1..=9` map onto each codec's
//!   native scale.
//! - [`CompFlags::XZ_EXTREME`] only affects the `xz` codec; it is ignored by
//!   every other codec.
//!
//! # Errors
//!
//! [`CompressError::UnknownCodec`] is a programmer error: an unresolved or
//! disabled codec name reached [`compress_file`]/[`decompress_file`].
//! [`CompressError::Io`] wraps failures reading the source or writing the
//! destination, including codec-internal stream errors.

pub mod algorithm;
pub mod common;

#[cfg(feature = "gzip")]
pub mod gzip;

#[cfg(feature = "bzip2")]
pub mod bz2;

#[cfg(feature = "xz")]
pub mod xz;

#[cfg(feature = "lz4")]
pub mod lz4;

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

pub use algorithm::{Codec, UnknownCodec};
pub use common::Level;

/// Size of the buffer used to pump bytes between source and codec.
pub const CHUNK_LEN: usize = 64 * 1024;

/// Codec-specific tuning flags.
///
/// Only [`CompFlags::XZ_EXTREME`] exists today; the bit-set shape is kept so
/// future per-codec flags (gzip strategy) can be added without another
/// signature change.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct CompFlags(u32);

impl CompFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);
    /// Selects the `xz` codec's "extreme" preset (the `xz` CLI's `-e` flag).
    pub const XZ_EXTREME: Self = Self(1 << 0);

    /// Returns whether every bit of `other` is set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the union of `self` and `other`.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

/// Errors raised while compressing or decompressing a file.
#[derive(Debug, thiserror::Error)]
pub enum CompressError {
    /// The codec name did not resolve to a known, enabled codec.
    #[error(transparent)]
    UnknownCodec(#[from] UnknownCodec),
    /// Reading the source or writing the destination failed.
    #[error("{path}: {source}")]
    Io {
        /// The path the failing operation targeted.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl CompressError {
    fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

fn pump<R: Read, W: Write>(mut reader: R, mut writer: W, err_path: &Path) -> Result<u64, CompressError> {
    let mut buffer = vec![0u8; CHUNK_LEN];
    let mut total = 0u64;
    loop {
        let read = reader
            .read(&mut buffer)
            .map_err(|e| CompressError::io(err_path, e))?;
        if read == 0 {
            break;
        }
        writer
            .write_all(&buffer[..read])
            .map_err(|e| CompressError::io(err_path, e))?;
        total += read as u64;
    }
    Ok(total)
}

/// Compresses `src` into `dst` using `codec` at `level`, honoring `flags`.
///
/// Returns the number of compressed bytes written. `codec = Codec::None` is
/// a buffered copy.
pub fn compress_file(
    src: &Path,
    dst: &Path,
    codec: Codec,
    level: Level,
    flags: CompFlags,
) -> Result<u64, CompressError> {
    let input = BufReader::with_capacity(
        CHUNK_LEN,
        File::open(src).map_err(|e| CompressError::io(src, e))?,
    );
    let output = File::create(dst).map_err(|e| CompressError::io(dst, e))?;

    match codec {
        Codec::None => pump(input, BufWriter::with_capacity(CHUNK_LEN, output), dst),
        #[cfg(feature = "gzip")]
        Codec::Gzip => {
            let level = gzip::GzipLevel::from_numeric(level.raw());
            let encoder = gzip::CountingGzEncoder::with_sink(output, level);
            finish_encoder(input, encoder, dst)
        }
        #[cfg(feature = "bzip2")]
        Codec::Bzip2 => {
            let level = bz2::Bzip2Level::from_numeric(level.raw());
            let encoder = bz2::CountingBzEncoder::with_sink(output, level);
            finish_encoder(input, encoder, dst)
        }
        #[cfg(feature = "xz")]
        Codec::Xz => {
            let level =
                xz::XzLevel::from_numeric(level.raw()).with_extreme(flags.contains(CompFlags::XZ_EXTREME));
            let encoder = xz::CountingXzEncoder::with_sink(output, level);
            finish_encoder(input, encoder, dst)
        }
        #[cfg(feature = "lz4")]
        Codec::Lz4 => {
            let level = lz4::Lz4Level::from_numeric(level.raw());
            let encoder = lz4::CountingLz4Encoder::with_sink(output, level);
            finish_lz4_encoder(input, encoder, dst)
        }
    }
}

/// Decompresses `src` into `dst` using `codec`.
///
/// `codec = Codec::None` is a buffered copy.
pub fn decompress_file(src: &Path, dst: &Path, codec: Codec) -> Result<u64, CompressError> {
    let input = File::open(src).map_err(|e| CompressError::io(src, e))?;
    let output = BufWriter::with_capacity(
        CHUNK_LEN,
        File::create(dst).map_err(|e| CompressError::io(dst, e))?,
    );

    match codec {
        Codec::None => pump(BufReader::with_capacity(CHUNK_LEN, input), output, src),
        #[cfg(feature = "gzip")]
        Codec::Gzip => pump(gzip::GzDecoderReader::new(input), output, src),
        #[cfg(feature = "bzip2")]
        Codec::Bzip2 => pump(bz2::BzDecoderReader::new(input), output, src),
        #[cfg(feature = "xz")]
        Codec::Xz => pump(xz::XzDecoderReader::new(input), output, src),
        #[cfg(feature = "lz4")]
        Codec::Lz4 => pump(lz4::CountingLz4Decoder::new(input), output, src),
    }
}

#[cfg(any(feature = "gzip", feature = "bzip2", feature = "xz"))]
fn finish_encoder<R, W>(input: R, mut encoder: W, err_path: &Path) -> Result<u64, CompressError>
where
    R: Read,
    W: Write + EncoderFinish,
{
    pump(input, &mut encoder, err_path)?;
    let bytes = encoder.finish(err_path)?;
    Ok(bytes)
}

#[cfg(any(feature = "gzip", feature = "bzip2", feature = "xz"))]
trait EncoderFinish {
    fn finish(self, err_path: &Path) -> Result<u64, CompressError>;
}

#[cfg(feature = "gzip")]
impl EncoderFinish for gzip::CountingGzEncoder<File> {
    fn finish(self, err_path: &Path) -> Result<u64, CompressError> {
        let (_, bytes) = self
            .finish_into_inner()
            .map_err(|e| CompressError::io(err_path, e))?;
        Ok(bytes)
    }
}

#[cfg(feature = "bzip2")]
impl EncoderFinish for bz2::CountingBzEncoder<File> {
    fn finish(self, err_path: &Path) -> Result<u64, CompressError> {
        let (_, bytes) = self
            .finish_into_inner()
            .map_err(|e| CompressError::io(err_path, e))?;
        Ok(bytes)
    }
}

#[cfg(feature = "xz")]
impl EncoderFinish for xz::CountingXzEncoder<File> {
    fn finish(self, err_path: &Path) -> Result<u64, CompressError> {
        let (_, bytes) = self
            .finish_into_inner()
            .map_err(|e| CompressError::io(err_path, e))?;
        Ok(bytes)
    }
}

#[cfg(feature = "lz4")]
fn finish_lz4_encoder<R: Read>(
    input: R,
    mut encoder: lz4::CountingLz4Encoder<File>,
    err_path: &Path,
) -> Result<u64, CompressError> {
    pump(input, &mut encoder, err_path)?;
    let (_, bytes) = encoder
        .finish_into_inner()
        .map_err(|e| CompressError::io(err_path, e))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn roundtrip(codec: Codec) {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.txt");
        let compressed = dir.path().join("compressed.bin");
        let restored = dir.path().join("restored.txt");
        let payload = b"hello world, hello world, hello world";
        fs::write(&src, payload).unwrap();

        compress_file(&src, &compressed, codec, Level::new(0), CompFlags::NONE).unwrap();
        decompress_file(&compressed, &restored, codec).unwrap();

        assert_eq!(fs::read(&restored).unwrap(), payload);
    }

    #[test]
    fn none_round_trips() {
        roundtrip(Codec::None);
    }

    #[cfg(feature = "gzip")]
    #[test]
    fn gzip_round_trips() {
        roundtrip(Codec::Gzip);
    }

    #[cfg(feature = "bzip2")]
    #[test]
    fn bzip2_round_trips() {
        roundtrip(Codec::Bzip2);
    }

    #[cfg(feature = "xz")]
    #[test]
    fn xz_round_trips() {
        roundtrip(Codec::Xz);
    }

    #[cfg(feature = "lz4")]
    #[test]
    fn lz4_round_trips() {
        roundtrip(Codec::Lz4);
    }

    #[test]
    fn none_is_equivalent_to_copy() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.txt");
        let dst = dir.path().join("dst.txt");
        fs::write(&src, b"plain bytes").unwrap();
        let written = compress_file(&src, &dst, Codec::None, Level::new(0), CompFlags::NONE).unwrap();
        assert_eq!(written, 11);
        assert_eq!(fs::read(&dst).unwrap(), b"plain bytes");
    }

    #[test]
    fn comp_flags_union_and_contains() {
        let flags = CompFlags::NONE.union(CompFlags::XZ_EXTREME);
        assert!(flags.contains(CompFlags::XZ_EXTREME));
        assert!(!CompFlags::NONE.contains(CompFlags::XZ_EXTREME));
    }
}
