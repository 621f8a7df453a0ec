//! Streaming gzip helpers.
//!
//! Unlike a raw-deflate stream, the gzip container is what makes
//! `output_root/files/<p>` interoperable with the reference `gzip` CLI, so
//! this module wraps [`flate2`]'s gzip reader/writer rather than its raw
//! deflate ones.

use std::io::{self, Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::common::{CountingSink, CountingWriter};

/// Compression level, `0` meaning "codec default".
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct GzipLevel(u32);

impl GzipLevel {
    /// Builds a level from the shared `0..=9` scale.
    #[must_use]
    pub const fn from_numeric(level: u32) -> Self {
        Self(if level > 9 { 9 } else { level })
    }
}

impl From<GzipLevel> for Compression {
    fn from(level: GzipLevel) -> Self {
        if level.0 == 0 {
            Compression::default()
        } else {
            Compression::new(level.0)
        }
    }
}

/// Streaming gzip encoder that records the number of compressed bytes produced.
pub struct CountingGzEncoder<W = CountingSink>
where
    W: Write,
{
    inner: GzEncoder<CountingWriter<W>>,
}

impl CountingGzEncoder<CountingSink> {
    /// Creates an encoder that discards compressed output while tracking its length.
    #[must_use]
    pub fn new(level: GzipLevel) -> Self {
        Self::with_sink(CountingSink, level)
    }
}

impl<W> CountingGzEncoder<W>
where
    W: Write,
{
    /// Creates an encoder that writes compressed bytes into `sink`.
    #[must_use]
    pub fn with_sink(sink: W, level: GzipLevel) -> Self {
        Self {
            inner: GzEncoder::new(CountingWriter::new(sink), level.into()),
        }
    }

    /// Returns the number of compressed bytes produced so far.
    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.inner.get_ref().bytes()
    }

    /// Completes the stream and returns the sink together with the byte count.
    pub fn finish_into_inner(self) -> io::Result<(W, u64)> {
        let writer = self.inner.finish()?;
        Ok(writer.into_parts())
    }
}

impl<W> Write for CountingGzEncoder<W>
where
    W: Write,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Streaming gzip decoder.
pub struct GzDecoderReader<R> {
    inner: GzDecoder<R>,
}

impl<R> GzDecoderReader<R>
where
    R: Read,
{
    /// Wraps `reader` in a gzip decoder.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            inner: GzDecoder::new(reader),
        }
    }
}

impl<R> Read for GzDecoderReader<R>
where
    R: Read,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read as _;

    #[test]
    fn round_trip_matches_input() {
        let payload = b"highly compressible payload payload payload";
        let mut encoder = CountingGzEncoder::with_sink(Vec::new(), GzipLevel::from_numeric(6));
        encoder.write_all(payload).unwrap();
        let (compressed, bytes) = encoder.finish_into_inner().unwrap();
        assert_eq!(bytes as usize, compressed.len());

        let mut decoder = GzDecoderReader::new(&compressed[..]);
        let mut restored = Vec::new();
        decoder.read_to_end(&mut restored).unwrap();
        assert_eq!(restored, payload);
    }

    #[test]
    fn empty_input_round_trips() {
        let mut encoder = CountingGzEncoder::with_sink(Vec::new(), GzipLevel::from_numeric(0));
        encoder.write_all(b"").unwrap();
        let (compressed, _) = encoder.finish_into_inner().unwrap();
        let mut decoder = GzDecoderReader::new(&compressed[..]);
        let mut restored = Vec::new();
        decoder.read_to_end(&mut restored).unwrap();
        assert!(restored.is_empty());
    }

    #[test]
    fn level_clamps_above_nine() {
        assert_eq!(GzipLevel::from_numeric(20), GzipLevel::from_numeric(9));
    }
}
