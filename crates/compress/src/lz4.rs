//! Streaming LZ4 helpers.
//!
//! The framed format is used (not the raw block format) so artifacts remain
//! interoperable with the reference `lz4` CLI. Block size is chosen from the
//! compression level the same way the level maps onto other codecs, and
//! linked-block mode with a content checksum is used for every level to
//! preserve bit-identical output when interop with the `lz4` CLI matters.

use std::io::{self, BufReader, IoSliceMut, Read, Write};

use lz4_flex::frame::{BlockMode, BlockSize, FrameDecoder, FrameEncoder, FrameInfo};

use crate::common::{CountingSink, CountingWriter};

/// Compression level, `0` meaning "codec default" (mapped to `Max256KB`).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Lz4Level(u32);

impl Lz4Level {
    /// Builds a level from the shared `0..=9` scale.
    #[must_use]
    pub const fn from_numeric(level: u32) -> Self {
        Self(if level > 9 { 9 } else { level })
    }
}

/// Streaming encoder that records the number of compressed bytes produced.
pub struct CountingLz4Encoder<W = CountingSink>
where
    W: Write,
{
    inner: FrameEncoder<CountingWriter<W>>,
}

impl CountingLz4Encoder<CountingSink> {
    /// Creates an encoder that discards compressed output while tracking its length.
    #[must_use]
    pub fn new(level: Lz4Level) -> Self {
        Self::with_sink(CountingSink, level)
    }
}

impl<W> CountingLz4Encoder<W>
where
    W: Write,
{
    /// Creates an encoder that writes compressed bytes into `sink`.
    #[must_use]
    pub fn with_sink(sink: W, level: Lz4Level) -> Self {
        let writer = CountingWriter::new(sink);
        let frame_info = frame_info_for_level(level);
        Self {
            inner: FrameEncoder::with_frame_info(frame_info, writer),
        }
    }

    /// Returns the number of compressed bytes produced so far.
    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.inner.get_ref().bytes()
    }

    /// Completes the stream and returns the sink together with the byte count.
    pub fn finish_into_inner(self) -> io::Result<(W, u64)> {
        let writer = self.inner.finish().map_err(io::Error::other)?;
        Ok(writer.into_parts())
    }
}

impl<W> Write for CountingLz4Encoder<W>
where
    W: Write,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf).map_err(io::Error::other)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush().map_err(io::Error::other)
    }
}

/// Streaming decoder that records the number of decompressed bytes produced.
pub struct CountingLz4Decoder<R>
where
    R: Read,
{
    inner: FrameDecoder<BufReader<R>>,
    bytes: u64,
}

impl<R> CountingLz4Decoder<R>
where
    R: Read,
{
    /// Wraps `reader` in a streaming LZ4 frame decoder.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            inner: FrameDecoder::new(BufReader::new(reader)),
            bytes: 0,
        }
    }

    /// Returns the number of decompressed bytes read so far.
    #[must_use]
    pub const fn bytes_read(&self) -> u64 {
        self.bytes
    }
}

impl<R> Read for CountingLz4Decoder<R>
where
    R: Read,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.inner.read(buf)?;
        self.bytes = self.bytes.saturating_add(read as u64);
        Ok(read)
    }

    fn read_vectored(&mut self, bufs: &mut [IoSliceMut<'_>]) -> io::Result<usize> {
        let read = self.inner.read_vectored(bufs)?;
        self.bytes = self.bytes.saturating_add(read as u64);
        Ok(read)
    }
}

fn frame_info_for_level(level: Lz4Level) -> FrameInfo {
    let block_size = match level.0 {
        0 | 4..=6 => BlockSize::Max256KB,
        1..=3 => BlockSize::Max64KB,
        7..=8 => BlockSize::Max1MB,
        _ => BlockSize::Max4MB,
    };

    FrameInfo::new()
        .block_mode(BlockMode::Linked)
        .block_size(block_size)
        .content_checksum(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read as _;

    #[test]
    fn counting_encoder_tracks_bytes() {
        let mut encoder = CountingLz4Encoder::with_sink(Vec::new(), Lz4Level::from_numeric(0));
        encoder.write_all(b"payload").unwrap();
        assert!(encoder.bytes_written() > 0);
    }

    #[test]
    fn round_trip_matches_input() {
        let payload = b"block oriented data block oriented data";
        let mut encoder = CountingLz4Encoder::with_sink(Vec::new(), Lz4Level::from_numeric(6));
        encoder.write_all(payload).unwrap();
        let (compressed, bytes) = encoder.finish_into_inner().unwrap();
        assert_eq!(bytes as usize, compressed.len());

        let mut decoder = CountingLz4Decoder::new(&compressed[..]);
        let mut restored = Vec::new();
        decoder.read_to_end(&mut restored).unwrap();
        assert_eq!(restored, payload);
        assert_eq!(decoder.bytes_read(), payload.len() as u64);
    }

    #[test]
    fn default_level_uses_256kb_blocks() {
        let info = frame_info_for_level(Lz4Level::from_numeric(0));
        assert_eq!(info.block_size, BlockSize::Max256KB);
    }
}
