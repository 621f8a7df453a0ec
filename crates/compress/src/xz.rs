//! Streaming XZ (LZMA2) helpers.

use std::io::{self, Read, Write};

use xz2::read::XzDecoder;
use xz2::write::XzEncoder;

use crate::common::{CountingSink, CountingWriter};

/// The high bit of the xz preset word selects the codec's "extreme" variant
/// (the `xz` CLI's `-e` flag) — a slower encode that searches harder for a
/// denser match. This mirrors liblzma's own `LZMA_PRESET_EXTREME` constant.
const PRESET_EXTREME: u32 = 1 << 31;

/// Compression level, `0` meaning "codec default" (mapped to preset 6).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct XzLevel {
    preset: u32,
    extreme: bool,
}

impl XzLevel {
    /// Builds a level from the shared `0..=9` scale.
    #[must_use]
    pub const fn from_numeric(level: u32) -> Self {
        Self {
            preset: if level > 9 { 9 } else { level },
            extreme: false,
        }
    }

    /// Selects the codec's "extreme" preset variant for a slower, denser
    /// encode (the `xz` CLI's `-e` flag).
    #[must_use]
    pub const fn with_extreme(mut self, extreme: bool) -> Self {
        self.extreme = extreme;
        self
    }

    fn preset(self) -> u32 {
        let base = if self.preset == 0 { 6 } else { self.preset };
        if self.extreme {
            base | PRESET_EXTREME
        } else {
            base
        }
    }
}

/// Streaming XZ encoder that records the number of compressed bytes produced.
pub struct CountingXzEncoder<W = CountingSink>
where
    W: Write,
{
    inner: XzEncoder<CountingWriter<W>>,
}

impl CountingXzEncoder<CountingSink> {
    /// Creates an encoder that discards compressed output while tracking its length.
    #[must_use]
    pub fn new(level: XzLevel) -> Self {
        Self::with_sink(CountingSink, level)
    }
}

impl<W> CountingXzEncoder<W>
where
    W: Write,
{
    /// Creates an encoder that writes compressed bytes into `sink`.
    ///
    /// Use [`XzLevel::with_extreme`] to select the codec's "extreme" preset
    /// variant for a slower, denser encode (the xz CLI's `-e` flag).
    #[must_use]
    pub fn with_sink(sink: W, level: XzLevel) -> Self {
        Self {
            inner: XzEncoder::new(CountingWriter::new(sink), level.preset()),
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

impl<W> Write for CountingXzEncoder<W>
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

/// Streaming XZ decoder.
pub struct XzDecoderReader<R> {
    inner: XzDecoder<R>,
}

impl<R> XzDecoderReader<R>
where
    R: Read,
{
    /// Wraps `reader` in an XZ decoder.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            inner: XzDecoder::new(reader),
        }
    }
}

impl<R> Read for XzDecoderReader<R>
where
    R: Read,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}
