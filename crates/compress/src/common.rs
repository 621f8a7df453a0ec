//! Common utility types shared by the codec back-ends.

use std::io::{self, IoSlice, Write};

/// Sink used by counting encoders when callers do not provide an explicit writer.
///
/// The sink discards all written bytes while allowing the encoder to keep
/// track of the compressed length.
#[derive(Clone, Copy, Debug, Default)]
pub struct CountingSink;

impl Write for CountingSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    fn write_vectored(&mut self, bufs: &[IoSlice<'_>]) -> io::Result<usize> {
        Ok(bufs.iter().map(|slice| slice.len()).sum())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub(crate) struct CountingWriter<W> {
    inner: W,
    bytes: u64,
}

impl<W> CountingWriter<W> {
    pub(crate) const fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    pub(crate) const fn bytes(&self) -> u64 {
        self.bytes
    }

    pub(crate) const fn inner_ref(&self) -> &W {
        &self.inner
    }

    pub(crate) const fn inner_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    pub(crate) fn into_parts(self) -> (W, u64) {
        (self.inner, self.bytes)
    }

    pub(crate) const fn saturating_add_bytes(&mut self, written: usize) {
        self.bytes = self.bytes.saturating_add(written as u64);
    }
}

impl<W> Write for CountingWriter<W>
where
    W: Write,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.saturating_add_bytes(written);
        Ok(written)
    }

    fn write_vectored(&mut self, bufs: &[IoSlice<'_>]) -> io::Result<usize> {
        let written = self.inner.write_vectored(bufs)?;
        self.saturating_add_bytes(written);
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Compression level, normalized across codecs.
///
/// `0` means "codec default"; `1..=9` map onto each codec's native scale.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Level(pub(crate) u32);

impl Level {
    /// Constructs a level from the `0..=9` scale used by the options record.
    ///
    /// `0` is normalized to the codec's own default at the call site.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw `0..=9` value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counting_sink_write_returns_full_length() {
        let mut sink = CountingSink;
        assert_eq!(sink.write(b"hello world").unwrap(), 11);
    }

    #[test]
    fn counting_sink_flush_succeeds() {
        let mut sink = CountingSink;
        assert!(sink.flush().is_ok());
    }

    #[test]
    fn counting_writer_write_counts_bytes() {
        let mut writer = CountingWriter::new(Vec::new());
        writer.write_all(b"hello world").unwrap();
        assert_eq!(writer.bytes(), 11);
    }

    #[test]
    fn counting_writer_into_parts_returns_both() {
        let mut writer = CountingWriter::new(Vec::new());
        writer.write_all(b"test").unwrap();
        let (inner, bytes) = writer.into_parts();
        assert_eq!(inner, b"test");
        assert_eq!(bytes, 4);
    }

    #[test]
    fn level_round_trips_raw_value() {
        assert_eq!(Level::new(6).raw(), 6);
    }
}
