//! Codec enumeration and name resolution.

use core::str::FromStr;

use thiserror::Error;

/// Compression codecs recognized by the engine.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Codec {
    /// No compression; a pass-through equivalent to a buffered copy.
    None,
    /// Gzip (DEFLATE with a gzip container), via [`flate2`].
    #[cfg(feature = "gzip")]
    Gzip,
    /// Bzip2, via the `bzip2` crate.
    #[cfg(feature = "bzip2")]
    Bzip2,
    /// XZ/LZMA2, via the `xz2` crate.
    #[cfg(feature = "xz")]
    Xz,
    /// LZ4 framed format, via [`lz4_flex`].
    #[cfg(feature = "lz4")]
    Lz4,
}

impl Codec {
    /// Returns the canonical lowercase name for this codec.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            #[cfg(feature = "gzip")]
            Self::Gzip => "gzip",
            #[cfg(feature = "bzip2")]
            Self::Bzip2 => "bzip2",
            #[cfg(feature = "xz")]
            Self::Xz => "xz",
            #[cfg(feature = "lz4")]
            Self::Lz4 => "lz4",
        }
    }
}

/// Error returned when a codec name does not resolve to a known or enabled codec.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("unrecognized or disabled compressor name: {input}")]
pub struct UnknownCodec {
    input: String,
}

impl UnknownCodec {
    fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }

    /// Returns the rejected input string.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl FromStr for Codec {
    type Err = UnknownCodec;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "off" => Ok(Self::None),
            #[cfg(feature = "gzip")]
            "gzip" | "gz" => Ok(Self::Gzip),
            #[cfg(feature = "bzip2")]
            "bzip2" | "bz2" => Ok(Self::Bzip2),
            #[cfg(feature = "xz")]
            "xz" | "lzma" => Ok(Self::Xz),
            #[cfg(feature = "lz4")]
            "lz4" => Ok(Self::Lz4),
            other => Err(UnknownCodec::new(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_aliases_parse() {
        assert_eq!("none".parse::<Codec>().unwrap(), Codec::None);
        assert_eq!("off".parse::<Codec>().unwrap(), Codec::None);
    }

    #[cfg(feature = "gzip")]
    #[test]
    fn gzip_aliases_parse() {
        assert_eq!("gzip".parse::<Codec>().unwrap(), Codec::Gzip);
        assert_eq!("gz".parse::<Codec>().unwrap(), Codec::Gzip);
    }

    #[cfg(feature = "bzip2")]
    #[test]
    fn bzip2_aliases_parse() {
        assert_eq!("bzip2".parse::<Codec>().unwrap(), Codec::Bzip2);
        assert_eq!("bz2".parse::<Codec>().unwrap(), Codec::Bzip2);
    }

    #[cfg(feature = "xz")]
    #[test]
    fn xz_aliases_parse() {
        assert_eq!("xz".parse::<Codec>().unwrap(), Codec::Xz);
        assert_eq!("lzma".parse::<Codec>().unwrap(), Codec::Xz);
    }

    #[cfg(feature = "lz4")]
    #[test]
    fn lz4_parses() {
        assert_eq!("lz4".parse::<Codec>().unwrap(), Codec::Lz4);
    }

    #[test]
    fn parsing_is_case_insensitive_and_trims() {
        assert_eq!("  NONE  ".parse::<Codec>().unwrap(), Codec::None);
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "brotli".parse::<Codec>().unwrap_err();
        assert_eq!(err.input(), "brotli");
    }
}
