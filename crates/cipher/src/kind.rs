//! Cipher name resolution.

use core::str::FromStr;

use openssl::symm::Cipher as OsslCipher;
use thiserror::Error;

/// A symmetric cipher recognized by the engine.
///
/// Names resolve case-insensitively, matching the `openssl enc` CLI's
/// algorithm names. `aes-256-cbc` is the default.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Default)]
pub enum CipherKind {
    /// AES-128 in CBC mode.
    Aes128Cbc,
    /// AES-192 in CBC mode.
    Aes192Cbc,
    /// AES-256 in CBC mode.
    #[default]
    Aes256Cbc,
    /// AES-128 in CTR mode.
    Aes128Ctr,
    /// AES-192 in CTR mode.
    Aes192Ctr,
    /// AES-256 in CTR mode.
    Aes256Ctr,
    /// Camellia-128 in CBC mode.
    Camellia128Cbc,
    /// Camellia-192 in CBC mode.
    Camellia192Cbc,
    /// Camellia-256 in CBC mode.
    Camellia256Cbc,
    /// Triple-DES (EDE3) in CBC mode.
    DesEde3Cbc,
    /// Blowfish in CBC mode.
    BfCbc,
}

/// Error returned when a cipher name does not resolve to a known algorithm.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("unrecognized cipher name: {0}")]
pub struct UnknownCipherKind(String);

impl FromStr for CipherKind {
    type Err = UnknownCipherKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aes-128-cbc" => Ok(Self::Aes128Cbc),
            "aes-192-cbc" => Ok(Self::Aes192Cbc),
            "aes-256-cbc" => Ok(Self::Aes256Cbc),
            "aes-128-ctr" => Ok(Self::Aes128Ctr),
            "aes-192-ctr" => Ok(Self::Aes192Ctr),
            "aes-256-ctr" => Ok(Self::Aes256Ctr),
            "camellia-128-cbc" => Ok(Self::Camellia128Cbc),
            "camellia-192-cbc" => Ok(Self::Camellia192Cbc),
            "camellia-256-cbc" => Ok(Self::Camellia256Cbc),
            "des-ede3-cbc" => Ok(Self::DesEde3Cbc),
            "bf-cbc" => Ok(Self::BfCbc),
            other => Err(UnknownCipherKind(other.to_string())),
        }
    }
}

impl CipherKind {
    /// Returns the canonical lowercase name for this cipher kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Aes128Cbc => "aes-128-cbc",
            Self::Aes192Cbc => "aes-192-cbc",
            Self::Aes256Cbc => "aes-256-cbc",
            Self::Aes128Ctr => "aes-128-ctr",
            Self::Aes192Ctr => "aes-192-ctr",
            Self::Aes256Ctr => "aes-256-ctr",
            Self::Camellia128Cbc => "camellia-128-cbc",
            Self::Camellia192Cbc => "camellia-192-cbc",
            Self::Camellia256Cbc => "camellia-256-cbc",
            Self::DesEde3Cbc => "des-ede3-cbc",
            Self::BfCbc => "bf-cbc",
        }
    }

    /// Resolves this kind to the concrete OpenSSL cipher it names.
    #[must_use]
    pub fn to_openssl(self) -> OsslCipher {
        match self {
            Self::Aes128Cbc => OsslCipher::aes_128_cbc(),
            Self::Aes192Cbc => OsslCipher::aes_192_cbc(),
            Self::Aes256Cbc => OsslCipher::aes_256_cbc(),
            Self::Aes128Ctr => OsslCipher::aes_128_ctr(),
            Self::Aes192Ctr => OsslCipher::aes_192_ctr(),
            Self::Aes256Ctr => OsslCipher::aes_256_ctr(),
            Self::Camellia128Cbc => OsslCipher::camellia_128_cbc(),
            Self::Camellia192Cbc => OsslCipher::camellia_192_cbc(),
            Self::Camellia256Cbc => OsslCipher::camellia_256_cbc(),
            Self::DesEde3Cbc => OsslCipher::des_ede3_cbc(),
            Self::BfCbc => OsslCipher::bf_cbc(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_aes_256_cbc() {
        assert_eq!(CipherKind::default(), CipherKind::Aes256Cbc);
    }

    #[test]
    fn from_str_is_case_insensitive() {
        assert_eq!(
            "AES-256-CBC".parse::<CipherKind>().unwrap(),
            CipherKind::Aes256Cbc
        );
    }

    #[test]
    fn from_str_rejects_unknown() {
        assert!("rot13".parse::<CipherKind>().is_err());
    }

    #[test]
    fn name_round_trips_through_parse() {
        for kind in [
            CipherKind::Aes128Cbc,
            CipherKind::Aes192Cbc,
            CipherKind::Aes256Cbc,
            CipherKind::Aes128Ctr,
            CipherKind::Aes192Ctr,
            CipherKind::Aes256Ctr,
            CipherKind::Camellia128Cbc,
            CipherKind::Camellia192Cbc,
            CipherKind::Camellia256Cbc,
            CipherKind::DesEde3Cbc,
            CipherKind::BfCbc,
        ] {
            assert_eq!(kind.name().parse::<CipherKind>().unwrap(), kind);
        }
    }
}
