//! A password buffer that is zeroed before deallocation.

use std::fmt;

use zeroize::Zeroize;

/// A byte buffer holding sensitive material (a password), scrubbed on drop.
///
/// [`Secret`] deliberately does not implement [`Clone`]: copying key
/// material multiplies the number of places that must be zeroed.
pub struct Secret(Vec<u8>);

impl Secret {
    /// Wraps `bytes` as a secret. Ownership of `bytes` transfers in; the
    /// caller should not retain a separate copy.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Returns the secret's bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_bytes_returns_wrapped_content() {
        let secret = Secret::new(b"hunter2".to_vec());
        assert_eq!(secret.as_bytes(), b"hunter2");
    }

    #[test]
    fn debug_never_prints_the_secret() {
        let secret = Secret::new(b"hunter2".to_vec());
        assert_eq!(format!("{secret:?}"), "Secret(..)");
    }
}
