#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! OpenSSL-compatible salted symmetric encryption over a file. The on-disk
//! format is `"Salted__" || 8-byte salt || ciphertext`, matching
//! `openssl enc -e -S <salt-hex> -pass pass:<password>` for a matching
//! cipher, so an encrypted artifact can be decrypted with the stock
//! `openssl` CLI as well as this engine.
//!
//! # Design
//!
//! Key and IV are derived from `(password, salt)` via `EVP_BytesToKey` with
//! a SHA-256 digest at one iteration — the `openssl` CLI's default KDF for
//! `enc -e` without an explicit `-iter`. [`CipherKind`] resolves cipher
//! names case-insensitively; `aes-256-cbc` is the default.
//!
//! # Invariants
//!
//! - [`encrypt`] always writes the 16-byte header before any ciphertext.
//! - [`decrypt`] requires the header's first 8 bytes to read exactly
//!   `"Salted__"`; anything else is rejected rather than silently
//!   misinterpreted as ciphertext.
//! - [`Secret`] zeroizes its backing buffer on drop.
//!
//! # Errors
//!
//! [`CipherError::UnknownKind`] is a programmer error. [`CipherError::Io`]
//! wraps file I/O. [`CipherError::Crypto`] wraps an OpenSSL failure (bad
//! header, corrupt ciphertext, KDF failure).

mod kind;
mod secret;

pub use kind::{CipherKind, UnknownCipherKind};
pub use secret::Secret;

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use openssl::symm::{Cipher as OsslCipher, Crypter, Mode};
use rand::RngCore;

/// Size of the buffer used to pump plaintext/ciphertext chunks.
pub const CHUNK_LEN: usize = 64 * 1024;

/// Length of the `"Salted__"` magic prefix.
const MAGIC_LEN: usize = 8;
/// Length of the random salt.
const SALT_LEN: usize = 8;
/// The magic prefix itself.
const MAGIC: &[u8; MAGIC_LEN] = b"Salted__";

/// Errors raised while encrypting or decrypting a file.
#[derive(Debug, thiserror::Error)]
pub enum CipherError {
    /// The cipher name did not resolve to a known algorithm.
    #[error(transparent)]
    UnknownKind(#[from] UnknownCipherKind),
    /// Reading the source or writing the destination failed.
    #[error("{path}: {source}")]
    Io {
        /// The path the failing operation targeted.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The file does not start with the expected `"Salted__"` header.
    #[error("{0}: missing or corrupt Salted__ header")]
    BadHeader(PathBuf),
    /// An OpenSSL primitive (KDF, cipher context) failed.
    #[error("OpenSSL error: {0}")]
    Crypto(#[from] openssl::error::ErrorStack),
    /// Filesystem error from the in-place rename dance.
    #[error(transparent)]
    Fs(#[from] fsutil::FsError),
}

impl CipherError {
    fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

fn derive_key_iv(cipher: OsslCipher, password: &Secret, salt: &[u8; SALT_LEN]) -> Result<(Vec<u8>, Option<Vec<u8>>), CipherError> {
    let pair = openssl::pkcs5::bytes_to_key(
        cipher,
        openssl::hash::MessageDigest::sha256(),
        password.as_bytes(),
        Some(salt),
        1,
    )?;
    Ok((pair.key, pair.iv))
}

fn random_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}

/// Encrypts `src` into `dst` under `cipher`, deriving keys from `password`
/// and a freshly generated random salt.
pub fn encrypt(src: &Path, dst: &Path, cipher: CipherKind, password: &Secret) -> Result<(), CipherError> {
    let osslcipher = cipher.to_openssl();
    let salt = random_salt();
    let (key, iv) = derive_key_iv(osslcipher, password, &salt)?;

    let mut input = File::open(src).map_err(|e| CipherError::io(src, e))?;
    let mut output = File::create(dst).map_err(|e| CipherError::io(dst, e))?;

    output
        .write_all(MAGIC)
        .and_then(|()| output.write_all(&salt))
        .map_err(|e| CipherError::io(dst, e))?;

    let mut crypter = Crypter::new(osslcipher, Mode::Encrypt, &key, iv.as_deref())?;
    let block_size = osslcipher.block_size();
    let mut inbuf = vec![0u8; CHUNK_LEN];
    let mut outbuf = vec![0u8; CHUNK_LEN + block_size];

    loop {
        let read = input.read(&mut inbuf).map_err(|e| CipherError::io(src, e))?;
        if read == 0 {
            break;
        }
        let written = crypter.update(&inbuf[..read], &mut outbuf)?;
        output
            .write_all(&outbuf[..written])
            .map_err(|e| CipherError::io(dst, e))?;
    }
    let written = crypter.finalize(&mut outbuf)?;
    output
        .write_all(&outbuf[..written])
        .map_err(|e| CipherError::io(dst, e))?;

    Ok(())
}

/// Decrypts `src` into `dst` under `cipher`, reading the salt from `src`'s
/// `"Salted__"` header and deriving keys from `password`.
pub fn decrypt(src: &Path, dst: &Path, cipher: CipherKind, password: &Secret) -> Result<(), CipherError> {
    let osslcipher = cipher.to_openssl();

    let mut input = File::open(src).map_err(|e| CipherError::io(src, e))?;
    let mut header = [0u8; MAGIC_LEN + SALT_LEN];
    input
        .read_exact(&mut header)
        .map_err(|e| CipherError::io(src, e))?;
    if &header[..MAGIC_LEN] != MAGIC {
        return Err(CipherError::BadHeader(src.to_path_buf()));
    }
    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(&header[MAGIC_LEN..]);

    let (key, iv) = derive_key_iv(osslcipher, password, &salt)?;
    let mut output = File::create(dst).map_err(|e| CipherError::io(dst, e))?;

    let mut crypter = Crypter::new(osslcipher, Mode::Decrypt, &key, iv.as_deref())?;
    let block_size = osslcipher.block_size();
    let mut inbuf = vec![0u8; CHUNK_LEN];
    let mut outbuf = vec![0u8; CHUNK_LEN + block_size];

    loop {
        let read = input.read(&mut inbuf).map_err(|e| CipherError::io(src, e))?;
        if read == 0 {
            break;
        }
        let written = crypter.update(&inbuf[..read], &mut outbuf)?;
        output
            .write_all(&outbuf[..written])
            .map_err(|e| CipherError::io(dst, e))?;
    }
    let written = crypter.finalize(&mut outbuf)?;
    output
        .write_all(&outbuf[..written])
        .map_err(|e| CipherError::io(dst, e))?;

    Ok(())
}

/// Encrypts `path` in place: the plaintext is rotated aside to a scratch
/// file, encrypted back to `path`, and the scratch file is unlinked on
/// success. On failure, `path` is restored from the scratch copy so the
/// original content is never lost.
pub fn encrypt_in_place(path: &Path, cipher: CipherKind, password: &Secret) -> Result<(), CipherError> {
    let parent = path.parent();
    let scratch = fsutil::TempFile::new(parent)?;
    fsutil::rename_file(path, scratch.path())?;

    match encrypt(scratch.path(), path, cipher, password) {
        Ok(()) => Ok(()),
        Err(e) => {
            let _ = fsutil::rename_file(scratch.path(), path);
            Err(e)
        }
    }
}
