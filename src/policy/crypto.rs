//! Encryption of the CLI's "current zone" variable.
//!
//! The CLI and the gateway share a base64 secret used as the PBKDF2 salt.
//! The derived key is a Fernet key; the variable itself is the standard
//! base64 encoding of the Fernet token.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE};
use fernet::Fernet;
use sha2::Sha256;

use crate::error::{Error, Result};

const PASSPHRASE: &[u8] = b"SECRETKEYPASSWORD";
const KDF_ITERATIONS: u32 = 100_000;

fn cipher(secret: &str) -> Result<Fernet> {
    let salt = STANDARD
        .decode(secret.trim())
        .map_err(|_| Error::InvalidEncryption)?;

    let mut key = [0u8; 32];
    pbkdf2::pbkdf2_hmac::<Sha256>(PASSPHRASE, &salt, KDF_ITERATIONS, &mut key);

    Fernet::new(&URL_SAFE.encode(key)).ok_or(Error::InvalidEncryption)
}

pub fn encrypt_zone(zone: &str, secret: &str) -> Result<String> {
    let token = cipher(secret)?.encrypt(zone.as_bytes());
    Ok(STANDARD.encode(token))
}

pub fn decrypt_zone(encrypted: &str, secret: &str) -> Result<String> {
    let token = STANDARD
        .decode(encrypted.trim())
        .map_err(|_| Error::InvalidEncryption)?;
    let token = String::from_utf8(token).map_err(|_| Error::InvalidEncryption)?;

    let plain = cipher(secret)?
        .decrypt(&token)
        .map_err(|_| Error::InvalidEncryption)?;

    String::from_utf8(plain).map_err(|_| Error::InvalidEncryption)
}
