//! Password hashing and session token generation.
//!
//! # Invariants
//! - Stored hashes have the form `v1$<salt hex>$<digest hex>`, where the
//!   digest is PBKDF2-HMAC-SHA256 over `HASH_ROUNDS` iterations.
//! - Verification compares digests through `Mac::verify_slice`, which is
//!   constant time.
//! - Plain-text passwords are never logged or stored.

use hmac::{Hmac, Mac};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const HASH_VERSION: &str = "v1";
const SALT_BYTES: usize = 16;
const DIGEST_BYTES: usize = 32;
const TOKEN_BYTES: usize = 32;
/// PBKDF2 iteration count.
pub const HASH_ROUNDS: u32 = 10_000;

/// Hashes a password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_BYTES];
    rand::thread_rng().fill_bytes(&mut salt);
    let digest = derive(password.as_bytes(), &salt);
    format!(
        "{HASH_VERSION}${}${}",
        hex::encode(salt),
        hex::encode(digest)
    )
}

/// Checks a password against a stored hash. Malformed hashes never match.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(version), Some(salt_hex), Some(digest_hex), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    if version != HASH_VERSION {
        return false;
    }
    let (Ok(salt), Ok(expected)) = (hex::decode(salt_hex), hex::decode(digest_hex)) else {
        return false;
    };
    if expected.len() != DIGEST_BYTES {
        return false;
    }

    // The stored digest is re-keyed under the salt so the comparison goes
    // through `verify_slice`.
    let Some(expected_tag) = tag(&salt, &expected) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(&salt) else {
        return false;
    };
    mac.update(&derive(password.as_bytes(), &salt));
    mac.verify_slice(&expected_tag).is_ok()
}

/// Generates an opaque session token.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn derive(password: &[u8], salt: &[u8]) -> [u8; DIGEST_BYTES] {
    let mut digest = [0u8; DIGEST_BYTES];
    pbkdf2_hmac::<Sha256>(password, salt, HASH_ROUNDS, &mut digest);
    digest
}

fn tag(key: &[u8], message: &[u8]) -> Option<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key).ok()?;
    mac.update(message);
    Some(mac.finalize().into_bytes().to_vec())
}
