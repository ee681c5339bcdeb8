//! Credential hashing for doctor and assistant accounts.
//!
//! PBKDF2-SHA256 with a per-credential random salt, verified in constant
//! time. Stored form is `pbkdf2-sha256$<iterations>$<salt b64>$<hash b64>`
//! so the work factor can be raised without invalidating old records.

use base64::engine::general_purpose::STANDARD_NO_PAD as B64;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

pub const PBKDF2_ITERATIONS: u32 = 600_000;
const SALT_LENGTH: usize = 16;
const HASH_LENGTH: usize = 32;

const SCHEME: &str = "pbkdf2-sha256";

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    let hash = derive(password, &salt, PBKDF2_ITERATIONS);
    format!(
        "{SCHEME}${PBKDF2_ITERATIONS}${}${}",
        B64.encode(salt),
        B64.encode(hash)
    )
}

/// Verify a password against a stored hash string.
///
/// Malformed stored values verify as false rather than erroring — a
/// corrupted credential row must never authenticate.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(scheme), Some(iterations), Some(salt), Some(hash), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };
    if scheme != SCHEME {
        return false;
    }
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (B64.decode(salt), B64.decode(hash)) else {
        return false;
    };
    if salt.len() != SALT_LENGTH || expected.len() != HASH_LENGTH {
        return false;
    }

    let mut salt_bytes = [0u8; SALT_LENGTH];
    salt_bytes.copy_from_slice(&salt);
    let actual = derive(password, &salt_bytes, iterations);
    actual.ct_eq(expected.as_slice()).into()
}

fn derive(password: &str, salt: &[u8; SALT_LENGTH], iterations: u32) -> [u8; HASH_LENGTH] {
    let mut out = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut out);
    out
}
