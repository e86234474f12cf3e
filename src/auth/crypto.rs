//! # Cryptographic Utilities
//!
//! Password digests for records that hold credentials.
//!
//! Digests are unsalted SHA-256, hex encoded. Equal passwords produce equal
//! digests, which keeps them usable as plain field values.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Length of a hex encoded digest
pub const DIGEST_HEX_LEN: usize = 64;

/// Hash a password to a 64 character lowercase hex SHA-256 digest
pub fn hash_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

/// Check a password against a stored digest
///
/// The comparison is constant-time.
pub fn check_password(stored_hash: &str, password: &str) -> bool {
    constant_time_str_eq(stored_hash, &hash_password(password))
}

/// Constant-time comparison of two strings
pub fn constant_time_str_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
