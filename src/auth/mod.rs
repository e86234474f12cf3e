//! # Password helper
//!
//! Records that carry credentials store a digest instead of the plaintext.
//! The store treats digests as opaque strings.

pub mod crypto;

pub use crypto::{check_password, constant_time_str_eq, hash_password};
