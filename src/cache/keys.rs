//! Cache key derivation.
//!
//! Every resource path owns one pre-cache record and any number of value
//! records:
//!
//! | Record | Key |
//! |--------|-----|
//! | pre-cache | `jsonld_` + path trimmed of `/` and spaces, with `/` replaced by `--` |
//! | value | pre-cache key + `_` + lowercase hex SHA-1 of the hash basis |
//!
//! The hash basis is the path, the encoded query string and the request's
//! values for each `Vary` header, joined with `\n`. A header the request
//! does not carry contributes an empty string.

use sha1::{Digest, Sha1};

pub const KEY_PREFIX: &str = "jsonld_";

pub fn pre_cache_key(path: &str) -> String {
    let id = path
        .trim_matches(|c| c == '/' || c == ' ')
        .replace('/', "--");
    format!("{}{}", KEY_PREFIX, id)
}

pub fn hash_basis(path: &str, query: &str, vary_values: &[&str]) -> String {
    let mut parts = Vec::with_capacity(vary_values.len() + 2);
    parts.push(path);
    parts.push(query);
    parts.extend_from_slice(vary_values);
    parts.join("\n")
}

pub fn value_key(path: &str, query: &str, vary_values: &[&str]) -> String {
    format!(
        "{}_{}",
        pre_cache_key(path),
        digest_hex(&hash_basis(path, query, vary_values))
    )
}

pub(crate) fn digest_hex(input: &str) -> String {
    format!("{:x}", Sha1::digest(input.as_bytes()))
}
