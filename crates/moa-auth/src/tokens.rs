//! Random tokens and token hashing.

use rand::Rng;
use rand::distributions::Alphanumeric;

/// Digits only.
pub const DIGITS: &[u8] = b"0123456789";

/// Letters, digits, `-` and `_`.
pub const URL_SAFE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Length of share tokens handed out by default.
pub const SHARE_TOKEN_LENGTH: usize = 16;

/// `len` characters drawn uniformly from `charset`.
///
/// An empty charset yields an empty string.
pub fn random_string(len: usize, charset: &[u8]) -> String {
    if charset.is_empty() {
        return String::new();
    }
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| char::from(charset[rng.gen_range(0..charset.len())]))
        .collect()
}

/// Alphanumeric token identifying a share link.
pub fn share_token(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Numeric code, e.g. for phone verification.
pub fn verification_code(len: usize) -> String {
    random_string(len, DIGITS)
}

/// URL-safe API key, optionally `prefix_`-qualified.
pub fn api_key(prefix: Option<&str>, len: usize) -> String {
    let key = random_string(len, URL_SAFE);
    match prefix {
        Some(p) if !p.is_empty() => format!("{p}_{key}"),
        _ => key,
    }
}

/// Long URL-safe secret for one-off links.
pub fn secure_token(len: usize) -> String {
    random_string(len, URL_SAFE)
}

/// Hex BLAKE3 digest under which a token is stored.
pub fn hash_token(token: &str) -> String {
    blake3::hash(token.as_bytes()).to_hex().to_string()
}
