//! Short, URL-safe record identifiers.
//!
//! Ten symbols from a 64-symbol alphabet give 60 random bits per id. There is
//! no collision check; uniqueness is probabilistic.

use rand::Rng;

/// Number of symbols in a generated id.
pub const ID_LENGTH: usize = 10;

const ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Returns a fresh identifier such as `"Xb3_kP9-aQ"`.
pub fn generate() -> String {
    let mut rng = rand::rng();
    (0..ID_LENGTH)
        .map(|_| char::from(ALPHABET[rng.random_range(0..ALPHABET.len())]))
        .collect()
}
