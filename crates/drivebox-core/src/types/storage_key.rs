//! Immutable storage identifier generation.
//!
//! Every node is assigned a random 21-character identifier at creation.
//! The identifier never changes for the lifetime of the node, so physical
//! paths stay valid across renames of the display name.

use rand::Rng;

/// Length of a generated storage identifier.
pub const STORAGE_ID_LEN: usize = 21;

const ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Generate a new random storage identifier.
///
/// Identifiers are URL- and filesystem-safe. With 64^21 possible values,
/// collisions are practically impossible; the database still enforces
/// uniqueness as a backstop.
pub fn generate() -> String {
    let mut rng = rand::thread_rng();
    (0..STORAGE_ID_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}
