//! Invite code generation.

use rand::Rng;

/// Upper-case letters and digits without the easily confused 0/O, 1/I/L.
pub const INVITE_CHARSET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Generate a random invite code of `len` characters.
pub fn generate_invite_code(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| INVITE_CHARSET[rng.random_range(0..INVITE_CHARSET.len())] as char)
        .collect()
}

/// Canonical form used for lookups.
pub fn normalize_invite_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}
