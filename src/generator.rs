/// Invite code generation
use rand::Rng;

/// Alphabet for generated codes: lowercase letters and digits
pub const CODE_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Length of generated codes
pub const CODE_LENGTH: usize = 32;

/// Generate a candidate invite code.
///
/// The code is a bearer credential, so this draws from `thread_rng`,
/// which is cryptographically secure.
pub fn generate() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..CODE_ALPHABET.len());
            CODE_ALPHABET[idx] as char
        })
        .collect()
}
