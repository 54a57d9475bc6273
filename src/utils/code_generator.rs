//! Short code generation.
//!
//! Codes are drawn uniformly from a 62-character alphanumeric alphabet. The
//! entropy source is the thread-local generator from `rand`, seeded once per
//! thread from the operating system, so concurrent requests never share or
//! reseed a generator. Collisions are expected and handled by the caller.

use rand::Rng;

/// Alphabet for generated codes: lowercase, uppercase, then digits.
pub const ALPHABET: &[u8; 62] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of generated short codes.
pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Generates `length` characters drawn uniformly from [`ALPHABET`].
///
/// # Examples
///
/// ```ignore
/// let code = generate_code(6);
/// assert_eq!(code.len(), 6);
/// assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_code(length: usize) -> String {
    let mut rng = rand::rng();

    (0..length)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Source of candidate short codes.
///
/// The link service asks for candidates through this trait so that tests can
/// script collisions.
#[cfg_attr(test, mockall::automock)]
pub trait CodeGenerator: Send + Sync {
    /// Produces one candidate code.
    fn generate(&self) -> String;
}

/// [`CodeGenerator`] backed by [`generate_code`].
#[derive(Debug, Clone)]
pub struct RandomCodeGenerator {
    length: usize,
}

impl RandomCodeGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl Default for RandomCodeGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_LENGTH)
    }
}

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> String {
        generate_code(self.length)
    }
}
