//! Short code generation and validation utilities.
//!
//! Generated codes are drawn uniformly from a 36-symbol alphabet (digits and
//! lowercase letters). Generation alone does not guarantee uniqueness; callers
//! check availability against the durable store.

use crate::error::AppError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;
use std::sync::Mutex;

/// Symbols a generated code is drawn from.
pub const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Custom code length bounds accepted at the boundary.
pub const CUSTOM_CODE_MIN_LEN: usize = 4;
pub const CUSTOM_CODE_MAX_LEN: usize = 10;

/// Reserved codes that cannot be used as short links.
///
/// These would be shadowed by system routes.
const RESERVED_CODES: &[&str] = &["api", "health", "admin", "static"];

/// Produces candidate short codes.
#[cfg_attr(test, mockall::automock)]
pub trait CodeGenerator: Send + Sync {
    /// Returns a new candidate code.
    fn generate(&self) -> String;
}

/// Fixed-length random code generator owning its own random source.
///
/// # Examples
///
/// ```ignore
/// let generator = RandomCodeGenerator::with_seed(7, 42);
/// let code = generator.generate();
/// assert_eq!(code.len(), 7);
/// ```
pub struct RandomCodeGenerator {
    length: usize,
    rng: Mutex<StdRng>,
}

impl RandomCodeGenerator {
    /// Creates a generator seeded from the operating system.
    ///
    /// `length` must be positive; configuration validation enforces this.
    pub fn new(length: usize) -> Self {
        Self::from_rng(length, StdRng::from_os_rng())
    }

    /// Creates a deterministic generator, producing the same sequence for the same seed.
    pub fn with_seed(length: usize, seed: u64) -> Self {
        Self::from_rng(length, StdRng::seed_from_u64(seed))
    }

    fn from_rng(length: usize, rng: StdRng) -> Self {
        debug_assert!(length > 0, "short code length must be positive");
        Self {
            length,
            rng: Mutex::new(rng),
        }
    }

    /// Configured code length.
    pub fn length(&self) -> usize {
        self.length
    }
}

impl CodeGenerator for RandomCodeGenerator {
    fn generate(&self) -> String {
        // A poisoned lock still holds a usable RNG.
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());

        (0..self.length)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect()
    }
}

/// Validates a user-provided custom short code.
///
/// # Rules
///
/// - Length: 4-10 characters
/// - Allowed characters: ASCII letters and digits
/// - Cannot be a reserved system code
///
/// # Errors
///
/// Returns [`AppError::Validation`] if any validation rule is violated.
pub fn validate_custom_code(code: &str) -> Result<(), AppError> {
    if code.len() < CUSTOM_CODE_MIN_LEN || code.len() > CUSTOM_CODE_MAX_LEN {
        return Err(AppError::bad_request(
            "Custom code must be 4-10 characters",
            json!({ "provided_length": code.len() }),
        ));
    }

    if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AppError::bad_request(
            "Custom code can only contain letters and digits",
            json!({ "code": code }),
        ));
    }

    if RESERVED_CODES.contains(&code.to_ascii_lowercase().as_str()) {
        return Err(AppError::bad_request(
            "This code is reserved",
            json!({ "code": code }),
        ));
    }

    Ok(())
}
