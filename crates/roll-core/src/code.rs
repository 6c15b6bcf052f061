//! Access code generation and one-way verifiers.
//!
//! A session's access code is a 6-digit, zero-padded decimal string drawn
//! uniformly from the OS random source. Only an Argon2id PHC string derived
//! from it is ever stored; redemption re-hashes the candidate against the
//! stored salt and parameters instead of comparing strings.

use std::fmt;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Number of decimal digits in an access code.
pub const CODE_WIDTH: usize = 6;

/// `10^CODE_WIDTH` candidates.
const CODE_SPACE: u32 = 1_000_000;

/// Argon2id cost for code verifiers. A 6-digit space cannot be protected by
/// memory hardness alone, so the cost stays modest; the verifier exists so
/// that no storage path ever holds the plaintext.
const VERIFIER_MEMORY_KIB: u32 = 8 * 1024;
const VERIFIER_ITERATIONS: u32 = 2;
const VERIFIER_PARALLELISM: u32 = 1;

/// A plaintext access code. Handed to the opener once, never stored or logged.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct AccessCode(String);

impl AccessCode {
    /// Draw a fresh code from the OS random source.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Other` if the random source is unavailable.
    pub fn generate() -> Result<Self, CoreError> {
        Ok(Self::from_value(random_below(CODE_SPACE)?))
    }

    /// Zero-pad a value below `10^6` into a code.
    #[must_use]
    pub fn from_value(value: u32) -> Self {
        Self(format!("{:0width$}", value % CODE_SPACE, width = CODE_WIDTH))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessCode(******)")
    }
}

/// Check a submitted candidate is exactly six ASCII digits.
#[must_use]
pub fn is_well_formed(candidate: &str) -> bool {
    candidate.len() == CODE_WIDTH && candidate.bytes().all(|b| b.is_ascii_digit())
}

/// Uniform draw in `[0, bound)` by rejection sampling over `u32`.
fn random_below(bound: u32) -> Result<u32, CoreError> {
    // Largest multiple of `bound` that fits; values at or above it are redrawn.
    let zone = u32::MAX - (u32::MAX % bound);
    loop {
        let mut bytes = [0u8; 4];
        getrandom::fill(&mut bytes)
            .map_err(|e| CoreError::Other(anyhow::anyhow!("random source unavailable: {e}")))?;
        let value = u32::from_le_bytes(bytes);
        if value < zone {
            return Ok(value % bound);
        }
    }
}

/// Salted one-way hash of an access code, in PHC string form.
#[derive(Clone, PartialEq, Eq)]
pub struct CodeVerifier(String);

impl CodeVerifier {
    /// Derive a verifier for `code` with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Other` if hashing fails.
    pub fn derive(code: &AccessCode) -> Result<Self, CoreError> {
        let params = Params::new(
            VERIFIER_MEMORY_KIB,
            VERIFIER_ITERATIONS,
            VERIFIER_PARALLELISM,
            None,
        )
        .map_err(|e| CoreError::Other(anyhow::anyhow!("invalid verifier params: {e}")))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let salt = SaltString::generate(&mut OsRng);

        let hash = argon2
            .hash_password(code.as_str().as_bytes(), &salt)
            .map_err(|e| CoreError::Other(anyhow::anyhow!("failed to derive code verifier: {e}")))?
            .to_string();
        Ok(Self(hash))
    }

    /// Wrap a verifier loaded from storage.
    #[must_use]
    pub const fn from_stored(phc: String) -> Self {
        Self(phc)
    }

    /// PHC string for storage.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check a candidate against this verifier.
    ///
    /// Uses the salt and cost parameters embedded in the stored hash. A
    /// corrupt stored value never matches.
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.0) else {
            return false;
        };
        Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok()
    }
}

impl fmt::Debug for CodeVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CodeVerifier(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn generated_code_is_six_digits() {
        for _ in 0..50 {
            let code = AccessCode::generate().unwrap();
            assert!(is_well_formed(code.as_str()), "bad code: {}", code.as_str());
        }
    }

    #[test]
    fn small_values_are_zero_padded() {
        assert_eq!(AccessCode::from_value(42_817).as_str(), "042817");
        assert_eq!(AccessCode::from_value(0).as_str(), "000000");
        assert_eq!(AccessCode::from_value(999_999).as_str(), "999999");
    }

    #[test]
    fn debug_never_reveals_code() {
        let code = AccessCode::from_value(123_456);
        assert!(!format!("{code:?}").contains("123456"));
    }

    #[rstest]
    #[case("123456", true)]
    #[case("000000", true)]
    #[case("12345", false)]
    #[case("1234567", false)]
    #[case("12a456", false)]
    #[case("", false)]
    #[case("١٢٣٤٥٦", false)]
    fn format_validation(#[case] candidate: &str, #[case] expected: bool) {
        assert_eq!(is_well_formed(candidate), expected);
    }

    #[test]
    fn verifier_matches_only_its_code() {
        let code = AccessCode::from_value(42_817);
        let verifier = CodeVerifier::derive(&code).unwrap();

        assert!(verifier.matches("042817"));
        assert!(!verifier.matches("042818"));
        assert!(!verifier.matches("42817"));
    }

    #[test]
    fn verifier_never_contains_plaintext() {
        let code = AccessCode::from_value(424_242);
        let verifier = CodeVerifier::derive(&code).unwrap();
        assert!(verifier.as_str().starts_with("$argon2id$"));
        assert!(!verifier.as_str().contains("424242"));
    }

    #[test]
    fn verifiers_are_salted() {
        let code = AccessCode::from_value(111_111);
        let a = CodeVerifier::derive(&code).unwrap();
        let b = CodeVerifier::derive(&code).unwrap();
        assert_ne!(a.as_str(), b.as_str());
    }

    #[test]
    fn corrupt_verifier_never_matches() {
        let verifier = CodeVerifier::from_stored("not-a-phc-string".into());
        assert!(!verifier.matches("123456"));
    }
}
