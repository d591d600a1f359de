//! Email verification codes.

use core::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// A six-digit, single-use email verification code.
///
/// Codes are drawn uniformly from `100000..=999999`, so they never carry a
/// leading zero and always render as exactly six ASCII digits.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VerificationCode(String);

impl VerificationCode {
    /// Number of digits in a code.
    pub const LENGTH: usize = 6;

    const RANGE: core::ops::Range<u32> = 100_000..1_000_000;

    /// Generate a fresh random code.
    #[must_use]
    pub fn generate() -> Self {
        let code: u32 = rand::rng().random_range(Self::RANGE);
        Self(code.to_string())
    }

    /// Wrap a code read back from storage.
    #[must_use]
    pub const fn from_stored(code: String) -> Self {
        Self(code)
    }

    /// Exact comparison against user-supplied input. No trimming, no case folding.
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        self.0 == candidate
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Codes are credentials; keep them out of logs.
impl fmt::Debug for VerificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VerificationCode(******)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_format() {
        let code = VerificationCode::generate();
        assert_eq!(code.as_str().len(), VerificationCode::LENGTH);
        assert!(code.as_str().chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_generate_range() {
        for _ in 0..200 {
            let value: u32 = VerificationCode::generate()
                .as_str()
                .parse()
                .expect("digits");
            assert!((100_000..=999_999).contains(&value));
        }
    }

    #[test]
    fn test_matches_is_exact() {
        let code = VerificationCode::from_stored("123456".to_owned());
        assert!(code.matches("123456"));
        assert!(!code.matches(" 123456"));
        assert!(!code.matches("12345"));
        assert!(!code.matches(""));
    }

    #[test]
    fn test_debug_redacts() {
        let code = VerificationCode::from_stored("654321".to_owned());
        assert!(!format!("{code:?}").contains("654321"));
    }
}
