//! Numeric one-time codes.

use rand::{Rng, rng};

/// Default code length.
pub const DEFAULT_OTP_LENGTH: usize = 4;

/// Generate a code of `length` decimal digits, each drawn uniformly.
pub fn generate(length: usize) -> String {
    let mut rng = rng();
    (0..length)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

/// Generate a code of [`DEFAULT_OTP_LENGTH`] digits.
pub fn generate_default() -> String {
    generate(DEFAULT_OTP_LENGTH)
}
