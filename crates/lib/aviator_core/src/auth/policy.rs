//! Password normalization and strength policy.
//!
//! A candidate is trimmed, stripped of invisible code points and
//! NFKC-normalized (so compatibility look-alikes such as mathematical bold
//! letters collapse to plain ASCII) before the strength rules run. The result
//! is always in NFKC form, so a decomposed and a precomposed spelling of the
//! same password sanitize to the same string. Rejection carries no detail
//! about which rule failed.

use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

/// Minimum length, in characters, after normalization.
pub const MIN_PASSWORD_LEN: usize = 8;
/// Maximum length, in characters, after normalization.
pub const MAX_PASSWORD_LEN: usize = 256;

/// Symbols that satisfy the "one symbol" rule.
pub const PASSWORD_SYMBOLS: &str = "!@#$%^&*()_-+={[}]|:;\"'<>,.?/~`";

/// The candidate failed the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("password rejected by policy")]
pub struct Rejected;

/// A password that passed [`sanitize`].
#[derive(Clone, PartialEq, Eq)]
pub struct NormalizedPassword(String);

impl NormalizedPassword {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Debug for NormalizedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("NormalizedPassword(***)")
    }
}

/// Zero-width, bidi-control, variation-selector and other formatting code
/// points that render as nothing.
fn is_invisible(c: char) -> bool {
    matches!(
        c,
        '\u{00AD}'
            | '\u{034F}'
            | '\u{061C}'
            | '\u{115F}'
            | '\u{1160}'
            | '\u{17B4}'
            | '\u{17B5}'
            | '\u{180B}'..='\u{180F}'
            | '\u{200B}'..='\u{200F}'
            | '\u{2028}'..='\u{202E}'
            | '\u{2060}'..='\u{2064}'
            | '\u{2066}'..='\u{206F}'
            | '\u{3164}'
            | '\u{FE00}'..='\u{FE0F}'
            | '\u{FEFF}'
            | '\u{FFA0}'
            | '\u{FFF9}'..='\u{FFFB}'
            | '\u{E0000}'..='\u{E007F}'
            | '\u{E000}'..='\u{F8FF}'
            | '\u{F0000}'..='\u{FFFFD}'
            | '\u{100000}'..='\u{10FFFD}'
    )
}

/// Control characters other than whitespace are stripped; whitespace is kept
/// so the whitespace rule can reject it.
fn is_stripped(c: char) -> bool {
    (c.is_control() && !c.is_whitespace()) || is_invisible(c)
}

/// Upper bound on strip/normalize rounds. Real input settles after one.
const MAX_NORMALIZE_ROUNDS: usize = 4;

fn strip(s: &str) -> String {
    s.trim().chars().filter(|c| !is_stripped(*c)).collect()
}

/// Strip, then normalize, until neither step changes the string.
fn normalize(candidate: &str) -> String {
    let mut cleaned = strip(candidate);
    for _ in 0..MAX_NORMALIZE_ROUNDS {
        let next = strip(&cleaned.nfkc().collect::<String>());
        if next == cleaned {
            break;
        }
        cleaned = next;
    }
    cleaned
}

/// Normalize and validate a candidate password.
pub fn sanitize(candidate: &str) -> Result<NormalizedPassword, Rejected> {
    let cleaned = normalize(candidate);

    let len = cleaned.chars().count();
    if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&len) {
        return Err(Rejected);
    }

    if cleaned.chars().any(char::is_whitespace) {
        return Err(Rejected);
    }

    let has_upper = cleaned.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = cleaned.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = cleaned.chars().any(|c| c.is_ascii_digit());
    let has_symbol = cleaned.chars().any(|c| PASSWORD_SYMBOLS.contains(c));
    if !(has_upper && has_lower && has_digit && has_symbol) {
        return Err(Rejected);
    }

    Ok(NormalizedPassword(cleaned))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_strong_password() {
        assert_eq!(sanitize("Str0ng!Pass").unwrap().as_str(), "Str0ng!Pass");
    }

    #[test]
    fn sanitize_is_idempotent_on_accepted_input() {
        for candidate in [
            "Str0ng!Pass",
            "  Padded#Pass9  ",
            "Zero\u{200B}Width#9a",
            "\u{1D40F}ass\u{1D430}ord1!",
            "Cafe\u{200B}\u{0301}9!xy",
        ] {
            let once = sanitize(candidate).unwrap();
            let twice = sanitize(once.as_str()).unwrap();
            assert_eq!(once, twice, "not idempotent for {candidate:?}");
        }
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(sanitize("  Str0ng!Pass\n").unwrap().as_str(), "Str0ng!Pass");
    }

    #[test]
    fn strips_zero_width_and_bom() {
        let out = sanitize("Str\u{200B}0ng\u{FEFF}!Pa\u{200D}ss").unwrap();
        assert_eq!(out.as_str(), "Str0ng!Pass");
    }

    #[test]
    fn stripping_does_not_leave_unnormalized_sequences() {
        // The zero-width space separates the base letter from its combining
        // accent until it is removed.
        let decomposed = sanitize("Cafe\u{200B}\u{0301}9!xy").unwrap();
        let precomposed = sanitize("Caf\u{00E9}9!xy").unwrap();
        assert_eq!(decomposed.as_str(), "Caf\u{00E9}9!xy");
        assert_eq!(decomposed, precomposed);
    }

    #[test]
    fn folds_compatibility_letters() {
        // Mathematical bold capital P, fullwidth digit one.
        let out = sanitize("\u{1D40F}assword\u{FF11}!").unwrap();
        assert_eq!(out.as_str(), "Password1!");
    }

    #[test]
    fn rejects_missing_character_classes() {
        for weak in [
            "str0ng!pass", // no uppercase
            "STR0NG!PASS", // no lowercase
            "Strong!Pass", // no digit
            "Str0ngPass1", // no symbol
        ] {
            assert_eq!(sanitize(weak), Err(Rejected), "{weak:?} should be rejected");
        }
    }

    #[test]
    fn rejects_internal_whitespace() {
        assert_eq!(sanitize("Str0ng! Pass"), Err(Rejected));
        assert_eq!(sanitize("Str0ng!\tPass"), Err(Rejected));
        assert_eq!(sanitize("Str0ng!\nPass"), Err(Rejected));
        // Ideographic space folds to an ASCII space under NFKC.
        assert_eq!(sanitize("Str0ng!\u{3000}Pass"), Err(Rejected));
        // So does a no-break space.
        assert_eq!(sanitize("Str0ng!\u{00A0}Pass"), Err(Rejected));
    }

    #[test]
    fn enforces_length_bounds() {
        assert_eq!(sanitize("S0!a"), Err(Rejected));
        assert_eq!(sanitize("Sh0rt!a"), Err(Rejected));
        assert!(sanitize("Sh0rt!ab").is_ok());

        let max = format!("A1!{}", "a".repeat(MAX_PASSWORD_LEN - 3));
        assert!(sanitize(&max).is_ok());
        let too_long = format!("A1!{}", "a".repeat(MAX_PASSWORD_LEN - 2));
        assert_eq!(sanitize(&too_long), Err(Rejected));
    }

    #[test]
    fn length_is_measured_after_stripping() {
        // Eight characters only when counting the zero-width joiners.
        assert_eq!(sanitize("A1!a\u{200D}\u{200D}\u{200D}\u{200D}"), Err(Rejected));
    }

    #[test]
    fn debug_does_not_leak() {
        let pw = sanitize("Str0ng!Pass").unwrap();
        assert!(!format!("{pw:?}").contains("Str0ng"));
    }
}
