//! Offline password strength scoring.
//!
//! Pure and deterministic: the same password always maps to the same
//! class, with no I/O. The score rewards length and character-class
//! diversity and penalizes well-known weak patterns.

use serde::{Deserialize, Serialize};

/// Password strength classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordStrength {
    Weak,
    Medium,
    Strong,
}

impl PasswordStrength {
    /// Label used in stored password records and exports.
    pub fn as_str(&self) -> &'static str {
        match self {
            PasswordStrength::Weak => "weak",
            PasswordStrength::Medium => "medium",
            PasswordStrength::Strong => "strong",
        }
    }
}

/// Dictionary fragments that cap a password at Weak regardless of length.
const COMMON_PATTERNS: &[&str] = &[
    "password", "passw0rd", "motdepasse", "123456", "12345678", "qwerty", "azerty", "abc123",
    "letmein", "welcome", "iloveyou", "admin",
];

/// Ascending runs checked in both directions for keyboard/alphabet walks.
const SEQUENCES: &[&str] = &["abcdefghijklmnopqrstuvwxyz", "0123456789", "qwertyuiop", "azertyuiop"];

/// Classify a password as weak, medium, or strong.
///
/// Scoring: one point per character class present (lowercase, uppercase,
/// digit, symbol), plus one point at 12 characters and another at 16.
/// Anything under 8 characters, single-class, or containing a common
/// pattern is weak; 3 or 4 points is medium; 5 or more is strong.
pub fn strength(password: &str) -> PasswordStrength {
    let length = password.chars().count();
    if length < 8 {
        return PasswordStrength::Weak;
    }

    let lowered = password.to_lowercase();
    if COMMON_PATTERNS.iter().any(|p| lowered.contains(p)) {
        return PasswordStrength::Weak;
    }
    if has_long_sequence(&lowered) || is_single_repeated_char(password) {
        return PasswordStrength::Weak;
    }

    let has_lowercase = password.chars().any(|c| c.is_lowercase());
    let has_uppercase = password.chars().any(|c| c.is_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| !c.is_alphanumeric());

    let classes = [has_lowercase, has_uppercase, has_digit, has_symbol]
        .iter()
        .filter(|present| **present)
        .count();
    if classes < 2 {
        return PasswordStrength::Weak;
    }

    let mut score = classes;
    if length >= 12 {
        score += 1;
    }
    if length >= 16 {
        score += 1;
    }

    match score {
        0..=2 => PasswordStrength::Weak,
        3..=4 => PasswordStrength::Medium,
        _ => PasswordStrength::Strong,
    }
}

/// True when the password contains a 5-character straight run from a
/// known sequence, forward or reversed.
fn has_long_sequence(lowered: &str) -> bool {
    for sequence in SEQUENCES {
        let reversed: String = sequence.chars().rev().collect();
        for source in [*sequence, reversed.as_str()] {
            let chars: Vec<char> = source.chars().collect();
            for window in chars.windows(5) {
                let run: String = window.iter().collect();
                if lowered.contains(&run) {
                    return true;
                }
            }
        }
    }
    false
}

fn is_single_repeated_char(password: &str) -> bool {
    let mut chars = password.chars();
    match chars.next() {
        Some(first) => chars.all(|c| c == first),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_passwords_are_weak() {
        assert_eq!(strength("Ab1!"), PasswordStrength::Weak);
        assert_eq!(strength(""), PasswordStrength::Weak);
    }

    #[test]
    fn common_patterns_are_weak_even_when_long() {
        assert_eq!(strength("MyPassword2024!!"), PasswordStrength::Weak);
        assert_eq!(strength("Azertyuiop99$"), PasswordStrength::Weak);
        assert_eq!(strength("xx123456xxXX!"), PasswordStrength::Weak);
    }

    #[test]
    fn repeated_and_single_class_are_weak() {
        assert_eq!(strength("aaaaaaaaaa"), PasswordStrength::Weak);
        assert_eq!(strength("justlowercase"), PasswordStrength::Weak);
    }

    #[test]
    fn mixed_medium_and_strong() {
        assert_eq!(strength("Bricolage7"), PasswordStrength::Medium);
        assert_eq!(strength("Tr;v0se-Lampe!42"), PasswordStrength::Strong);
        assert_eq!(strength("Chev@l-Rouge9"), PasswordStrength::Strong);
    }

    #[test]
    fn scoring_is_deterministic() {
        let sample = "K7#plume-Ocre";
        let first = strength(sample);
        for _ in 0..10 {
            assert_eq!(strength(sample), first);
        }
    }
}
