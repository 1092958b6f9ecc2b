//! Locale-aware string ordering for package names
//!
//! Approximates root-locale collation: at the primary level whitespace sorts
//! first, then punctuation and symbols in a fixed order, then digits, then
//! letters compared without regard to case. Lowercase sorts before uppercase
//! on a tie, and the raw code points settle anything left so the order is
//! total.

use std::cmp::Ordering;

/// Primary order of punctuation and symbols; unlisted ones follow in code point order
const PUNCTUATION: &str = "_-,;:!?.'\"()[]{}@*/\\&#%`^+<=>|~$";

/// Compare two strings the way a locale-aware sort would
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    primary_key(a)
        .cmp(primary_key(b))
        .then_with(|| case_key(a).cmp(case_key(b)))
        .then_with(|| a.cmp(b))
}

fn primary_key(s: &str) -> impl Iterator<Item = (u8, usize, char)> + '_ {
    s.chars().map(|c| {
        if c.is_alphabetic() {
            (3, 0, c.to_lowercase().next().unwrap_or(c))
        } else if c.is_numeric() {
            (2, 0, c)
        } else if c.is_whitespace() {
            (0, 0, c)
        } else {
            let rank = PUNCTUATION.find(c).unwrap_or(PUNCTUATION.len());
            (1, rank, c)
        }
    })
}

fn case_key(s: &str) -> impl Iterator<Item = u8> + '_ {
    s.chars().map(|c| u8::from(c.is_uppercase()))
}
