//! Identity-string canonicalization.

use unicode_normalization::UnicodeNormalization;

/// Fold free text for fuzzy comparison: NFKD-decompose, drop everything
/// outside ASCII (combining accents included), lower-case, trim.
///
/// Total: every input produces an output.
pub fn normalize_text(text: &str) -> String {
    let ascii: String = text.nfkd().filter(char::is_ascii).collect();
    ascii.to_lowercase().trim().to_string()
}

/// Key used for exact name equality: upper-cased and trimmed, accents kept.
pub fn name_key(text: &str) -> String {
    text.to_uppercase().trim().to_string()
}
