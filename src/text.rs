use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Fold a free-text label for comparison: decompose, drop combining marks,
/// lowercase, and keep only alphabetic characters.
///
/// `"Líder de Célula"` folds to `"liderdecelula"`.
pub fn fold(raw: &str) -> String {
    raw.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphabetic())
        .collect()
}
