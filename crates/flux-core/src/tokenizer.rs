//! Query tokenizer.

/// Splits free text into normalized search tokens.
///
/// The text is lowercased and split on every run of characters outside
/// `[a-z0-9]`; empty pieces are dropped. Absent input yields no tokens.
///
/// # Examples
///
/// ```
/// use flux_core::tokenizer::tokenize;
///
/// assert_eq!(tokenize("Hello, World!  42"), vec!["hello", "world", "42"]);
/// assert!(tokenize(None).is_empty());
/// ```
pub fn tokenize<'a>(text: impl Into<Option<&'a str>>) -> Vec<String> {
    let Some(text) = text.into() else {
        return Vec::new();
    };

    text.to_lowercase()
        .split(|c: char| !(c.is_ascii_lowercase() || c.is_ascii_digit()))
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_mixed_punctuation() {
        assert_eq!(tokenize("Hello, World!  42"), vec!["hello", "world", "42"]);
    }

    #[test]
    fn test_tokenize_empty_and_absent() {
        assert!(tokenize("").is_empty());
        assert!(tokenize(None).is_empty());
        assert!(tokenize("  ,;!  ").is_empty());
    }

    #[test]
    fn test_tokenize_splits_non_ascii() {
        // Only ASCII letters and digits survive, everything else separates
        assert_eq!(tokenize("café-au_lait"), vec!["caf", "au", "lait"]);
    }

    #[test]
    fn test_tokenize_keeps_order_and_duplicates() {
        assert_eq!(tokenize("rust RUST memory"), vec!["rust", "rust", "memory"]);
    }
}
