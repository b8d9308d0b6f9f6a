//! Resume text normalization

use regex::Regex;
use std::fmt;

/// Text that has been through [`TextNormalizer::normalize`]: ASCII letters
/// and digits separated by single spaces, nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn word_count(&self) -> usize {
        self.0.split(' ').filter(|w| !w.is_empty()).count()
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Whitespace, plus the ASCII information separators U+001C..U+001F, which
/// Unicode `White_Space` leaves out.
fn is_separator(c: char) -> bool {
    c.is_whitespace() || ('\u{1C}'..='\u{1F}').contains(&c)
}

pub struct TextNormalizer {
    disallowed: Regex,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextNormalizer {
    pub fn new() -> Self {
        let disallowed = Regex::new(r"[^A-Za-z0-9\s\x1C-\x1F]").expect("Invalid character-class regex");
        Self { disallowed }
    }

    /// Drop every character outside `[A-Za-z0-9\s]`, then collapse whitespace
    /// runs to one ASCII space and trim both ends.
    pub fn normalize(&self, text: &str) -> NormalizedText {
        let stripped = self.disallowed.replace_all(text, "");
        let words: Vec<&str> = stripped.split(is_separator).filter(|w| !w.is_empty()).collect();
        NormalizedText(words.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_well_formed(text: &str) -> bool {
        let pattern = Regex::new(r"^(?:[A-Za-z0-9]+(?: [A-Za-z0-9]+)*)?$").unwrap();
        pattern.is_match(text)
    }

    #[test]
    fn strips_punctuation_and_collapses_whitespace() {
        let normalizer = TextNormalizer::new();
        let out = normalizer.normalize("  Built UIs with React.js!\n\n\tNode.js,  TypeScript  ");
        assert_eq!(out.as_str(), "Built UIs with Reactjs Nodejs TypeScript");
    }

    #[test]
    fn empty_input_gives_empty_output() {
        let normalizer = TextNormalizer::new();
        assert!(normalizer.normalize("").is_empty());
        assert!(normalizer.normalize(" \n\t ").is_empty());
        assert!(normalizer.normalize("!!! ??? ...").is_empty());
    }

    #[test]
    fn non_ascii_letters_are_removed() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize("José Müller — C++ / C#").as_str(), "Jos Mller C C");
    }

    #[test]
    fn unicode_whitespace_becomes_single_space() {
        let normalizer = TextNormalizer::new();
        let out = normalizer.normalize("Rust\u{00A0}\u{2003}Go\r\nPython");
        assert_eq!(out.as_str(), "Rust Go Python");
    }

    #[test]
    fn information_separators_split_words() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize("a\x1fb").as_str(), "a b");
        assert_eq!(normalizer.normalize("\x1cRust\x1d\x1eGo\x1f").as_str(), "Rust Go");
    }

    #[test]
    fn normalization_is_idempotent() {
        let normalizer = TextNormalizer::new();
        let samples = [
            "",
            "plain words",
            "  e-mail: jane.doe@example.com  | +1 (555) 123-4567 ",
            "Ünïcödé\u{2028}line\u{00A0}separators\t\t\tand\ntabs",
            "Senior Engineer (2019–2023): Kubernetes, gRPC & AWS.",
        ];
        for sample in samples {
            let once = normalizer.normalize(sample);
            let twice = normalizer.normalize(once.as_str());
            assert_eq!(once, twice, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn output_matches_word_pattern() {
        let normalizer = TextNormalizer::new();
        let samples = [
            "",
            "\n",
            "a",
            "  ---  ",
            "Résumé:\n\n  • Led a team of 5\u{00A0}engineers\n• Shipped v2.0!",
            "tab\tseparated\u{3000}ideographic space",
        ];
        for sample in samples {
            let out = normalizer.normalize(sample);
            assert!(is_well_formed(out.as_str()), "bad output {:?} for {:?}", out, sample);
        }
    }

    #[test]
    fn word_count_counts_tokens() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.normalize("one, two; three").word_count(), 3);
        assert_eq!(normalizer.normalize("").word_count(), 0);
    }
}
