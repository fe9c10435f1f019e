//! Title and genre tokenization.
//!
//! Titles are lowercased and split on a fixed character class: ASCII letters
//! and digits plus the accented Latin letters used by Polish, German, French,
//! Spanish, Portuguese and the Nordic languages. Everything else separates
//! tokens. Each title yields its unigrams followed by every adjacent bigram
//! (joined with a single space).
//!
//! Genre tags become terms in their own namespace (`"genre:<tag>"`). Title
//! tokens never contain `':'`, so the two can not collide.

use lazy_static::lazy_static;
use regex::Regex;

/// Prefix that keeps genre terms apart from title words
pub const GENRE_PREFIX: &str = "genre:";

lazy_static! {
    static ref TOKEN_RE: Regex = Regex::new(
        r"[a-z0-9ąćęłńóśźżäöüßàâæçéèêëîïôœùûÿáíúñãõåø]+"
    )
    .expect("valid token pattern");
}

/// Lowercased unigrams in title order
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_RE
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Adjacent-pair bigrams of `tokens`
pub fn bigrams(tokens: &[String]) -> Vec<String> {
    tokens
        .windows(2)
        .map(|pair| format!("{} {}", pair[0], pair[1]))
        .collect()
}

/// Unigrams followed by bigrams; repeated tokens are kept so callers can
/// count term frequency.
pub fn title_terms(title: &str) -> Vec<String> {
    let mut terms = tokenize(title);
    let pairs = bigrams(&terms);
    terms.extend(pairs);
    terms
}

/// Namespaced vocabulary entry for a genre tag
pub fn genre_term(genre: &str) -> String {
    format!("{}{}", GENRE_PREFIX, genre.trim().to_lowercase())
}

pub fn is_genre_term(term: &str) -> bool {
    term.starts_with(GENRE_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_tokenize() {
        assert_eq!(tokenize("Fast Cars"), vec!["fast", "cars"]);
        assert_eq!(tokenize("  Harry   Potter!  "), vec!["harry", "potter"]);
    }

    #[test]
    fn test_punctuation_splits_tokens() {
        assert_eq!(tokenize("Spider-Man: No Way Home (2021)"), vec![
            "spider", "man", "no", "way", "home", "2021"
        ]);
    }

    #[test]
    fn test_polish_diacritics_survive() {
        assert_eq!(tokenize("Szybcy i Wściekli"), vec!["szybcy", "i", "wściekli"]);
        assert_eq!(tokenize("Władca Pierścieni"), vec!["władca", "pierścieni"]);
    }

    #[test]
    fn test_uppercase_diacritics_are_lowered() {
        assert_eq!(tokenize("ŻÓŁW Über"), vec!["żółw", "über"]);
    }

    #[test]
    fn test_bigrams() {
        let tokens = tokenize("The Lord of the Rings");
        let pairs = bigrams(&tokens);
        assert_eq!(pairs, vec!["the lord", "lord of", "of the", "the rings"]);
        assert!(bigrams(&tokenize("Matrix")).is_empty());
    }

    #[test]
    fn test_title_terms_keep_repeats() {
        let terms = title_terms("New York New York");
        assert_eq!(terms.iter().filter(|t| *t == "new").count(), 2);
        assert!(terms.contains(&"york new".to_string()));
    }

    #[test]
    fn test_empty_title() {
        assert!(title_terms("").is_empty());
        assert!(title_terms("!!! ---").is_empty());
    }

    #[test]
    fn test_genre_namespace() {
        assert_eq!(genre_term(" Sci-Fi "), "genre:sci-fi");
        assert!(is_genre_term(&genre_term("Action")));
        // a title word can never look like a genre term
        assert!(title_terms("genre action").iter().all(|t| !is_genre_term(t)));
    }
}
