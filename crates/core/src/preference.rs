// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

//! Parsing of the `Accept-Language` header and matching against the set of
//! supported languages.

use std::collections::HashSet;

/// Split a raw `Accept-Language` value into the list of language tags it
/// contains, in the order the client listed them.
///
/// Quality values (anything after a `;`) are dropped, as is surrounding
/// whitespace. Tags are not validated: whatever sits between two commas is
/// returned as-is. Items which are empty after trimming are skipped, so an
/// empty header gives an empty list.
#[must_use]
pub fn parse_accept_language(raw: &str) -> Vec<&str> {
    raw.split(',')
        .map(|part| part.split(';').next().unwrap_or(part).trim())
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// The set of languages a site supports, along with the language to fall back
/// to when none of them is acceptable to the client.
#[derive(Debug, Clone)]
pub struct LanguageSet {
    languages: HashSet<String>,
    fallback: String,
}

impl LanguageSet {
    /// Create a new language set.
    ///
    /// This does not check that the set or the fallback are non-empty, see
    /// [`crate::LanguageNegotiator::new`] for the validated constructor.
    pub fn new<I, L>(languages: I, fallback: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        Self {
            languages: languages.into_iter().map(Into::into).collect(),
            fallback: fallback.into(),
        }
    }

    /// Whether the given tag is one of the supported languages. The
    /// comparison is exact and case-sensitive.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.languages.contains(tag)
    }

    /// The fallback language
    #[must_use]
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Pick the first candidate which is a supported language, or the
    /// fallback if none is.
    ///
    /// The order of the candidates wins over anything else: the client's
    /// first supported choice is always the one returned.
    #[must_use]
    pub fn preferred<'a>(&'a self, candidates: &[&'a str]) -> &'a str {
        candidates
            .iter()
            .copied()
            .find(|candidate| self.contains(candidate))
            .unwrap_or(self.fallback.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accept_language() {
        assert_eq!(
            parse_accept_language("fr-CA, fr;q=0.9, en;q=0.8, *;q=0.5"),
            vec!["fr-CA", "fr", "en", "*"]
        );
        assert_eq!(parse_accept_language("de"), vec!["de"]);
        assert_eq!(parse_accept_language(" de ;q=1 ,en"), vec!["de", "en"]);
    }

    #[test]
    fn test_parse_accept_language_degrades_gracefully() {
        assert!(parse_accept_language("").is_empty());
        assert!(parse_accept_language("   ").is_empty());
        assert!(parse_accept_language(",;q=0.1,").is_empty());
        assert_eq!(parse_accept_language("en,,fr"), vec!["en", "fr"]);
        // Garbage goes through untouched, it just won't match anything
        assert_eq!(parse_accept_language("no thanks!"), vec!["no thanks!"]);
    }

    #[test]
    fn test_preferred_follows_header_order() {
        let set = LanguageSet::new(["en", "fr-CA", "de"], "en");

        assert_eq!(set.preferred(&["de", "fr-CA"]), "de");
        assert_eq!(set.preferred(&["fr-CA", "de"]), "fr-CA");
        assert_eq!(set.preferred(&["it", "es", "fr-CA"]), "fr-CA");
    }

    #[test]
    fn test_preferred_falls_back() {
        let set = LanguageSet::new(["en", "fr"], "en");

        assert_eq!(set.preferred(&[]), "en");
        assert_eq!(set.preferred(&["it", "es"]), "en");
        // Matching is case-sensitive
        assert_eq!(set.preferred(&["FR"]), "en");
        // ...and does not strip subtags
        assert_eq!(set.preferred(&["fr-FR"]), "en");
    }

    #[test]
    fn test_language_set_accessors() {
        let set = LanguageSet::new(vec!["en".to_owned(), "en".to_owned()], "en");
        assert!(set.contains("en"));
        assert!(!set.contains("fr"));
        assert_eq!(set.fallback(), "en");
        assert_eq!(set.preferred(&["en"]), "en");
    }
}
