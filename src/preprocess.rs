//! Lexical preprocessing: tokenization, stopword lists and stemming.

use std::collections::HashSet;
use std::path::Path;

use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::Deserialize;
use tracing::warn;

use crate::error::{LdaError, Result};

/// A letter, then letters or punctuation, then a letter.
const WORD_PATTERN: &str = r"\p{L}[\p{L}\p{P}]*\p{L}";

/// Words of this length or shorter are always treated as stopwords.
pub const SHORT_WORD_LEN: usize = 2;

const ENGLISH_STOPWORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "all", "and", "any", "are", "aren't", "because",
    "been", "before", "being", "below", "between", "both", "but", "can", "can't", "cannot",
    "could", "couldn't", "did", "didn't", "does", "doesn't", "doing", "don't", "down", "during",
    "each", "few", "for", "from", "further", "had", "hadn't", "has", "hasn't", "have", "haven't",
    "having", "he'd", "he'll", "he's", "her", "here", "here's", "hers", "herself", "him",
    "himself", "his", "how", "how's", "i'd", "i'll", "i'm", "i've", "into", "isn't", "it's", "its",
    "itself", "let's", "more", "most", "mustn't", "myself", "nor", "not", "off", "once", "only",
    "other", "ought", "our", "ours", "ourselves", "out", "over", "own", "same", "shan't", "she",
    "she'd", "she'll", "she's", "should", "shouldn't", "some", "such", "than", "that", "that's",
    "the", "their", "theirs", "them", "themselves", "then", "there", "there's", "these", "they",
    "they'd", "they'll", "they're", "they've", "this", "those", "through", "too", "under", "until",
    "very", "was", "wasn't", "we'd", "we'll", "we're", "we've", "were", "weren't", "what",
    "what's", "when", "when's", "where", "where's", "which", "while", "who", "who's", "whom",
    "why", "why's", "will", "with", "won't", "would", "wouldn't", "you", "you'd", "you'll",
    "you're", "you've", "your", "yours", "yourself", "yourselves", "also", "just", "like", "much",
    "many", "may", "might", "must", "shall", "still", "yet",
];

/// Built-in stopword list for a language code.
///
/// Only English ships with a list; any other language starts empty and
/// relies on the length rule and an external dictionary.
pub fn base_stopwords(language: &str) -> HashSet<String> {
    match language {
        "en" => ENGLISH_STOPWORDS.iter().map(|w| w.to_string()).collect(),
        other => {
            warn!(language = other, "no built-in stopword list, starting empty");
            HashSet::new()
        }
    }
}

/// Map an ISO 639-1 code to its Snowball algorithm.
pub fn stemming_algorithm(language: &str) -> Option<Algorithm> {
    let algorithm = match language {
        "ar" => Algorithm::Arabic,
        "da" => Algorithm::Danish,
        "de" => Algorithm::German,
        "el" => Algorithm::Greek,
        "en" => Algorithm::English,
        "es" => Algorithm::Spanish,
        "fi" => Algorithm::Finnish,
        "fr" => Algorithm::French,
        "hu" => Algorithm::Hungarian,
        "it" => Algorithm::Italian,
        "nl" => Algorithm::Dutch,
        "no" => Algorithm::Norwegian,
        "pt" => Algorithm::Portuguese,
        "ro" => Algorithm::Romanian,
        "ru" => Algorithm::Russian,
        "sv" => Algorithm::Swedish,
        "ta" => Algorithm::Tamil,
        "tr" => Algorithm::Turkish,
        _ => return None,
    };
    Some(algorithm)
}

/// External stopword dictionary merged into the base list.
///
/// Accepts either a JSON object keyed by word or a plain JSON array of words.
/// Object keys whose value is falsy (`false`, `0`, `""`, `null`) are left
/// out, so a dictionary can switch individual words off.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StopwordDictionary {
    words: HashSet<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDictionary {
    Keys(serde_json::Map<String, serde_json::Value>),
    Words(Vec<String>),
}

impl StopwordDictionary {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let words = match serde_json::from_str::<RawDictionary>(json)? {
            RawDictionary::Keys(map) => map
                .into_iter()
                .filter(|(_, flag)| is_truthy(flag))
                .map(|(word, _)| word)
                .collect(),
            RawDictionary::Words(words) => words.into_iter().collect(),
        };
        Ok(Self { words })
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn into_words(self) -> HashSet<String> {
        self.words
    }
}

fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().map_or(true, |x| x != 0.0 && !x.is_nan()),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    }
}

/// Turns raw text into lowercase word tokens and optionally stems them.
pub struct Preprocessor {
    word_re: Regex,
    stemmer: Option<Stemmer>,
    language: String,
}

impl std::fmt::Debug for Preprocessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preprocessor")
            .field("language", &self.language)
            .field("stem", &self.stemmer.is_some())
            .finish()
    }
}

impl Preprocessor {
    pub fn new(language: &str, stem: bool) -> Result<Self> {
        let word_re = Regex::new(WORD_PATTERN)
            .map_err(|e| LdaError::InvalidParameter(format!("word pattern: {}", e)))?;

        let stemmer = if stem {
            let algorithm = stemming_algorithm(language)
                .ok_or_else(|| LdaError::UnsupportedLanguage(language.to_string()))?;
            Some(Stemmer::create(algorithm))
        } else {
            None
        };

        Ok(Self {
            word_re,
            stemmer,
            language: language.to_string(),
        })
    }

    pub fn stems(&self) -> bool {
        self.stemmer.is_some()
    }

    /// Lowercase the text and extract every word match.
    ///
    /// Leading and trailing non-letters are stripped while internal
    /// punctuation (apostrophes, hyphens) is kept.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        self.word_re
            .find_iter(&text.to_lowercase())
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Stem a word, or return it unchanged when stemming is off.
    pub fn stem(&self, word: &str) -> String {
        match &self.stemmer {
            Some(stemmer) => stemmer.stem(word).into_owned(),
            None => word.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_strips_outer_punctuation() {
        let pre = Preprocessor::new("en", false).unwrap();
        let tokens = pre.tokenize("\"Don't\" stop-words, (please)... A x 42 Über!");
        assert_eq!(tokens, vec!["don't", "stop-words", "please", "über"]);
    }

    #[test]
    fn test_tokenize_empty() {
        let pre = Preprocessor::new("en", false).unwrap();
        assert!(pre.tokenize("").is_empty());
        assert!(pre.tokenize("1 2 3 !!").is_empty());
    }

    #[test]
    fn test_stemming() {
        let pre = Preprocessor::new("en", true).unwrap();
        assert!(pre.stems());
        assert_eq!(pre.stem("running"), "run");
        assert_eq!(pre.stem("cats"), "cat");

        let plain = Preprocessor::new("en", false).unwrap();
        assert_eq!(plain.stem("running"), "running");
    }

    #[test]
    fn test_unsupported_stemming_language() {
        assert!(matches!(
            Preprocessor::new("xx", true),
            Err(LdaError::UnsupportedLanguage(_))
        ));
        assert!(Preprocessor::new("xx", false).is_ok());
    }

    #[test]
    fn test_base_stopwords() {
        let en = base_stopwords("en");
        assert!(en.contains("the"));
        assert!(!en.contains("cat"));
        assert!(base_stopwords("fr").is_empty());
    }

    #[test]
    fn test_dictionary_formats() {
        let from_keys = StopwordDictionary::from_json_str(r#"{"foo": 1, "bar": 1}"#).unwrap();
        let from_list = StopwordDictionary::from_json_str(r#"["foo", "bar"]"#).unwrap();
        assert_eq!(from_keys, from_list);
        assert_eq!(from_keys.len(), 2);
        assert!(StopwordDictionary::from_json_str("42").is_err());
    }

    #[test]
    fn test_dictionary_skips_falsy_keys() {
        let json = r#"{"foo": 1, "bar": 0, "baz": false, "qux": null,
                       "quux": "", "yes": true, "list": []}"#;
        let dict = StopwordDictionary::from_json_str(json).unwrap();
        let words = dict.into_words();
        let expected: HashSet<String> =
            ["foo", "yes", "list"].iter().map(|w| w.to_string()).collect();
        assert_eq!(words, expected);
    }
}
