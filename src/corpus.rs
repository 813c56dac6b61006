//! Document corpus and random initialization.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::preprocess::{Preprocessor, SHORT_WORD_LEN};
use crate::vocabulary::{Vocabulary, WordId};

/// Caller-supplied document identifier, a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentId {
    Number(i64),
    Text(String),
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentId::Number(n) => write!(f, "{}", n),
            DocumentId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for DocumentId {
    fn from(n: i64) -> Self {
        DocumentId::Number(n)
    }
}

impl From<i32> for DocumentId {
    fn from(n: i32) -> Self {
        DocumentId::Number(n.into())
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        DocumentId::Text(s.to_string())
    }
}

/// Raw text, or a sequence of words that skips tokenization.
///
/// `Invalid` stands for missing text or text of any other JSON shape;
/// such documents are skipped rather than failing the whole corpus.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentText {
    Raw(String),
    Tokens(Vec<String>),
    #[default]
    Invalid,
}

impl DocumentText {
    /// True for empty text, an empty word list, or invalid text
    pub fn is_empty(&self) -> bool {
        match self {
            DocumentText::Raw(text) => text.is_empty(),
            DocumentText::Tokens(words) => words.is_empty(),
            DocumentText::Invalid => true,
        }
    }
}

fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<DocumentText, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or(DocumentText::Invalid))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentInput {
    pub id: DocumentId,
    #[serde(default, deserialize_with = "lenient_text")]
    pub text: DocumentText,
}

impl DocumentInput {
    pub fn new(id: impl Into<DocumentId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: DocumentText::Raw(text.into()),
        }
    }

    pub fn tokenized<I, S>(id: impl Into<DocumentId>, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            text: DocumentText::Tokens(words.into_iter().map(Into::into).collect()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub word: String,
    pub topic: usize,
    word_id: Option<WordId>,  // None for stopwords
}

impl Token {
    pub fn is_stopword(&self) -> bool {
        self.word_id.is_none()
    }

    pub(crate) fn word_id(&self) -> Option<WordId> {
        self.word_id
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    pub id: DocumentId,
    pub original_text: DocumentText,
    pub tokens: Vec<Token>,
    pub topic_counts: Vec<usize>,  // non-stopword tokens per topic
}

impl Document {
    /// All tokens, stopwords included
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn sampled_token_count(&self) -> usize {
        self.topic_counts.iter().sum()
    }
}

/// Build the document list with a uniformly random topic for every token.
///
/// Words of length <= 2 are promoted to stopwords in the shared vocabulary
/// as they are met, so the promotion applies to later occurrences only.
/// Documents with empty text, or with no word matches, are skipped.
pub fn build_corpus<R: Rng + ?Sized>(
    inputs: Vec<DocumentInput>,
    vocab: &mut Vocabulary,
    preprocessor: &Preprocessor,
    rng: &mut R,
) -> Result<Vec<Document>> {
    let num_topics = vocab.num_topics();
    let mut documents = Vec::with_capacity(inputs.len());

    for input in inputs {
        if input.text.is_empty() {
            debug!(id = %input.id, "skipping empty or malformed document");
            continue;
        }
        let words = match &input.text {
            DocumentText::Raw(text) => preprocessor.tokenize(text),
            DocumentText::Tokens(words) => words.clone(),
            DocumentText::Invalid => Vec::new(),
        };
        if words.is_empty() {
            debug!(id = %input.id, "skipping document without words");
            continue;
        }

        let mut tokens = Vec::with_capacity(words.len());
        let mut topic_counts = vec![0; num_topics];

        for raw in words.into_iter().filter(|w| !w.is_empty()) {
            let topic = rng.gen_range(0..num_topics);

            if raw.chars().count() <= SHORT_WORD_LEN {
                vocab.mark_stopword(&raw);
            }

            let mut word = raw;
            let mut is_stopword = vocab.is_stopword(&word);
            if preprocessor.stems() && !is_stopword {
                word = preprocessor.stem(&word);
                is_stopword = vocab.is_stopword(&word);
            }

            let word_id = if is_stopword {
                vocab.record_stopword(&word);
                None
            } else {
                topic_counts[topic] += 1;
                Some(vocab.record_occurrence(&word, topic)?)
            };
            tokens.push(Token { word, topic, word_id });
        }

        documents.push(Document {
            id: input.id,
            original_text: input.text,
            tokens,
            topic_counts,
        });
    }

    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn build(
        inputs: Vec<DocumentInput>,
        stopwords: &[&str],
        stem: bool,
    ) -> (Vec<Document>, Vocabulary) {
        let stopwords: HashSet<String> = stopwords.iter().map(|w| w.to_string()).collect();
        let mut vocab = Vocabulary::new(3, stopwords);
        let pre = Preprocessor::new("en", stem).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let docs = build_corpus(inputs, &mut vocab, &pre, &mut rng).unwrap();
        (docs, vocab)
    }

    #[test]
    fn test_empty_documents_skipped() {
        let (docs, _) = build(
            vec![
                DocumentInput::new(1, ""),
                DocumentInput::new(2, "!!! 42"),
                DocumentInput::tokenized(3, Vec::<String>::new()),
                DocumentInput::new(4, "trading volume rises"),
            ],
            &[],
            false,
        );
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, DocumentId::Number(4));
    }

    #[test]
    fn test_short_words_become_stopwords() {
        let (docs, vocab) = build(vec![DocumentInput::new("a", "we go to market")], &[], false);
        assert!(vocab.is_stopword("we"));
        assert!(vocab.is_stopword("go"));
        assert!(vocab.is_stopword("to"));
        assert_eq!(vocab.vocabulary_size(), 1);

        let doc = &docs[0];
        assert_eq!(doc.token_count(), 4);
        assert_eq!(doc.sampled_token_count(), 1);
        assert!(doc.tokens[0].is_stopword());
        assert!(!doc.tokens[3].is_stopword());
    }

    #[test]
    fn test_topic_counts_match_tokens() {
        let (docs, vocab) = build(
            vec![
                DocumentInput::new(1, "the cat sat on the mat"),
                DocumentInput::new(2, "dogs and cats are pets"),
            ],
            &["the", "and", "are"],
            false,
        );
        for doc in &docs {
            for topic in 0..3 {
                let expected = doc
                    .tokens
                    .iter()
                    .filter(|t| !t.is_stopword() && t.topic == topic)
                    .count();
                assert_eq!(doc.topic_counts[topic], expected);
            }
        }
        assert_eq!(vocab.tokens_per_topic().iter().sum::<usize>(), 6);
        assert_eq!(vocab.occurrence_count("the"), 2);
    }

    #[test]
    fn test_stemming_rechecks_stopwords() {
        // "runs" stems to "run", which is listed
        let (docs, vocab) = build(
            vec![DocumentInput::new(1, "runs jumping")],
            &["run"],
            true,
        );
        assert!(docs[0].tokens[0].is_stopword());
        assert_eq!(docs[0].tokens[0].word, "run");
        assert_eq!(docs[0].tokens[1].word, "jump");
        assert_eq!(vocab.words(), &["jump".to_string()]);
    }

    #[test]
    fn test_pretokenized_input_used_verbatim() {
        let (docs, vocab) = build(
            vec![DocumentInput::tokenized(1, ["Bitcoin", "", "halving"])],
            &[],
            false,
        );
        assert_eq!(docs[0].token_count(), 2);
        assert_eq!(vocab.words(), &["Bitcoin".to_string(), "halving".to_string()]);
    }

    #[test]
    fn test_document_json_shapes() {
        let inputs: Vec<DocumentInput> = serde_json::from_str(
            r#"[{"id": 1, "text": "plain text"}, {"id": "b", "text": ["pre", "split"]}]"#,
        )
        .unwrap();
        assert_eq!(inputs[0].text, DocumentText::Raw("plain text".to_string()));
        assert_eq!(inputs[1].id, DocumentId::Text("b".to_string()));
        assert!(matches!(inputs[1].text, DocumentText::Tokens(_)));
    }

    #[test]
    fn test_malformed_text_is_skipped() {
        let inputs: Vec<DocumentInput> = serde_json::from_str(
            r#"[
                {"id": 1, "text": "bitcoin miners halving"},
                {"id": 2, "text": null},
                {"id": 3, "text": 42},
                {"id": 4},
                {"id": 5, "text": ["gas", 7]},
                {"id": 6, "text": "ethereum gas fees"}
            ]"#,
        )
        .unwrap();
        assert_eq!(inputs.len(), 6);
        for input in &inputs[1..5] {
            assert_eq!(input.text, DocumentText::Invalid);
        }

        let (docs, vocab) = build(inputs, &[], false);
        let ids: Vec<&DocumentId> = docs.iter().map(|d| &d.id).collect();
        assert_eq!(ids, vec![&DocumentId::Number(1), &DocumentId::Number(6)]);
        assert_eq!(vocab.vocabulary_size(), 6);
    }

    #[test]
    fn test_short_word_promotion_is_forward_only() {
        // "going" stems to "go" before the raw "go" in the second document
        // promotes it, so the first occurrence stays sampled
        let (docs, vocab) = build(
            vec![
                DocumentInput::new(1, "going home"),
                DocumentInput::new(2, "go home"),
            ],
            &[],
            true,
        );
        assert!(vocab.is_stopword("go"));
        assert!(vocab.word_id("go").is_some());
        assert_eq!(vocab.occurrence_count("go"), 2);

        let first = &docs[0].tokens[0];
        assert_eq!(first.word, "go");
        assert!(!first.is_stopword());
        assert_eq!(vocab.count_for_word_topic("go", first.topic), 1);

        let second = &docs[1].tokens[0];
        assert_eq!(second.word, "go");
        assert!(second.is_stopword());
        assert_eq!(docs[1].sampled_token_count(), 1);
    }
}
