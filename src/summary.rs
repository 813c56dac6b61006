//! Read-only views over the final counts: topic word rankings, word
//! specificity and per-topic document rankings.

use std::cmp::Ordering;

use serde::Serialize;

use crate::corpus::{Document, DocumentId, DocumentText};
use crate::error::{LdaError, Result};
use crate::vocabulary::Vocabulary;

/// Number of rows in a vocabulary table
pub const VOCAB_TABLE_LIMIT: usize = 499;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordCount {
    pub word: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VocabEntry {
    pub word: String,
    pub count: usize,
    pub stopword: bool,
    pub specificity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedDocument {
    pub id: DocumentId,
    pub text: DocumentText,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicDocuments {
    pub documents: Vec<RankedDocument>,
    pub document_vocab: Vec<VocabEntry>,
}

fn by_count_then_word(a: &WordCount, b: &WordCount) -> Ordering {
    b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word))
}

/// Words of every topic sorted by count, descending. Zero counts are left out.
pub fn sort_topic_words(vocab: &Vocabulary) -> Vec<Vec<WordCount>> {
    let mut topic_words: Vec<Vec<WordCount>> = vec![Vec::new(); vocab.num_topics()];

    for (id, word) in vocab.words().iter().enumerate() {
        for (topic, &count) in vocab.topic_counts(id).iter().enumerate() {
            if count > 0 {
                topic_words[topic].push(WordCount {
                    word: word.clone(),
                    count,
                });
            }
        }
    }

    for words in topic_words.iter_mut() {
        words.sort_by(by_count_then_word);
    }
    topic_words
}

/// First `n` words of a sorted list, space-joined.
pub fn top_n_words(word_counts: &[WordCount], n: usize) -> String {
    word_counts
        .iter()
        .take(n)
        .map(|wc| wc.word.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Shannon entropy in nats over the positive entries of `counts`.
pub fn entropy(counts: &[f64]) -> Result<f64> {
    let positive: Vec<f64> = counts.iter().copied().filter(|&x| x > 0.0).collect();
    let sum: f64 = positive.iter().sum();
    if sum <= 0.0 {
        return Err(LdaError::DegenerateEntropy);
    }
    let weighted: f64 = positive.iter().map(|&x| x * x.ln()).sum();
    Ok(sum.ln() - weighted / sum)
}

/// How concentrated a word is across topics: 1 means a single topic,
/// 0 means spread evenly. Unseen words score 0.
pub fn specificity(vocab: &Vocabulary, word: &str) -> f64 {
    let Some(counts) = vocab.topic_counts_for(word) else {
        return 0.0;
    };
    let counts: Vec<f64> = counts.iter().map(|&c| c as f64).collect();
    let Ok(h) = entropy(&counts) else {
        return 0.0;
    };
    if vocab.num_topics() == 1 {
        return 1.0;
    }
    let normalized = 1.0 - h / (vocab.num_topics() as f64).ln();
    normalized.clamp(0.0, 1.0)
}

/// Word frequencies, most frequent first.
///
/// With `topic` set the counts are that topic's word counts. Otherwise they
/// are raw occurrence counts, with stopwords only when `include_stops`.
pub fn most_frequent_words(
    vocab: &Vocabulary,
    include_stops: bool,
    topic: Option<usize>,
) -> Vec<WordCount> {
    let mut word_counts: Vec<WordCount> = match topic {
        Some(topic) => vocab
            .words()
            .iter()
            .enumerate()
            .filter_map(|(id, word)| {
                let count = vocab.topic_counts(id).get(topic).copied().unwrap_or(0);
                (count > 0).then(|| WordCount {
                    word: word.clone(),
                    count,
                })
            })
            .collect(),
        None => vocab
            .occurrences()
            .iter()
            .filter(|(word, _)| include_stops || !vocab.is_stopword(word))
            .map(|(word, &count)| WordCount {
                word: word.clone(),
                count,
            })
            .collect(),
    };
    word_counts.sort_by(by_count_then_word);
    word_counts
}

/// Top words annotated with stopword flag and specificity.
pub fn vocab_table(
    vocab: &Vocabulary,
    include_stops: bool,
    topic: Option<usize>,
) -> Vec<VocabEntry> {
    most_frequent_words(vocab, include_stops, topic)
        .into_iter()
        .take(VOCAB_TABLE_LIMIT)
        .map(|wc| VocabEntry {
            stopword: vocab.is_stopword(&wc.word),
            specificity: specificity(vocab, &wc.word),
            word: wc.word,
            count: wc.count,
        })
        .collect()
}

/// Smoothed share of a document's tokens assigned to `topic`.
pub fn document_score(doc: &Document, topic: usize, smoothing: f64, num_topics: usize) -> f64 {
    (doc.topic_counts[topic] as f64 + smoothing)
        / (doc.token_count() as f64 + num_topics as f64 * smoothing)
}

/// Documents of every topic ranked by smoothed score, keeping only those
/// with at least one token in the topic. Ties keep corpus order.
pub fn reorder_documents(
    documents: &[Document],
    vocab: &Vocabulary,
    smoothing: f64,
) -> Vec<TopicDocuments> {
    let num_topics = vocab.num_topics();

    (0..num_topics)
        .map(|topic| {
            let document_vocab = vocab_table(vocab, false, Some(topic));

            let mut scores: Vec<(usize, f64)> = documents
                .iter()
                .enumerate()
                .map(|(i, doc)| (i, document_score(doc, topic, smoothing, num_topics)))
                .collect();
            scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

            let documents = scores
                .into_iter()
                .filter(|&(i, _)| documents[i].topic_counts[topic] > 0)
                .map(|(i, score)| RankedDocument {
                    id: documents[i].id.clone(),
                    text: documents[i].original_text.clone(),
                    score,
                })
                .collect();

            TopicDocuments {
                documents,
                document_vocab,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn vocab_with(num_topics: usize, entries: &[(&str, usize, usize)]) -> Vocabulary {
        let mut vocab = Vocabulary::new(num_topics, HashSet::new());
        for &(word, topic, times) in entries {
            for _ in 0..times {
                vocab.record_occurrence(word, topic).unwrap();
            }
        }
        vocab
    }

    #[test]
    fn test_entropy() {
        assert!(entropy(&[4.0, 0.0, 0.0]).unwrap().abs() < 1e-12);
        let uniform = entropy(&[2.0, 2.0, 2.0, 2.0]).unwrap();
        assert!((uniform - 4f64.ln()).abs() < 1e-12);
        assert!(matches!(entropy(&[0.0, 0.0]), Err(LdaError::DegenerateEntropy)));
        assert!(matches!(entropy(&[]), Err(LdaError::DegenerateEntropy)));
    }

    #[test]
    fn test_specificity_bounds() {
        let vocab = vocab_with(
            3,
            &[
                ("focused", 1, 5),
                ("spread", 0, 2),
                ("spread", 1, 2),
                ("spread", 2, 2),
                ("mixed", 0, 3),
                ("mixed", 2, 1),
            ],
        );
        assert!((specificity(&vocab, "focused") - 1.0).abs() < 1e-12);
        assert!(specificity(&vocab, "spread").abs() < 1e-12);
        let mixed = specificity(&vocab, "mixed");
        assert!(mixed > 0.0 && mixed < 1.0);
        assert_eq!(specificity(&vocab, "unseen"), 0.0);
    }

    #[test]
    fn test_specificity_single_topic() {
        let vocab = vocab_with(1, &[("only", 0, 3)]);
        assert_eq!(specificity(&vocab, "only"), 1.0);
    }

    #[test]
    fn test_sort_topic_words_breaks_ties_by_word() {
        let vocab = vocab_with(
            2,
            &[("zeta", 0, 2), ("alpha", 0, 2), ("beta", 0, 5), ("gamma", 1, 1)],
        );
        let sorted = sort_topic_words(&vocab);
        let words: Vec<&str> = sorted[0].iter().map(|wc| wc.word.as_str()).collect();
        assert_eq!(words, vec!["beta", "alpha", "zeta"]);
        assert_eq!(top_n_words(&sorted[0], 2), "beta alpha");
        assert_eq!(top_n_words(&sorted[1], 10), "gamma");
    }

    #[test]
    fn test_most_frequent_words_filters_stopwords() {
        let mut vocab = vocab_with(2, &[("market", 0, 2)]);
        vocab.mark_stopword("the");
        for _ in 0..3 {
            vocab.record_stopword("the");
        }
        let without = most_frequent_words(&vocab, false, None);
        assert_eq!(without, vec![WordCount { word: "market".into(), count: 2 }]);

        let with = most_frequent_words(&vocab, true, None);
        assert_eq!(with[0].word, "the");

        let table = vocab_table(&vocab, true, None);
        assert!(table[0].stopword);
        assert_eq!(table[0].specificity, 0.0);
    }
}
