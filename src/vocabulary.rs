//! Vocabulary and count store.
//!
//! Owns the word x topic counts, the per-topic token totals, the raw
//! occurrence counts and the stopword set. Non-stopword words are interned
//! into dense ids so the sampler can index count rows without hashing.

use std::collections::{HashMap, HashSet};

use counter::Counter;

use crate::error::{LdaError, Result};

pub type WordId = usize;

#[derive(Debug, Clone)]
pub struct Vocabulary {
    num_topics: usize,
    words: Vec<String>,
    index: HashMap<String, WordId>,
    word_topic_counts: Vec<Vec<usize>>,  // WordId x Topics
    tokens_per_topic: Vec<usize>,
    occurrences: Counter<String>,        // every word, stopwords included
    stopwords: HashSet<String>,
}

impl Vocabulary {
    pub fn new(num_topics: usize, stopwords: HashSet<String>) -> Self {
        Vocabulary {
            num_topics,
            words: Vec::new(),
            index: HashMap::new(),
            word_topic_counts: Vec::new(),
            tokens_per_topic: vec![0; num_topics],
            occurrences: Counter::new(),
            stopwords,
        }
    }

    pub fn num_topics(&self) -> usize {
        self.num_topics
    }

    /// Number of distinct non-stopword words ever recorded
    pub fn vocabulary_size(&self) -> usize {
        self.words.len()
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    /// Promote a word to a stopword for the rest of the run.
    pub fn mark_stopword(&mut self, word: &str) {
        if !self.stopwords.contains(word) {
            self.stopwords.insert(word.to_string());
        }
    }

    pub fn stopwords(&self) -> &HashSet<String> {
        &self.stopwords
    }

    pub fn word_id(&self, word: &str) -> Option<WordId> {
        self.index.get(word).copied()
    }

    /// Non-stopword words in first-seen order
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Count a stopword occurrence. Stopwords never enter the topic counts.
    pub fn record_stopword(&mut self, word: &str) {
        self.occurrences[&word.to_string()] += 1;
    }

    /// Record a non-stopword occurrence under `topic`, interning the word on
    /// first sight.
    pub fn record_occurrence(&mut self, word: &str, topic: usize) -> Result<WordId> {
        self.check_topic(topic)?;
        let id = match self.index.get(word) {
            Some(&id) => id,
            None => {
                let id = self.words.len();
                self.words.push(word.to_string());
                self.index.insert(word.to_string(), id);
                self.word_topic_counts.push(vec![0; self.num_topics]);
                id
            }
        };
        self.assign(id, topic);
        self.occurrences[&word.to_string()] += 1;
        Ok(id)
    }

    /// Exact inverse of [`Vocabulary::record_occurrence`].
    ///
    /// Zeroed entries stay in place and the word stays interned, so the
    /// vocabulary size never shrinks.
    pub fn remove_occurrence(&mut self, word: &str, topic: usize) -> Result<()> {
        self.check_topic(topic)?;
        let id = self.word_id(word).ok_or_else(|| {
            LdaError::InvariantViolation(format!("removing unrecorded word '{}'", word))
        })?;
        self.retract(id, topic)?;
        match self.occurrences.get_mut(word) {
            Some(count) if *count > 0 => *count -= 1,
            _ => {
                return Err(LdaError::InvariantViolation(format!(
                    "occurrence count of '{}' would go negative",
                    word
                )))
            }
        }
        Ok(())
    }

    pub fn count_for_word_topic(&self, word: &str, topic: usize) -> usize {
        self.word_id(word)
            .and_then(|id| self.word_topic_counts[id].get(topic).copied())
            .unwrap_or(0)
    }

    pub fn total_for_topic(&self, topic: usize) -> usize {
        self.tokens_per_topic.get(topic).copied().unwrap_or(0)
    }

    pub fn tokens_per_topic(&self) -> &[usize] {
        &self.tokens_per_topic
    }

    /// Per-topic counts of an interned word
    pub fn topic_counts(&self, id: WordId) -> &[usize] {
        &self.word_topic_counts[id]
    }

    pub fn topic_counts_for(&self, word: &str) -> Option<&[usize]> {
        self.word_id(word).map(|id| self.topic_counts(id))
    }

    /// Total occurrences of a word, stopwords included
    pub fn occurrence_count(&self, word: &str) -> usize {
        self.occurrences.get(word).copied().unwrap_or(0)
    }

    pub fn occurrences(&self) -> &Counter<String> {
        &self.occurrences
    }

    /// Move one token of `id` out of `topic` without touching raw occurrence
    /// counts. Used by the sampler together with [`Vocabulary::assign`].
    pub(crate) fn retract(&mut self, id: WordId, topic: usize) -> Result<()> {
        let word_count = &mut self.word_topic_counts[id][topic];
        let topic_total = &mut self.tokens_per_topic[topic];
        if *word_count == 0 || *topic_total == 0 {
            return Err(LdaError::InvariantViolation(format!(
                "count of '{}' in topic {} would go negative",
                self.words[id], topic
            )));
        }
        *word_count -= 1;
        *topic_total -= 1;
        Ok(())
    }

    pub(crate) fn assign(&mut self, id: WordId, topic: usize) {
        self.word_topic_counts[id][topic] += 1;
        self.tokens_per_topic[topic] += 1;
    }

    fn check_topic(&self, topic: usize) -> Result<()> {
        if topic >= self.num_topics {
            return Err(LdaError::TopicOutOfRange {
                topic,
                num_topics: self.num_topics,
            });
        }
        Ok(())
    }
}
