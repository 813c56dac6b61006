use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::config::LdaConfig;
use crate::corpus::{build_corpus, Document, DocumentInput};
use crate::error::{LdaError, Result};
use crate::preprocess::{base_stopwords, Preprocessor, StopwordDictionary};
use crate::sampler::{GibbsSampler, SamplerState};
use crate::summary::{self, TopicDocuments, VocabEntry, WordCount};
use crate::vocabulary::Vocabulary;

/// Words shown per topic by [`TopicModel::display_topic_words`]
pub const DISPLAY_WORDS: usize = 10;

/// An LDA topic model fitted by collapsed Gibbs sampling.
///
/// The model moves `Initialized -> Sweeping -> Converged`. Sorted topic word
/// lists are computed once, on the transition into `Converged`.
#[derive(Debug)]
pub struct TopicModel<R: Rng = StdRng> {
    config: LdaConfig,
    vocabulary: Vocabulary,
    documents: Vec<Document>,
    sampler: GibbsSampler,
    rng: R,
    state: SamplerState,
    complete_sweeps: usize,
    topic_words: Vec<Vec<WordCount>>,
}

impl TopicModel<StdRng> {
    /// Initialize a model, seeding from `config.seed` or from OS entropy.
    pub fn build(
        config: LdaConfig,
        documents: Vec<DocumentInput>,
        dictionary: Option<StopwordDictionary>,
    ) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::build_with_rng(config, documents, dictionary, rng)
    }

    /// Initialize and run every requested sweep.
    pub fn fit(
        config: LdaConfig,
        documents: Vec<DocumentInput>,
        dictionary: Option<StopwordDictionary>,
    ) -> Result<Self> {
        let mut model = Self::build(config, documents, dictionary)?;
        model.run()?;
        Ok(model)
    }
}

impl<R: Rng> TopicModel<R> {
    /// Initialize a model drawing all randomness from `rng`.
    pub fn build_with_rng(
        config: LdaConfig,
        documents: Vec<DocumentInput>,
        dictionary: Option<StopwordDictionary>,
        mut rng: R,
    ) -> Result<Self> {
        config.validate()?;
        let preprocessor = Preprocessor::new(&config.language, config.stem)?;

        let mut stopwords = base_stopwords(&config.language);
        if let Some(dictionary) = dictionary {
            stopwords.extend(dictionary.into_words());
        }

        let num_topics = config.number_topics;
        let mut vocabulary = Vocabulary::new(num_topics, stopwords);
        let documents = build_corpus(documents, &mut vocabulary, &preprocessor, &mut rng)?;

        info!(
            documents = documents.len(),
            vocabulary = vocabulary.vocabulary_size(),
            topics = num_topics,
            sweeps = config.sweeps,
            "initialized topic model"
        );

        let sampler = GibbsSampler::new(
            num_topics,
            config.document_topic_smoothing,
            config.topic_word_smoothing,
        );

        Ok(TopicModel {
            config,
            vocabulary,
            documents,
            sampler,
            rng,
            state: SamplerState::Initialized,
            complete_sweeps: 0,
            topic_words: Vec::new(),
        })
    }

    /// Sweep until the requested number of sweeps has completed.
    pub fn run(&mut self) -> Result<()> {
        while self.step()? != SamplerState::Converged {}
        info!(sweeps = self.complete_sweeps, "sampling converged");
        Ok(())
    }

    /// Advance by at most one sweep and return the new state.
    ///
    /// Sweeps are atomic, so callers may stop between steps. Once the
    /// requested count is reached the model converges without sweeping again.
    pub fn step(&mut self) -> Result<SamplerState> {
        if self.state == SamplerState::Converged {
            return Ok(self.state);
        }
        if self.complete_sweeps < self.config.sweeps {
            self.state = SamplerState::Sweeping;
            self.sampler
                .sweep(&mut self.documents, &mut self.vocabulary, &mut self.rng)?;
            self.complete_sweeps += 1;
            debug!(
                sweep = self.complete_sweeps,
                min_weight = self.sampler.min_weight(),
                "sweep complete"
            );
        }
        if self.complete_sweeps >= self.config.sweeps {
            self.converge();
        }
        Ok(self.state)
    }

    fn converge(&mut self) {
        self.topic_words = summary::sort_topic_words(&self.vocabulary);
        self.state = SamplerState::Converged;
    }

    pub fn state(&self) -> SamplerState {
        self.state
    }

    pub fn complete_sweeps(&self) -> usize {
        self.complete_sweeps
    }

    pub fn requested_sweeps(&self) -> usize {
        self.config.sweeps
    }

    pub fn num_topics(&self) -> usize {
        self.config.number_topics
    }

    pub fn config(&self) -> &LdaConfig {
        &self.config
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Sorted word counts of every topic
    pub fn topic_words(&self) -> Result<&[Vec<WordCount>]> {
        match self.state {
            SamplerState::Converged => Ok(&self.topic_words),
            _ => Err(LdaError::NotConverged),
        }
    }

    pub fn top_n_words(&self, topic: usize, n: usize) -> Result<String> {
        self.check_topic(topic)?;
        let topic_words = self.topic_words()?;
        Ok(summary::top_n_words(&topic_words[topic], n))
    }

    /// Top ten words of every topic, space-joined
    pub fn display_topic_words(&self) -> Result<Vec<String>> {
        let topic_words = self.topic_words()?;
        Ok(topic_words
            .iter()
            .map(|words| summary::top_n_words(words, DISPLAY_WORDS))
            .collect())
    }

    pub fn specificity(&self, word: &str) -> f64 {
        summary::specificity(&self.vocabulary, word)
    }

    pub fn most_frequent_words(
        &self,
        include_stops: bool,
        topic: Option<usize>,
    ) -> Result<Vec<WordCount>> {
        if let Some(topic) = topic {
            self.check_topic(topic)?;
        }
        Ok(summary::most_frequent_words(&self.vocabulary, include_stops, topic))
    }

    /// Vocabulary table for one topic, or for the whole corpus when
    /// `sort_by_topic` is false. Stopwords appear in the corpus table only
    /// when `displaying_stop_words` is set.
    pub fn vocab_table(&self, topic: usize, sort_by_topic: bool) -> Result<Vec<VocabEntry>> {
        self.check_topic(topic)?;
        let topic = sort_by_topic.then_some(topic);
        Ok(summary::vocab_table(
            &self.vocabulary,
            self.config.displaying_stop_words,
            topic,
        ))
    }

    pub fn reorder_documents(&self) -> Vec<TopicDocuments> {
        summary::reorder_documents(
            &self.documents,
            &self.vocabulary,
            self.config.doc_sort_smoothing,
        )
    }

    /// Check that topic totals agree with the document and word counts and
    /// that every document count matches its token assignments.
    pub fn verify_counts(&self) -> Result<()> {
        let num_topics = self.num_topics();
        let mut from_documents = vec![0usize; num_topics];
        let mut from_words = vec![0usize; num_topics];

        for doc in &self.documents {
            let mut assigned = vec![0usize; num_topics];
            for token in doc.tokens.iter().filter(|t| !t.is_stopword()) {
                assigned[token.topic] += 1;
            }
            if assigned != doc.topic_counts {
                return Err(LdaError::InvariantViolation(format!(
                    "document {} counts {:?} disagree with its tokens {:?}",
                    doc.id, doc.topic_counts, assigned
                )));
            }
            for (total, count) in from_documents.iter_mut().zip(&doc.topic_counts) {
                *total += count;
            }
        }

        for id in 0..self.vocabulary.vocabulary_size() {
            for (total, count) in from_words.iter_mut().zip(self.vocabulary.topic_counts(id)) {
                *total += count;
            }
        }

        let totals = self.vocabulary.tokens_per_topic();
        if totals != from_documents.as_slice() || totals != from_words.as_slice() {
            return Err(LdaError::InvariantViolation(format!(
                "topic totals {:?}, documents {:?}, words {:?}",
                totals, from_documents, from_words
            )));
        }
        Ok(())
    }

    fn check_topic(&self, topic: usize) -> Result<()> {
        if topic >= self.num_topics() {
            return Err(LdaError::TopicOutOfRange {
                topic,
                num_topics: self.num_topics(),
            });
        }
        Ok(())
    }
}
