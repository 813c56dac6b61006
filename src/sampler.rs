//! Collapsed Gibbs sampler for LDA.
//!
//! A sweep visits every non-stopword token in document order, retracts its
//! current assignment from the counts, computes the conditional weight of
//! each topic and draws a replacement by walking the unnormalized CDF.

use rand::Rng;

use crate::corpus::Document;
use crate::error::{LdaError, Result};
use crate::vocabulary::Vocabulary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerState {
    Initialized,
    Sweeping,
    Converged,
}

#[derive(Debug, Clone)]
pub struct GibbsSampler {
    alpha: f64,  // Document-topic smoothing
    beta: f64,   // Topic-word smoothing
    topic_normalizers: Vec<f64>,
    topic_weights: Vec<f64>,
    min_weight: f64,  // smallest weight drawn from in the last sweep
}

impl GibbsSampler {
    pub fn new(num_topics: usize, alpha: f64, beta: f64) -> Self {
        GibbsSampler {
            alpha,
            beta,
            topic_normalizers: vec![0.0; num_topics],
            topic_weights: vec![0.0; num_topics],
            min_weight: f64::INFINITY,
        }
    }

    pub fn num_topics(&self) -> usize {
        self.topic_weights.len()
    }

    /// Smallest topic weight computed during the last sweep, infinite when
    /// the sweep resampled nothing
    pub fn min_weight(&self) -> f64 {
        self.min_weight
    }

    /// Resample the topic of every non-stopword token once.
    pub fn sweep<R: Rng + ?Sized>(
        &mut self,
        documents: &mut [Document],
        vocab: &mut Vocabulary,
        rng: &mut R,
    ) -> Result<()> {
        let num_topics = self.num_topics();
        if vocab.num_topics() != num_topics {
            return Err(LdaError::InvariantViolation(format!(
                "sampler has {} topics but vocabulary has {}",
                num_topics,
                vocab.num_topics()
            )));
        }

        let smoothing_mass = vocab.vocabulary_size() as f64 * self.beta;
        for topic in 0..num_topics {
            self.topic_normalizers[topic] =
                1.0 / (smoothing_mass + vocab.total_for_topic(topic) as f64);
        }
        self.min_weight = f64::INFINITY;

        for doc in documents.iter_mut() {
            let Document { tokens, topic_counts, .. } = doc;

            for token in tokens.iter_mut() {
                let Some(word_id) = token.word_id() else {
                    continue;
                };
                let old_topic = token.topic;

                // Retract the current assignment
                vocab.retract(word_id, old_topic)?;
                if topic_counts[old_topic] == 0 {
                    return Err(LdaError::InvariantViolation(format!(
                        "document count for topic {} would go negative",
                        old_topic
                    )));
                }
                topic_counts[old_topic] -= 1;
                self.topic_normalizers[old_topic] =
                    1.0 / (smoothing_mass + vocab.total_for_topic(old_topic) as f64);

                // Conditional weight of every topic
                let word_counts = vocab.topic_counts(word_id);
                let mut sum = 0.0;
                for topic in 0..num_topics {
                    let weight = (self.alpha + topic_counts[topic] as f64)
                        * (self.beta + word_counts[topic] as f64)
                        * self.topic_normalizers[topic];
                    self.topic_weights[topic] = weight;
                    self.min_weight = self.min_weight.min(weight);
                    sum += weight;
                }

                let new_topic = sample_index(&self.topic_weights, sum * rng.gen::<f64>());

                // Commit the new assignment
                token.topic = new_topic;
                vocab.assign(word_id, new_topic);
                topic_counts[new_topic] += 1;
                self.topic_normalizers[new_topic] =
                    1.0 / (smoothing_mass + vocab.total_for_topic(new_topic) as f64);
            }
        }

        Ok(())
    }
}

/// Inverse-CDF draw over unnormalized weights.
///
/// Subtracts weights from `target` until it drops to zero or below. The walk
/// stops at the last index when the weights run out, so degenerate input
/// (all zeros, rounding) never indexes past the end.
pub fn sample_index(weights: &[f64], target: f64) -> usize {
    let last = weights.len().saturating_sub(1);
    let mut remaining = target;
    for (i, &weight) in weights.iter().enumerate() {
        remaining -= weight;
        if remaining <= 0.0 || i == last {
            return i;
        }
    }
    0
}
