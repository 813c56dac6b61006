//! Latent Dirichlet Allocation over short documents, fitted by collapsed
//! Gibbs sampling, with per-topic word and document rankings.

pub mod config;
pub mod corpus;
pub mod error;
pub mod preprocess;
pub mod sampler;
pub mod summary;
pub mod topic_modeling;
pub mod vocabulary;

pub use config::LdaConfig;
pub use corpus::{Document, DocumentId, DocumentInput, DocumentText, Token};
pub use error::{LdaError, Result};
pub use preprocess::{Preprocessor, StopwordDictionary};
pub use sampler::{GibbsSampler, SamplerState};
pub use summary::{RankedDocument, TopicDocuments, VocabEntry, WordCount};
pub use topic_modeling::TopicModel;
pub use vocabulary::Vocabulary;
