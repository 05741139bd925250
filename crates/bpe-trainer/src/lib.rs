//! # `bpe-trainer`
//!
//! A byte-pair-encoding tokenizer trainer compatible with the GPT-2
//! pre-tokenization regime: streams a corpus, builds a pretoken frequency
//! table in parallel, and runs an incremental merge engine to learn a
//! vocabulary and an ordered list of merges.
//!
//! The two entry points are [`Trainer::train`] for in-memory corpora and
//! [`Trainer::train_from_file`] for streamed ones; [`state::save_state`]
//! and [`state::load_state`] persist the result.

pub mod chunking;
pub mod error;
pub mod pattern;
pub mod pretokenize;
pub mod state;
pub mod training;
pub mod types;
pub mod vocab;

pub use error::{Result, TrainerError};
pub use training::Trainer;
pub use vocab::{Merges, Vocab};
