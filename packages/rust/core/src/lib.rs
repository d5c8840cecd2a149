//! Deck analysis and batch orchestration for kfdeck.
//!
//! This crate ties together link parsing, fetching, extraction and report
//! writing into end-to-end workflows (e.g., `run_batch`).

pub mod pipeline;

pub use pipeline::{
    BatchSummary, DeckFailure, ProgressReporter, SilentProgress, analyze_deck, analyze_link,
    merge, run_batch,
};
