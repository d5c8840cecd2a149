//! Shared types, error model, and configuration for kfdeck.
//!
//! This crate is the foundation depended on by all other kfdeck crates.
//! It provides:
//! - [`KfDeckError`]: the unified error type
//! - Domain types ([`DeckId`], [`DeckLink`], [`CardLine`], [`DeckReport`], ...)
//! - Configuration ([`AppConfig`], [`RunConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, OutputFormat, RunConfig, RunPolicyConfig, SourcesConfig,
    config_dir, config_file_path, init_config, load_config, load_config_from,
};
pub use error::{KfDeckError, Result};
pub use types::{
    CardLine, CompendiumStats, DeckId, DeckLink, DeckLinks, DeckRecord, DeckReport, House,
    LinkSource, Rarity, SasRatings, StatLine, TypeBreakdown, format_rating, group_by_house,
};
