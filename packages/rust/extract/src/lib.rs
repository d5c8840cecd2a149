//! Link parsing and content extraction for the three deck sites.
//!
//! This crate provides:
//! - [`links`]: input line → [`DeckLink`](kfdeck_shared::DeckLink)
//! - [`compendium`]: KeyForge Compendium HTML (ABCE stats, card table)
//! - [`dok`]: Decks of KeyForge JSON (SAS / AERC)
//! - [`kfg`]: official KeyForge JSON (record, houses, card list)

pub mod compendium;
pub mod dok;
pub mod kfg;
pub mod links;
mod text;

pub use compendium::CompendiumDeck;
pub use dok::DokDeck;
pub use kfg::KfgDeck;
pub use links::{parse_deck_link, read_link_lines};
