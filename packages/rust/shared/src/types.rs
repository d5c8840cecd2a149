//! Core domain types for a scraped deck.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{KfDeckError, Result};

// ---------------------------------------------------------------------------
// DeckId / DeckLink
// ---------------------------------------------------------------------------

/// The deck identifier shared by all three sites (a UUID).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeckId(pub Uuid);

impl fmt::Display for DeckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl std::str::FromStr for DeckId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Which site an input link points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkSource {
    Compendium,
    DecksOfKeyforge,
    KeyforgeGame,
}

impl fmt::Display for LinkSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Compendium => "KeyForge-Compendium",
            Self::DecksOfKeyforge => "Decks of KeyForge",
            Self::KeyforgeGame => "KeyForgeGame",
        })
    }
}

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckLink {
    pub source: LinkSource,
    pub id: DeckId,
    /// The link as it appeared in the input, trimmed.
    pub raw: String,
}

// ---------------------------------------------------------------------------
// House / Rarity
// ---------------------------------------------------------------------------

/// A KeyForge house.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum House {
    Brobnar,
    Dis,
    Logos,
    Mars,
    Sanctum,
    Shadows,
    Untamed,
    Saurian,
    StarAlliance,
    Unfathomable,
    Ekwidon,
    Geistoid,
    Skyborn,
    Redemption,
    /// A house name this build does not know about yet.
    Other(String),
}

impl House {
    /// Look up a known house by its display name. Returns `None` for
    /// anything else, which is how house icons are told apart from
    /// rarity icons on scraped pages.
    pub fn known(name: &str) -> Option<Self> {
        let key: String = name
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        let house = match key.as_str() {
            "brobnar" => Self::Brobnar,
            "dis" => Self::Dis,
            "logos" => Self::Logos,
            "mars" => Self::Mars,
            "sanctum" => Self::Sanctum,
            "shadows" => Self::Shadows,
            "untamed" => Self::Untamed,
            "saurian" => Self::Saurian,
            "staralliance" => Self::StarAlliance,
            "unfathomable" => Self::Unfathomable,
            "ekwidon" => Self::Ekwidon,
            "geistoid" => Self::Geistoid,
            "skyborn" => Self::Skyborn,
            "redemption" => Self::Redemption,
            _ => return None,
        };
        Some(house)
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Brobnar => "Brobnar",
            Self::Dis => "Dis",
            Self::Logos => "Logos",
            Self::Mars => "Mars",
            Self::Sanctum => "Sanctum",
            Self::Shadows => "Shadows",
            Self::Untamed => "Untamed",
            Self::Saurian => "Saurian",
            Self::StarAlliance => "Star Alliance",
            Self::Unfathomable => "Unfathomable",
            Self::Ekwidon => "Ekwidon",
            Self::Geistoid => "Geistoid",
            Self::Skyborn => "Skyborn",
            Self::Redemption => "Redemption",
            Self::Other(name) => name,
        }
    }
}

impl From<&str> for House {
    fn from(name: &str) -> Self {
        Self::known(name).unwrap_or_else(|| Self::Other(name.trim().to_string()))
    }
}

impl fmt::Display for House {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Card rarity as published by the sites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Special,
    Other(String),
}

impl Rarity {
    pub fn name(&self) -> &str {
        match self {
            Self::Common => "Common",
            Self::Uncommon => "Uncommon",
            Self::Rare => "Rare",
            Self::Special => "Special",
            Self::Other(name) => name,
        }
    }

    /// Single-letter label used in card lines.
    pub fn letter(&self) -> char {
        self.name().chars().next().unwrap_or('?')
    }
}

impl From<&str> for Rarity {
    fn from(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "common" => Self::Common,
            "uncommon" => Self::Uncommon,
            "rare" => Self::Rare,
            "special" => Self::Special,
            _ => Self::Other(name.trim().to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Card list
// ---------------------------------------------------------------------------

/// One owned copy of a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardLine {
    pub house: House,
    pub rarity: Rarity,
    pub title: String,
    pub maverick: bool,
}

impl CardLine {
    /// `M` for mavericks, otherwise the rarity letter.
    pub fn label(&self) -> char {
        if self.maverick { 'M' } else { self.rarity.letter() }
    }
}

impl fmt::Display for CardLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label(), self.title)
    }
}

/// Group card lines by house, in first-seen order.
pub fn group_by_house(cards: &[CardLine]) -> Vec<(&House, Vec<&CardLine>)> {
    let mut groups: Vec<(&House, Vec<&CardLine>)> = Vec::new();
    for card in cards {
        match groups.iter_mut().find(|(h, _)| *h == &card.house) {
            Some((_, lines)) => lines.push(card),
            None => groups.push((&card.house, vec![card])),
        }
    }
    groups
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Card counts per card type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeBreakdown {
    pub creatures: u32,
    pub actions: u32,
    pub artifacts: u32,
    pub upgrades: u32,
}

impl TypeBreakdown {
    /// Add `count` cards of the given type name (singular or plural, any
    /// case; the split-creature halves `Creature1`/`Creature2` count as
    /// creatures). Returns `Ok(false)` for unrecognised types and a parse
    /// error if the tally no longer fits in a `u32`.
    pub fn add(&mut self, card_type: &str, count: u32) -> Result<bool> {
        let key = card_type
            .trim()
            .trim_end_matches(|c: char| c.is_ascii_digit())
            .to_ascii_lowercase();
        let slot = match key.trim_end_matches('s') {
            "creature" => &mut self.creatures,
            "action" => &mut self.actions,
            "artifact" => &mut self.artifacts,
            "upgrade" => &mut self.upgrades,
            _ => return Ok(false),
        };
        *slot = slot.checked_add(count).ok_or_else(|| {
            KfDeckError::parse(format!("card type count overflow adding {count} {card_type}"))
        })?;
        Ok(true)
    }

    pub fn total(&self) -> u64 {
        [self.creatures, self.actions, self.artifacts, self.upgrades]
            .into_iter()
            .map(u64::from)
            .sum()
    }

    pub fn entries(&self) -> [(&'static str, u32); 4] {
        [
            ("Creatures", self.creatures),
            ("Actions", self.actions),
            ("Artifacts", self.artifacts),
            ("Upgrades", self.upgrades),
        ]
    }
}

impl fmt::Display for TypeBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .entries()
            .iter()
            .map(|(label, n)| format!("{label}: {n}"))
            .collect();
        f.write_str(&parts.join(" "))
    }
}

/// A relabelled stat fragment, e.g. `A: 10 (high)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatLine {
    pub code: String,
    pub value: String,
    pub note: Option<String>,
}

impl fmt::Display for StatLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.value)?;
        if let Some(note) = &self.note {
            write!(f, " {note}")?;
        }
        Ok(())
    }
}

/// Stats scraped from the compendium deck page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompendiumStats {
    pub types: TypeBreakdown,
    /// A, B, C, E in that order.
    pub abce: Vec<StatLine>,
    pub consistency: String,
}

impl CompendiumStats {
    /// `A: ..| B: ..| C: ..`
    pub fn abc_line(&self) -> String {
        self.abce
            .iter()
            .filter(|s| s.code != "E")
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("| ")
    }

    /// `E: ..| Cons: ..`
    pub fn e_line(&self) -> String {
        let mut parts: Vec<String> = self
            .abce
            .iter()
            .filter(|s| s.code == "E")
            .map(ToString::to_string)
            .collect();
        parts.push(format!("Cons: {}", self.consistency));
        parts.join("| ")
    }
}

/// Competitive record from the official API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckRecord {
    pub wins: u32,
    pub losses: u32,
    pub power_level: u32,
    pub chains: u32,
}

impl fmt::Display for DeckRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "W-L: {}-{}| Power: {}| Chains: {}",
            self.wins, self.losses, self.power_level, self.chains
        )
    }
}

/// SAS and AERC ratings from Decks of KeyForge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SasRatings {
    pub amber_control: f64,
    pub expected_amber: f64,
    pub artifact_control: f64,
    pub creature_control: f64,
    pub aerc_score: Option<f64>,
    pub cards: f64,
    pub synergy: f64,
    /// Stored negated: the site publishes a positive penalty.
    pub antisynergy: f64,
    pub sas: f64,
}

impl SasRatings {
    /// Labelled values in report order.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let mut rows = vec![
            ("Amber Control", format_rating(self.amber_control)),
            ("Expected Amber", format_rating(self.expected_amber)),
            ("Artifact Control", format_rating(self.artifact_control)),
            ("Creature Control", format_rating(self.creature_control)),
        ];
        if let Some(aerc) = self.aerc_score {
            rows.push(("AERC", format_rating(aerc)));
        }
        rows.extend([
            ("Cards", format_rating(self.cards)),
            ("Synergy", format_rating(self.synergy)),
            ("Antisynergy", format_rating(self.antisynergy)),
            ("SAS", format_rating(self.sas)),
        ]);
        rows
    }
}

/// Shortest decimal form; integral values print without a fraction and
/// zero never prints as `-0`.
pub fn format_rating(value: f64) -> String {
    if value == 0.0 {
        return "0".into();
    }
    format!("{value}")
}

// ---------------------------------------------------------------------------
// DeckReport
// ---------------------------------------------------------------------------

/// Human-facing links for a deck on each site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckLinks {
    pub keyforge_game: String,
    pub compendium: String,
    pub decks_of_keyforge: String,
}

/// Everything gathered for one deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckReport {
    pub id: DeckId,
    pub name: Option<String>,
    /// Houses in deck order.
    pub houses: Vec<House>,
    pub record: Option<DeckRecord>,
    pub types: Option<TypeBreakdown>,
    pub stats: Option<CompendiumStats>,
    pub sas: Option<SasRatings>,
    /// One entry per owned copy.
    pub cards: Vec<CardLine>,
    pub links: DeckLinks,
}

impl DeckReport {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("(unknown)")
    }
}
