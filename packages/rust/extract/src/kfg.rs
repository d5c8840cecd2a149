//! Official KeyForge `/api/decks/<id>/?links=cards` extractor.
//!
//! `data._links.cards` lists one card id per owned copy; the card details
//! live in `_linked.cards`.

use std::collections::HashMap;

use kfdeck_shared::{CardLine, DeckRecord, House, KfDeckError, Rarity, Result, TypeBreakdown};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct DeckResponse {
    data: DeckData,
    #[serde(rename = "_linked", default)]
    linked: Linked,
}

#[derive(Debug, Deserialize)]
struct DeckData {
    name: String,
    #[serde(default)]
    wins: u32,
    #[serde(default)]
    losses: u32,
    #[serde(default)]
    power_level: u32,
    #[serde(default)]
    chains: u32,
    #[serde(rename = "_links")]
    links: DeckLinks,
}

#[derive(Debug, Deserialize)]
struct DeckLinks {
    #[serde(default)]
    houses: Vec<String>,
    #[serde(default)]
    cards: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Linked {
    #[serde(default)]
    cards: Vec<LinkedCard>,
}

#[derive(Debug, Deserialize)]
struct LinkedCard {
    id: String,
    card_title: String,
    house: String,
    card_type: String,
    rarity: String,
    #[serde(default)]
    is_maverick: bool,
}

/// What the official API contributes to a report.
#[derive(Debug, Clone)]
pub struct KfgDeck {
    pub name: String,
    pub record: DeckRecord,
    /// Houses in deck order.
    pub houses: Vec<House>,
    pub types: TypeBreakdown,
    /// One line per owned copy, grouped by house in deck order.
    pub cards: Vec<CardLine>,
}

/// Parse the deck payload and expand its card list.
pub fn parse_deck(json: &serde_json::Value) -> Result<KfgDeck> {
    let resp = DeckResponse::deserialize(json)
        .map_err(|e| KfDeckError::parse(format!("keyforgegame payload: {e}")))?;

    let by_id: HashMap<&str, &LinkedCard> =
        resp.linked.cards.iter().map(|c| (c.id.as_str(), c)).collect();

    // Copy counts per id, in first-seen order.
    let mut order: Vec<&str> = Vec::new();
    let mut copies: HashMap<&str, u32> = HashMap::new();
    for id in &resp.data.links.cards {
        let n = copies.entry(id.as_str()).or_insert(0);
        if *n == 0 {
            order.push(id.as_str());
        }
        *n += 1;
    }

    let mut expanded: Vec<CardLine> = Vec::with_capacity(resp.data.links.cards.len());
    let mut types = TypeBreakdown::default();
    for id in order {
        let card = by_id.get(id).ok_or_else(|| {
            KfDeckError::parse(format!("keyforgegame payload: card '{id}' not in _linked.cards"))
        })?;
        let count = copies[id];
        if !types.add(&card.card_type, count)? {
            debug!(card = %card.card_title, card_type = %card.card_type, "untracked card type");
        }
        for _ in 0..count {
            expanded.push(CardLine {
                house: House::from(card.house.as_str()),
                rarity: Rarity::from(card.rarity.as_str()),
                title: card.card_title.clone(),
                maverick: card.is_maverick,
            });
        }
    }

    let houses: Vec<House> = resp
        .data
        .links
        .houses
        .iter()
        .map(|h| House::from(h.as_str()))
        .collect();

    // Deck houses first, then anything outside them; stable within a house.
    let rank = |h: &House| houses.iter().position(|d| d == h).unwrap_or(houses.len());
    expanded.sort_by_key(|c| rank(&c.house));

    Ok(KfgDeck {
        name: resp.data.name,
        record: DeckRecord {
            wins: resp.data.wins,
            losses: resp.data.losses,
            power_level: resp.data.power_level,
            chains: resp.data.chains,
        },
        houses,
        types,
        cards: expanded,
    })
}
