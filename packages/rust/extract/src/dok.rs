//! Decks of KeyForge `/api/decks/<id>/simple` extractor (SAS / AERC).

use kfdeck_shared::{KfDeckError, Result, SasRatings};
use serde::Deserialize;

/// Fields we read from the simple deck payload; everything else is ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SimpleDeck {
    #[serde(default)]
    name: Option<String>,
    amber_control: f64,
    expected_amber: f64,
    artifact_control: f64,
    creature_control: f64,
    #[serde(default)]
    aerc_score: Option<f64>,
    cards_rating: f64,
    synergy_rating: f64,
    antisynergy_rating: f64,
    sas_rating: f64,
}

/// What Decks of KeyForge contributes to a report.
#[derive(Debug, Clone)]
pub struct DokDeck {
    pub name: Option<String>,
    pub sas: SasRatings,
}

/// Parse the simple deck payload.
pub fn parse_sas(json: &serde_json::Value) -> Result<DokDeck> {
    let deck = SimpleDeck::deserialize(json)
        .map_err(|e| KfDeckError::parse(format!("decks of keyforge payload: {e}")))?;

    Ok(DokDeck {
        name: deck.name.filter(|n| !n.trim().is_empty()),
        sas: SasRatings {
            amber_control: deck.amber_control,
            expected_amber: deck.expected_amber,
            artifact_control: deck.artifact_control,
            creature_control: deck.creature_control,
            aerc_score: deck.aerc_score,
            cards: deck.cards_rating,
            synergy: deck.synergy_rating,
            // Published as a positive penalty.
            antisynergy: -deck.antisynergy_rating,
            sas: deck.sas_rating,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn zero_antisynergy_is_not_negative_zero() {
        let payload = json!({
            "amberControl": 0, "expectedAmber": 0, "artifactControl": 0,
            "creatureControl": 0, "cardsRating": 50, "synergyRating": 0,
            "antisynergyRating": 0, "sasRating": 50
        });
        let deck = parse_sas(&payload).unwrap();
        let rows = deck.sas.rows();
        let anti = rows.iter().find(|(l, _)| *l == "Antisynergy").unwrap();
        assert_eq!(anti.1, "0");
        assert!(deck.name.is_none());
        assert!(!rows.iter().any(|(l, _)| *l == "AERC"));
    }

    #[test]
    fn missing_rating_is_a_parse_error() {
        let payload = json!({ "amberControl": 1, "sasRating": 50 });
        let err = parse_sas(&payload).unwrap_err();
        assert!(matches!(err, KfDeckError::Parse { .. }));
        assert!(err.to_string().contains("decks of keyforge"));
    }
}
