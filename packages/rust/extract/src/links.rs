//! Input link parsing.
//!
//! Three link formats are accepted, one per site:
//! - `https://keyforge-compendium.com/decks/<id>`
//! - `https://decksofkeyforge.com/decks/<id>`
//! - `https://www.keyforgegame.com/deck-details/<id>`

use kfdeck_shared::{DeckId, DeckLink, KfDeckError, LinkSource, Result};
use url::Url;

/// Path segments that precede the deck id.
const ID_MARKERS: [&str; 2] = ["decks", "deck-details"];

/// Parse one input line into a [`DeckLink`].
pub fn parse_deck_link(line: &str) -> Result<DeckLink> {
    let raw = line.trim();
    if raw.is_empty() {
        return Err(KfDeckError::invalid_link(line, "empty line"));
    }

    let url = Url::parse(raw).map_err(|e| KfDeckError::invalid_link(raw, e.to_string()))?;

    let host = url
        .host_str()
        .ok_or_else(|| KfDeckError::invalid_link(raw, "link has no host"))?
        .to_ascii_lowercase();

    let source = match host.trim_start_matches("www.") {
        "keyforge-compendium.com" => LinkSource::Compendium,
        "decksofkeyforge.com" => LinkSource::DecksOfKeyforge,
        "keyforgegame.com" => LinkSource::KeyforgeGame,
        other => {
            return Err(KfDeckError::invalid_link(
                raw,
                format!("unsupported host '{other}'"),
            ));
        }
    };

    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|p| !p.is_empty()).collect())
        .unwrap_or_default();

    let id_segment = segments
        .iter()
        .position(|s| ID_MARKERS.contains(s))
        .and_then(|i| segments.get(i + 1))
        .ok_or_else(|| KfDeckError::invalid_link(raw, "no deck id in path"))?;

    let id: DeckId = id_segment
        .parse()
        .map_err(|e| KfDeckError::invalid_link(raw, format!("bad deck id: {e}")))?;

    Ok(DeckLink {
        source,
        id,
        raw: raw.to_string(),
    })
}

/// Split a links file into link lines, skipping blanks and `#` comments.
pub fn read_link_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "2c2f8e19-5a7a-4c8e-9b0b-1f6f1c5b0e3a";

    #[test]
    fn parses_compendium_link() {
        let link = parse_deck_link(&format!("https://keyforge-compendium.com/decks/{ID}\r\n")).unwrap();
        assert_eq!(link.source, LinkSource::Compendium);
        assert_eq!(link.id.to_string(), ID);
        assert_eq!(link.raw, format!("https://keyforge-compendium.com/decks/{ID}"));
    }

    #[test]
    fn parses_dok_link_with_query() {
        let link =
            parse_deck_link(&format!("https://decksofkeyforge.com/decks/{ID}?tab=cards")).unwrap();
        assert_eq!(link.source, LinkSource::DecksOfKeyforge);
        assert_eq!(link.id.to_string(), ID);
    }

    #[test]
    fn parses_official_link() {
        let link = parse_deck_link(&format!("https://www.keyforgegame.com/deck-details/{ID}")).unwrap();
        assert_eq!(link.source, LinkSource::KeyforgeGame);

        let bare = parse_deck_link(&format!("https://keyforgegame.com/deck-details/{ID}/")).unwrap();
        assert_eq!(bare.id, link.id);
    }

    #[test]
    fn rejects_foreign_host() {
        let err = parse_deck_link(&format!("https://example.com/decks/{ID}")).unwrap_err();
        assert!(err.to_string().contains("unsupported host"));
    }

    #[test]
    fn rejects_missing_or_bad_id() {
        assert!(parse_deck_link("https://decksofkeyforge.com/decks/").is_err());
        assert!(parse_deck_link("https://decksofkeyforge.com/decks/not-a-uuid").is_err());
        assert!(parse_deck_link("decksofkeyforge.com/decks/x").is_err());
        assert!(parse_deck_link("   ").is_err());
    }

    #[test]
    fn link_lines_skip_blanks_and_comments() {
        let text = "# my decks\nhttps://a\r\n\n  https://b  \n#https://c\n";
        assert_eq!(read_link_lines(text), vec!["https://a", "https://b"]);
    }
}
