//! KeyForge Compendium deck page extractor.
//!
//! The page has no stable ids or classes worth trusting, so everything is
//! positional:
//! - the first `div > h5 > a` is the deck name, linking to the official page;
//! - the first nine `li` items are the stat block (four card-type counts,
//!   then A, B, C, E and consistency). Type labels are normalised: the
//!   page may say `1 Creature` or `17 Creatures` in any order, and the
//!   report always uses the plural labels in the fixed order Creatures,
//!   Actions, Artifacts, Upgrades;
//! - card rows are six `td` cells each, count in column 1 and name in
//!   column 2, with the house, rarity and optional maverick icons as
//!   `td > img` alt texts in that order.

use std::sync::LazyLock;

use kfdeck_shared::{
    CardLine, CompendiumStats, House, KfDeckError, Rarity, Result, StatLine, TypeBreakdown,
};
use scraper::{Html, Selector};
use tracing::debug;

use crate::text::element_text;

/// Cells per card row.
const ROW_CELLS: usize = 6;

/// Stat items at the top of the page.
const STAT_ITEMS: usize = 9;

static TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div > h5 > a").expect("title selector"));
static LI_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("li").expect("li selector"));
static TD_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").expect("td selector"));
static IMG_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td > img").expect("img selector"));

/// Everything the compendium page contributes to a report.
#[derive(Debug, Clone)]
pub struct CompendiumDeck {
    pub name: String,
    /// Link to the deck on the official site.
    pub official_link: Option<String>,
    pub stats: CompendiumStats,
    pub cards: Vec<CardLine>,
}

/// Parse a full compendium deck page.
pub fn parse_page(html: &str) -> Result<CompendiumDeck> {
    let doc = Html::parse_document(html);

    let deck = CompendiumDeck {
        name: parse_name(&doc)?,
        official_link: parse_official_link(&doc),
        stats: parse_stats(&doc)?,
        cards: parse_cards(&doc)?,
    };

    debug!(name = %deck.name, cards = deck.cards.len(), "parsed compendium page");
    Ok(deck)
}

/// Deck name: text of the first `div > h5 > a`.
pub fn parse_name(doc: &Html) -> Result<String> {
    doc.select(&TITLE_SEL)
        .next()
        .map(element_text)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| KfDeckError::parse("compendium page: no deck title (div > h5 > a)"))
}

/// Official deck link: `href` of the first `div > h5 > a`.
pub fn parse_official_link(doc: &Html) -> Option<String> {
    doc.select(&TITLE_SEL)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
}

/// The nine-item stat block.
pub fn parse_stats(doc: &Html) -> Result<CompendiumStats> {
    let items: Vec<Vec<String>> = doc
        .select(&LI_SEL)
        .take(STAT_ITEMS)
        .map(|li| {
            element_text(li)
                .split(' ')
                .filter(|w| !w.is_empty())
                .map(String::from)
                .collect()
        })
        .collect();

    if items.len() < STAT_ITEMS {
        return Err(KfDeckError::parse(format!(
            "compendium page: expected {STAT_ITEMS} stat items, found {}",
            items.len()
        )));
    }

    // Items 0..4: "<count> <Type>"
    let mut types = TypeBreakdown::default();
    for words in &items[..4] {
        let count: u32 = word(words, 0, "card type count")?
            .parse()
            .map_err(|_| KfDeckError::parse(format!("compendium page: bad type count in {words:?}")))?;
        let label = words.last().map(String::as_str).unwrap_or_default();
        if !types.add(label, count)? {
            return Err(KfDeckError::parse(format!(
                "compendium page: unknown card type '{label}'"
            )));
        }
    }

    // Items 4..8: A, B, C, E. C's label is two words long.
    let mut abce = Vec::with_capacity(4);
    for (code, words) in ["A", "B", "C", "E"].into_iter().zip(&items[4..8]) {
        let offset = if code == "C" { 2 } else { 1 };
        abce.push(StatLine {
            code: code.to_string(),
            value: word(words, offset, code)?.to_string(),
            note: words.get(offset + 1).cloned(),
        });
    }

    let consistency = word(&items[8], 1, "consistency")?.to_string();

    Ok(CompendiumStats {
        types,
        abce,
        consistency,
    })
}

/// The card table, expanded to one line per owned copy.
pub fn parse_cards(doc: &Html) -> Result<Vec<CardLine>> {
    let cells: Vec<String> = doc.select(&TD_SEL).map(element_text).collect();
    let rows = icon_rows(doc)?;

    if cells.len() % ROW_CELLS != 0 {
        return Err(KfDeckError::parse(format!(
            "compendium page: {} table cells is not a whole number of {ROW_CELLS}-cell rows",
            cells.len()
        )));
    }

    let entries: Vec<(u32, String)> = cells
        .chunks(ROW_CELLS)
        .map(|row| -> Result<(u32, String)> {
            let count = row[1].parse::<u32>().map_err(|_| {
                KfDeckError::parse(format!("compendium page: bad copy count '{}'", row[1]))
            })?;
            Ok((count, row[2].clone()))
        })
        .collect::<Result<_>>()?;

    if entries.len() != rows.len() {
        return Err(KfDeckError::parse(format!(
            "compendium page: {} card rows but {} icon groups",
            entries.len(),
            rows.len()
        )));
    }

    let mut cards = Vec::new();
    for ((count, title), icons) in entries.into_iter().zip(rows) {
        for _ in 0..count {
            cards.push(CardLine {
                house: icons.house.clone(),
                rarity: icons.rarity.clone(),
                title: title.clone(),
                maverick: icons.maverick,
            });
        }
    }

    Ok(cards)
}

/// Icons belonging to one card row.
#[derive(Debug)]
struct RowIcons {
    house: House,
    rarity: Rarity,
    maverick: bool,
}

/// Walk `td > img` alt texts: a house icon opens a row, the next icon is the
/// rarity, and any further icon before the next house marks a maverick.
fn icon_rows(doc: &Html) -> Result<Vec<RowIcons>> {
    let mut rows: Vec<RowIcons> = Vec::new();
    let mut pending_house: Option<House> = None;

    for img in doc.select(&IMG_SEL) {
        let alt = img.value().attr("alt").unwrap_or("").trim();

        if let Some(house) = House::known(alt) {
            if pending_house.is_some() {
                return Err(KfDeckError::parse(format!(
                    "compendium page: house icon '{alt}' follows a row without rarity"
                )));
            }
            pending_house = Some(house);
            continue;
        }

        match pending_house.take() {
            Some(house) => rows.push(RowIcons {
                house,
                rarity: Rarity::from(alt),
                maverick: false,
            }),
            None => match rows.last_mut() {
                Some(row) => row.maverick = true,
                None => {
                    return Err(KfDeckError::parse(format!(
                        "compendium page: icon '{alt}' before any house icon"
                    )));
                }
            },
        }
    }

    if pending_house.is_some() {
        return Err(KfDeckError::parse(
            "compendium page: last card row has no rarity icon",
        ));
    }

    Ok(rows)
}

fn word<'a>(words: &'a [String], i: usize, what: &str) -> Result<&'a str> {
    words
        .get(i)
        .map(String::as_str)
        .ok_or_else(|| KfDeckError::parse(format!("compendium page: missing {what} in {words:?}")))
}
