//! Report writers: one row block per deck, as CSV or CRLF plain text.
//!
//! Both writers share the [`ReportWriter`] trait so the batch driver does not
//! care which format it is producing.

mod csv_writer;
mod text_writer;

use std::io::Write;

use chrono::{DateTime, SecondsFormat, Utc};
use kfdeck_shared::{DeckReport, OutputFormat, Result};

pub use csv_writer::CsvReportWriter;
pub use text_writer::TextReportWriter;

/// Written once at the top of a report.
#[derive(Debug, Clone)]
pub struct ReportHeader {
    pub tool_version: String,
    pub generated_at: DateTime<Utc>,
}

impl ReportHeader {
    pub fn now(tool_version: impl Into<String>) -> Self {
        Self {
            tool_version: tool_version.into(),
            generated_at: Utc::now(),
        }
    }

    pub(crate) fn timestamp(&self) -> String {
        self.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// Written once at the bottom of a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportTotals {
    pub analyzed: usize,
    pub failed: usize,
}

/// Sink for a batch of deck reports.
pub trait ReportWriter {
    fn begin(&mut self, header: &ReportHeader) -> Result<()>;

    /// Deck `number` is 1-based, in input order.
    fn deck(&mut self, number: usize, link: &str, report: &DeckReport) -> Result<()>;

    /// A deck that could not be analysed (keep-going mode).
    fn failure(&mut self, number: usize, link: &str, error: &str) -> Result<()>;

    /// Write the closing summary and flush.
    fn finish(&mut self, totals: &ReportTotals) -> Result<()>;
}

/// Build the writer for `format` over any byte sink.
pub fn writer_for<'a, W: Write + 'a>(format: OutputFormat, out: W) -> Box<dyn ReportWriter + 'a> {
    tracing::debug!(%format, "creating report writer");
    match format {
        OutputFormat::Csv => Box::new(CsvReportWriter::new(out)),
        OutputFormat::Text => Box::new(TextReportWriter::new(out)),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::TimeZone;
    use kfdeck_shared::{
        CardLine, CompendiumStats, DeckLinks, DeckRecord, DeckReport, House, Rarity, SasRatings,
        StatLine, TypeBreakdown,
    };

    use super::ReportHeader;

    pub(crate) fn header() -> ReportHeader {
        ReportHeader {
            tool_version: "0.1.0".into(),
            generated_at: chrono::Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap(),
        }
    }

    fn card(house: House, rarity: Rarity, title: &str, maverick: bool) -> CardLine {
        CardLine {
            house,
            rarity,
            title: title.into(),
            maverick,
        }
    }

    pub(crate) fn report() -> DeckReport {
        let stat = |code: &str, value: &str, note: &str| StatLine {
            code: code.into(),
            value: value.into(),
            note: Some(note.into()),
        };
        let types = TypeBreakdown {
            creatures: 2,
            actions: 1,
            artifacts: 0,
            upgrades: 0,
        };
        DeckReport {
            id: "2c2f8e19-5a7a-4c8e-9b0b-1f6f1c5b0e3a".parse().unwrap(),
            name: Some("Quixo, the Sage".into()),
            houses: vec![House::Brobnar, House::Logos],
            record: Some(DeckRecord {
                wins: 3,
                losses: 1,
                power_level: 2,
                chains: 0,
            }),
            types: Some(types),
            stats: Some(CompendiumStats {
                types,
                abce: vec![
                    stat("A", "10", "(high)"),
                    stat("B", "6", "(avg)"),
                    stat("C", "12", "(high)"),
                    stat("E", "3", "(low)"),
                ],
                consistency: "14".into(),
            }),
            sas: Some(SasRatings {
                amber_control: 10.5,
                expected_amber: 18.0,
                artifact_control: 1.5,
                creature_control: 9.25,
                aerc_score: None,
                cards: 60.0,
                synergy: 8.0,
                antisynergy: -2.0,
                sas: 66.0,
            }),
            cards: vec![
                card(House::Brobnar, Rarity::Common, "Anger", false),
                card(House::Brobnar, Rarity::Rare, "Troll", false),
                card(House::Logos, Rarity::Rare, "Dextre", true),
            ],
            links: DeckLinks {
                keyforge_game: "https://kfg/deck-details/x".into(),
                compendium: "https://kc/decks/x".into(),
                decks_of_keyforge: "https://dok/decks/x".into(),
            },
        }
    }
}
