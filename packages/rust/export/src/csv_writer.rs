//! CSV report: one labelled row per fact, rows vary in length.
//!
//! ```text
//! Deck,1,<input link>
//! Name,<deck name>
//! Houses,Brobnar,Dis,Logos
//! Record,Wins,3,Losses,1,Power,2,Chains,0
//! Types,Creatures,17,Actions,12,Artifacts,5,Upgrades,2
//! Stat,A,10,(high)
//! SAS,Amber Control,10.5
//! Card,Brobnar,C,Anger,Common
//! Link,KeyForgeGame,<url>
//! ```

use std::io::Write;

use kfdeck_shared::{DeckReport, KfDeckError, Result};

use crate::{ReportHeader, ReportTotals, ReportWriter};

pub struct CsvReportWriter<W: Write> {
    inner: csv::Writer<W>,
}

impl<W: Write> CsvReportWriter<W> {
    pub fn new(out: W) -> Self {
        let inner = csv::WriterBuilder::new().flexible(true).from_writer(out);
        Self { inner }
    }

    fn row<I, T>(&mut self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        self.inner
            .write_record(fields)
            .map_err(|e| KfDeckError::Export(format!("csv: {e}")))
    }
}

impl<W: Write> ReportWriter for CsvReportWriter<W> {
    fn begin(&mut self, header: &ReportHeader) -> Result<()> {
        self.row([
            "kfdeck",
            header.tool_version.as_str(),
            "generated",
            header.timestamp().as_str(),
        ])
    }

    fn deck(&mut self, number: usize, link: &str, report: &DeckReport) -> Result<()> {
        self.row(["Deck", number.to_string().as_str(), link])?;
        self.row(["Name", report.display_name()])?;

        let mut houses = vec!["Houses".to_string()];
        houses.extend(report.houses.iter().map(ToString::to_string));
        self.row(&houses)?;

        if let Some(rec) = &report.record {
            self.row([
                "Record".to_string(),
                "Wins".into(),
                rec.wins.to_string(),
                "Losses".into(),
                rec.losses.to_string(),
                "Power".into(),
                rec.power_level.to_string(),
                "Chains".into(),
                rec.chains.to_string(),
            ])?;
        }

        if let Some(types) = &report.types {
            let mut row = vec!["Types".to_string()];
            for (label, n) in types.entries() {
                row.push(label.to_string());
                row.push(n.to_string());
            }
            self.row(&row)?;
        }

        if let Some(stats) = &report.stats {
            for stat in &stats.abce {
                let note = stat.note.as_deref().unwrap_or("");
                self.row(["Stat", stat.code.as_str(), stat.value.as_str(), note])?;
            }
            self.row(["Stat", "Cons", stats.consistency.as_str()])?;
        }

        if let Some(sas) = &report.sas {
            for (label, value) in sas.rows() {
                self.row(["SAS", label, value.as_str()])?;
            }
        }

        for card in &report.cards {
            self.row([
                "Card",
                card.house.name(),
                card.label().to_string().as_str(),
                card.title.as_str(),
                card.rarity.name(),
            ])?;
        }

        self.row(["Link", "KeyForgeGame", report.links.keyforge_game.as_str()])?;
        self.row(["Link", "KeyForge-Compendium", report.links.compendium.as_str()])?;
        self.row(["Link", "Decks of KeyForge", report.links.decks_of_keyforge.as_str()])
    }

    fn failure(&mut self, number: usize, link: &str, error: &str) -> Result<()> {
        self.row(["Error", number.to_string().as_str(), link, error])
    }

    fn finish(&mut self, totals: &ReportTotals) -> Result<()> {
        self.row([
            "Summary".to_string(),
            "analyzed".into(),
            totals.analyzed.to_string(),
            "failed".into(),
            totals.failed.to_string(),
        ])?;
        self.inner
            .flush()
            .map_err(|e| KfDeckError::Export(format!("csv flush: {e}")))
    }
}
