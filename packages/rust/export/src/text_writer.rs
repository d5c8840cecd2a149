//! Plain-text report with CRLF line endings, the layout of the earliest
//! releases of the tool.

use std::io::Write;

use kfdeck_shared::{DeckReport, KfDeckError, Result, group_by_house};

use crate::{ReportHeader, ReportTotals, ReportWriter};

const NL: &str = "\r\n";
const SEPARATOR: &str = "----------------------------------------------";

pub struct TextReportWriter<W: Write> {
    out: W,
}

impl<W: Write> TextReportWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    fn line(&mut self, text: &str) -> Result<()> {
        write!(self.out, "{text}{NL}").map_err(|e| KfDeckError::Export(format!("text: {e}")))
    }

    fn blank(&mut self) -> Result<()> {
        self.line("")
    }
}

impl<W: Write> ReportWriter for TextReportWriter<W> {
    fn begin(&mut self, header: &ReportHeader) -> Result<()> {
        self.line(&format!(
            "kfdeck {} (generated {})",
            header.tool_version,
            header.timestamp()
        ))?;
        self.line("Beginning deck analysis...")
    }

    fn deck(&mut self, number: usize, link: &str, report: &DeckReport) -> Result<()> {
        self.line(&format!("Deck number {number} of this run"))?;
        self.line(&format!("Running kfdeck using the link: {link}"))?;
        self.blank()?;
        self.line(&format!("Deck name: {}", report.display_name()))?;
        self.blank()?;

        if let Some(types) = &report.types {
            self.line(&types.to_string())?;
        }
        if let Some(stats) = &report.stats {
            self.line(&stats.abc_line())?;
            self.line(&stats.e_line())?;
        }
        if let Some(record) = &report.record {
            self.line(&record.to_string())?;
        }

        for (house, cards) in group_by_house(&report.cards) {
            self.blank()?;
            self.line(house.name())?;
            for card in cards {
                self.line(&card.to_string())?;
            }
        }

        if let Some(sas) = &report.sas {
            self.blank()?;
            self.line("SAS Info")?;
            self.blank()?;
            for (label, value) in sas.rows() {
                self.line(&format!("{label}: {value}"))?;
            }
        }

        self.blank()?;
        self.line(&format!("KeyForgeGame: {}", report.links.keyforge_game))?;
        self.line(&format!("KeyForge-Compendium: {}", report.links.compendium))?;
        self.line(&format!("Decks of KeyForge: {}", report.links.decks_of_keyforge))?;
        self.line(SEPARATOR)
    }

    fn failure(&mut self, number: usize, link: &str, error: &str) -> Result<()> {
        self.line(&format!("Deck number {number} of this run"))?;
        self.line(&format!("ERROR while analyzing {link}: {error}"))?;
        self.line(SEPARATOR)
    }

    fn finish(&mut self, totals: &ReportTotals) -> Result<()> {
        self.line(&format!(
            "All done! Analyzed {} decks in total.",
            totals.analyzed
        ))?;
        if totals.failed > 0 {
            self.line(&format!("{} decks failed.", totals.failed))?;
        }
        self.out
            .flush()
            .map_err(|e| KfDeckError::Export(format!("text flush: {e}")))
    }
}
