//! Deck pipeline: link → fetch enabled sources → merge → report writer.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};

use kfdeck_export::{ReportHeader, ReportTotals, writer_for};
use kfdeck_extract::{CompendiumDeck, DokDeck, KfgDeck, compendium, dok, kfg};
use kfdeck_fetch::{Endpoints, Fetcher};
use kfdeck_shared::{
    DeckId, DeckLink, DeckReport, House, KfDeckError, Result, RunConfig, SourcesConfig,
    group_by_house,
};

/// A deck that could not be analysed.
#[derive(Debug, Clone)]
pub struct DeckFailure {
    /// 1-based position in the input.
    pub number: usize,
    pub link: String,
    pub error: String,
}

/// Result of a batch run.
#[derive(Debug)]
pub struct BatchSummary {
    /// Decks written to the report.
    pub analyzed: usize,
    /// Decks recorded as errors (keep-going mode only).
    pub failures: Vec<DeckFailure>,
    /// Report file.
    pub output: PathBuf,
    /// Total elapsed time.
    pub elapsed: Duration,
}

impl BatchSummary {
    pub fn totals(&self) -> ReportTotals {
        ReportTotals {
            analyzed: self.analyzed,
            failed: self.failures.len(),
        }
    }
}

/// Progress callback for reporting batch status.
pub trait ProgressReporter: Send + Sync {
    /// Called once the links file has been read.
    fn started(&self, total: usize);
    /// Called before a deck is fetched.
    fn deck_started(&self, number: usize, total: usize, link: &str);
    /// Called after a deck block has been written.
    fn deck_done(&self, number: usize, name: &str);
    /// Called when a deck fails.
    fn deck_failed(&self, number: usize, link: &str, error: &str);
    /// Called when the batch completes.
    fn done(&self, summary: &BatchSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn started(&self, _total: usize) {}
    fn deck_started(&self, _number: usize, _total: usize, _link: &str) {}
    fn deck_done(&self, _number: usize, _name: &str) {}
    fn deck_failed(&self, _number: usize, _link: &str, _error: &str) {}
    fn done(&self, _summary: &BatchSummary) {}
}

/// Fetch every enabled source for one deck and merge the results.
///
/// Sources are fetched in order (compendium, Decks of KeyForge,
/// KeyForgeGame); the first failure aborts the deck.
#[instrument(skip_all, fields(id = %link.id, source = %link.source))]
pub async fn analyze_deck(
    fetcher: &Fetcher,
    endpoints: &Endpoints,
    link: &DeckLink,
    sources: &SourcesConfig,
) -> Result<DeckReport> {
    let id = &link.id;

    let compendium = if sources.compendium {
        let html = fetcher.get_html(&endpoints.compendium_page(id)).await?;
        Some(compendium::parse_page(&html)?)
    } else {
        None
    };

    let dok = if sources.decks_of_keyforge {
        let json = fetcher.get_json(&endpoints.dok_api(id)).await?;
        Some(dok::parse_sas(&json)?)
    } else {
        None
    };

    let kfg = if sources.keyforge_game {
        let json = fetcher.get_json(&endpoints.kfg_api(id)).await?;
        Some(kfg::parse_deck(&json)?)
    } else {
        None
    };

    let report = merge(id, endpoints, compendium, dok, kfg);
    debug!(
        name = report.display_name(),
        cards = report.cards.len(),
        "deck analysed"
    );
    Ok(report)
}

/// Combine per-site results into one report.
pub fn merge(
    id: &DeckId,
    endpoints: &Endpoints,
    compendium: Option<CompendiumDeck>,
    dok: Option<DokDeck>,
    kfg: Option<KfgDeck>,
) -> DeckReport {
    let mut links = endpoints.links(id);
    if let Some(href) = compendium.as_ref().and_then(|c| c.official_link.clone()) {
        links.keyforge_game = href;
    }

    let (stats, compendium_name, compendium_cards) = match compendium {
        Some(c) => (Some(c.stats), Some(c.name), c.cards),
        None => (None, None, Vec::new()),
    };
    let (sas, dok_name) = match dok {
        Some(d) => (Some(d.sas), d.name),
        None => (None, None),
    };

    match kfg {
        Some(k) => DeckReport {
            id: *id,
            name: Some(k.name),
            houses: k.houses,
            record: Some(k.record),
            types: Some(k.types),
            stats,
            sas,
            cards: k.cards,
            links,
        },
        None => {
            let houses: Vec<House> = group_by_house(&compendium_cards)
                .into_iter()
                .map(|(house, _)| house.clone())
                .collect();
            DeckReport {
                id: *id,
                name: compendium_name.or(dok_name),
                houses,
                record: None,
                types: stats.as_ref().map(|s| s.types),
                stats,
                sas,
                cards: compendium_cards,
                links,
            }
        }
    }
}

/// Run a whole links file through the pipeline.
///
/// Without `keep_going`, the first failing deck ends the batch: its error
/// block and the closing summary are still written, then the error is
/// returned with the deck number and link attached.
#[instrument(skip_all, fields(input = %config.input.display(), output = %config.output.display()))]
pub async fn run_batch(
    config: &RunConfig,
    progress: &dyn ProgressReporter,
) -> Result<BatchSummary> {
    let start = Instant::now();

    // --- Phase 1: Input ---
    let text = std::fs::read_to_string(&config.input)
        .map_err(|e| KfDeckError::io(&config.input, e))?;
    let lines = kfdeck_extract::read_link_lines(&text);
    if lines.is_empty() {
        warn!("links file has no deck links");
    }
    info!(decks = lines.len(), format = %config.format, "starting batch");
    progress.started(lines.len());

    config.sources.validate()?;
    let fetcher = Fetcher::new(&config.sources)?;
    let endpoints = Endpoints::new(&config.sources);

    // --- Phase 2: Output ---
    let file = File::create(&config.output).map_err(|e| KfDeckError::io(&config.output, e))?;
    let mut writer = writer_for(config.format, BufWriter::new(file));
    writer.begin(&ReportHeader::now(env!("CARGO_PKG_VERSION")))?;

    // --- Phase 3: Decks ---
    let mut summary = BatchSummary {
        analyzed: 0,
        failures: Vec::new(),
        output: config.output.clone(),
        elapsed: Duration::ZERO,
    };

    for (i, line) in lines.iter().enumerate() {
        let number = i + 1;
        progress.deck_started(number, lines.len(), line);

        let result = match kfdeck_extract::parse_deck_link(line) {
            Ok(link) => analyze_deck(&fetcher, &endpoints, &link, &config.sources).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(report) => {
                writer.deck(number, line, &report)?;
                summary.analyzed += 1;
                info!(number, name = report.display_name(), "deck written");
                progress.deck_done(number, report.display_name());
            }
            Err(e) => {
                let message = e.to_string();
                writer.failure(number, line, &message)?;
                progress.deck_failed(number, line, &message);
                summary.failures.push(DeckFailure {
                    number,
                    link: line.clone(),
                    error: message,
                });

                if !config.keep_going {
                    writer.finish(&summary.totals())?;
                    return Err(e.in_deck(number, line.as_str()));
                }
                warn!(number, link = %line, error = %e, "deck failed, continuing");
            }
        }
    }

    // --- Phase 4: Summary ---
    writer.finish(&summary.totals())?;
    summary.elapsed = start.elapsed();

    info!(
        analyzed = summary.analyzed,
        failed = summary.failures.len(),
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "batch complete"
    );
    progress.done(&summary);

    Ok(summary)
}

/// Analyse a single link with a fresh client.
pub async fn analyze_link(line: &str, sources: &SourcesConfig) -> Result<DeckReport> {
    sources.validate()?;
    let link = kfdeck_extract::parse_deck_link(line)?;
    let fetcher = Fetcher::new(sources)?;
    let endpoints = Endpoints::new(sources);
    analyze_deck(&fetcher, &endpoints, &link, sources).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use kfdeck_shared::OutputFormat;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ID: &str = "2c2f8e19-5a7a-4c8e-9b0b-1f6f1c5b0e3a";
    const MISSING_ID: &str = "0b7f3c1a-9d1e-4f53-8a8e-6d2c4b5a7f10";

    fn fixture(name: &str) -> String {
        let path = format!("../../../fixtures/{name}");
        std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("missing fixture: {path}"))
    }

    fn sources_for(server: &MockServer) -> SourcesConfig {
        SourcesConfig {
            compendium_base: server.uri(),
            dok_base: server.uri(),
            kfg_base: server.uri(),
            ..SourcesConfig::default()
        }
    }

    async fn mount_deck(server: &MockServer, id: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/decks/{id}")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(fixture("html/compendium-deck.html"), "text/html; charset=utf-8"),
            )
            .mount(server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("/api/decks/{id}/simple")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(fixture("json/dok-simple.json"), "application/json"),
            )
            .mount(server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("/api/decks/{id}/")))
            .and(query_param("links", "cards"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(fixture("json/kfg-deck.json"), "application/json"),
            )
            .mount(server)
            .await;
    }

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("kfdeck-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn batch_config(dir: &std::path::Path, links: &[String], server: &MockServer) -> RunConfig {
        let input = dir.join("links.txt");
        std::fs::write(&input, links.join("\n")).unwrap();
        RunConfig {
            input,
            output: dir.join("out.csv"),
            format: OutputFormat::Csv,
            keep_going: false,
            sources: sources_for(server),
        }
    }

    #[tokio::test]
    async fn analyze_merges_all_three_sources() {
        let server = MockServer::start().await;
        mount_deck(&server, ID).await;

        let sources = sources_for(&server);
        let report = analyze_link(&format!("https://decksofkeyforge.com/decks/{ID}"), &sources)
            .await
            .unwrap();

        assert_eq!(report.display_name(), "Quixo the Unyielding Sage");
        assert_eq!(report.houses, vec![House::Brobnar, House::Dis, House::Logos]);
        assert_eq!(report.record.unwrap().wins, 3);
        assert_eq!(report.cards.len(), 10);
        assert_eq!(report.types.unwrap().total(), 10);
        assert_eq!(
            report.stats.as_ref().unwrap().abc_line(),
            "A: 10 (high)| B: 6 (avg)| C: 12 (high)"
        );
        assert_eq!(report.sas.as_ref().unwrap().antisynergy, -2.0);

        assert_eq!(
            report.links.keyforge_game,
            format!("https://www.keyforgegame.com/deck-details/{ID}")
        );
        assert_eq!(
            report.links.decks_of_keyforge,
            format!("{}/decks/{ID}", server.uri())
        );
    }

    #[tokio::test]
    async fn compendium_only_falls_back_to_scraped_data() {
        let server = MockServer::start().await;
        mount_deck(&server, ID).await;

        let sources = SourcesConfig {
            decks_of_keyforge: false,
            keyforge_game: false,
            ..sources_for(&server)
        };
        let report = analyze_link(&format!("https://keyforge-compendium.com/decks/{ID}"), &sources)
            .await
            .unwrap();

        assert_eq!(report.name.as_deref(), Some("Quixo the Unyielding Sage"));
        assert!(report.record.is_none());
        assert!(report.sas.is_none());
        assert_eq!(report.houses, vec![House::Brobnar, House::Dis, House::Logos]);
        assert_eq!(report.types.unwrap().creatures, 17);
        assert_eq!(report.cards.len(), 10);
    }

    #[tokio::test]
    async fn dok_only_uses_dok_name_and_built_links() {
        let server = MockServer::start().await;
        mount_deck(&server, ID).await;

        let sources = SourcesConfig {
            compendium: false,
            keyforge_game: false,
            ..sources_for(&server)
        };
        let report = analyze_link(&format!("https://www.keyforgegame.com/deck-details/{ID}"), &sources)
            .await
            .unwrap();

        assert_eq!(report.name.as_deref(), Some("Quixo the Unyielding Sage"));
        assert!(report.cards.is_empty());
        assert!(report.types.is_none());
        assert_eq!(
            report.links.keyforge_game,
            format!("{}/deck-details/{ID}", server.uri())
        );
    }

    #[tokio::test]
    async fn missing_deck_is_an_http_error() {
        let server = MockServer::start().await;

        let err = analyze_link(
            &format!("https://keyforge-compendium.com/decks/{MISSING_ID}"),
            &sources_for(&server),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, KfDeckError::Http { status: 404, .. }));
    }

    #[tokio::test]
    async fn batch_writes_one_block_per_deck() {
        let server = MockServer::start().await;
        mount_deck(&server, ID).await;
        let dir = temp_dir();

        let link = format!("https://decksofkeyforge.com/decks/{ID}");
        let config = batch_config(&dir, &["# header".into(), link.clone(), link], &server);
        let summary = run_batch(&config, &SilentProgress).await.unwrap();

        assert_eq!(summary.analyzed, 2);
        assert!(summary.failures.is_empty());

        let out = std::fs::read_to_string(&config.output).unwrap();
        assert!(out.starts_with("kfdeck,"));
        assert!(out.contains("Deck,1,"));
        assert!(out.contains("Deck,2,"));
        assert!(out.contains("Summary,analyzed,2,failed,0"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn batch_aborts_on_first_failure() {
        let server = MockServer::start().await;
        mount_deck(&server, ID).await;
        let dir = temp_dir();

        let links = vec![
            format!("https://decksofkeyforge.com/decks/{ID}"),
            format!("https://decksofkeyforge.com/decks/{MISSING_ID}"),
            format!("https://decksofkeyforge.com/decks/{ID}"),
        ];
        let config = batch_config(&dir, &links, &server);
        let err = run_batch(&config, &SilentProgress).await.unwrap_err();

        match err {
            KfDeckError::Deck { number, link, .. } => {
                assert_eq!(number, 2);
                assert!(link.contains(MISSING_ID));
            }
            other => panic!("unexpected error: {other}"),
        }

        let out = std::fs::read_to_string(&config.output).unwrap();
        assert!(out.contains("Deck,1,"));
        assert!(out.contains("Error,2,"));
        assert!(!out.contains("Deck,3,"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn keep_going_records_failures() {
        let server = MockServer::start().await;
        mount_deck(&server, ID).await;
        let dir = temp_dir();

        let links = vec![
            "https://example.com/not-a-deck".to_string(),
            format!("https://decksofkeyforge.com/decks/{ID}"),
        ];
        let config = RunConfig {
            keep_going: true,
            format: OutputFormat::Text,
            ..batch_config(&dir, &links, &server)
        };
        let summary = run_batch(&config, &SilentProgress).await.unwrap();

        assert_eq!(summary.analyzed, 1);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].number, 1);
        assert!(summary.failures[0].error.contains("unsupported host"));

        let out = std::fs::read_to_string(&config.output).unwrap();
        assert!(out.contains("Deck name: Quixo the Unyielding Sage"));
        assert!(out.contains("All done! Analyzed 1 decks in total."));
        assert!(out.contains("1 decks failed."));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn missing_input_is_an_io_error() {
        let server = MockServer::start().await;
        let dir = temp_dir();
        let config = RunConfig {
            input: dir.join("nope.txt"),
            ..batch_config(&dir, &[], &server)
        };

        let err = run_batch(&config, &SilentProgress).await.unwrap_err();
        assert!(matches!(err, KfDeckError::Io { .. }));

        std::fs::remove_dir_all(&dir).ok();
    }
}
