//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use kfdeck_core::pipeline::{BatchSummary, ProgressReporter};
use kfdeck_export::{ReportHeader, ReportTotals, writer_for};
use kfdeck_shared::{AppConfig, OutputFormat, RunConfig, init_config, load_config};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// kfdeck: KeyForge deck reports from three community sites.
#[derive(Parser)]
#[command(
    name = "kfdeck",
    version,
    about = "Collect KeyForge deck stats, SAS ratings and card lists into one report.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Analyse every deck in a links file and write the report.
    Run {
        /// Links file, one deck URL per line.
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Report file to write.
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Report format: csv or text.
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Record failing decks and continue with the rest.
        #[arg(long)]
        keep_going: bool,
    },

    /// Analyse one deck and print its report to stdout.
    Deck {
        /// Deck URL on any of the supported sites.
        url: String,

        /// Report format: csv or text.
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "kfdeck=info",
        1 => "kfdeck=debug",
        _ => "kfdeck=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so `kfdeck deck` output stays clean.
    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run {
            input,
            out,
            format,
            keep_going,
        } => cmd_run(input, out, format, keep_going).await,
        Command::Deck { url, format } => cmd_deck(&url, format).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_run(
    input: Option<PathBuf>,
    out: Option<PathBuf>,
    format: Option<OutputFormat>,
    keep_going: bool,
) -> Result<()> {
    let config = load_config()?;

    // CLI flags override config file values.
    let mut run_config = RunConfig::from(&config);
    if let Some(input) = input {
        run_config.input = input;
    }
    if let Some(out) = out {
        run_config.output = out;
    }
    if let Some(format) = format {
        run_config.format = format;
    }
    run_config.keep_going |= keep_going;

    info!(
        input = %run_config.input.display(),
        output = %run_config.output.display(),
        format = %run_config.format,
        keep_going = run_config.keep_going,
        "analysing decks"
    );

    let reporter = CliProgress::new();
    let summary = kfdeck_core::run_batch(&run_config, &reporter).await;
    reporter.spinner.finish_and_clear();
    let summary = summary?;

    // Print summary
    println!();
    println!("  All done! Analyzed {} decks in total.", summary.analyzed);
    if !summary.failures.is_empty() {
        println!("  Failed:  {}", summary.failures.len());
        for failure in &summary.failures {
            println!("    {}. {}: {}", failure.number, failure.link, failure.error);
        }
    }
    println!("  Report:  {}", summary.output.display());
    println!("  Time:    {:.1}s", summary.elapsed.as_secs_f64());
    println!();

    Ok(())
}

async fn cmd_deck(url: &str, format: Option<OutputFormat>) -> Result<()> {
    let config = load_config()?;
    let format = format.unwrap_or(config.defaults.format);

    info!(url, %format, "analysing deck");
    let report = kfdeck_core::analyze_link(url, &config.sources).await?;

    let stdout = std::io::stdout();
    let mut writer = writer_for(format, stdout.lock());
    writer.begin(&ReportHeader::now(env!("CARGO_PKG_VERSION")))?;
    writer.deck(1, url, &report)?;
    writer.finish(&ReportTotals {
        analyzed: 1,
        failed: 0,
    })?;

    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn started(&self, total: usize) {
        self.spinner.set_message(format!("Beginning deck analysis ({total} links)"));
    }

    fn deck_started(&self, number: usize, total: usize, link: &str) {
        self.spinner.set_message(format!("[{number}/{total}] {link}"));
    }

    fn deck_done(&self, number: usize, name: &str) {
        self.spinner.println(format!("  {number}. {name}"));
    }

    fn deck_failed(&self, number: usize, link: &str, error: &str) {
        self.spinner.println(format!("  {number}. ERROR {link}: {error}"));
    }

    fn done(&self, _summary: &BatchSummary) {
        self.spinner.finish_and_clear();
    }
}
