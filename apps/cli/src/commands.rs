//! CLI command definitions, routing, and tracing setup.

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use repairkb_core::{IngestOptions, ProgressReporter, discover, ingest, load_knowledge_base, search};
use repairkb_shared::{AppConfig, init_config, load_config};
use repairkb_storage::{GuideStore, UrlStore};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// repairkb — crawl repair guides into a queryable knowledge base.
#[derive(Parser)]
#[command(
    name = "repairkb",
    version,
    about = "Crawl a repair-guide site and query the resulting knowledge base.",
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
    /// Crawl the configured seed paths and record discovered guide URLs.
    Crawl {
        /// Seed path(s) to crawl instead of the configured ones.
        #[arg(long)]
        seed: Vec<String>,
    },

    /// Fetch stored guide URLs and merge cleaned pages into the guide store.
    Ingest {
        /// Index of the first stored URL to fetch.
        #[arg(long, default_value_t = 0)]
        start: usize,

        /// Maximum number of URLs to fetch in this run.
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },

    /// Rank stored guides against a repair question.
    Search {
        /// The repair question.
        query: String,

        /// Number of results to print (defaults to the configured top_k).
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// Show store and knowledge-base counts.
    Status,

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
        0 => "repairkb=info",
        1 => "repairkb=debug",
        _ => "repairkb=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Crawl { seed } => cmd_crawl(seed).await,
        Command::Ingest { start, limit } => cmd_ingest(start, limit).await,
        Command::Search { query, top_k } => cmd_search(&query, top_k).await,
        Command::Status => cmd_status().await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter backed by an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn page_fetched(&self, url: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Fetching [{current}/{total}] {url}"));
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_crawl(seeds: Vec<String>) -> Result<()> {
    let mut config = load_config()?;
    if !seeds.is_empty() {
        config.crawl.seeds = seeds;
    }

    info!(
        base = %config.crawl.base_domain,
        seeds = config.crawl.seeds.len(),
        "starting crawl"
    );

    let reporter = CliProgress::new();
    let result = discover(&config, &reporter).await?;
    reporter.finish();

    println!();
    println!("  Crawl finished.");
    println!("  Visited:   {}", result.outcome.visited.len());
    println!("  Saved:     {}", result.outcome.saved.len());
    println!("  New URLs:  {}", result.new_urls);
    println!("  Errors:    {}", result.outcome.errors.len());
    println!("  URL store: {}", config.storage.url_path().display());
    println!();

    Ok(())
}

async fn cmd_ingest(start: usize, limit: usize) -> Result<()> {
    let config = load_config()?;
    let opts = IngestOptions { start, limit };

    info!(start, limit, "starting ingest");

    let reporter = CliProgress::new();
    let result = ingest(&config, &opts, &reporter).await?;
    reporter.finish();

    println!();
    println!("  Ingest finished.");
    println!("  Attempted:  {}", result.attempted);
    println!("  Ingested:   {}", result.ingested);
    println!("  Too short:  {}", result.skipped_short);
    println!("  Errors:     {}", result.errors.len());
    println!("  New stored: {}", result.stored_new);
    println!("  Time:       {:.1}s", result.elapsed.as_secs_f64());
    println!("  Guide store: {}", config.storage.guide_path().display());
    println!();

    Ok(())
}

async fn cmd_search(query: &str, top_k: Option<usize>) -> Result<()> {
    let config = load_config()?;
    let knowledge_base = load_knowledge_base(&config);

    if knowledge_base.is_empty() {
        println!("Knowledge base is empty. Run `repairkb crawl` and `repairkb ingest` first.");
        return Ok(());
    }

    let top_k = top_k.unwrap_or(config.retrieval.top_k);
    let results = search(query, &knowledge_base, top_k);

    if results.is_empty() {
        println!("No matching guides for: {query}");
        return Ok(());
    }

    println!();
    for (i, result) in results.iter().enumerate() {
        let doc = result.document;
        println!("{}. {} (score {:.1})", i + 1, doc.title, result.score);
        println!("   {}", doc.url);
        if !doc.tools.is_empty() {
            println!("   Tools: {}", doc.tools.join(", "));
        }
        if !doc.warnings.is_empty() {
            println!("   Warnings: {}", doc.warnings.join(" / "));
        }
        println!("   {}", doc.summary);
        println!();
    }

    Ok(())
}

async fn cmd_status() -> Result<()> {
    let config = load_config()?;

    let url_store = UrlStore::new(config.storage.url_path());
    let guide_store = GuideStore::new(config.storage.guide_path());
    let urls = url_store.load();
    let guides = guide_store.load();
    let knowledge_base = load_knowledge_base(&config);

    println!();
    println!("  URL store:   {} ({} URLs)", config.storage.url_path().display(), urls.len());
    println!(
        "  Guide store: {} ({} documents)",
        config.storage.guide_path().display(),
        guides.len()
    );
    println!("  Structured:  {} documents", knowledge_base.len());
    println!();

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
