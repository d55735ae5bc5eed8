use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use sa_core::{ArticleRecord, Config, Result};
use sa_digest::{write_report, DigestGenerator, OpenAiModel};
use sa_enrich::CrossrefClient;
use sa_extract::parse_alert;
use sa_mail::MailFetcher;
use sa_store::FileStore;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path of the article store (default: data/articles.json)
    #[arg(long)]
    store: Option<PathBuf>,

    /// Directory for report output
    #[arg(long, default_value = "output")]
    output: PathBuf,

    /// Prefix for report file names
    #[arg(long, default_value = "")]
    prefix: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch alert emails, then parse, enrich, store, and summarize new articles
    Run {
        /// Fall back to summarizing the whole store when no new articles arrived
        #[arg(long)]
        all: bool,
    },
    /// Summarize the existing store without fetching mail
    Summarize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    let config = Config::from_env();
    let store = FileStore::new(cli.store.unwrap_or_else(FileStore::default_path));

    match cli.command.unwrap_or(Commands::Run { all: false }) {
        Commands::Run { all } => run(&config, &store, &cli.output, &cli.prefix, all).await,
        Commands::Summarize => summarize_existing(&config, &store, &cli.output, &cli.prefix).await,
    }
}

async fn run(
    config: &Config,
    store: &FileStore,
    output: &Path,
    prefix: &str,
    all: bool,
) -> Result<()> {
    info!("Starting scholar alert digest run");

    let fetcher = MailFetcher::new(config);
    let html_bodies = match fetcher.fetch_unread().await {
        Ok(bodies) => bodies,
        Err(e) => {
            error!("Mail fetch failed: {}", e);
            Vec::new()
        }
    };

    let enricher = CrossrefClient::new()?;
    let mut all_new = Vec::new();
    for html in &html_bodies {
        let parsed = parse_alert(html);
        info!("Parsed {} articles from one email", parsed.len());

        let mut enriched = Vec::with_capacity(parsed.len());
        for article in parsed {
            enriched.push(enricher.enrich(article).await);
        }

        let new_articles = store.store(enriched).await?;
        info!("Stored {} new articles after deduplication", new_articles.len());
        all_new.extend(new_articles);
    }

    let to_summarize = if all_new.is_empty() {
        if !all {
            info!("No new articles to summarize. Exiting.");
            return Ok(());
        }
        let existing = store.load().await;
        if existing.is_empty() {
            info!("Store is empty; nothing to summarize.");
            return Ok(());
        }
        info!("No new articles; summarizing all {} stored articles", existing.len());
        existing
    } else {
        all_new
    };

    digest_and_report(config, &to_summarize, output, prefix).await
}

async fn summarize_existing(
    config: &Config,
    store: &FileStore,
    output: &Path,
    prefix: &str,
) -> Result<()> {
    let articles = store.load().await;
    if articles.is_empty() {
        info!("No articles found in {}. Nothing to summarize.", store.path().display());
        return Ok(());
    }
    digest_and_report(config, &articles, output, prefix).await
}

async fn digest_and_report(
    config: &Config,
    articles: &[ArticleRecord],
    output: &Path,
    prefix: &str,
) -> Result<()> {
    let model = Arc::new(OpenAiModel::new(&config.openai_api_key)?);
    let generator = DigestGenerator::new(model);

    let digest = generator.generate(articles).await;
    let path = write_report(&digest, articles, output, prefix).await?;
    info!("Summary report generated at {}", path.display());
    Ok(())
}
