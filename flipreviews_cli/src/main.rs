mod output;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use flipreviews_lib::flipreviews_dom::{ChromeSession, PageSession, StaticSession};
use flipreviews_lib::{CrawlConfig, Crawler};
use indicatif::ProgressBar;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "flipreviews")]
#[command(about = "Scrape product reviews from a Flipkart listing into CSV")]
struct Cli {
    /// Product URL: a reviews listing, a /p/<id> product page, or any page
    /// with a link to the reviews
    url: String,

    /// Maximum number of listing pages to visit
    #[arg(long, default_value_t = 3)]
    max_pages: u32,

    /// Output file
    #[arg(long, default_value = "flipkart_reviews.csv")]
    out: PathBuf,

    /// Page engine: chrome renders JavaScript, static fetches raw HTML
    #[arg(long, value_enum, default_value_t = Engine::Chrome)]
    engine: Engine,

    /// Output format: csv or json
    #[arg(long, value_enum, default_value_t = Format::Csv)]
    format: Format,
}

#[derive(Copy, Clone, ValueEnum)]
enum Engine {
    Chrome,
    Static,
}

#[derive(Copy, Clone, ValueEnum)]
enum Format {
    Csv,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("flipreviews=info".parse().unwrap()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut config = CrawlConfig::from_env();
    config.max_pages = cli.max_pages;

    let session: Box<dyn PageSession> = match cli.engine {
        Engine::Chrome => Box::new(ChromeSession::new().context("launching headless Chrome")?),
        Engine::Static => Box::new(StaticSession::new().context("building HTTP session")?),
    };

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received, finishing up");
                cancel.cancel();
            }
        });
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_message(format!("crawling up to {} pages", config.max_pages));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let outcome = Crawler::new(session, config)
        .with_cancellation(cancel)
        .crawl(&cli.url)
        .await?;
    spinner.finish_and_clear();

    if outcome.records.is_empty() {
        bail!("no reviews were extracted");
    }

    match cli.format {
        Format::Csv => output::write_csv_file(&cli.out, &outcome.records)?,
        Format::Json => output::write_json_file(&cli.out, &outcome.records)?,
    }

    println!(
        "Saved {} reviews to {}",
        outcome.records.len(),
        cli.out.display()
    );
    if outcome.interrupted {
        println!("Crawl was interrupted; results are partial.");
    }
    output::print_summary(&outcome);

    Ok(())
}
