//! # Tri-Source News
//!
//! Command-line front end: applies the requested filters, loads the first
//! page plus `--pages` further pages, prints the result and optionally writes
//! a JSON snapshot.
//!
//! ## Usage
//!
//! ```sh
//! NEWS_API_KEY=... GUARDIAN_API_KEY=... NYT_API_KEY=... tri_source_news -t election --pages 1
//! ```

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

use tri_source_news::api::HttpClient;
use tri_source_news::cli::Cli;
use tri_source_news::config::Settings;
use tri_source_news::outputs::{json, text};
use tri_source_news::{providers, Aggregator, FeedController, Filters};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    info!("tri_source_news starting up");

    let args = Cli::parse();
    debug!(term = ?args.term, source = ?args.source, pages = args.pages, "Parsed CLI arguments");

    // ---- Configuration ----
    let mut settings = match &args.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    }
    .with_api_keys(
        args.news_api_key.clone(),
        args.guardian_api_key.clone(),
        args.nyt_api_key.clone(),
    );
    if let Some(page_size) = args.page_size {
        settings.page_size = page_size;
    }
    settings.warn_missing_keys();

    let http = HttpClient::new(Duration::from_secs(settings.timeout_secs), &settings.user_agent)?;
    let aggregator = Aggregator::new(providers::build_all(&settings, &http)).with_strategy(args.strategy.into());
    info!(strategy = ?aggregator.strategy(), page_size = settings.page_size, "Pipeline configured");
    let controller = FeedController::new(aggregator, settings.page_size);

    // ---- First page ----
    controller
        .apply_filters(Filters {
            term: args.term.clone(),
            category: args.category.clone(),
            source: args.source,
            author: args.author.clone(),
            from_date: args.from,
            to_date: args.to,
        })
        .await;

    // ---- Further pages ----
    for _ in 0..args.pages {
        if !controller.load_more().await {
            info!("No more articles to load");
            break;
        }
    }

    let view = controller.view().await;
    print!("{}", text::render_view(&view));

    if let Some(dir) = &args.json_output_dir {
        if let Err(e) = json::write_snapshot(&view, dir, Local::now()).await {
            error!(path = %dir, error = %e, "Failed to write JSON snapshot");
            return Err(e);
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        articles = view.articles.len(),
        has_more = view.has_more,
        "Execution complete"
    );
    Ok(())
}
