//! Command-line interface definitions.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! API keys can be provided via command-line flags or environment variables.

use crate::aggregator::MoreStrategy;
use crate::models::Source;
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};

/// Command-line arguments.
///
/// Filters map one-to-one onto the controller's intents; `--pages` replays
/// the "load more" action that many times after the first page.
///
/// # Examples
///
/// ```sh
/// # Latest headlines from all three providers
/// tri_source_news
///
/// # Search, restricted to one provider and a date range, three pages deep
/// tri_source_news -t election --source guardian --from 2025-05-01 --to 2025-05-06 --pages 2
///
/// # Also write the final view as JSON
/// tri_source_news -t election -j ./json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Search term
    #[arg(short, long)]
    pub term: Option<String>,

    /// Category to show ("All" for every category)
    #[arg(long)]
    pub category: Option<String>,

    /// Only show articles from this provider
    #[arg(long)]
    pub source: Option<Source>,

    /// Only show articles by this author
    #[arg(long)]
    pub author: Option<String>,

    /// Earliest publication date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Latest publication date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Number of additional pages to load after the first
    #[arg(long, default_value_t = 0)]
    pub pages: u32,

    /// Articles requested from each provider per page
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub page_size: Option<u32>,

    /// How to decide whether another page exists
    #[arg(long, value_enum, default_value_t = StrategyArg::Lookahead)]
    pub strategy: StrategyArg,

    /// Optional path to a YAML settings file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory for a JSON snapshot of the final view
    #[arg(short, long)]
    pub json_output_dir: Option<String>,

    /// NewsAPI key for the generic headline provider
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    pub news_api_key: Option<String>,

    /// Guardian content API key
    #[arg(long, env = "GUARDIAN_API_KEY", hide_env_values = true)]
    pub guardian_api_key: Option<String>,

    /// New York Times API key
    #[arg(long, env = "NYT_API_KEY", hide_env_values = true)]
    pub nyt_api_key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Probe the next page before reporting that more exists
    Lookahead,
    /// Assume more exists while any provider returns a full page
    ShortPage,
}

impl From<StrategyArg> for MoreStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Lookahead => MoreStrategy::Lookahead,
            StrategyArg::ShortPage => MoreStrategy::ShortPage,
        }
    }
}
