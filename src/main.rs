//! vacancy-fetch - command-line entry point
//!
//! Loads settings (JSON file, then flags and `VACANCY_FETCH_*` variables),
//! runs one page fan-out against the vacancies API and prints the report.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use vacancy_fetch::{
    AggregateResult, Config, FanOutCoordinator, HttpPageFetcher, MergeOrder, cancel_on_signal,
};

/// Command-line arguments for vacancy-fetch
#[derive(Parser, Debug)]
#[command(name = "vacancy-fetch")]
#[command(about = "Fetch hh.ru vacancy search pages concurrently and merge them")]
#[command(version)]
struct Args {
    /// JSON settings file; flags below override its values
    #[arg(short, long, env = "VACANCY_FETCH_CONFIG")]
    config: Option<PathBuf>,

    /// Search text
    #[arg(short, long, env = "VACANCY_FETCH_QUERY")]
    query: Option<String>,

    /// Number of pages to request (indices 0..N)
    #[arg(short, long, env = "VACANCY_FETCH_PAGES")]
    pages: Option<u32>,

    /// Records per page
    #[arg(long, env = "VACANCY_FETCH_PER_PAGE")]
    per_page: Option<u32>,

    /// Maximum pages in flight (unbounded when unset)
    #[arg(long, env = "VACANCY_FETCH_MAX_CONCURRENT")]
    max_concurrent: Option<usize>,

    /// API base URL
    #[arg(long, env = "VACANCY_FETCH_BASE_URL")]
    base_url: Option<String>,

    /// Merge records in page-index order instead of arrival order
    #[arg(long, env = "VACANCY_FETCH_PAGE_ORDER")]
    page_order: bool,

    /// Print one line per fetched vacancy
    #[arg(long, env = "VACANCY_FETCH_RECORDS")]
    records: bool,
}

impl Args {
    /// Build the effective configuration.
    fn into_config(self) -> Result<(Config, bool)> {
        let mut config = match &self.config {
            Some(path) => Config::from_json_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => Config::default(),
        };

        if let Some(query) = self.query {
            config.fetch.query = query;
        }
        if let Some(pages) = self.pages {
            config.fetch.page_count = pages;
        }
        if let Some(per_page) = self.per_page {
            config.fetch.page_size = per_page;
        }
        if self.max_concurrent.is_some() {
            config.fetch.max_concurrent = self.max_concurrent;
        }
        if let Some(base_url) = self.base_url {
            config.api.base_url = base_url;
        }
        if self.page_order {
            config.fetch.merge_order = MergeOrder::PageIndex;
        }

        config.validate().context("Invalid configuration")?;
        Ok((config, self.records))
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(Args::parse()).await {
        Ok(result) if result.all_failed() => {
            tracing::error!(pages = result.page_count(), "Every page failed");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("vacancy-fetch failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<AggregateResult> {
    let (config, print_records) = args.into_config()?;

    info!(
        endpoint = %config.api.base_url,
        query = %config.fetch.query,
        pages = config.fetch.page_count,
        per_page = config.fetch.page_size,
        "Fetching vacancies"
    );

    let fetcher =
        Arc::new(HttpPageFetcher::new(&config.api).context("Failed to build HTTP client")?);
    let coordinator = FanOutCoordinator::from_config(fetcher, &config.fetch);

    let signal_watcher = tokio::spawn(cancel_on_signal(coordinator.cancel_token()));
    let result = coordinator.run_config(&config.fetch).await;
    signal_watcher.abort();
    let result = result.context("Fan-out rejected its arguments")?;

    if print_records {
        print_vacancies(&result);
    }
    println!("{result}");

    Ok(result)
}

fn print_vacancies(result: &AggregateResult) {
    for vacancy in &result.records {
        let employer = vacancy
            .employer
            .as_ref()
            .map(|e| e.name.as_str())
            .unwrap_or("-");
        println!("{}\t{}\t{}", vacancy.id, vacancy.name, employer);
    }
}
