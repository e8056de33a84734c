//! Scrapedown main entry point
//!
//! This is the command-line interface for scraping single pages and crawling
//! site sections into Markdown. JSON goes to stdout, logs go to stderr.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use scrapedown::config::{apply_env_overrides, load_config, Config};
use scrapedown::url::{derive_path_prefix, parse_http_url};
use scrapedown::{BrowserPool, CrawlRequest, Crawler, ScrapeRequest, Scraper};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Scrapedown: web pages in, clean Markdown out
///
/// Fetches pages over plain HTTP or through a pooled headless Chrome, strips
/// them down to their content and converts them to Markdown.
#[derive(Parser, Debug)]
#[command(name = "scrapedown")]
#[command(version)]
#[command(about = "Convert web pages and site sections to Markdown", long_about = None)]
struct Cli {
    /// Path to an optional TOML configuration file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Maximum number of concurrent browser instances
    #[arg(long, global = true, env = "MAX_BROWSERS", value_name = "N")]
    max_browsers: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape a single page
    Scrape {
        url: String,

        /// Render the page in headless Chrome
        #[arg(long)]
        render_js: bool,

        /// Request timeout in milliseconds
        #[arg(long, value_name = "MS")]
        timeout: Option<u64>,

        /// Click inactive tabs before capturing (with --render-js)
        #[arg(long)]
        auto_click_tabs: bool,

        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Crawl same-host links from a seed page
    Crawl {
        url: String,

        #[arg(long, value_name = "N")]
        max_depth: Option<u32>,

        #[arg(long, value_name = "N")]
        max_pages: Option<usize>,

        /// Render every page in headless Chrome
        #[arg(long)]
        render_js: bool,

        /// Per-page timeout in milliseconds
        #[arg(long, value_name = "MS")]
        timeout: Option<u64>,

        /// Only follow links whose path starts with this prefix
        #[arg(long, conflicts_with = "auto_prefix")]
        path_prefix: Option<String>,

        /// Derive the path prefix from the seed URL's directory
        #[arg(long)]
        auto_prefix: bool,

        /// Print every progress event as one JSON line
        #[arg(long)]
        stream: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Markdown,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;
    tracing::debug!(
        "Browser pool capacity {}, fetch timeout {}ms",
        config.browser.max_browsers,
        config.scraper.timeout_ms
    );

    let pool = Arc::new(BrowserPool::from_config(&config.browser));
    let scraper = Arc::new(Scraper::new(&config, Arc::clone(&pool))?);

    let outcome = match cli.command {
        Command::Scrape {
            url,
            render_js,
            timeout,
            auto_click_tabs,
            format,
        } => {
            let request = ScrapeRequest::new(url)
                .with_render_js(render_js)
                .with_timeout(timeout.unwrap_or(config.scraper.timeout_ms))
                .with_auto_click_tabs(auto_click_tabs);
            handle_scrape(&scraper, &request, format).await
        }
        Command::Crawl {
            url,
            max_depth,
            max_pages,
            render_js,
            timeout,
            path_prefix,
            auto_prefix,
            stream,
        } => {
            let mut request = CrawlRequest::new(url)
                .with_max_depth(max_depth.unwrap_or(config.crawl.max_depth))
                .with_max_pages(max_pages.unwrap_or(config.crawl.max_pages))
                .with_render_js(render_js)
                .with_timeout(timeout.unwrap_or(config.scraper.timeout_ms));

            if let Some(prefix) = path_prefix {
                request = request.with_path_prefix(prefix);
            } else if auto_prefix {
                let seed = parse_http_url(&request.url)?;
                let prefix = derive_path_prefix(&seed);
                tracing::info!("Using path prefix {}", prefix);
                request = request.with_path_prefix(prefix);
            }

            handle_crawl(Crawler::new(scraper), request, stream).await
        }
    };

    pool.close_all().await;
    outcome
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// `RUST_LOG` wins over the flags when set.
fn setup_logging(verbose: u8, quiet: bool) {
    let default = if quiet {
        "error"
    } else {
        match verbose {
            0 => "scrapedown=info,warn",
            1 => "scrapedown=debug,info",
            2 => "scrapedown=trace,debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file if given, then applies the pool size override
fn build_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("failed to load config {}", path.display()))?
        }
        None => Config::default(),
    };

    apply_env_overrides(&mut config, cli.max_browsers.as_deref())?;
    Ok(config)
}

/// Handles the scrape subcommand
async fn handle_scrape(
    scraper: &Scraper,
    request: &ScrapeRequest,
    format: OutputFormat,
) -> Result<ExitCode> {
    let result = scraper.scrape(request).await;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Markdown => match &result.markdown {
            Some(markdown) => println!("{}", markdown),
            None => tracing::error!(
                "{}",
                result.error.as_deref().unwrap_or("scrape produced no markdown")
            ),
        },
    }

    Ok(exit_code(result.success))
}

/// Handles the crawl subcommand
///
/// With `stream`, the crawl runs on its own task and every progress event is
/// printed as it arrives; the terminal event carries the final result.
async fn handle_crawl(crawler: Crawler, request: CrawlRequest, stream: bool) -> Result<ExitCode> {
    if !stream {
        let result = crawler.crawl(&request, None).await?;
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(exit_code(result.success));
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(async move { crawler.crawl(&request, Some(tx)).await });

    while let Some(event) = rx.recv().await {
        println!("{}", serde_json::to_string(&event)?);
    }

    let result = task.await.context("crawl task panicked")??;
    Ok(exit_code(result.success))
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
