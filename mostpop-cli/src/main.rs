//! mostpop CLI
//!
//! Command-line client for NYT Most Popular feeds with stale-while-revalidate caching.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mostpop_cache::ResponseCache;
use mostpop_core::constants::{DEFAULT_CACHE_TTL_SECONDS, DEFAULT_SECTION};
use mostpop_core::types::{Article, ArticleApiResponse, EndpointKind, FilterSpec, Period, ShareKind};
use mostpop_feed::{ConnectivityMonitor, FeedController, ViewState};
use mostpop_http::{HttpConfig, HttpTransport};
use mostpop_repo::{resolve, ArticlesRepository, RepositoryConfig};

/// Number of titles printed per batch.
const TOP_TITLES: usize = 5;

/// mostpop - NYT Most Popular feeds from the terminal
#[derive(Parser)]
#[command(name = "mostpop")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a feed through the cache, optionally several times
    Fetch {
        #[command(flatten)]
        filter: FilterArgs,
        #[command(flatten)]
        http: HttpArgs,
        /// Seconds before a cached feed is revalidated
        #[arg(long, default_value_t = DEFAULT_CACHE_TTL_SECONDS)]
        ttl: u64,
        /// Number of consecutive fetches sharing one cache
        #[arg(long, default_value_t = 1)]
        repeat: u32,
    },

    /// Load a feed through the feed controller and print the latest view state on each change
    Feed {
        #[command(flatten)]
        filter: FilterArgs,
        #[command(flatten)]
        http: HttpArgs,
    },

    /// Print the request path and cache key of a filter without any I/O
    Path {
        #[command(flatten)]
        filter: FilterArgs,
    },
}

#[derive(Args)]
struct FilterArgs {
    /// Feed to read: viewed, emailed or shared
    #[arg(short, long, default_value_t = EndpointKind::Viewed)]
    endpoint: EndpointKind,
    /// Ranking window in days (1, 7, 30) or day, week, month
    #[arg(short, long, default_value_t = Period::Week)]
    period: Period,
    /// Section label (part of the cache key only)
    #[arg(long, default_value = DEFAULT_SECTION)]
    section: String,
    /// Share channel for the shared feed: facebook or twitter
    #[arg(long)]
    share: Option<ShareKind>,
}

impl FilterArgs {
    fn to_filter(&self) -> FilterSpec {
        FilterSpec {
            share: self.share,
            ..FilterSpec::new(self.endpoint, self.period).with_section(self.section.clone())
        }
    }
}

#[derive(Args)]
struct HttpArgs {
    /// NYT API key
    #[arg(long, env = "NYT_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
}

impl HttpArgs {
    fn transport(&self) -> Result<HttpTransport> {
        let mut config = HttpConfig::from_env().context("Invalid HTTP configuration")?;
        if let Some(key) = &self.api_key {
            config = config.with_api_key(key.clone());
        }
        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }
        HttpTransport::with_config(config).context("Failed to create HTTP transport")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "mostpop_cli=debug,mostpop_repo=debug,mostpop_cache=debug,mostpop_http=debug,mostpop_feed=debug,info"
    } else {
        "warn"
    };

    let registry = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()));
    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }

    match cli.command {
        Commands::Fetch {
            filter,
            http,
            ttl,
            repeat,
        } => cmd_fetch(&filter.to_filter(), &http, ttl, repeat).await,
        Commands::Feed { filter, http } => cmd_feed(filter.to_filter(), &http).await,
        Commands::Path { filter } => cmd_path(&filter.to_filter()),
    }
}

/// Fetch a feed `repeat` times against one shared cache
async fn cmd_fetch(filter: &FilterSpec, http: &HttpArgs, ttl: u64, repeat: u32) -> Result<()> {
    println!(
        "{} {} / {}",
        "📰 Most popular:".cyan().bold(),
        filter.endpoint,
        filter.period.display_name()
    );

    let transport = Arc::new(http.transport()?);
    let repository = ArticlesRepository::with_config(
        transport,
        Arc::new(ResponseCache::new()),
        RepositoryConfig { ttl_seconds: ttl },
    );
    let key = filter.cache_key();

    for round in 1..=repeat.max(1) {
        println!("\n{} {}", "Round".dimmed(), round);

        let had_cached = repository.cache().get::<ArticleApiResponse>(&key).await.is_some();
        info!(round, key = %key, cached = had_cached, "Starting fetch round");
        let spinner = spinner("Loading feed...")?;

        let mut stream = repository.fetch_articles(filter);
        let mut emitted = 0usize;
        while let Some(item) = stream.next().await {
            match item {
                Ok(batch) => {
                    let source = if emitted == 0 && had_cached { "cache" } else { "network" };
                    debug!(round, source, articles = batch.len(), "Received batch");
                    spinner.suspend(|| print_batch(source, &batch));
                    emitted += 1;
                }
                Err(e) if emitted > 0 => {
                    warn!(round, error = %e, "Refresh failed after cached emission");
                    spinner.suspend(|| {
                        println!("   {} {}", "⚠️  Refresh failed, showing cached feed:".yellow(), e)
                    });
                }
                Err(e) => {
                    spinner.finish_and_clear();
                    return Err(e).context("Failed to load feed");
                }
            }
        }
        spinner.finish_and_clear();
    }

    Ok(())
}

/// Load a feed through the controller and print the latest state on each change
///
/// States replaced before the printer wakes (e.g. a quick `Loading`) are not shown.
async fn cmd_feed(filter: FilterSpec, http: &HttpArgs) -> Result<()> {
    let transport = Arc::new(http.transport()?);
    let repository = Arc::new(ArticlesRepository::new(transport, Arc::new(ResponseCache::new())));
    let controller = FeedController::with_filter(repository, Arc::new(ConnectivityMonitor::online()), filter);

    let mut states = controller.subscribe();
    let printer = tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let state = states.borrow_and_update().clone();
            print_state(&state);
        }
    });

    info!(key = %controller.filter().cache_key(), "Loading feed");
    controller.refresh();
    controller.settled().await;
    debug!(state = ?controller.state(), "Feed settled");
    drop(controller);
    printer.await.context("State printer failed")?;

    Ok(())
}

/// Print the resolved path and cache key
fn cmd_path(filter: &FilterSpec) -> Result<()> {
    let request = resolve(filter);

    println!("{} {}", "Path:".yellow(), request.path);
    println!("{} {}", "Cache key:".yellow(), filter.cache_key());
    if !request.query.is_empty() {
        for (name, value) in &request.query {
            println!("   {} {}={}", "Query:".dimmed(), name, value);
        }
    }

    Ok(())
}

fn spinner(message: &'static str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

fn print_batch(source: &str, batch: &[Article]) {
    let label = match source {
        "cache" => source.blue(),
        _ => source.green(),
    };
    println!("   {} {} article(s) from {}", "✅".green(), batch.len(), label);
    print_titles(batch);
}

fn print_titles(articles: &[Article]) {
    for (rank, article) in articles.iter().take(TOP_TITLES).enumerate() {
        println!("   {:>2}. {}", rank + 1, article.title.bold());
        println!("       {} · {}", article.byline_text().dimmed(), article.published_date.dimmed());
    }
    if articles.len() > TOP_TITLES {
        println!("       {}", format!("... and {} more", articles.len() - TOP_TITLES).dimmed());
    }
}

fn print_state(state: &ViewState) {
    match state {
        ViewState::Idle => println!("{}", "Idle".dimmed()),
        ViewState::Loading => println!("{}", "⏳ Loading...".cyan()),
        ViewState::Success(articles) => {
            println!("{} {} article(s)", "✅ Showing".green(), articles.len());
            print_titles(articles);
        }
        ViewState::Failure(message) => println!("{} {}", "❌".red(), message.red()),
        ViewState::Offline => println!("{}", "📡 Offline".yellow()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_feed_help_describes_latest_state() {
        let cli = Cli::command();
        let feed = cli.find_subcommand("feed").unwrap();
        let about = feed.get_about().unwrap().to_string();
        assert!(about.contains("latest view state on each change"));
        assert!(!about.contains("every"));
    }

    #[test]
    fn test_filter_flags_parse() {
        let cli = Cli::try_parse_from([
            "mostpop", "path", "--endpoint", "shared", "--period", "month", "--share", "twitter",
        ])
        .unwrap();
        match cli.command {
            Commands::Path { filter } => {
                let filter = filter.to_filter();
                assert_eq!(filter.cache_key(), "shared-30-all-sections-twitter");
                assert_eq!(resolve(&filter).path, "/svc/mostpopular/v2/shared/30/twitter.json");
            }
            _ => panic!("expected path subcommand"),
        }
    }
}
