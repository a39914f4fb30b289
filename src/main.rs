use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::{debug, error};

use release_query::config::{ConfigLayer, QueryConfig};
use release_query::logging::{self, LogOptions};
use release_query::release::cache::{CacheKey, FileCacheStore};
use release_query::release::github::GitHubFetcher;
use release_query::release::selector::ReleaseSelector;
use release_query::release::types::SelectionResult;

#[derive(Parser)]
#[command(name = "release-query")]
#[command(version, about = "Find the newest release asset matching a pattern")]
struct Cli {
    #[command(flatten)]
    log: LogArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct LogArgs {
    /// Increase diagnostic verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Write diagnostics to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Emit diagnostics as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Print the newest release asset matching a pattern as JSON
    Query(QueryArgs),
}

#[derive(Args)]
struct QueryArgs {
    /// URL of the GitHub releases API endpoint
    #[arg(long)]
    releases_url: Option<String>,

    /// Regular expression to match the desired asset file name
    #[arg(long)]
    asset_regex: Option<String>,

    /// Disable caching of the releases data
    #[arg(long)]
    no_cache: bool,

    /// Remove everything but digits and dots from tags before comparing them
    #[arg(long)]
    parse_harder: bool,

    /// Regex patterns for tags to ignore (repeatable or comma-separated)
    #[arg(long = "ignore", value_delimiter = ',')]
    ignore: Vec<String>,

    /// Maximum age of cached releases data in seconds
    #[arg(long)]
    cache_ttl: Option<u64>,

    /// Directory for cached releases data
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// JSON config file; command-line flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,
}

impl QueryArgs {
    fn to_layer(&self) -> ConfigLayer {
        ConfigLayer {
            releases_url: self.releases_url.clone(),
            asset_pattern: self.asset_regex.clone(),
            disable_cache: self.no_cache.then_some(true),
            lenient_versions: self.parse_harder.then_some(true),
            exclude_patterns: self.ignore.clone(),
            cache_ttl_secs: self.cache_ttl,
            cache_dir: self.cache_dir.clone(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _guard = logging::init(&LogOptions {
        verbosity: cli.log.verbose,
        file: cli.log.log_file,
        json: cli.log.log_json,
    })?;

    match cli.command {
        Command::Query(args) => {
            let result = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?
                .block_on(query(&args))
                .inspect_err(|e| error!("{:#}", e))?;
            println!("{}", serde_json::to_string(&result)?);
        }
    }

    Ok(())
}

async fn query(args: &QueryArgs) -> anyhow::Result<SelectionResult> {
    let file_layer = match &args.config {
        Some(path) => ConfigLayer::load(path)?,
        None => ConfigLayer::default(),
    };
    let config = QueryConfig::from_layers(file_layer, args.to_layer());

    let store = FileCacheStore::new(&config.cache_dir);
    debug!(
        "cache path {:?}",
        store.path_for(&CacheKey::for_source(&config.releases_url))
    );

    let selector = ReleaseSelector::new(config, GitHubFetcher::new()?, store)?;
    Ok(selector.select().await?)
}
