//! Tally daemon: entry point for running the vote tally service.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tally_node::{init_logging, LogFormat, ShutdownSignal, TallyConfig, TallyNode};
use tally_rpc::RpcServer;
use tally_store::{CandidateStore, CounterStore, Fixtures, RankedSetStore, VoterStore};
use tally_store_lmdb::LmdbEnvironment;
use tally_store_memory::MemoryCacheStore;
use tally_store_redis::RedisCacheStore;

#[derive(Parser)]
#[command(name = "tally-daemon", about = "Vote tally service daemon")]
struct Cli {
    /// Address for the HTTP server, e.g. "0.0.0.0:8080".
    #[arg(long, env = "TALLY_LISTEN_ADDR")]
    listen_addr: Option<String>,

    /// Data directory for the LMDB relational store.
    #[arg(long, env = "TALLY_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Redis URL for counters and ranked sets. Without it the in-process
    /// backend is used.
    #[arg(long, env = "TALLY_REDIS_URL")]
    redis_url: Option<String>,

    /// Page cache TTL in seconds.
    #[arg(long, env = "TALLY_PAGE_CACHE_TTL_SECS")]
    page_cache_ttl_secs: Option<u64>,

    /// Allow concurrent submissions from the same voter (not recommended).
    #[arg(long, env = "TALLY_UNSERIALIZED_VOTERS")]
    unserialized_voters: bool,

    /// Enable Prometheus metrics endpoint.
    #[arg(long, env = "TALLY_ENABLE_METRICS")]
    metrics: bool,

    /// Log format: "human" or "json".
    #[arg(long, env = "TALLY_LOG_FORMAT")]
    log_format: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "TALLY_LOG_LEVEL")]
    log_level: Option<String>,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "TALLY_CONFIG")]
    config: Option<PathBuf>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Warm up the caches and serve HTTP.
    Run,
    /// Load candidates and voters from a JSON fixture file into LMDB.
    Import {
        #[arg(long)]
        fixtures: PathBuf,
    },
    /// Print the effective configuration as TOML.
    Config,
}

impl Cli {
    /// File config (or defaults) with CLI flags and env vars layered on top.
    fn effective_config(&self) -> anyhow::Result<TallyConfig> {
        let base = match &self.config {
            Some(path) => {
                let path = path.to_string_lossy();
                TallyConfig::from_toml_file(&path)
                    .with_context(|| format!("loading config file {path}"))?
            }
            None => TallyConfig::default(),
        };

        Ok(TallyConfig {
            listen_addr: self.listen_addr.clone().unwrap_or(base.listen_addr),
            data_dir: self.data_dir.clone().unwrap_or(base.data_dir),
            redis_url: self.redis_url.clone().or(base.redis_url),
            page_cache_ttl_secs: self.page_cache_ttl_secs.unwrap_or(base.page_cache_ttl_secs),
            serialize_voter_submissions: base.serialize_voter_submissions
                && !self.unserialized_voters,
            enable_metrics: self.metrics || base.enable_metrics,
            log_format: self.log_format.clone().unwrap_or(base.log_format),
            log_level: self.log_level.clone().unwrap_or(base.log_level),
            ..base
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.effective_config()?;

    let format: LogFormat = config
        .log_format
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    init_logging(format, &config.log_level).context("initialising logging")?;

    match cli.command {
        Command::Run => run(config).await,
        Command::Import { fixtures } => import(&config, &fixtures),
        Command::Config => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

fn open_relational(config: &TallyConfig) -> anyhow::Result<Arc<LmdbEnvironment>> {
    let env = LmdbEnvironment::open(&config.data_dir, config.lmdb_map_size)
        .with_context(|| format!("opening LMDB at {}", config.data_dir.display()))?;
    Ok(Arc::new(env))
}

fn import(config: &TallyConfig, path: &std::path::Path) -> anyhow::Result<()> {
    let env = open_relational(config)?;
    let fixtures = Fixtures::from_json_file(path)?;
    let (candidates, voters) = fixtures.load_into(env.as_ref())?;
    tracing::info!(
        candidates,
        voters,
        total_candidates = env.candidate_count()?,
        total_voters = env.voter_count()?,
        "Imported fixtures from {}",
        path.display()
    );
    Ok(())
}

async fn run(config: TallyConfig) -> anyhow::Result<()> {
    let relational = open_relational(&config)?;

    let (counters, sets): (Arc<dyn CounterStore>, Arc<dyn RankedSetStore>) =
        match &config.redis_url {
            Some(url) => {
                let redis = Arc::new(
                    RedisCacheStore::connect(url)
                        .await
                        .with_context(|| format!("connecting to Redis at {url}"))?,
                );
                tracing::info!("Using Redis cache store at {url}");
                (
                    redis.clone() as Arc<dyn CounterStore>,
                    redis as Arc<dyn RankedSetStore>,
                )
            }
            None => {
                let memory = Arc::new(MemoryCacheStore::new());
                tracing::info!("Using in-process cache store");
                (
                    memory.clone() as Arc<dyn CounterStore>,
                    memory as Arc<dyn RankedSetStore>,
                )
            }
        };

    let node = Arc::new(TallyNode::new(config, relational, counters, sets));
    let report = node.warm_up().await.context("initial warm-up")?;
    tracing::info!(
        candidates = report.candidates,
        votes_replayed = report.votes_replayed,
        "Caches warmed, starting HTTP server"
    );

    let shutdown = ShutdownSignal::new();
    let signals = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move { shutdown.listen_for_os_signals().await })
    };

    RpcServer::new(node, shutdown.clone()).start().await?;
    shutdown.trigger();
    let _ = signals.await;

    tracing::info!("Tally daemon exited cleanly");
    Ok(())
}
