use anyhow::{Context, Result};
use app::{Services, StoreKind};
use clap::{Args, Parser, Subcommand};
use config::FileConfig;
use serde::Serialize;
use sitelens_analysis::{collection_name, InMemoryStateSink, ProjectContext, RunProcessor};
use sitelens_protocol::RunStatus;
use std::path::PathBuf;
use std::sync::Arc;

mod app;
mod config;

#[derive(Parser)]
#[command(name = "sitelens")]
#[command(about = "Per-route web performance insights grounded in source code", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// TOML config with [analysis], [discovery] and [indexer] tables
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover routes, measure them and generate insights
    Analyze(AnalyzeArgs),

    /// Print the routes discovery would analyze
    Discover(DiscoverArgs),

    /// Index a repository into the retrieval store
    Index(IndexArgs),
}

#[derive(Args)]
struct ServiceArgs {
    /// PageSpeed Insights API key
    #[arg(long, env = "PAGESPEED_API_KEY", hide_env_values = true)]
    pagespeed_key: Option<String>,

    /// Gemini API key (generation and embeddings)
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_key: Option<String>,

    /// Gemini model for insight generation
    #[arg(long, env = "GEMINI_MODEL", default_value = sitelens_analysis::DEFAULT_GEMINI_MODEL)]
    gemini_model: String,

    /// Retrieval store backend
    #[arg(long, value_enum, default_value = "memory")]
    store: StoreKind,

    /// Chroma server URL (with --store chroma)
    #[arg(long, env = "CHROMA_SERVER_URL", default_value = "http://localhost:8000")]
    chroma_url: String,
}

impl ServiceArgs {
    fn services(&self) -> Services {
        Services {
            pagespeed_key: self.pagespeed_key.clone(),
            gemini_key: self.gemini_key.clone(),
            gemini_model: self.gemini_model.clone(),
            store: self.store,
            chroma_url: self.chroma_url.clone(),
        }
    }
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Site base URL, e.g. https://example.com
    site: String,

    /// Project name; also names the code collection
    #[arg(long)]
    name: Option<String>,

    /// Source repository to index for code context
    #[arg(long)]
    repo: Option<String>,

    /// Run identifier reported with the result
    #[arg(long, default_value = "local")]
    run_id: String,

    #[command(flatten)]
    services: ServiceArgs,
}

#[derive(Args)]
struct DiscoverArgs {
    /// Site base URL
    site: String,
}

#[derive(Args)]
struct IndexArgs {
    /// Repository URL to clone
    repo: String,

    /// Project name; the collection is derived from it
    #[arg(long)]
    name: String,

    #[command(flatten)]
    services: ServiceArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    // reqwest/hyper internals are noisy at debug
    if !cli.verbose {
        builder.filter_module("hyper", log::LevelFilter::Warn);
        builder.filter_module("reqwest", log::LevelFilter::Warn);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = FileConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze(args) => run_analyze(args, &config, cli.pretty).await?,
        Commands::Discover(args) => run_discover(args, &config, cli.pretty).await?,
        Commands::Index(args) => run_index(args, &config, cli.pretty).await?,
    }

    Ok(())
}

async fn run_analyze(args: AnalyzeArgs, config: &FileConfig, pretty: bool) -> Result<()> {
    let services = args.services.services();
    let pipeline = app::pipeline(config, &services, args.repo.is_some()).await?;
    let processor = RunProcessor::new(Arc::new(pipeline), Arc::new(InMemoryStateSink::new()));

    let context = ProjectContext {
        project_name: args.name.unwrap_or_else(|| args.site.clone()),
        site_url: args.site,
        repo_url: args.repo,
    };
    let state = processor.process_run(&args.run_id, &context).await?;

    print_json(&state, pretty)?;
    if state.status == RunStatus::Error {
        anyhow::bail!("analysis of {} failed", context.site_url);
    }
    Ok(())
}

async fn run_discover(args: DiscoverArgs, config: &FileConfig, pretty: bool) -> Result<()> {
    let discovery = app::discovery(config)?;
    let found = discovery
        .discover(&args.site)
        .await
        .with_context(|| format!("Route discovery failed for {}", args.site))?;
    print_json(&found, pretty)
}

#[derive(Serialize)]
struct IndexOutput {
    collection: String,
    #[serde(flatten)]
    stats: sitelens_indexer::IndexStats,
}

async fn run_index(args: IndexArgs, config: &FileConfig, pretty: bool) -> Result<()> {
    let services = args.services.services();
    let store = services.store().await?;
    let indexer = app::indexer(config, store)?;

    let collection = collection_name(&args.name);
    let stats = indexer
        .index_repository(&args.repo, &collection)
        .await
        .with_context(|| format!("Indexing {} failed", args.repo))?;
    if services.store == StoreKind::Memory {
        log::warn!("--store memory keeps the index only for this process");
    }

    print_json(&IndexOutput { collection, stats }, pretty)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let output = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{output}");
    Ok(())
}
