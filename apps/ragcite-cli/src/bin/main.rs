//! ragcite: query a user's plain-text corpus and print cited passages.
//!
//! ```bash
//! ragcite query alice "how do I size a battery bank?"
//! ragcite query alice "pump maintenance" -k 3 --json
//! ragcite sources alice
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::env;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use ragcite_core::config::{Config, Settings};
use ragcite_core::data_processor::Chunker;
use ragcite_core::store::DirectoryCorpusStore;
use ragcite_core::{QueryResult, UserId};
use ragcite_hybrid::{RetrieveParams, Retriever};

/// Hybrid BM25 + TF-IDF retrieval with numbered citations.
#[derive(Parser)]
#[command(name = "ragcite", version, about)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Retrieve cited passages for a query
    Query {
        /// User whose corpus is searched
        user: String,
        /// Free-text query
        query: String,
        /// Number of citations to return
        #[arg(short)]
        k: Option<usize>,
        /// Number of fused candidates that reach the rerank pass
        #[arg(long)]
        window: Option<usize>,
        /// Output the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// List a user's sources and their chunk counts
    Sources {
        user: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {e}"); e })?;
    let settings = config.settings()?;
    let store = DirectoryCorpusStore::new(settings.corpus.root_path(&env::current_dir()?), Chunker::from_config(&settings.corpus));
    debug!(root = %store.root().display(), "corpus root");

    match cli.command {
        Command::Query { user, query, k, window, json } => run_query(store, settings, &UserId::new(user), &query, k, window, json),
        Command::Sources { user } => {
            let sources = store.sources(&UserId::new(user))?;
            if sources.is_empty() { println!("No sources."); }
            for (source, chunks) in sources { println!("{source}\t{chunks} chunks"); }
            Ok(())
        }
    }
}

fn run_query(store: DirectoryCorpusStore, settings: Settings, user: &UserId, query: &str, k: Option<usize>, window: Option<usize>, json: bool) -> Result<()> {
    let retriever = Retriever::new(store, settings.retrieval)?;
    let params = query_params(retriever.config().window_size, k, window);
    let result = retriever.retrieve_with(user, query, &params)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", format_human(&result));
    }
    Ok(())
}

/// A `-k` larger than the configured window widens the window to match,
/// unless `--window` was given explicitly.
fn query_params(configured_window: usize, k: Option<usize>, window: Option<usize>) -> RetrieveParams {
    let window_size = window.or_else(|| k.map(|k| k.max(configured_window)));
    RetrieveParams { k, window_size, weights: None }
}

fn format_human(result: &QueryResult) -> String {
    if !result.found() { return "No relevant documents found.".to_string(); }
    result
        .citations()
        .iter()
        .map(|c| format!("{} {:.4}  {}\n    {}", c.marker(), c.score, c.locator, c.snippet))
        .collect::<Vec<_>>()
        .join("\n")
}
