use anyhow::Result;
use catalog_core::loader::load_catalog;
use catalog_core::{query, Filters, InvertedIndex};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "catalog-indexer")]
#[command(about = "Build the catalog index and inspect or query it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from a catalog and print statistics
    Stats {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Also list the most frequent terms
        #[arg(long, default_value_t = 0)]
        top_terms: usize,
    },
    /// Build the index and run a single query against it
    Query {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Free text query; empty browses the whole catalog
        #[arg(long, default_value = "")]
        q: String,
        #[arg(long)]
        size: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        min_price: Option<f64>,
        #[arg(long)]
        max_price: Option<f64>,
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[derive(Serialize)]
struct Stats {
    num_docs: u32,
    num_terms: usize,
    avg_doc_length: f32,
    built_at: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    top_terms: Vec<TermStat>,
}

#[derive(Serialize)]
struct TermStat {
    term: String,
    df: usize,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Stats { input, top_terms } => stats(&input, top_terms),
        Commands::Query { input, q, size, category, min_price, max_price, limit } => {
            let filters = Filters { size, category, min_price, max_price };
            run_query(&input, &q, &filters, limit)
        }
    }
}

fn build(input: &str) -> Result<InvertedIndex> {
    let records = load_catalog(input)?;
    tracing::info!(input, records = records.len(), "loaded catalog");
    Ok(InvertedIndex::build(records)?)
}

fn stats(input: &str, top_terms: usize) -> Result<()> {
    let index = build(input)?;
    let mut terms: Vec<TermStat> = index
        .terms()
        .map(|(term, postings)| TermStat { term: term.to_string(), df: postings.len() })
        .collect();
    terms.sort_by(|a, b| b.df.cmp(&a.df).then_with(|| a.term.cmp(&b.term)));
    terms.truncate(top_terms);

    let stats = Stats {
        num_docs: index.num_docs(),
        num_terms: index.num_terms(),
        avg_doc_length: index.avg_doc_length(),
        built_at: time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339).unwrap_or_else(|_| "".into()),
        top_terms: terms,
    };
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

fn run_query(input: &str, q: &str, filters: &Filters, limit: Option<usize>) -> Result<()> {
    let index = build(input)?;
    let hits = query(&index, q, filters, limit)?;
    println!("{}", serde_json::to_string_pretty(&hits)?);
    Ok(())
}
