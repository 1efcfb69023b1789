use anyhow::Result;
use catalog_server::{build_app, AppConfig};
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

/// Serve catalog recommendations over HTTP.
#[derive(Parser)]
struct Args {
    /// Catalog to index: a .json/.jsonl file or a directory of them
    #[arg(long, default_value = "./data/dataset_1.json")]
    catalog: String,
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    #[arg(long, default_value_t = 3000)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let app = build_app(AppConfig::from_env(&args.catalog))?;

    let listener = TcpListener::bind((args.host.as_str(), args.port)).await?;
    tracing::info!(addr = %listener.local_addr()?, catalog = %args.catalog, "recommendation server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
