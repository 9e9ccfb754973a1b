use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sluice::{ElasticClient, MongoStore, SyncOptions, SyncRunner};

#[derive(Parser, Debug)]
#[command(name = "sluice")]
#[command(about = "Sync MongoDB collections into Elasticsearch indexes")]
#[command(version)]
struct Cli {
    /// MongoDB connection URI, including the database name
    #[arg(short, long, env = "MONGO_URL")]
    mongo: String,

    /// Elasticsearch base URL
    #[arg(short, long, env = "ELASTICSEARCH_URL")]
    elastic: String,

    /// Name indexes with the singular form of the collection name
    #[arg(short, long)]
    singularize: bool,

    /// Documents sampled per collection for schema inference
    #[arg(long, default_value = "100")]
    sample_size: usize,

    /// Disable progress bars
    #[arg(long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let store = MongoStore::connect(&cli.mongo, cli.sample_size).await?;
    tracing::info!("connected to MongoDB");

    let search = ElasticClient::new(&cli.elastic)?;
    search.ping().await?;
    tracing::info!("connected to Elasticsearch at {}", cli.elastic);

    let runner = SyncRunner::new(
        &store,
        &search,
        SyncOptions {
            singularize: cli.singularize,
            quiet: cli.quiet,
        },
    );
    let report = runner.run().await?;

    println!("Synced {} collections:", report.collections.len());
    for entry in &report.collections {
        println!(
            "  {} -> {} ({} documents)",
            entry.collection, entry.index, entry.documents
        );
    }

    Ok(())
}
