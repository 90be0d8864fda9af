use std::path::PathBuf;

use clap::Parser;
use roadmap_cli::{init_tracing, App};
use roadmap_core::traits::TopicIndex;

/// Reconcile the topic corpus into the vector index.
#[derive(Parser)]
#[command(name = "roadmap-loader", version)]
struct Args {
    /// Corpus directory; defaults to `data.corpus_dir` from config.
    #[arg(long)]
    corpus: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let app = App::bootstrap().await?;
    let report = app.reconcile(args.corpus.as_deref()).await?;
    let total = app.index.count().await?;

    println!("Corpus topics:    {}", report.corpus);
    println!("Already indexed:  {}", report.existing);
    println!("Duplicate ids:    {}", report.duplicates);
    println!("Inserted:         {}", report.inserted);
    println!("Index now holds:  {total} ({})", app.index.table_name());
    Ok(())
}
