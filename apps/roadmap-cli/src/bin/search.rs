use clap::Parser;
use roadmap_cli::{init_tracing, App};

/// Nearest topics for a free-text query.
#[derive(Parser)]
#[command(name = "roadmap-search", version)]
struct Args {
    query: String,
    /// Only topics whose domain equals this exactly.
    #[arg(long)]
    domain: Option<String>,
    #[arg(long)]
    limit: Option<usize>,
    /// Reconcile the configured corpus before searching.
    #[arg(long)]
    reconcile: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let app = App::bootstrap().await?;
    if args.reconcile {
        app.reconcile(None).await?;
    }

    let limit = args.limit.unwrap_or(app.engine.settings().default_limit);
    let hits = app.engine.retrieve(&args.query, args.domain.as_deref(), limit).await?;
    if hits.is_empty() {
        println!("No topics found for '{}'", args.query);
        return Ok(());
    }
    let threshold = app.engine.settings().relevance_threshold;
    for (rank, hit) in hits.iter().enumerate() {
        let marker = if hit.distance < threshold { "*" } else { " " };
        println!(
            "{marker}{:>3}. {:.4}  [{}] {} ({}, {}h)",
            rank + 1,
            hit.distance,
            hit.id(),
            hit.topic.topic,
            hit.topic.difficulty.as_str(),
            hit.topic.hours()
        );
    }
    Ok(())
}
