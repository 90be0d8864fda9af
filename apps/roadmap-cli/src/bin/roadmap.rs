use clap::Parser;
use roadmap_cli::{init_tracing, App};

/// Build a phased learning roadmap and print it as JSON.
#[derive(Parser)]
#[command(name = "roadmap", version)]
struct Args {
    query: String,
    #[arg(long)]
    domain: Option<String>,
    #[arg(long)]
    num_topics: Option<usize>,
    /// Reconcile the configured corpus first.
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

    let num_topics = args.num_topics.unwrap_or(app.engine.settings().default_limit);
    let roadmap = app.engine.generate_roadmap(&args.query, args.domain.as_deref(), num_topics).await?;
    println!("{}", serde_json::to_string_pretty(&roadmap)?);
    Ok(())
}
