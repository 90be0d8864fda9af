//! Shared startup for the roadmap binaries.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use roadmap_core::config::{Config, Settings};
use roadmap_core::corpus::CorpusLoader;
use roadmap_core::traits::TopicIndex;
use roadmap_embed::default_embedder;
use roadmap_engine::{EngineSettings, GeminiGenerator, ReconcileReport, RoadmapEngine};
use roadmap_vector::LanceTopicIndex;

/// `RUST_LOG` when set, `info` otherwise. Logs go to stderr so stdout stays parseable.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

pub struct App {
    pub settings: Settings,
    pub index: Arc<LanceTopicIndex>,
    pub engine: RoadmapEngine,
}

impl App {
    /// Loads configuration and opens the index, embedder and generator once.
    pub async fn bootstrap() -> Result<Self> {
        let config = Config::load().map_err(|e| {
            eprintln!("Error loading config: {e}");
            e
        })?;
        let settings = config.settings()?;
        info!(
            lancedb = %settings.data.lancedb_dir.display(),
            table = %settings.index.table_name,
            dimension = settings.index.dimension,
            "starting"
        );

        let index = Arc::new(LanceTopicIndex::open(&settings.data.lancedb_dir, &settings.index).await?);
        index.ensure_schema().await?;

        let embedder = default_embedder(&settings.embedding, settings.index.dimension)?;
        let generator = GeminiGenerator::from_settings(&settings.generation);
        let engine = RoadmapEngine::new(
            index.clone(),
            Arc::from(embedder),
            Arc::new(generator),
            EngineSettings::from_settings(&settings),
        );
        Ok(Self { settings, index, engine })
    }

    /// Loads the corpus directory (configured one unless overridden) and
    /// reconciles it against the index.
    pub async fn reconcile(&self, corpus_dir: Option<&Path>) -> Result<ReconcileReport> {
        let dir = corpus_dir.unwrap_or(&self.settings.data.corpus_dir);
        let corpus = CorpusLoader::new().load_dir(dir)?;
        for skipped in &corpus.skipped {
            warn!(file = %skipped.path.display(), reason = %skipped.reason, "corpus file skipped");
        }

        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}") {
            spinner.set_style(style);
        }
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner.set_message(format!("reconciling {} topics from {}", corpus.len(), dir.display()));
        let result = self.engine.reconcile(&corpus.entries).await;
        match &result {
            Ok(report) => spinner.finish_with_message(format!("{} new topics indexed", report.inserted)),
            Err(_) => spinner.abandon_with_message("reconciliation failed"),
        }
        Ok(result?)
    }
}
