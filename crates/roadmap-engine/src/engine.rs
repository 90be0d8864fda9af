use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use roadmap_core::config::Settings;
use roadmap_core::traits::{Embedder, Generator, TopicIndex};
use roadmap_core::types::{Roadmap, SearchHit, TopicEntry};
use roadmap_core::{Error, Result};

use crate::assembler::Assembler;
use crate::loader::{Loader, ReconcileReport};
use crate::retriever::{Relevance, Retriever};

/// Knobs the engine reads from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub relevance_threshold: f32,
    pub default_limit: usize,
    pub max_limit: usize,
    pub embed_timeout: Duration,
    pub generate_timeout: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl EngineSettings {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            relevance_threshold: settings.retrieval.relevance_threshold,
            default_limit: settings.retrieval.default_limit,
            max_limit: settings.retrieval.max_limit,
            embed_timeout: settings.embedding.timeout(),
            generate_timeout: settings.generation.timeout(),
        }
    }
}

/// Retrieval, roadmap generation and corpus reconciliation over one index.
pub struct RoadmapEngine {
    loader: Loader,
    retriever: Retriever,
    assembler: Assembler,
    settings: EngineSettings,
}

impl RoadmapEngine {
    pub fn new(
        index: Arc<dyn TopicIndex>,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            loader: Loader::new(index.clone(), embedder.clone(), settings.embed_timeout),
            retriever: Retriever::new(index, embedder, settings.embed_timeout),
            assembler: Assembler::new(generator, settings.generate_timeout),
            settings,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    fn check_limit(&self, name: &str, n: usize) -> Result<()> {
        if n == 0 || n > self.settings.max_limit {
            return Err(Error::Validation(format!("{name} must be within 1..={}, got {n}", self.settings.max_limit)));
        }
        Ok(())
    }

    pub async fn retrieve(&self, query: &str, domain: Option<&str>, limit: usize) -> Result<Vec<SearchHit>> {
        self.check_limit("limit", limit)?;
        self.retriever.retrieve(query, domain, limit).await
    }

    /// Grounded roadmap when the best hit passes the relevance gate, otherwise a
    /// roadmap written by the generator alone.
    pub async fn generate_roadmap(&self, query: &str, domain: Option<&str>, num_topics: usize) -> Result<Roadmap> {
        self.check_limit("num_topics", num_topics)?;
        let query = query.trim();
        let hits = self.retriever.retrieve(query, domain, num_topics).await?;
        match Relevance::assess(&hits, self.settings.relevance_threshold) {
            Relevance::Grounded { best_distance } => {
                info!(query, best_distance, "relevant topics found, building grounded roadmap");
                Ok(self.assembler.grounded(query, domain, hits).await)
            }
            Relevance::KnowledgeOnly { best_distance } => {
                info!(
                    query,
                    best_distance = ?best_distance,
                    threshold = self.settings.relevance_threshold,
                    "no relevant topics, falling back to generator knowledge"
                );
                self.assembler.knowledge_only(query, domain, num_topics, best_distance).await
            }
        }
    }

    pub async fn reconcile(&self, corpus: &[TopicEntry]) -> Result<ReconcileReport> {
        self.loader.reconcile(corpus).await
    }
}
