use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use roadmap_core::traits::{Embedder, TopicIndex};
use roadmap_core::types::SearchHit;
use roadmap_core::{Error, Result};

use crate::upstream;

/// Whether retrieved hits are close enough to ground a roadmap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Relevance {
    Grounded { best_distance: f32 },
    KnowledgeOnly { best_distance: Option<f32> },
}

impl Relevance {
    /// Decided on the best hit alone: grounded iff its distance is strictly
    /// below `threshold`.
    pub fn assess(hits: &[SearchHit], threshold: f32) -> Self {
        match hits.first() {
            Some(best) if best.distance < threshold => Relevance::Grounded { best_distance: best.distance },
            Some(best) => Relevance::KnowledgeOnly { best_distance: Some(best.distance) },
            None => Relevance::KnowledgeOnly { best_distance: None },
        }
    }

    pub fn is_grounded(&self) -> bool {
        matches!(self, Relevance::Grounded { .. })
    }

    pub fn best_distance(&self) -> Option<f32> {
        match *self {
            Relevance::Grounded { best_distance } => Some(best_distance),
            Relevance::KnowledgeOnly { best_distance } => best_distance,
        }
    }
}

pub fn is_grounded(hits: &[SearchHit], threshold: f32) -> bool {
    Relevance::assess(hits, threshold).is_grounded()
}

pub struct Retriever {
    index: Arc<dyn TopicIndex>,
    embedder: Arc<dyn Embedder>,
    embed_timeout: Duration,
}

impl Retriever {
    pub fn new(index: Arc<dyn TopicIndex>, embedder: Arc<dyn Embedder>, embed_timeout: Duration) -> Self {
        Self { index, embedder, embed_timeout }
    }

    pub async fn retrieve(&self, query: &str, domain: Option<&str>, limit: usize) -> Result<Vec<SearchHit>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::Validation("query must not be empty".into()));
        }
        let context = format!("query '{query}'");
        let mut vectors = upstream::embed(
            self.embedder.clone(),
            vec![query.to_string()],
            self.index.dimension(),
            self.embed_timeout,
            &context,
        )
        .await?;
        let vector = vectors.pop().unwrap_or_default();
        let hits = self.index.search(&vector, limit, domain).await?;
        debug!(query, domain = domain.unwrap_or("*"), hits = hits.len(), "retrieved");
        Ok(hits)
    }
}
