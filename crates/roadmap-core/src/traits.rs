use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{SearchHit, TopicRecord};

/// Text to fixed-length vector. One call per batch, order preserved.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Prompt to free text.
#[async_trait]
pub trait Generator: Send + Sync {
    fn model_id(&self) -> &str;
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}

/// Persistent store of topic records with nearest-neighbour search.
#[async_trait]
pub trait TopicIndex: Send + Sync {
    /// Vector dimension every stored record carries.
    fn dimension(&self) -> usize;
    async fn ensure_schema(&self) -> Result<()>;
    async fn list_ids(&self) -> Result<HashSet<String>>;
    async fn count(&self) -> Result<usize>;
    /// Appends all records in one commit, or none of them.
    async fn insert(&self, records: &[TopicRecord]) -> Result<usize>;
    /// At most `limit` hits, ascending by distance, ties broken by id.
    async fn search(&self, query: &[f32], limit: usize, domain: Option<&str>) -> Result<Vec<SearchHit>>;
}
