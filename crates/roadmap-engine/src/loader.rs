use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use roadmap_core::traits::{Embedder, TopicIndex};
use roadmap_core::types::{TopicEntry, TopicRecord};
use roadmap_core::Result;

use crate::upstream;

/// Outcome of one reconciliation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Entries in the corpus as given.
    pub corpus: usize,
    /// Entries whose id was already indexed.
    pub existing: usize,
    /// Later occurrences of an id seen earlier in the same corpus.
    pub duplicates: usize,
    pub inserted: usize,
}

/// Brings the index up to date with a corpus by inserting only unseen ids.
pub struct Loader {
    index: Arc<dyn TopicIndex>,
    embedder: Arc<dyn Embedder>,
    embed_timeout: Duration,
}

impl Loader {
    pub fn new(index: Arc<dyn TopicIndex>, embedder: Arc<dyn Embedder>, embed_timeout: Duration) -> Self {
        Self { index, embedder, embed_timeout }
    }

    /// Embeds the descriptions of new entries in one batch and inserts them in
    /// one commit. Nothing is written if embedding fails.
    pub async fn reconcile(&self, corpus: &[TopicEntry]) -> Result<ReconcileReport> {
        let mut report = ReconcileReport { corpus: corpus.len(), ..Default::default() };
        let indexed = self.index.list_ids().await?;

        let mut seen: HashSet<&str> = HashSet::with_capacity(corpus.len());
        let mut fresh: Vec<&TopicEntry> = Vec::new();
        for entry in corpus {
            if !seen.insert(entry.id.as_str()) {
                warn!(id = %entry.id, "duplicate id in corpus, keeping first occurrence");
                report.duplicates += 1;
                continue;
            }
            if indexed.contains(&entry.id) {
                report.existing += 1;
            } else {
                fresh.push(entry);
            }
        }

        if fresh.is_empty() {
            info!(corpus = report.corpus, existing = report.existing, "index already up to date");
            return Ok(report);
        }

        let texts: Vec<String> = fresh.iter().map(|e| e.description.clone()).collect();
        let context = format!("{} new topics", fresh.len());
        let vectors = upstream::embed(self.embedder.clone(), texts, self.index.dimension(), self.embed_timeout, &context).await?;

        let records: Vec<TopicRecord> = fresh
            .into_iter()
            .zip(vectors)
            .map(|(entry, vector)| TopicRecord::from_entry(entry.clone(), vector))
            .collect();
        report.inserted = self.index.insert(&records).await?;
        info!(
            corpus = report.corpus,
            existing = report.existing,
            duplicates = report.duplicates,
            inserted = report.inserted,
            "reconciled corpus"
        );
        Ok(report)
    }
}
