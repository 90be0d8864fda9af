use std::collections::HashSet;
use std::path::Path;

use arrow_array::RecordBatchIterator;
use async_trait::async_trait;
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase, Select};
use lancedb::{Connection, DistanceType, Table};
use tracing::{debug, info, warn};

use roadmap_core::config::{DistanceMetric, IndexSettings};
use roadmap_core::traits::TopicIndex;
use roadmap_core::types::{SearchHit, TopicRecord};
use roadmap_core::{Error, Result};

use crate::reader::{batch_ids, batch_to_hits};
use crate::schema::build_topic_schema;
use crate::table::{ensure_table, open_db, open_table};
use crate::writer::records_to_batch;

/// Extra rows fetched past `limit` so equal-distance hits can be ordered by id
/// before truncation.
const TIE_SLACK: usize = 16;

/// The topics table of one LanceDB database.
pub struct LanceTopicIndex {
    db: Connection,
    table_name: String,
    dim: usize,
    metric: DistanceMetric,
}

impl LanceTopicIndex {
    pub async fn open(db_path: &Path, settings: &IndexSettings) -> Result<Self> {
        let db = open_db(db_path.to_string_lossy().as_ref()).await?;
        Ok(Self { db, table_name: settings.table_name.clone(), dim: settings.dimension, metric: settings.metric })
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    async fn table(&self) -> Result<Option<Table>> {
        open_table(&self.db, &self.table_name).await
    }

    fn distance_type(&self) -> DistanceType {
        match self.metric {
            DistanceMetric::L2 => DistanceType::L2,
            DistanceMetric::Cosine => DistanceType::Cosine,
        }
    }

    fn validate_batch(&self, records: &[TopicRecord]) -> Result<()> {
        let mut seen = HashSet::with_capacity(records.len());
        for r in records {
            r.validate(self.dim)?;
            if !seen.insert(r.id.as_str()) {
                return Err(Error::Validation(format!("duplicate id '{}' in insert batch", r.id)));
            }
        }
        Ok(())
    }
}

/// SQL equality predicate on the domain column with quotes escaped.
pub fn domain_predicate(domain: &str) -> String {
    format!("`domain` = '{}'", domain.replace('\'', "''"))
}

#[async_trait]
impl TopicIndex for LanceTopicIndex {
    fn dimension(&self) -> usize {
        self.dim
    }

    async fn ensure_schema(&self) -> Result<()> {
        ensure_table(&self.db, &self.table_name, build_topic_schema(self.dim)).await?;
        Ok(())
    }

    async fn list_ids(&self) -> Result<HashSet<String>> {
        let Some(table) = self.table().await? else { return Ok(HashSet::new()) };
        let mut ids = HashSet::new();
        let mut stream = table
            .query()
            .select(Select::columns(&["id"]))
            .execute()
            .await
            .map_err(Error::storage)?;
        while let Some(batch) = stream.try_next().await.map_err(Error::storage)? {
            ids.extend(batch_ids(&batch)?);
        }
        Ok(ids)
    }

    async fn count(&self) -> Result<usize> {
        let Some(table) = self.table().await? else { return Ok(0) };
        table.count_rows(None).await.map_err(Error::storage)
    }

    async fn insert(&self, records: &[TopicRecord]) -> Result<usize> {
        if records.is_empty() {
            warn!(table = %self.table_name, "insert called with no records");
            return Ok(0);
        }
        self.validate_batch(records)?;
        let table = ensure_table(&self.db, &self.table_name, build_topic_schema(self.dim)).await?;
        let batch = records_to_batch(records, self.dim)?;
        let schema = batch.schema();
        let reader = Box::new(RecordBatchIterator::new(vec![Ok(batch)].into_iter(), schema));
        table.add(reader).execute().await.map_err(Error::storage)?;
        info!(table = %self.table_name, inserted = records.len(), "inserted topics");
        Ok(records.len())
    }

    async fn search(&self, query: &[f32], limit: usize, domain: Option<&str>) -> Result<Vec<SearchHit>> {
        if limit == 0 {
            return Err(Error::Validation("search limit must be at least 1".into()));
        }
        if query.len() != self.dim {
            return Err(Error::Validation(format!(
                "query vector has dimension {}, index expects {}",
                query.len(),
                self.dim
            )));
        }
        if query.iter().any(|x| !x.is_finite()) {
            return Err(Error::Validation("query vector has a non-finite component".into()));
        }
        let Some(table) = self.table().await? else { return Ok(Vec::new()) };
        if table.count_rows(None).await.map_err(Error::storage)? == 0 {
            return Ok(Vec::new());
        }

        let mut q = table
            .vector_search(query.to_vec())
            .map_err(Error::storage)?
            .distance_type(self.distance_type())
            .limit(limit.saturating_add(TIE_SLACK));
        if let Some(d) = domain {
            q = q.only_if(domain_predicate(d));
        }
        let mut stream = q.execute().await.map_err(Error::storage)?;
        let mut hits = Vec::new();
        while let Some(batch) = stream.try_next().await.map_err(Error::storage)? {
            hits.extend(batch_to_hits(&batch)?);
        }
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance).then_with(|| a.topic.id.cmp(&b.topic.id)));
        hits.truncate(limit);
        debug!(
            table = %self.table_name,
            domain = domain.unwrap_or("*"),
            hits = hits.len(),
            best = ?hits.first().map(|h| h.distance),
            "vector search"
        );
        Ok(hits)
    }
}
