use arrow_array::{Array, Float32Array, Int32Array, ListArray, RecordBatch, StringArray, StructArray};

use roadmap_core::types::{Difficulty, Resource, SearchHit, TopicEntry};
use roadmap_core::{Error, Result};

fn column<'a, T: 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<T>())
        .ok_or_else(|| Error::Storage(format!("column '{name}' missing or of unexpected type")))
}

fn string_list(list: &ListArray, row: usize) -> Result<Vec<String>> {
    if list.is_null(row) {
        return Ok(Vec::new());
    }
    let values = list.value(row);
    let strings = values
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| Error::Storage("prerequisites items are not strings".into()))?;
    Ok((0..strings.len()).filter(|&i| strings.is_valid(i)).map(|i| strings.value(i).to_string()).collect())
}

fn resource_list(list: &ListArray, row: usize) -> Result<Vec<Resource>> {
    if list.is_null(row) {
        return Ok(Vec::new());
    }
    let values = list.value(row);
    let items = values
        .as_any()
        .downcast_ref::<StructArray>()
        .ok_or_else(|| Error::Storage("resources items are not structs".into()))?;
    let field = |name: &str| {
        items
            .column_by_name(name)
            .and_then(|c| c.as_any().downcast_ref::<StringArray>())
            .ok_or_else(|| Error::Storage(format!("resource field '{name}' missing")))
    };
    let (titles, kinds, urls) = (field("title")?, field("type")?, field("url")?);
    let text = |arr: &StringArray, i: usize| if arr.is_valid(i) { arr.value(i).to_string() } else { String::new() };
    Ok((0..items.len())
        .filter(|&i| items.is_valid(i))
        .map(|i| Resource { title: text(titles, i), kind: text(kinds, i), url: text(urls, i) })
        .collect())
}

/// Converts a search result batch into hits. Requires the `_distance` column.
pub fn batch_to_hits(batch: &RecordBatch) -> Result<Vec<SearchHit>> {
    let ids = column::<StringArray>(batch, "id")?;
    let topics = column::<StringArray>(batch, "topic")?;
    let domains = column::<StringArray>(batch, "domain")?;
    let subdomains = column::<StringArray>(batch, "subdomain")?;
    let difficulties = column::<StringArray>(batch, "difficulty")?;
    let hours = column::<Int32Array>(batch, "estimated_hours")?;
    let descriptions = column::<StringArray>(batch, "description")?;
    let prerequisites = column::<ListArray>(batch, "prerequisites")?;
    let resources = column::<ListArray>(batch, "resources")?;
    let distances = column::<Float32Array>(batch, "_distance")?;

    let mut hits = Vec::with_capacity(batch.num_rows());
    for i in 0..batch.num_rows() {
        let difficulty = Difficulty::parse(difficulties.value(i))
            .map_err(|e| Error::Storage(format!("row '{}': {}", ids.value(i), e)))?;
        let topic = TopicEntry {
            id: ids.value(i).to_string(),
            topic: topics.value(i).to_string(),
            domain: domains.value(i).to_string(),
            subdomain: subdomains.value(i).to_string(),
            difficulty,
            estimated_hours: Some(hours.value(i).max(0) as u32),
            description: descriptions.value(i).to_string(),
            prerequisites: string_list(prerequisites, i)?,
            resources: resource_list(resources, i)?,
        };
        hits.push(SearchHit { topic, distance: distances.value(i).max(0.0) });
    }
    Ok(hits)
}

pub fn batch_ids(batch: &RecordBatch) -> Result<Vec<String>> {
    let ids = column::<StringArray>(batch, "id")?;
    Ok((0..ids.len()).map(|i| ids.value(i).to_string()).collect())
}
