use arrow_array::builder::{ListBuilder, StringBuilder, StructBuilder};
use arrow_array::{ArrayRef, FixedSizeListArray, Int32Array, RecordBatch, StringArray};
use std::sync::Arc;

use roadmap_core::types::TopicRecord;
use roadmap_core::{Error, Result};

use crate::schema::{build_topic_schema, resource_fields};

/// One record batch holding `records` in order. Records must already be validated.
pub fn records_to_batch(records: &[TopicRecord], dim: usize) -> Result<RecordBatch> {
	let schema = build_topic_schema(dim);
	let mut ids = Vec::with_capacity(records.len());
	let mut topics = Vec::with_capacity(records.len());
	let mut domains = Vec::with_capacity(records.len());
	let mut subdomains = Vec::with_capacity(records.len());
	let mut difficulties = Vec::with_capacity(records.len());
	let mut hours = Vec::with_capacity(records.len());
	let mut descriptions = Vec::with_capacity(records.len());
	let mut vectors: Vec<Option<Vec<Option<f32>>>> = Vec::with_capacity(records.len());
	let mut prerequisites = ListBuilder::new(StringBuilder::new());
	let mut resources = ListBuilder::new(StructBuilder::from_fields(resource_fields(), 0));

	for r in records {
		ids.push(r.id.as_str());
		topics.push(r.topic.as_str());
		domains.push(r.domain.as_str());
		subdomains.push(r.subdomain.as_str());
		difficulties.push(r.difficulty.as_str());
		hours.push(i32::try_from(r.estimated_hours).map_err(|_| {
			Error::Validation(format!("topic '{}' estimated_hours does not fit Int32", r.id))
		})?);
		descriptions.push(r.description.as_str());
		vectors.push(Some(r.vector.iter().map(|&x| Some(x)).collect()));

		for p in &r.prerequisites {
			prerequisites.values().append_value(p);
		}
		prerequisites.append(true);

		let entries = resources.values();
		for res in &r.resources {
			for (idx, value) in [&res.title, &res.kind, &res.url].into_iter().enumerate() {
				entries
					.field_builder::<StringBuilder>(idx)
					.ok_or_else(|| Error::Storage("resource struct builder has no string field".into()))?
					.append_value(value);
			}
			entries.append(true);
		}
		resources.append(true);
	}

	let columns: Vec<ArrayRef> = vec![
		Arc::new(StringArray::from(ids)),
		Arc::new(StringArray::from(topics)),
		Arc::new(StringArray::from(domains)),
		Arc::new(StringArray::from(subdomains)),
		Arc::new(StringArray::from(difficulties)),
		Arc::new(Int32Array::from(hours)),
		Arc::new(StringArray::from(descriptions)),
		Arc::new(prerequisites.finish()),
		Arc::new(resources.finish()),
		Arc::new(FixedSizeListArray::from_iter_primitive::<arrow_array::types::Float32Type, _, _>(vectors.into_iter(), dim as i32)),
	];
	RecordBatch::try_new(schema, columns).map_err(Error::storage)
}
