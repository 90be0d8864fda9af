use arrow_schema::{DataType, Field, Fields, Schema};
use std::sync::Arc;

pub const DEFAULT_EMBEDDING_DIM: usize = 1024;

pub fn resource_fields() -> Fields {
	Fields::from(vec![
		Field::new("title", DataType::Utf8, true),
		Field::new("type", DataType::Utf8, true),
		Field::new("url", DataType::Utf8, true),
	])
}

/// Arrow schema of the topics table for vectors of dimension `dim`.
pub fn build_topic_schema(dim: usize) -> Arc<Schema> {
	Arc::new(Schema::new(vec![
		Field::new("id", DataType::Utf8, false),
		Field::new("topic", DataType::Utf8, false),
		Field::new("domain", DataType::Utf8, false),
		Field::new("subdomain", DataType::Utf8, false),
		Field::new("difficulty", DataType::Utf8, false),
		Field::new("estimated_hours", DataType::Int32, false),
		Field::new("description", DataType::Utf8, false),
		Field::new("prerequisites", DataType::List(Arc::new(Field::new("item", DataType::Utf8, true))), true),
		Field::new(
			"resources",
			DataType::List(Arc::new(Field::new("item", DataType::Struct(resource_fields()), true))),
			true,
		),
		Field::new("vector", DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim as i32), true),
	]))
}

/// Checks that `actual` carries every expected column with a compatible type.
/// List item names and nullability are ignored; struct member names and
/// fixed-size list lengths are not.
pub fn check_compatible(expected: &Schema, actual: &Schema) -> Result<(), String> {
	for field in expected.fields() {
		let found = actual
			.field_with_name(field.name())
			.map_err(|_| format!("column '{}' is missing", field.name()))?;
		if !types_compatible(field.data_type(), found.data_type()) {
			return Err(format!(
				"column '{}' has type {}, expected {}",
				field.name(),
				found.data_type(),
				field.data_type()
			));
		}
	}
	Ok(())
}

fn types_compatible(expected: &DataType, actual: &DataType) -> bool {
	match (expected, actual) {
		(DataType::List(e), DataType::List(a)) => types_compatible(e.data_type(), a.data_type()),
		(DataType::FixedSizeList(e, en), DataType::FixedSizeList(a, an)) => en == an && types_compatible(e.data_type(), a.data_type()),
		(DataType::Struct(e), DataType::Struct(a)) => {
			e.len() == a.len()
				&& e.iter().zip(a.iter()).all(|(ef, af)| ef.name() == af.name() && types_compatible(ef.data_type(), af.data_type()))
		}
		(DataType::Utf8 | DataType::LargeUtf8, DataType::Utf8 | DataType::LargeUtf8) => true,
		(e, a) => e == a,
	}
}
