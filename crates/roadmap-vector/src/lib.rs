//! LanceDB-backed topic index.
//!
//! One table holds every topic record with its embedding. The table is created
//! on first use and never altered afterwards; an incompatible existing table is
//! reported as a schema error instead of being migrated.

pub mod index;
pub mod reader;
pub mod schema;
pub mod table;
pub mod writer;

pub use index::{domain_predicate, LanceTopicIndex};
pub use schema::{build_topic_schema, DEFAULT_EMBEDDING_DIM};
