//! LanceDB connection and table housekeeping.
use lancedb::{connect, Connection, Table};
use arrow_array::RecordBatchIterator;
use std::sync::Arc;
use tracing::info;

use roadmap_core::{Error, Result};

use crate::schema::check_compatible;

pub async fn open_db(uri: &str) -> Result<Connection> {
    connect(uri).execute().await.map_err(|e| Error::Storage(format!("cannot open LanceDB at {uri}: {e}")))
}

pub async fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let names = conn.table_names().execute().await.map_err(Error::storage)?;
    Ok(names.iter().any(|n| n == name))
}

/// Opens `name`, or `None` when the table has not been created yet.
pub async fn open_table(conn: &Connection, name: &str) -> Result<Option<Table>> {
    if !table_exists(conn, name).await? {
        return Ok(None);
    }
    let table = conn.open_table(name).execute().await.map_err(Error::storage)?;
    Ok(Some(table))
}

/// Creates an empty table with `schema` if absent; otherwise verifies the
/// existing schema without touching it.
pub async fn ensure_table(conn: &Connection, name: &str, schema: Arc<arrow_schema::Schema>) -> Result<Table> {
    if let Some(table) = open_table(conn, name).await? {
        let actual = table.schema().await.map_err(Error::storage)?;
        check_compatible(&schema, &actual).map_err(|msg| Error::Schema(format!("table '{name}': {msg}")))?;
        return Ok(table);
    }
    // create empty table with 0 rows
    let iter = RecordBatchIterator::new(vec![].into_iter(), schema.clone());
    let table = conn.create_table(name, Box::new(iter)).execute().await.map_err(Error::storage)?;
    info!(table = name, "created table");
    Ok(table)
}
