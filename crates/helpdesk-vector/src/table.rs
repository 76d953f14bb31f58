//! LanceDB connection and housekeeping helpers.
//!
//! Provides database open, table existence and row counts, and clearing a
//! corpus table so it can be rebuilt without touching the other corpus.

use anyhow::Result;
use lancedb::{connect, Connection};

pub async fn open_db(uri: &str) -> Result<Connection> {
    Ok(connect(uri).execute().await?)
}

pub async fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let names = conn.table_names().execute().await?;
    Ok(names.iter().any(|n| n == name))
}

/// Rows in `name`, or `None` if the table does not exist.
pub async fn count_rows(conn: &Connection, name: &str) -> Result<Option<usize>> {
    if !table_exists(conn, name).await? {
        return Ok(None);
    }
    let t = conn.open_table(name).execute().await?;
    Ok(Some(t.count_rows(None).await?))
}

/// Delete every row of `name`; returns how many rows were removed.
pub async fn clear_table(conn: &Connection, name: &str) -> Result<usize> {
    let Some(rows) = count_rows(conn, name).await? else { return Ok(0) };
    if rows > 0 {
        let t = conn.open_table(name).execute().await?;
        t.delete("true").await?;
    }
    Ok(rows)
}
