//! # Database Schema Module
//!
//! This module defines and manages the schema for the vector index: a single
//! `blocks` table holding content blocks with their embeddings, plus a
//! one-row `index_meta` table tracking the committed generation.
//!
//! Every refresh claims the next generation, writes its rows, and purges
//! superseded rows inside one transaction, so readers never observe a
//! partially rebuilt or mixed index and at most one generation exists
//! outside an open transaction.

use crate::index::error::DbError;
use libsql::{params, Connection};
use tracing::warn;

/// Initialize the database schema
pub async fn initialize_schema(conn: &Connection, dimensions: usize) -> Result<(), DbError> {
    conn.execute(
        &format!(
            "CREATE TABLE IF NOT EXISTS blocks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                url TEXT NOT NULL,
                text TEXT NOT NULL,
                html TEXT NOT NULL,
                generation INTEGER NOT NULL,
                embedding F32_BLOB({dimensions}) NOT NULL
            )"
        ),
        params![],
    )
    .await
    .map_err(|e| DbError::Schema(format!("Failed to create blocks table: {}", e)))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS index_meta (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            current_generation INTEGER NOT NULL
        )",
        params![],
    )
    .await
    .map_err(|e| DbError::Schema(format!("Failed to create index_meta table: {}", e)))?;

    conn.execute(
        "INSERT OR IGNORE INTO index_meta (id, current_generation) VALUES (1, 0)",
        params![],
    )
    .await
    .map_err(|e| DbError::Schema(format!("Failed to seed index_meta: {}", e)))?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_blocks_generation ON blocks(generation)",
        params![],
    )
    .await
    .map_err(|e| DbError::Schema(format!("Failed to create generation index: {}", e)))?;

    // Create vector index for embeddings
    // This might fail if the vector extension is not available, but we'll continue anyway
    let vector_index_result = conn
        .execute(
            "CREATE INDEX IF NOT EXISTS blocks_idx ON blocks (libsql_vector_idx(embedding))",
            params![],
        )
        .await;

    if let Err(e) = vector_index_result {
        warn!(
            "Failed to create vector index: {}. Vector search will not be available.",
            e
        );
    }

    Ok(())
}
