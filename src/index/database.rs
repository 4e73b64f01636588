//! Database operations for the index module

use crate::index::error::DbError;
use crate::index::schema;
use crate::index::{NewEntry, StoredEntry};
use libsql::{params, Connection};
use rig::embeddings::Embedding;
use tracing::{debug, instrument};

/// Database manager for the vector index
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Create a new database manager over an existing connection
    #[instrument(skip(conn))]
    pub async fn new(conn: Connection, dimensions: usize) -> Result<Self, DbError> {
        schema::initialize_schema(&conn, dimensions).await?;

        Ok(Self { conn })
    }

    /// Create a new database manager from a path
    pub async fn new_from_path(path: &str, dimensions: usize) -> Result<Self, DbError> {
        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DbError::Connection(format!("Failed to open database: {}", e)))?;

        let conn = db
            .connect()
            .map_err(|e| DbError::Connection(format!("Failed to connect to database: {}", e)))?;

        Self::new(conn, dimensions).await
    }

    /// The committed generation queries should read from
    pub async fn current_generation(&self) -> Result<i64, DbError> {
        let mut rows = self
            .conn
            .query(
                "SELECT current_generation FROM index_meta WHERE id = 1",
                params![],
            )
            .await
            .map_err(|e| DbError::Query(format!("Failed to read generation: {}", e)))?;

        match rows.next().await {
            Ok(Some(row)) => row
                .get(0)
                .map_err(|e| DbError::Data(format!("Failed to read generation: {}", e))),
            Ok(None) => Err(DbError::Data("index_meta row is missing".to_string())),
            Err(e) => Err(DbError::Data(format!("Failed to read generation: {}", e))),
        }
    }

    /// Number of entries in the committed generation
    pub async fn entry_count(&self) -> Result<i64, DbError> {
        let generation = self.current_generation().await?;
        let mut rows = self
            .conn
            .query(
                "SELECT COUNT(*) FROM blocks WHERE generation = ?",
                params![generation],
            )
            .await
            .map_err(|e| DbError::Query(format!("Failed to count blocks: {}", e)))?;

        match rows.next().await {
            Ok(Some(row)) => row
                .get(0)
                .map_err(|e| DbError::Data(format!("Failed to read count: {}", e))),
            Ok(None) => Err(DbError::Data("COUNT returned no row".to_string())),
            Err(e) => Err(DbError::Data(format!("Failed to read count: {}", e))),
        }
    }

    /// Replace the index contents with `entries`.
    ///
    /// One transaction increments `index_meta.current_generation`, inserts
    /// the new rows under the incremented value, and purges every superseded
    /// row. The increment is the transaction's first statement, so the write
    /// lock serializes racing refreshes and no two of them can claim the
    /// same generation. Outside an open transaction exactly one generation
    /// exists, and a query racing a refresh reads either the old generation
    /// or the new one in full, never a mix.
    #[instrument(skip(self, entries), fields(count = entries.len()))]
    pub async fn replace_all(&self, entries: &[NewEntry]) -> Result<i64, DbError> {
        let tx = self
            .conn
            .transaction()
            .await
            .map_err(|e| DbError::Transaction(format!("Failed to start transaction: {}", e)))?;

        tx.execute(
            "UPDATE index_meta SET current_generation = current_generation + 1 WHERE id = 1",
            params![],
        )
        .await
        .map_err(|e| DbError::Query(format!("Failed to claim generation: {}", e)))?;

        let mut rows = tx
            .query(
                "SELECT current_generation FROM index_meta WHERE id = 1",
                params![],
            )
            .await
            .map_err(|e| DbError::Query(format!("Failed to read claimed generation: {}", e)))?;
        let generation: i64 = match rows.next().await {
            Ok(Some(row)) => row
                .get(0)
                .map_err(|e| DbError::Data(format!("Failed to read claimed generation: {}", e)))?,
            Ok(None) => return Err(DbError::Data("index_meta row is missing".to_string())),
            Err(e) => {
                return Err(DbError::Data(format!(
                    "Failed to read claimed generation: {}",
                    e
                )))
            }
        };

        for entry in entries {
            tx.execute(
                "INSERT INTO blocks (url, text, html, generation, embedding)
                 VALUES (?, ?, ?, ?, ?)",
                params![
                    entry.block.source_url.clone(),
                    entry.block.text.clone(),
                    entry.block.html.clone(),
                    generation,
                    libsql::Value::Blob(embedding_blob(&entry.embedding)),
                ],
            )
            .await
            .map_err(|e| DbError::Query(format!("Failed to insert block: {}", e)))?;
        }

        let purged = tx
            .execute(
                "DELETE FROM blocks WHERE generation < ?",
                params![generation],
            )
            .await
            .map_err(|e| DbError::Query(format!("Failed to purge stale blocks: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| DbError::Transaction(format!("Failed to commit transaction: {}", e)))?;

        debug!(
            "Committed generation {} ({} entries, {} stale rows purged)",
            generation,
            entries.len(),
            purged
        );
        Ok(generation)
    }

    /// Nearest-neighbor lookup against the committed generation.
    ///
    /// Results come back nearest first, each with the cosine distance the
    /// store reported for it (when available).
    #[instrument(skip(self, query_embedding))]
    pub async fn nearest(
        &self,
        query_embedding: &Embedding,
        limit: usize,
    ) -> Result<Vec<StoredEntry>, DbError> {
        let generation = self.current_generation().await?;
        let blob = embedding_blob(query_embedding);

        let mut rows = self
            .conn
            .query(
                "SELECT b.text, b.html, b.url,
                        vector_distance_cos(b.embedding, ?) AS distance
                 FROM vector_top_k('blocks_idx', ?, ?) AS v
                 JOIN blocks b ON b.rowid = v.id
                 WHERE b.generation = ?",
                params![
                    libsql::Value::Blob(blob.clone()),
                    libsql::Value::Blob(blob),
                    limit as i64,
                    generation,
                ],
            )
            .await
            .map_err(|e| DbError::Query(format!("Failed to run vector search: {}", e)))?;

        let mut entries = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            entries.push(StoredEntry {
                text: row
                    .get(0)
                    .map_err(|e| DbError::Data(format!("Failed to get text: {}", e)))?,
                html: row
                    .get(1)
                    .map_err(|e| DbError::Data(format!("Failed to get html: {}", e)))?,
                source_url: row
                    .get(2)
                    .map_err(|e| DbError::Data(format!("Failed to get url: {}", e)))?,
                distance: row.get::<f64>(3).ok(),
            });
        }

        Ok(entries)
    }
}

/// Serialize an embedding into the little-endian f32 blob libsql expects.
fn embedding_blob(embedding: &Embedding) -> Vec<u8> {
    embedding
        .vec
        .iter()
        .flat_map(|f| (*f as f32).to_le_bytes())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::ContentBlock;

    fn entry(text: &str, url: &str, vec: Vec<f64>) -> NewEntry {
        NewEntry {
            block: ContentBlock {
                text: text.to_string(),
                html: format!("<div class=\"et_pb_text_inner\">\n  {}\n</div>", text),
                source_url: url.to_string(),
            },
            embedding: Embedding {
                document: text.to_string(),
                vec,
            },
        }
    }

    async fn test_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.db");
        let db = Database::new_from_path(path.to_str().unwrap(), 3)
            .await
            .unwrap();
        (dir, db)
    }

    #[tokio::test]
    async fn replace_all_advances_the_generation() {
        let (_dir, db) = test_db().await;
        assert_eq!(db.current_generation().await.unwrap(), 0);

        let first = db
            .replace_all(&[entry("a", "https://example.com/a", vec![1.0, 0.0, 0.0])])
            .await
            .unwrap();
        assert_eq!(first, 1);

        let second = db
            .replace_all(&[entry("b", "https://example.com/b", vec![0.0, 1.0, 0.0])])
            .await
            .unwrap();
        assert_eq!(second, 2);
        assert_eq!(db.current_generation().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn refresh_fully_replaces_previous_contents() {
        let (_dir, db) = test_db().await;

        db.replace_all(&[
            entry("old one", "https://example.com/1", vec![1.0, 0.0, 0.0]),
            entry("old two", "https://example.com/2", vec![0.0, 1.0, 0.0]),
        ])
        .await
        .unwrap();

        db.replace_all(&[entry("new", "https://example.com/3", vec![0.0, 0.0, 1.0])])
            .await
            .unwrap();

        assert_eq!(db.entry_count().await.unwrap(), 1);

        let query = Embedding {
            document: String::new(),
            vec: vec![1.0, 0.0, 0.0],
        };
        let hits = db.nearest(&query, 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "new");
    }

    #[tokio::test]
    async fn nearest_orders_by_distance() {
        let (_dir, db) = test_db().await;

        db.replace_all(&[
            entry("far", "https://example.com/far", vec![0.0, 1.0, 0.0]),
            entry("close", "https://example.com/close", vec![1.0, 0.0, 0.0]),
        ])
        .await
        .unwrap();

        let query = Embedding {
            document: String::new(),
            vec: vec![1.0, 0.0, 0.0],
        };
        let hits = db.nearest(&query, 10).await.unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].text, "close");
        let distance = hits[0].distance.expect("distance reported");
        assert!(distance.abs() < 1e-6);
    }

    #[tokio::test]
    async fn racing_refreshes_claim_distinct_generations_and_never_commingle() {
        let (_dir, db) = test_db().await;

        let first = vec![
            entry("crawl one a", "https://example.com/1a", vec![1.0, 0.0, 0.0]),
            entry("crawl one b", "https://example.com/1b", vec![0.0, 1.0, 0.0]),
        ];
        let second = vec![
            entry("crawl two a", "https://example.com/2a", vec![0.0, 0.0, 1.0]),
            entry("crawl two b", "https://example.com/2b", vec![0.7, 0.7, 0.0]),
            entry("crawl two c", "https://example.com/2c", vec![0.7, 0.0, 0.7]),
        ];

        let barrier = std::sync::Arc::new(tokio::sync::Barrier::new(2));
        let db_a = db.clone();
        let db_b = db.clone();
        let entries_a = first.clone();
        let entries_b = second.clone();
        let barrier_a = barrier.clone();
        let barrier_b = barrier.clone();

        let (gen_a, gen_b) = tokio::join!(
            async move {
                barrier_a.wait().await;
                db_a.replace_all(&entries_a).await.unwrap()
            },
            async move {
                barrier_b.wait().await;
                db_b.replace_all(&entries_b).await.unwrap()
            }
        );

        assert_ne!(gen_a, gen_b);
        assert_eq!(gen_a.max(gen_b), 2);
        assert_eq!(db.current_generation().await.unwrap(), 2);

        // Whichever refresh committed last won in full; the other left nothing.
        let count = db.entry_count().await.unwrap();
        let winner: Vec<&str> = if gen_a > gen_b {
            assert_eq!(count, first.len() as i64);
            first.iter().map(|e| e.block.text.as_str()).collect()
        } else {
            assert_eq!(count, second.len() as i64);
            second.iter().map(|e| e.block.text.as_str()).collect()
        };

        let query = Embedding {
            document: String::new(),
            vec: vec![1.0, 0.0, 0.0],
        };
        let hits = db.nearest(&query, 10).await.unwrap();
        assert_eq!(hits.len(), winner.len());
        for hit in &hits {
            assert!(winner.contains(&hit.text.as_str()), "stray hit {}", hit.text);
        }
    }

    #[tokio::test]
    async fn superseded_entries_never_crowd_out_current_hits() {
        let (_dir, db) = test_db().await;

        db.replace_all(&[
            entry("old a", "https://example.com/a", vec![1.0, 0.0, 0.0]),
            entry("old b", "https://example.com/b", vec![0.9, 0.1, 0.0]),
            entry("old c", "https://example.com/c", vec![0.9, 0.0, 0.1]),
            entry("old d", "https://example.com/d", vec![0.8, 0.2, 0.0]),
        ])
        .await
        .unwrap();

        // The replacement sits far from the query; the purged rows sat close.
        db.replace_all(&[entry("current", "https://example.com/new", vec![0.0, 1.0, 0.0])])
            .await
            .unwrap();

        let query = Embedding {
            document: String::new(),
            vec: vec![1.0, 0.0, 0.0],
        };
        let hits = db.nearest(&query, 3).await.unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "current");
    }

    #[tokio::test]
    async fn empty_index_returns_no_hits() {
        let (_dir, db) = test_db().await;

        let query = Embedding {
            document: String::new(),
            vec: vec![1.0, 0.0, 0.0],
        };
        let hits = db.nearest(&query, 10).await.unwrap();
        assert!(hits.is_empty());
    }
}
