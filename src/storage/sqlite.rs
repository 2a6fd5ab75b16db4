//! SQLite storage implementation

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;

use super::{Candidate, FaqStore, SimilarityIndex, cosine_similarity, normalize_question, schema};
use crate::{Error, Result};

/// SQLite-backed storage for the FAQ tables and the vector index.
///
/// The connection sits behind a mutex so one store can be shared across
/// request threads.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open a database file with a busy timeout applied to every statement
    pub fn open_with_timeout(path: &Path, timeout: Duration) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(timeout)?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        let conn = self.conn()?;
        for stmt in schema::all_schema_statements() {
            conn.execute(stmt, [])?;
        }
        Ok(())
    }

    /// A panic while the lock was held leaves the connection itself intact,
    /// so a poisoned lock is taken over rather than reported.
    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        Ok(self.conn.lock().unwrap_or_else(PoisonError::into_inner))
    }

    // ========== FAQ Operations ==========

    /// Insert a FAQ row, returning its id
    pub fn insert_faq(&self, row: &FaqRow) -> Result<i64> {
        let conn = self.conn()?;
        Self::insert_faq_on(&conn, row)?;
        Ok(conn.last_insert_rowid())
    }

    /// Insert a batch of FAQ rows in one transaction
    pub fn insert_faqs(&self, rows: &[FaqRow]) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        for row in rows {
            Self::insert_faq_on(&tx, row)?;
        }
        tx.commit()?;
        Ok(rows.len())
    }

    fn insert_faq_on(conn: &Connection, row: &FaqRow) -> Result<()> {
        conn.execute(
            "INSERT INTO faqs (question, answer, category, normalized) VALUES (?1, ?2, ?3, ?4)",
            params![
                row.question,
                row.answer,
                row.category,
                normalize_question(&row.question),
            ],
        )?;
        Ok(())
    }

    /// Find the answer for a normalized question. Lowest id wins on duplicates.
    pub fn lookup_answer(&self, normalized_question: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT answer FROM faqs WHERE normalized = ?1 ORDER BY id LIMIT 1",
            [normalized_question],
            |row| row.get(0),
        )
        .optional()
        .map_err(Into::into)
    }

    /// Count all FAQ rows
    pub fn count_faqs(&self) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM faqs", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    // ========== Vector Operations ==========

    /// Insert a batch of vectors in one transaction.
    ///
    /// Every vector must share the dimensionality already recorded for the
    /// index; the first batch into an empty index records it.
    pub fn insert_vectors(&self, rows: &[VectorRow]) -> Result<usize> {
        let Some(first) = rows.first() else {
            return Ok(0);
        };
        let dims = first.vector.len();

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        match Self::dimensions_on(&tx)? {
            Some(expected) if expected != dims => {
                return Err(Error::DimensionMismatch {
                    expected,
                    actual: dims,
                });
            }
            Some(_) => {}
            None => {
                tx.execute(
                    "INSERT OR REPLACE INTO meta (key, value) VALUES (?1, ?2)",
                    params![schema::META_VECTOR_DIMENSIONS, dims.to_string()],
                )?;
            }
        }

        for row in rows {
            if row.vector.len() != dims {
                return Err(Error::DimensionMismatch {
                    expected: dims,
                    actual: row.vector.len(),
                });
            }
            tx.execute(
                "INSERT INTO faq_vectors (question, answer, vector) VALUES (?1, ?2, ?3)",
                params![row.question, row.answer, encode_vector(&row.vector)],
            )?;
        }

        tx.commit()?;
        Ok(rows.len())
    }

    /// Dimensionality recorded for the index, if any vectors were stored
    pub fn index_dimensions(&self) -> Result<Option<usize>> {
        let conn = self.conn()?;
        Self::dimensions_on(&conn)
    }

    fn dimensions_on(conn: &Connection) -> Result<Option<usize>> {
        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM meta WHERE key = ?1",
                [schema::META_VECTOR_DIMENSIONS],
                |row| row.get(0),
            )
            .optional()?;

        match value {
            Some(v) => v
                .parse()
                .map(Some)
                .map_err(|_| Error::IndexAccess(format!("corrupt dimension metadata: {}", v))),
            None => Ok(None),
        }
    }

    /// Count stored vectors
    pub fn count_vectors(&self) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM faq_vectors", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Check that vectors of `dims` length can be stored in or compared
    /// against the index. An empty index accepts any length.
    pub fn check_dimensions(&self, dims: usize) -> Result<()> {
        match self.index_dimensions()? {
            Some(expected) if expected != dims => Err(Error::DimensionMismatch {
                expected,
                actual: dims,
            }),
            _ => Ok(()),
        }
    }

    /// Brute-force top-1 search over every stored vector.
    ///
    /// Rows are read under the connection lock; scoring runs after it is
    /// released so concurrent searches only serialize on the read.
    pub fn nearest_vector(&self, query_vector: &[f32]) -> Result<Option<Candidate>> {
        let rows = {
            let conn = self.conn()?;

            if let Some(expected) = Self::dimensions_on(&conn)? {
                if expected != query_vector.len() {
                    return Err(Error::DimensionMismatch {
                        expected,
                        actual: query_vector.len(),
                    });
                }
            }

            let mut stmt =
                conn.prepare("SELECT question, answer, vector FROM faq_vectors ORDER BY id")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Vec<u8>>(2)?,
                    ))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        };

        let mut best: Option<Candidate> = None;
        for (question, answer, blob) in rows {
            let vector = decode_vector(&blob)?;
            if vector.len() != query_vector.len() {
                return Err(Error::DimensionMismatch {
                    expected: vector.len(),
                    actual: query_vector.len(),
                });
            }

            let score = cosine_similarity(query_vector, &vector);
            // Strictly greater keeps the earliest row on ties.
            if best.as_ref().is_none_or(|b| score > b.score) {
                best = Some(Candidate {
                    score,
                    question,
                    answer,
                });
            }
        }

        Ok(best)
    }

    // ========== Bulk Operations ==========

    /// Delete all structured FAQ rows
    pub fn clear_faqs(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM faqs", [])?;
        Ok(())
    }

    /// Delete all vectors and forget the index dimensionality
    pub fn clear_vectors(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM faq_vectors", [])?;
        conn.execute(
            "DELETE FROM meta WHERE key = ?1",
            [schema::META_VECTOR_DIMENSIONS],
        )?;
        Ok(())
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            faqs: self.count_faqs()?,
            vectors: self.count_vectors()?,
            dimensions: self.index_dimensions()?,
        })
    }
}

impl FaqStore for SqliteStore {
    fn lookup(&self, normalized_question: &str) -> Result<Option<String>> {
        self.lookup_answer(normalized_question)
    }
}

impl SimilarityIndex for SqliteStore {
    fn nearest(&self, vector: &[f32]) -> Result<Option<Candidate>> {
        self.nearest_vector(vector)
    }
}

fn encode_vector(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn decode_vector(blob: &[u8]) -> Result<Vec<f32>> {
    if blob.len() % 4 != 0 {
        return Err(Error::IndexAccess(format!(
            "vector blob length {} is not a multiple of 4",
            blob.len()
        )));
    }
    Ok(blob
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// A structured FAQ row (id and normalized key are assigned on insert)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaqRow {
    pub question: String,
    pub answer: String,
    pub category: Option<String>,
}

impl FaqRow {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            category: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// An embedded question/answer pair for the similarity index
#[derive(Debug, Clone)]
pub struct VectorRow {
    pub question: String,
    pub answer: String,
    pub vector: Vec<f32>,
}

/// Database statistics
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub faqs: usize,
    pub vectors: usize,
    pub dimensions: Option<usize>,
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  FAQs: {}", self.faqs)?;
        writeln!(f, "  Vectors: {}", self.vectors)?;
        match self.dimensions {
            Some(d) => writeln!(f, "  Dimensions: {}", d),
            None => writeln!(f, "  Dimensions: -"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector_row(question: &str, vector: Vec<f32>) -> VectorRow {
        VectorRow {
            question: question.to_string(),
            answer: format!("answer to {}", question),
            vector,
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .insert_faq(&FaqRow::new(
                "What is the currency in Dubai?",
                "The UAE Dirham (AED).",
            ))
            .unwrap();

        let hit = store
            .lookup(&normalize_question("  WHAT IS THE CURRENCY IN DUBAI? "))
            .unwrap();
        assert_eq!(hit.as_deref(), Some("The UAE Dirham (AED)."));

        let miss = store.lookup("currency used in dubai").unwrap();
        assert!(miss.is_none());
    }

    #[test]
    fn test_first_row_wins_on_duplicates() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .insert_faqs(&[
                FaqRow::new("Is Dubai safe?", "Yes, very safe."),
                FaqRow::new("is dubai safe?", "Second answer."),
            ])
            .unwrap();

        let hit = store.lookup("is dubai safe?").unwrap();
        assert_eq!(hit.as_deref(), Some("Yes, very safe."));
        assert_eq!(store.count_faqs().unwrap(), 2);
    }

    #[test]
    fn test_nearest_returns_best_candidate() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .insert_vectors(&[
                vector_row("What is the Dubai Metro?", vec![1.0, 0.0, 0.0]),
                vector_row("What is the Dubai Frame?", vec![0.0, 1.0, 0.0]),
            ])
            .unwrap();

        let best = store.nearest(&[0.1, 0.9, 0.0]).unwrap().unwrap();
        assert_eq!(best.question, "What is the Dubai Frame?");
        assert!(best.score > 0.9 && best.score <= 1.0);
    }

    #[test]
    fn test_nearest_on_empty_index() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.nearest(&[1.0, 0.0]).unwrap().is_none());
        assert_eq!(store.index_dimensions().unwrap(), None);
    }

    #[test]
    fn test_dimension_mismatch_is_rejected() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .insert_vectors(&[vector_row("q1", vec![1.0, 0.0, 0.0])])
            .unwrap();
        assert_eq!(store.index_dimensions().unwrap(), Some(3));

        let err = store
            .insert_vectors(&[vector_row("q2", vec![1.0, 0.0])])
            .unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { expected: 3, actual: 2 }));

        let err = store.nearest(&[1.0, 0.0]).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { .. }));
    }

    #[test]
    fn test_clear_vectors_resets_dimensions() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .insert_vectors(&[vector_row("q1", vec![1.0, 0.0, 0.0])])
            .unwrap();
        store.clear_vectors().unwrap();

        assert_eq!(store.count_vectors().unwrap(), 0);
        store
            .insert_vectors(&[vector_row("q1", vec![1.0, 0.0])])
            .unwrap();
        assert_eq!(store.index_dimensions().unwrap(), Some(2));
    }

    #[test]
    fn test_check_dimensions() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.check_dimensions(64).unwrap();

        store
            .insert_vectors(&[vector_row("q1", vec![0.0; 256])])
            .unwrap();
        store.check_dimensions(256).unwrap();
        let err = store.check_dimensions(64).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { expected: 256, actual: 64 }));
    }

    #[test]
    fn test_nearest_ties_keep_earliest_row() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .insert_vectors(&[
                vector_row("first", vec![1.0, 0.0]),
                vector_row("second", vec![1.0, 0.0]),
            ])
            .unwrap();

        let best = store.nearest(&[1.0, 0.0]).unwrap().unwrap();
        assert_eq!(best.question, "first");
    }

    #[test]
    fn test_poisoned_lock_is_recovered() {
        let store = std::sync::Arc::new(SqliteStore::open_in_memory().unwrap());
        store
            .insert_faq(&FaqRow::new("Is Dubai safe?", "Yes, very safe."))
            .unwrap();

        let poisoner = std::sync::Arc::clone(&store);
        let joined = std::thread::spawn(move || {
            let _guard = poisoner.conn.lock().unwrap();
            panic!("panic while holding the connection");
        })
        .join();
        assert!(joined.is_err());
        assert!(store.conn.is_poisoned());

        let hit = store.lookup("is dubai safe?").unwrap();
        assert_eq!(hit.as_deref(), Some("Yes, very safe."));
        store.insert_faq(&FaqRow::new("q", "a")).unwrap();
        assert_eq!(store.count_faqs().unwrap(), 2);
    }

    #[test]
    fn test_stats() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.insert_faq(&FaqRow::new("q", "a")).unwrap();
        store
            .insert_vectors(&[vector_row("q", vec![0.5, 0.5])])
            .unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.faqs, 1);
        assert_eq!(stats.vectors, 1);
        assert_eq!(stats.dimensions, Some(2));
        assert!(stats.to_string().contains("Vectors: 1"));
    }
}
