//! Data provisioning
//!
//! Loads a question/answer CSV and seeds the structured table and the vector
//! index. Runs offline, never concurrently with serving.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::embedding::Embedder;
use crate::storage::{Candidate, FaqRow, SimilarityIndex, SqliteStore, VectorRow};
use crate::{Error, Result};

pub const DEFAULT_BATCH_SIZE: usize = 32;

const REQUIRED_COLUMNS: [&str; 2] = ["question", "answer"];

/// Parsed dataset plus the number of rows dropped for missing fields
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub rows: Vec<FaqRow>,
    pub skipped: usize,
}

#[derive(Debug, Deserialize)]
struct CsvRecord {
    question: Option<String>,
    answer: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

pub fn load_csv(path: &Path) -> Result<Dataset> {
    if !path.exists() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("CSV file not found: {}", path.display()),
        )));
    }
    let file = std::fs::File::open(path)?;
    read_csv(file)
}

pub fn read_csv<R: Read>(reader: R) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let headers = reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(Error::Config(format!("Required column '{}' not found in CSV", column)));
        }
    }

    let mut dataset = Dataset::default();
    for record in reader.deserialize::<CsvRecord>() {
        let record = record?;
        match (non_empty(record.question), non_empty(record.answer)) {
            (Some(question), Some(answer)) => dataset.rows.push(FaqRow {
                question,
                answer,
                category: non_empty(record.category),
            }),
            _ => dataset.skipped += 1,
        }
    }

    tracing::info!("Loaded {} FAQs from CSV ({} skipped)", dataset.rows.len(), dataset.skipped);
    Ok(dataset)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Which tables to seed and how
#[derive(Debug, Clone)]
pub struct SeedOptions {
    pub sql: bool,
    pub vectors: bool,
    /// Clear the targeted tables first
    pub reset: bool,
    pub batch_size: usize,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            sql: true,
            vectors: true,
            reset: false,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeedReport {
    pub faqs: usize,
    pub vectors: usize,
    pub skipped: usize,
}

/// Seed the store from a dataset.
///
/// `progress` is called with (embedded so far, total) after each batch.
pub fn seed(
    store: &SqliteStore,
    embedder: &dyn Embedder,
    dataset: &Dataset,
    options: &SeedOptions,
    progress: &mut dyn FnMut(usize, usize),
) -> Result<SeedReport> {
    if options.batch_size == 0 {
        return Err(Error::Config("batch size must be non-zero".to_string()));
    }

    let mut report = SeedReport {
        skipped: dataset.skipped,
        ..SeedReport::default()
    };

    if options.sql {
        if options.reset {
            tracing::info!("Clearing existing FAQ rows");
            store.clear_faqs()?;
        }
        report.faqs = store.insert_faqs(&dataset.rows)?;
        tracing::info!("{} records inserted into 'faqs'", report.faqs);
    }

    if options.vectors {
        if options.reset {
            tracing::info!("Clearing existing vectors");
            store.clear_vectors()?;
        }

        let total = dataset.rows.len();
        for chunk in dataset.rows.chunks(options.batch_size) {
            let questions: Vec<String> = chunk.iter().map(|r| r.question.clone()).collect();
            let vectors = embedder.embed_batch(&questions)?;
            if vectors.len() != chunk.len() {
                return Err(Error::Embedding(format!(
                    "expected {} embeddings, got {}",
                    chunk.len(),
                    vectors.len()
                )));
            }

            let rows: Vec<VectorRow> = chunk
                .iter()
                .zip(vectors)
                .map(|(faq, vector)| VectorRow {
                    question: faq.question.clone(),
                    answer: faq.answer.clone(),
                    vector,
                })
                .collect();

            report.vectors += store.insert_vectors(&rows)?;
            progress(report.vectors, total);
        }
        tracing::info!("{} vectors stored", report.vectors);
    }

    Ok(report)
}

/// Run one test query against the index and log the best match
pub fn verify(
    index: &dyn SimilarityIndex,
    embedder: &dyn Embedder,
    sample_question: &str,
) -> Result<Option<Candidate>> {
    let vector = embedder.embed(sample_question)?;
    let best = index.nearest(&vector)?;
    match &best {
        Some(c) => tracing::info!(
            "Verification: '{}' -> '{}' (score {:.3})",
            sample_question,
            c.question,
            c.score
        ),
        None => tracing::warn!("No matches found in verification query"),
    }
    Ok(best)
}
