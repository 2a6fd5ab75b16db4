//! Database schema definitions

/// SQL to create the structured FAQ table.
///
/// `normalized` holds the trimmed, lowercased question and is the exact-match key.
pub const CREATE_FAQS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS faqs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    question TEXT NOT NULL,
    answer TEXT NOT NULL,
    category TEXT,
    normalized TEXT NOT NULL
)
"#;

/// SQL to create the vector table backing the similarity index
pub const CREATE_FAQ_VECTORS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS faq_vectors (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    question TEXT NOT NULL,
    answer TEXT NOT NULL,
    vector BLOB NOT NULL
)
"#;

/// Key/value metadata (index dimensionality)
pub const CREATE_META_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
"#;

/// Metadata key for the vector dimensionality
pub const META_VECTOR_DIMENSIONS: &str = "vector_dimensions";

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_faqs_normalized ON faqs(normalized)",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![CREATE_FAQS_TABLE, CREATE_FAQ_VECTORS_TABLE, CREATE_META_TABLE];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
