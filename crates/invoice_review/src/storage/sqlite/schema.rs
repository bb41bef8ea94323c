//! SQLite schema definitions and embedded-only SQL statements.
//!
//! Statements here differ from the primary dialect beyond what translation
//! covers: ids and timestamps are generated client-side.

/// Bumped whenever `CREATE_TABLES` changes. Stored in `PRAGMA user_version`.
pub const SCHEMA_VERSION: i64 = 1;

/// SQL statement to create all tables. Safe to run repeatedly.
pub const CREATE_TABLES: &str = r#"
-- Submissions table
CREATE TABLE IF NOT EXISTS submissions (
    id TEXT PRIMARY KEY,
    image_url TEXT NOT NULL,
    extracted_data TEXT NOT NULL DEFAULT '{}',
    status TEXT NOT NULL DEFAULT 'pending_review',
    created_at TEXT NOT NULL
);

-- Approved line items
CREATE TABLE IF NOT EXISTS invoice_items (
    id TEXT PRIMARY KEY,
    submission_id TEXT NOT NULL,
    description TEXT,
    quantity INTEGER,
    amount REAL,
    confidence REAL,
    FOREIGN KEY (submission_id) REFERENCES submissions(id) ON DELETE CASCADE
);

-- Indexes for efficient queries
CREATE INDEX IF NOT EXISTS idx_submissions_status_created_at ON submissions(status, created_at);
CREATE INDEX IF NOT EXISTS idx_invoice_items_submission_id ON invoice_items(submission_id);
"#;

pub const INSERT_SUBMISSION: &str = r#"
INSERT INTO submissions (id, image_url, extracted_data, status, created_at)
VALUES (?1, ?2, ?3, ?4, ?5)
RETURNING id, image_url, extracted_data, status, created_at
"#;

pub const INSERT_ITEM: &str = r#"
INSERT INTO invoice_items (id, submission_id, description, quantity, amount, confidence)
VALUES (?1, ?2, ?3, ?4, ?5, ?6)
"#;

pub const SELECT_ITEMS_BY_SUBMISSION: &str = r#"
SELECT id, submission_id, description, quantity, amount, confidence
FROM invoice_items
WHERE submission_id = ?1
ORDER BY rowid ASC
"#;
