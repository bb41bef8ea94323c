//! PostgreSQL schema and primary-only statements.
//!
//! The database generates ids and timestamps here, so these statements have
//! no embedded counterpart beyond the ones in the SQLite `schema` module.

/// SQL script creating all tables. Safe to run repeatedly.
pub const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS submissions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    image_url TEXT NOT NULL,
    extracted_data JSONB NOT NULL DEFAULT '{}'::jsonb,
    status TEXT NOT NULL DEFAULT 'pending_review',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS invoice_items (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    submission_id UUID NOT NULL REFERENCES submissions(id) ON DELETE CASCADE,
    description TEXT,
    quantity INTEGER,
    amount DOUBLE PRECISION,
    confidence DOUBLE PRECISION,
    seq BIGSERIAL
);

ALTER TABLE invoice_items ADD COLUMN IF NOT EXISTS seq BIGSERIAL;

CREATE INDEX IF NOT EXISTS idx_submissions_status_created_at ON submissions(status, created_at);
CREATE INDEX IF NOT EXISTS idx_invoice_items_submission_id ON invoice_items(submission_id, seq);
"#;

pub const INSERT_SUBMISSION: &str = r#"
INSERT INTO submissions (image_url, extracted_data, status)
VALUES ($1, $2::jsonb, $3)
RETURNING id::text AS id, image_url, extracted_data, status, created_at
"#;

pub const INSERT_ITEM: &str = r#"
INSERT INTO invoice_items (submission_id, description, quantity, amount, confidence)
VALUES ($1::uuid, $2, $3, $4, $5)
"#;

// Column casts pin the wire types regardless of how older deployments
// declared quantity, amount and confidence.
pub const SELECT_ITEMS_BY_SUBMISSION: &str = r#"
SELECT id::text AS id,
       submission_id::text AS submission_id,
       description,
       quantity::int8 AS quantity,
       amount::float8 AS amount,
       confidence::float8 AS confidence
FROM invoice_items
WHERE submission_id = $1::uuid
ORDER BY seq ASC
"#;
