//! SQLite row conversion functions.
//!
//! Pure functions for converting between SQLite rows and domain types.
//! Columns are read by name so statement column order does not matter.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use invoice_review_core::submission::{
    extracted_data_from_text, InvoiceItem, Submission, SubmissionStatus,
};
use rusqlite::{types::Value, Row};

/// Convert a SQLite row to a Submission.
///
/// Expected columns: id, image_url, extracted_data, status, created_at
pub fn row_to_submission(row: &Row) -> rusqlite::Result<Submission> {
    let id: Value = row.get("id")?;
    let image_url: String = row.get("image_url")?;
    let extracted_data: Option<String> = row.get("extracted_data")?;
    let status: String = row.get("status")?;
    let created_at: String = row.get("created_at")?;

    Ok(Submission {
        id: value_to_id(id),
        image_url,
        extracted_data: extracted_data_from_text(extracted_data.as_deref()),
        status: parse_status(&status)?,
        created_at: parse_datetime(&created_at)?,
    })
}

/// Convert a SQLite row to an InvoiceItem.
///
/// Expected columns: id, submission_id, description, quantity, amount, confidence
pub fn row_to_item(row: &Row) -> rusqlite::Result<InvoiceItem> {
    let id: Value = row.get("id")?;
    let submission_id: Value = row.get("submission_id")?;

    Ok(InvoiceItem {
        id: value_to_id(id),
        submission_id: value_to_id(submission_id),
        description: row.get("description")?,
        quantity: row.get("quantity")?,
        amount: row.get("amount")?,
        confidence: row.get("confidence")?,
    })
}

/// Stored ids are text, but rows written by older tooling may hold integers.
fn value_to_id(value: Value) -> String {
    match value {
        Value::Text(s) => s,
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Blob(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Value::Null => String::new(),
    }
}

pub fn parse_status(s: &str) -> rusqlite::Result<SubmissionStatus> {
    s.parse().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Parse a datetime from RFC 3339, or SQLite's `CURRENT_TIMESTAMP` format.
fn parse_datetime(s: &str) -> rusqlite::Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })
}

/// Format a DateTime for SQLite storage.
///
/// Fixed precision and a `Z` suffix keep text order equal to time order.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rusqlite::Connection;

    fn conn_with_row(sql: &str) -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(sql).unwrap();
        conn
    }

    #[test]
    fn test_format_datetime_sorts_lexicographically() {
        let earlier = Utc.with_ymd_and_hms(2024, 3, 9, 23, 59, 59).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap();

        assert_eq!(format_datetime(&earlier), "2024-03-09T23:59:59.000000Z");
        assert!(format_datetime(&earlier) < format_datetime(&later));
    }

    #[test]
    fn test_parse_datetime_accepts_both_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 9, 12, 30, 0).unwrap();

        assert_eq!(parse_datetime("2024-03-09T12:30:00Z").unwrap(), expected);
        assert_eq!(parse_datetime("2024-03-09T12:30:00.000000Z").unwrap(), expected);
        assert_eq!(parse_datetime("2024-03-09 12:30:00").unwrap(), expected);
        assert!(parse_datetime("yesterday").is_err());
    }

    #[test]
    fn test_row_to_submission_normalizes_fields() {
        let conn = conn_with_row(
            "CREATE TABLE s (id, image_url, extracted_data, status, created_at);
             INSERT INTO s VALUES (42, 'uploaded_file', NULL, 'approved', '2024-03-09 12:30:00');",
        );

        let submission = conn
            .query_row("SELECT * FROM s", [], row_to_submission)
            .unwrap();

        assert_eq!(submission.id, "42");
        assert!(submission.extracted_data.is_empty());
        assert_eq!(submission.status, SubmissionStatus::Approved);
    }

    #[test]
    fn test_row_to_submission_rejects_unknown_status() {
        let conn = conn_with_row(
            "CREATE TABLE s (id, image_url, extracted_data, status, created_at);
             INSERT INTO s VALUES ('a', 'x', '{}', 'archived', '2024-03-09T12:30:00Z');",
        );

        let result = conn.query_row("SELECT * FROM s", [], row_to_submission);

        assert!(result.is_err());
    }

    #[test]
    fn test_row_to_item_keeps_nulls() {
        let conn = conn_with_row(
            "CREATE TABLE i (id, submission_id, description, quantity, amount, confidence);
             INSERT INTO i VALUES ('item-1', 'sub-1', NULL, 3, NULL, 0.5);",
        );

        let item = conn.query_row("SELECT * FROM i", [], row_to_item).unwrap();

        assert_eq!(item.id, "item-1");
        assert_eq!(item.submission_id, "sub-1");
        assert_eq!(item.description, None);
        assert_eq!(item.quantity, Some(3));
        assert_eq!(item.amount, None);
        assert_eq!(item.confidence, Some(0.5));
    }
}
