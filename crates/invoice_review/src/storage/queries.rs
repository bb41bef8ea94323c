//! Statements shared by both backends, written in the primary dialect.
//!
//! The SQLite backend runs each of these through
//! [`invoice_review_core::storage::translate`] before executing it.
//! Statements whose ID generation differs live in each backend's `schema`.

pub const SELECT_SUBMISSION_BY_ID: &str = r#"
SELECT id::text AS id, image_url, extracted_data, status, created_at
FROM submissions
WHERE id = $1::uuid
"#;

pub const SELECT_SUBMISSIONS_BY_STATUS: &str = r#"
SELECT id::text AS id, image_url, extracted_data, status, created_at
FROM submissions
WHERE status = $1
ORDER BY created_at DESC
"#;

pub const SELECT_SUBMISSION_STATUS: &str = r#"
SELECT status
FROM submissions
WHERE id = $1::uuid
"#;

pub const SELECT_SUBMISSION_STATUS_FOR_UPDATE: &str = r#"
SELECT status
FROM submissions
WHERE id = $1::uuid
FOR UPDATE
"#;

pub const UPDATE_SUBMISSION_STATUS: &str = r#"
UPDATE submissions
SET status = $2
WHERE id = $1::uuid
"#;

#[cfg(test)]
mod tests {
    use invoice_review_core::storage::{translate, Dialect};

    use super::*;

    #[test]
    fn test_locking_read_translates_to_plain_read() {
        assert_eq!(
            translate(SELECT_SUBMISSION_STATUS_FOR_UPDATE, Dialect::Sqlite).trim(),
            translate(SELECT_SUBMISSION_STATUS, Dialect::Sqlite).trim()
        );
    }

    #[test]
    fn test_translated_queries_use_sqlite_placeholders() {
        for sql in [
            SELECT_SUBMISSION_BY_ID,
            SELECT_SUBMISSIONS_BY_STATUS,
            SELECT_SUBMISSION_STATUS,
            SELECT_SUBMISSION_STATUS_FOR_UPDATE,
            UPDATE_SUBMISSION_STATUS,
        ] {
            let translated = translate(sql, Dialect::Sqlite);
            assert!(!translated.contains('$'), "untranslated: {translated}");
            assert!(translated.contains("?1"));
        }
    }

    #[test]
    fn test_casts_are_stripped_for_sqlite() {
        let translated = translate(SELECT_SUBMISSION_BY_ID, Dialect::Sqlite);
        assert!(!translated.contains("::"));
        assert!(translated.contains("SELECT id AS id,"));
        assert!(translated.contains("WHERE id = ?1"));
    }

    #[test]
    fn test_list_orders_newest_first() {
        assert!(SELECT_SUBMISSIONS_BY_STATUS.contains("ORDER BY created_at DESC"));
    }
}
