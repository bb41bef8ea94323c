//! SQL dialect translation between the primary and embedded stores.
//!
//! Statements are written once in the primary (PostgreSQL) dialect. Before
//! the embedded (SQLite) backend executes a shared statement it passes it
//! through [`translate`], which:
//!
//! - rewrites `$N` placeholders to `?N`
//! - strips `::type` cast annotations (SQLite has no cast operator),
//!   including multi-word names like `double precision`
//! - removes `FOR UPDATE` row-locking clauses (SQLite locks the database)
//!
//! Single-quoted literals, double-quoted identifiers, `--` line comments and
//! `/* */` block comments are copied verbatim. Dollar-quoted bodies are not
//! recognised. Pure functions only.

use std::borrow::Cow;

/// SQL dialect spoken by a storage backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// The networked primary store. Statements run unchanged.
    Postgres,
    /// The embedded fallback store.
    Sqlite,
}

/// Translates a primary-dialect statement for the target dialect.
///
/// # Examples
///
/// ```
/// use invoice_review_core::storage::{translate, Dialect};
///
/// let sql = "SELECT status FROM submissions WHERE id = $1 FOR UPDATE";
/// assert_eq!(
///     translate(sql, Dialect::Sqlite),
///     "SELECT status FROM submissions WHERE id = ?1"
/// );
/// assert_eq!(translate(sql, Dialect::Postgres), sql);
/// ```
pub fn translate(query: &str, target: Dialect) -> Cow<'_, str> {
    match target {
        Dialect::Postgres => Cow::Borrowed(query),
        Dialect::Sqlite => Cow::Owned(to_sqlite(query)),
    }
}

fn to_sqlite(query: &str) -> String {
    let bytes = query.as_bytes();
    let mut out = String::with_capacity(query.len());
    // Start of the pending verbatim segment. Every cut happens on an ASCII
    // byte, so slicing `query` at these offsets stays on char boundaries.
    let mut copied = 0;
    let mut quote: Option<u8> = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];

        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            i += 1;
            continue;
        }

        match b {
            b'\'' | b'"' => {
                quote = Some(b);
                i += 1;
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                i = bytes[i..]
                    .iter()
                    .position(|&c| c == b'\n')
                    .map_or(bytes.len(), |n| i + n);
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = bytes[i + 2..]
                    .windows(2)
                    .position(|w| w == b"*/")
                    .map_or(bytes.len(), |n| i + 2 + n + 2);
            }
            b'$' if bytes.get(i + 1).is_some_and(u8::is_ascii_digit) => {
                out.push_str(&query[copied..i]);
                out.push('?');
                i += 1;
                copied = i;
            }
            b':' if bytes.get(i + 1) == Some(&b':') => {
                out.push_str(&query[copied..i]);
                i = skip_cast(bytes, i + 2);
                copied = i;
            }
            _ => match locking_clause_end(bytes, i) {
                Some(end) => {
                    out.push_str(query[copied..i].trim_end());
                    i = end;
                    copied = i;
                }
                None => i += 1,
            },
        }
    }

    out.push_str(&query[copied..]);
    out
}

fn is_ident(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Type names made of several words, keyed by their first word.
const MULTI_WORD_TYPES: &[(&[u8], &[&[u8]])] = &[
    (b"double", &[b"precision"]),
    (b"character", &[b"varying"]),
    (b"bit", &[b"varying"]),
    (b"timestamp", &[b"with", b"time", b"zone"]),
    (b"timestamp", &[b"without", b"time", b"zone"]),
    (b"time", &[b"with", b"time", b"zone"]),
    (b"time", &[b"without", b"time", b"zone"]),
];

/// Skips a cast target such as `jsonb`, `numeric(12,2)`, `text[]` or
/// `timestamp(3) with time zone`.
fn skip_cast(bytes: &[u8], mut i: usize) -> usize {
    let start = i;
    while i < bytes.len() && is_ident(bytes[i]) {
        i += 1;
    }
    let first = &bytes[start..i];
    i = skip_modifier(bytes, i);

    if let Some(end) = MULTI_WORD_TYPES
        .iter()
        .filter(|(head, _)| first.eq_ignore_ascii_case(head))
        .find_map(|(_, rest)| match_words(bytes, i, rest))
    {
        i = skip_modifier(bytes, end);
    }

    while bytes.get(i) == Some(&b'[') && bytes.get(i + 1) == Some(&b']') {
        i += 2;
    }
    i
}

/// Skips a parenthesised type modifier such as `(12,2)`.
fn skip_modifier(bytes: &[u8], mut i: usize) -> usize {
    if bytes.get(i) == Some(&b'(') {
        while i < bytes.len() && bytes[i] != b')' {
            i += 1;
        }
        i = (i + 1).min(bytes.len());
    }
    i
}

/// Matches whitespace-separated whole words, returning the end offset.
fn match_words(bytes: &[u8], mut i: usize, words: &[&[u8]]) -> Option<usize> {
    for word in words {
        let gap_start = i;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i == gap_start {
            return None;
        }
        i = match_keyword(bytes, i, word)?;
        if i < bytes.len() && is_ident(bytes[i]) {
            return None;
        }
    }
    Some(i)
}

/// Returns the end offset of a `FOR UPDATE` clause starting at `i`.
fn locking_clause_end(bytes: &[u8], i: usize) -> Option<usize> {
    if i > 0 && is_ident(bytes[i - 1]) {
        return None;
    }

    let mut j = match_keyword(bytes, i, b"for")?;
    let gap_start = j;
    while j < bytes.len() && bytes[j].is_ascii_whitespace() {
        j += 1;
    }
    if j == gap_start {
        return None;
    }
    let end = match_keyword(bytes, j, b"update")?;

    if end < bytes.len() && is_ident(bytes[end]) {
        return None;
    }
    Some(end)
}

fn match_keyword(bytes: &[u8], i: usize, keyword: &[u8]) -> Option<usize> {
    let end = i + keyword.len();
    let candidate = bytes.get(i..end)?;
    candidate.eq_ignore_ascii_case(keyword).then_some(end)
}
