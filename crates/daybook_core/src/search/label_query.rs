//! First-match label queries over the note DAG.
//!
//! # Responsibility
//! - Find the first active note carrying a label, optionally constrained to
//!   an exact value and to the subtree below an ancestor note.
//!
//! # Invariants
//! - Only active notes, branches and attributes are considered.
//! - "First" is a stable tie-break: `created_at ASC, note_uuid ASC`. When
//!   duplicate labels exist the oldest note wins; which note that is carries
//!   no semantic meaning.

use crate::db::DbError;
use crate::model::note::{Note, NoteId};
use crate::repo::note_repo::{parse_note_row, RepoError};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type for search APIs.
pub type SearchResult<T> = Result<T, SearchError>;

/// Search-layer error for DB interaction and result decoding.
#[derive(Debug)]
pub enum SearchError {
    Db(DbError),
    InvalidData(String),
}

impl Display for SearchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid search row: {message}"),
        }
    }
}

impl Error for SearchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for SearchError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SearchError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<RepoError> for SearchError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Db(err) => Self::Db(err),
            other => Self::InvalidData(other.to_string()),
        }
    }
}

/// Label query options.
#[derive(Debug, Clone, Copy)]
pub struct LabelQuery<'a> {
    /// Label name, e.g. `dateNote`.
    pub name: &'a str,
    /// Exact value match; `None` is a presence query.
    pub value: Option<&'a str>,
    /// Restrict matches to the subtree below this note (ancestor included).
    pub ancestor: Option<NoteId>,
}

impl<'a> LabelQuery<'a> {
    /// Presence query for a label anywhere in the store.
    pub fn anywhere(name: &'a str) -> Self {
        Self {
            name,
            value: None,
            ancestor: None,
        }
    }

    /// Equality query scoped below an ancestor note.
    pub fn under(ancestor: NoteId, name: &'a str, value: &'a str) -> Self {
        Self {
            name,
            value: Some(value),
            ancestor: Some(ancestor),
        }
    }
}

/// Finds the first active note matching the label query.
pub fn find_first_with_label(
    conn: &Connection,
    query: &LabelQuery<'_>,
) -> SearchResult<Option<Note>> {
    let mut sql = String::from(
        "SELECT
            n.note_uuid AS note_uuid,
            n.title AS title,
            n.kind AS kind,
            n.content AS content,
            n.is_protected AS is_protected,
            n.is_deleted AS is_deleted,
            n.created_at AS created_at,
            n.updated_at AS updated_at
         FROM notes n
         JOIN attributes a ON a.note_uuid = n.note_uuid
         WHERE a.kind = 'label'
           AND a.name = ?
           AND a.is_deleted = 0
           AND n.is_deleted = 0",
    );
    let mut bind_values: Vec<Value> = vec![Value::Text(query.name.to_string())];

    if let Some(value) = query.value {
        sql.push_str(" AND a.value = ?");
        bind_values.push(Value::Text(value.to_string()));
    }

    if let Some(ancestor) = query.ancestor {
        // UNION (not UNION ALL) keeps the walk finite on diamond-shaped
        // multi-parent layouts.
        sql.push_str(
            " AND n.note_uuid IN (
                WITH RECURSIVE subtree(note_uuid) AS (
                    SELECT ?
                    UNION
                    SELECT b.child_uuid
                    FROM branches b
                    INNER JOIN subtree s ON b.parent_uuid = s.note_uuid
                    WHERE b.is_deleted = 0
                )
                SELECT note_uuid FROM subtree
            )",
        );
        bind_values.push(Value::Text(ancestor.to_string()));
    }

    sql.push_str(" ORDER BY n.created_at ASC, n.note_uuid ASC LIMIT 1;");

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_note_row(row)?));
    }
    Ok(None)
}
