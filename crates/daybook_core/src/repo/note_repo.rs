//! Note repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide note persistence APIs over the notes/branches storage.
//! - Own the atomic create-child semantics: a note is never observable
//!   without its initial labels/relations.
//! - Own the multi-parent attach ("clone") operation over the branch DAG.
//!
//! # Invariants
//! - Write paths must call `NoteDraft::validate()` before SQL mutations.
//! - Child ordering under one parent is deterministic:
//!   `sort_order ASC, child_uuid ASC`.
//! - Clone never duplicates note identity and never creates a cycle.

use crate::db::DbError;
use crate::model::note::{AttributeKind, Note, NoteDraft, NoteId, NoteKind, NoteValidationError};
use crate::repo::attr_repo::insert_attribute;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const NOTE_SELECT_SQL: &str = "SELECT
    note_uuid,
    title,
    kind,
    content,
    is_protected,
    is_deleted,
    created_at,
    updated_at
FROM notes";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for note persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(NoteValidationError),
    Db(DbError),
    NotFound(NoteId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<NoteValidationError> for RepoError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Outcome of a multi-parent attach attempt.
///
/// Attach failures are reported as data, not as errors, so callers can pass
/// the message through their own error surface verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneOutcome {
    pub success: bool,
    pub message: String,
}

impl CloneOutcome {
    fn ok() -> Self {
        Self {
            success: true,
            message: String::new(),
        }
    }

    fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Repository interface for note operations.
pub trait NoteRepository {
    /// Atomically creates one note under `parent_uuid` together with the
    /// draft's labels and relations.
    fn create_child_note(&self, parent_uuid: NoteId, draft: &NoteDraft) -> RepoResult<Note>;
    /// Loads one note by id.
    fn get_note(&self, note_uuid: NoteId, include_deleted: bool) -> RepoResult<Option<Note>>;
    /// Lists active parent notes of one note, oldest branch first.
    fn parent_notes(&self, note_uuid: NoteId) -> RepoResult<Vec<Note>>;
    /// Attaches an existing note as an additional child of `new_parent_uuid`.
    fn clone_to(&self, note_uuid: NoteId, new_parent_uuid: NoteId) -> RepoResult<CloneOutcome>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn create_child_note(&self, parent_uuid: NoteId, draft: &NoteDraft) -> RepoResult<Note> {
        draft.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !note_is_active(&tx, parent_uuid)? {
            return Err(RepoError::NotFound(parent_uuid));
        }

        let note_uuid = Uuid::new_v4();
        tx.execute(
            "INSERT INTO notes (note_uuid, title, kind, content, is_protected, is_deleted)
             VALUES (?1, ?2, ?3, ?4, ?5, 0);",
            params![
                note_uuid.to_string(),
                draft.title.as_str(),
                note_kind_to_db(draft.kind),
                draft.content.as_str(),
                bool_to_int(draft.is_protected),
            ],
        )?;

        insert_branch(&tx, parent_uuid, note_uuid)?;

        for (name, value) in &draft.labels {
            insert_attribute(&tx, note_uuid, AttributeKind::Label, name, value)?;
        }
        for (name, target) in &draft.relations {
            insert_attribute(
                &tx,
                note_uuid,
                AttributeKind::Relation,
                name,
                &target.to_string(),
            )?;
        }

        let note = load_required_note(&tx, note_uuid)?;
        tx.commit()?;
        Ok(note)
    }

    fn get_note(&self, note_uuid: NoteId, include_deleted: bool) -> RepoResult<Option<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL}
             WHERE note_uuid = ?1
               AND (?2 = 1 OR is_deleted = 0);"
        ))?;

        let mut rows = stmt.query(params![note_uuid.to_string(), bool_to_int(include_deleted)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_note_row(row)?));
        }

        Ok(None)
    }

    fn parent_notes(&self, note_uuid: NoteId) -> RepoResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL}
             WHERE note_uuid IN (
                SELECT parent_uuid
                FROM branches
                WHERE child_uuid = ?1
                  AND is_deleted = 0
             )
               AND is_deleted = 0
             ORDER BY created_at ASC, note_uuid ASC;"
        ))?;

        let mut rows = stmt.query([note_uuid.to_string()])?;
        let mut parents = Vec::new();
        while let Some(row) = rows.next()? {
            parents.push(parse_note_row(row)?);
        }
        Ok(parents)
    }

    fn clone_to(&self, note_uuid: NoteId, new_parent_uuid: NoteId) -> RepoResult<CloneOutcome> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        if !note_is_active(&tx, note_uuid)? {
            return Err(RepoError::NotFound(note_uuid));
        }
        if note_uuid == new_parent_uuid {
            return Ok(CloneOutcome::rejected("cannot clone a note into itself"));
        }
        if !note_is_active(&tx, new_parent_uuid)? {
            return Ok(CloneOutcome::rejected(format!(
                "target parent not found: {new_parent_uuid}"
            )));
        }
        if branch_exists(&tx, new_parent_uuid, note_uuid)? {
            return Ok(CloneOutcome::rejected(format!(
                "note is already a child of {new_parent_uuid}"
            )));
        }
        if is_in_subtree(&tx, note_uuid, new_parent_uuid)? {
            return Ok(CloneOutcome::rejected(format!(
                "clone would create a cycle: {new_parent_uuid} is below {note_uuid}"
            )));
        }

        insert_branch(&tx, new_parent_uuid, note_uuid)?;
        tx.commit()?;
        Ok(CloneOutcome::ok())
    }
}

fn insert_branch(conn: &Connection, parent_uuid: NoteId, child_uuid: NoteId) -> RepoResult<()> {
    let sort_order = next_sort_order(conn, parent_uuid)?;
    conn.execute(
        "INSERT INTO branches (branch_uuid, parent_uuid, child_uuid, sort_order, is_deleted)
         VALUES (?1, ?2, ?3, ?4, 0);",
        params![
            Uuid::new_v4().to_string(),
            parent_uuid.to_string(),
            child_uuid.to_string(),
            sort_order,
        ],
    )?;
    Ok(())
}

fn next_sort_order(conn: &Connection, parent_uuid: NoteId) -> RepoResult<i64> {
    let next = conn.query_row(
        "SELECT COALESCE(MAX(sort_order), -1) + 1
         FROM branches
         WHERE parent_uuid = ?1
           AND is_deleted = 0;",
        [parent_uuid.to_string()],
        |row| row.get(0),
    )?;
    Ok(next)
}

fn note_is_active(conn: &Connection, note_uuid: NoteId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM notes
            WHERE note_uuid = ?1
              AND is_deleted = 0
        );",
        [note_uuid.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn branch_exists(conn: &Connection, parent_uuid: NoteId, child_uuid: NoteId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM branches
            WHERE parent_uuid = ?1
              AND child_uuid = ?2
              AND is_deleted = 0
        );",
        params![parent_uuid.to_string(), child_uuid.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

/// Returns whether `candidate` is `ancestor` itself or sits anywhere below it
/// in the branch DAG.
fn is_in_subtree(conn: &Connection, ancestor: NoteId, candidate: NoteId) -> RepoResult<bool> {
    let found: i64 = conn.query_row(
        "WITH RECURSIVE subtree(note_uuid) AS (
            SELECT ?1
            UNION
            SELECT b.child_uuid
            FROM branches b
            INNER JOIN subtree s ON b.parent_uuid = s.note_uuid
            WHERE b.is_deleted = 0
        )
        SELECT EXISTS(SELECT 1 FROM subtree WHERE note_uuid = ?2);",
        params![ancestor.to_string(), candidate.to_string()],
        |row| row.get(0),
    )?;
    Ok(found == 1)
}

fn load_required_note(conn: &Connection, note_uuid: NoteId) -> RepoResult<Note> {
    let mut stmt = conn.prepare(&format!(
        "{NOTE_SELECT_SQL}
         WHERE note_uuid = ?1
           AND is_deleted = 0;"
    ))?;
    let mut rows = stmt.query([note_uuid.to_string()])?;
    if let Some(row) = rows.next()? {
        return parse_note_row(row);
    }
    Err(RepoError::NotFound(note_uuid))
}

pub(crate) fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let uuid_text: String = row.get("note_uuid")?;
    let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in notes.note_uuid"))
    })?;

    let kind_text: String = row.get("kind")?;
    let kind = parse_note_kind(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid note kind `{kind_text}` in notes.kind"))
    })?;

    Ok(Note {
        uuid,
        title: row.get("title")?,
        kind,
        content: row.get("content")?,
        is_protected: int_to_bool(row.get("is_protected")?, "notes.is_protected")?,
        is_deleted: int_to_bool(row.get("is_deleted")?, "notes.is_deleted")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn note_kind_to_db(kind: NoteKind) -> &'static str {
    match kind {
        NoteKind::Text => "text",
        NoteKind::Code => "code",
    }
}

fn parse_note_kind(value: &str) -> Option<NoteKind> {
    match value {
        "text" => Some(NoteKind::Text),
        "code" => Some(NoteKind::Code),
        _ => None,
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn int_to_bool(value: i64, column: &'static str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}
