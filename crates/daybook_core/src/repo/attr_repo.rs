//! Attribute repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide label/relation create APIs for existing notes.
//! - Provide owned-attribute reads by name (first match, oldest wins).
//!
//! # Invariants
//! - Only active (`is_deleted=0`) attributes are visible.
//! - Owned reads are deterministic: `created_at ASC, attr_uuid ASC`.

use crate::model::note::{Attribute, AttributeKind, NoteId};
use crate::repo::note_repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

/// Repository interface for attribute operations.
pub trait AttributeRepository {
    /// Creates one label on an existing note. Empty `value` records a flag.
    fn create_label(&self, note_uuid: NoteId, name: &str, value: &str)
        -> RepoResult<Attribute>;
    /// Creates one relation on an existing note pointing to `target`.
    fn create_relation(
        &self,
        note_uuid: NoteId,
        name: &str,
        target: NoteId,
    ) -> RepoResult<Attribute>;
    /// Reads the first owned label value by name, if present.
    fn owned_label_value(&self, note_uuid: NoteId, name: &str) -> RepoResult<Option<String>>;
    /// Reads the first owned relation target by name, if present.
    fn owned_relation_target(&self, note_uuid: NoteId, name: &str) -> RepoResult<Option<NoteId>>;
}

/// SQLite-backed attribute repository.
pub struct SqliteAttributeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAttributeRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl AttributeRepository for SqliteAttributeRepository<'_> {
    fn create_label(
        &self,
        note_uuid: NoteId,
        name: &str,
        value: &str,
    ) -> RepoResult<Attribute> {
        ensure_note_active(self.conn, note_uuid)?;
        insert_attribute(self.conn, note_uuid, AttributeKind::Label, name, value)
    }

    fn create_relation(
        &self,
        note_uuid: NoteId,
        name: &str,
        target: NoteId,
    ) -> RepoResult<Attribute> {
        ensure_note_active(self.conn, note_uuid)?;
        insert_attribute(
            self.conn,
            note_uuid,
            AttributeKind::Relation,
            name,
            &target.to_string(),
        )
    }

    fn owned_label_value(&self, note_uuid: NoteId, name: &str) -> RepoResult<Option<String>> {
        owned_attribute_value(self.conn, note_uuid, AttributeKind::Label, name)
    }

    fn owned_relation_target(&self, note_uuid: NoteId, name: &str) -> RepoResult<Option<NoteId>> {
        let value = owned_attribute_value(self.conn, note_uuid, AttributeKind::Relation, name)?;
        match value {
            None => Ok(None),
            Some(text) => {
                let target = Uuid::parse_str(&text).map_err(|_| {
                    RepoError::InvalidData(format!(
                        "invalid relation target `{text}` in attributes.value for `{name}`"
                    ))
                })?;
                Ok(Some(target))
            }
        }
    }
}

/// Inserts one attribute row. Callers are responsible for transaction scope;
/// `note_repo` reuses this inside its create transaction.
pub(crate) fn insert_attribute(
    conn: &Connection,
    note_uuid: NoteId,
    kind: AttributeKind,
    name: &str,
    value: &str,
) -> RepoResult<Attribute> {
    if name.trim().is_empty() {
        return Err(RepoError::Validation(
            crate::model::note::NoteValidationError::BlankAttributeName,
        ));
    }

    let attr_uuid = Uuid::new_v4();
    conn.execute(
        "INSERT INTO attributes (attr_uuid, note_uuid, kind, name, value, is_deleted)
         VALUES (?1, ?2, ?3, ?4, ?5, 0);",
        params![
            attr_uuid.to_string(),
            note_uuid.to_string(),
            attribute_kind_to_db(kind),
            name,
            value,
        ],
    )?;

    Ok(Attribute {
        uuid: attr_uuid,
        note_uuid,
        kind,
        name: name.to_string(),
        value: value.to_string(),
    })
}

fn owned_attribute_value(
    conn: &Connection,
    note_uuid: NoteId,
    kind: AttributeKind,
    name: &str,
) -> RepoResult<Option<String>> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value
             FROM attributes
             WHERE note_uuid = ?1
               AND kind = ?2
               AND name = ?3
               AND is_deleted = 0
             ORDER BY created_at ASC, attr_uuid ASC
             LIMIT 1;",
            params![note_uuid.to_string(), attribute_kind_to_db(kind), name],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value)
}

fn ensure_note_active(conn: &Connection, note_uuid: NoteId) -> RepoResult<()> {
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
    if exists == 0 {
        return Err(RepoError::NotFound(note_uuid));
    }
    Ok(())
}

pub(crate) fn attribute_kind_to_db(kind: AttributeKind) -> &'static str {
    match kind {
        AttributeKind::Label => "label",
        AttributeKind::Relation => "relation",
    }
}
