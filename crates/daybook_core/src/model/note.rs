//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note record shared by plain notes and journal
//!   container notes.
//! - Define the attribute (label/relation) shape owned by notes.
//! - Provide the draft type consumed by atomic note creation.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another note.
//! - The nil uuid is reserved for the fixed global root note.
//! - `is_deleted` is the source of truth for tombstone state.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every note in the store.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type NoteId = Uuid;

/// Returns the uuid of the fixed global root note seeded by migrations.
pub fn root_note_id() -> NoteId {
    Uuid::nil()
}

/// Content kind of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteKind {
    /// Free-form rich text. All journal containers use this kind.
    Text,
    /// Source/code content rendered without formatting.
    Code,
}

impl Default for NoteKind {
    fn default() -> Self {
        Self::Text
    }
}

/// Attribute kind owned by a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    /// Name/value marker. Empty value means a flag label.
    Label,
    /// Link to another note; `value` holds the target note uuid.
    Relation,
}

/// Canonical note record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Stable global ID used for linking and parent/child edges.
    pub uuid: NoteId,
    /// User-facing title.
    pub title: String,
    /// Serialized as `kind` to match storage naming.
    pub kind: NoteKind,
    /// Note body. Journal containers start empty.
    pub content: String,
    /// Whether content is subject to protected-session handling.
    pub is_protected: bool,
    /// Soft delete tombstone.
    pub is_deleted: bool,
    /// Epoch ms creation timestamp.
    pub created_at: i64,
    /// Epoch ms update timestamp.
    pub updated_at: i64,
}

impl Note {
    /// Returns whether this note should be considered visible/active.
    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }
}

/// Attribute read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Stable attribute id.
    pub uuid: Uuid,
    /// Owning note.
    pub note_uuid: NoteId,
    pub kind: AttributeKind,
    /// Attribute name, e.g. `dateNote` or `template`.
    pub name: String,
    /// Label value or relation target uuid as text. Empty for flag labels.
    pub value: String,
}

/// Creation request for one note, applied atomically with its initial
/// attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub kind: NoteKind,
    pub content: String,
    pub is_protected: bool,
    /// `(name, value)` labels attached in the same transaction. An empty
    /// value records a flag label.
    pub labels: Vec<(String, String)>,
    /// `(name, target)` relations attached in the same transaction.
    pub relations: Vec<(String, NoteId)>,
}

impl NoteDraft {
    /// Creates a text-note draft with the given title and no attributes.
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Validates draft fields before persistence.
    ///
    /// # Invariants
    /// - Title must not be blank after trimming.
    /// - Attribute names must not be blank.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.title.trim().is_empty() {
            return Err(NoteValidationError::BlankTitle);
        }
        for (name, _) in &self.labels {
            if name.trim().is_empty() {
                return Err(NoteValidationError::BlankAttributeName);
            }
        }
        for (name, _) in &self.relations {
            if name.trim().is_empty() {
                return Err(NoteValidationError::BlankAttributeName);
            }
        }
        Ok(())
    }
}

/// Validation failures raised before note persistence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteValidationError {
    BlankTitle,
    BlankAttributeName,
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "note title must not be blank"),
            Self::BlankAttributeName => write!(f, "attribute name must not be blank"),
        }
    }
}

impl Error for NoteValidationError {}

#[cfg(test)]
mod tests {
    use super::{NoteDraft, NoteValidationError};

    #[test]
    fn draft_with_blank_title_is_rejected() {
        let draft = NoteDraft::with_title("   ");
        assert_eq!(draft.validate(), Err(NoteValidationError::BlankTitle));
    }

    #[test]
    fn draft_with_blank_label_name_is_rejected() {
        let mut draft = NoteDraft::with_title("Calendar");
        draft.labels.push((String::new(), "2024".to_string()));
        assert_eq!(
            draft.validate(),
            Err(NoteValidationError::BlankAttributeName)
        );
    }

    #[test]
    fn note_kind_serializes_snake_case() {
        let json = serde_json::to_string(&super::NoteKind::Text).unwrap();
        assert_eq!(json, "\"text\"");
    }
}
