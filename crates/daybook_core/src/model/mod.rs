//! Domain model for the hierarchical note store.
//!
//! # Responsibility
//! - Define the canonical note/branch/attribute structures used by core
//!   business logic.
//! - Keep one storage shape usable by every journal granularity.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.
//! - Notes form a directed acyclic graph: one note may carry several parents.
//! - Deletion is represented by soft-delete tombstones, not hard delete.

pub mod note;
