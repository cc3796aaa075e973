//! Domain model for owner-scoped notes.
//!
//! # Responsibility
//! - Define the canonical note record and its write-side shapes.
//! - Keep field constraints as explicit validation functions, independent
//!   of any storage technology.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId` and owned by exactly
//!   one `OwnerId` for its whole lifetime.
//! - Derived word counts are recomputed before every persisted write.

pub mod note;
