//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for notes.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `Note::validate()` before persistence.
//! - Every statement is scoped by the owning user; a wrong-owner hit is
//!   indistinguishable from a missing row (`NotFound`).

pub mod note_repo;
