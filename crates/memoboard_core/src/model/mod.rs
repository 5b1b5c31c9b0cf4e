//! Domain model for the memo board.
//!
//! # Responsibility
//! - Define canonical records for users, memos and comments.
//! - Keep identity and role semantics in one place for policy checks.
//!
//! # Invariants
//! - Every record is identified by a stable UUID, never reused.
//! - A like is represented purely by the existence of a join row; the
//!   records here never carry like state of their own.

pub mod comment;
pub mod memo;
pub mod user;
