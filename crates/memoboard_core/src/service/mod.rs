//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Shape read models (memo views with top-level comments) for the
//!   presentation layer.
//! - Keep callers decoupled from storage details.

pub mod comment_service;
pub mod memo_service;
pub mod view;
