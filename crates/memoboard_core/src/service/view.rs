//! Read models returned to the presentation layer.
//!
//! # Invariants
//! - A `MemoView` lists only top-level comments; replies are nested by
//!   the presentation layer and never duplicated at the top level.
//! - Comment like counts are derived, never stored.

use crate::model::comment::CommentId;
use crate::model::memo::{Memo, MemoId};
use crate::repo::comment_repo::CommentWithLikes;
use serde::Serialize;

/// Memo read model with its top-level comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemoView {
    pub id: MemoId,
    pub content: String,
    pub author_name: String,
    pub like_count: i64,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
    /// Top-level comments only; empty when the memo has none.
    pub comments: Vec<CommentView>,
}

impl MemoView {
    /// Assembles a view from a memo and its full comment list,
    /// keeping only comments without a parent reference.
    pub fn assemble(memo: Memo, comments: Vec<CommentWithLikes>) -> Self {
        let top_level = comments
            .into_iter()
            .filter(|entry| entry.comment.is_top_level())
            .map(CommentView::from)
            .collect();

        Self {
            id: memo.uuid,
            content: memo.content,
            author_name: memo.author_name,
            like_count: memo.like_count,
            created_at: memo.created_at,
            updated_at: memo.updated_at,
            comments: top_level,
        }
    }
}

/// Comment read model with derived like count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentView {
    pub id: CommentId,
    pub content: String,
    pub author_name: String,
    /// Parent comment for replies; `None` means top-level.
    pub parent_id: Option<CommentId>,
    pub like_count: i64,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
}

impl From<CommentWithLikes> for CommentView {
    fn from(entry: CommentWithLikes) -> Self {
        Self {
            id: entry.comment.uuid,
            content: entry.comment.content,
            author_name: entry.comment.author_name,
            parent_id: entry.comment.parent_uuid,
            like_count: entry.like_count,
            created_at: entry.comment.created_at,
            updated_at: entry.comment.updated_at,
        }
    }
}
