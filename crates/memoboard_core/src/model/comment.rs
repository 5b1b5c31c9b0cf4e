//! Comment domain model.
//!
//! # Invariants
//! - `parent_uuid`, when set, must reference a comment of the same memo.
//! - Nesting is one level deep: a reply's parent is always top-level.

use crate::model::memo::MemoId;
use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a comment.
pub type CommentId = Uuid;

/// Stored comment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Stable global ID.
    pub uuid: CommentId,
    /// Comment body text.
    pub content: String,
    /// Display name captured from the author at creation time.
    pub author_name: String,
    /// Owning user reference.
    pub user_uuid: UserId,
    /// Memo this comment belongs to.
    pub memo_uuid: MemoId,
    /// Parent comment for replies; `None` means top-level.
    pub parent_uuid: Option<CommentId>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds; touched on content updates.
    pub updated_at: i64,
}

impl Comment {
    /// Returns whether this comment sits at the top level of its memo.
    pub fn is_top_level(&self) -> bool {
        self.parent_uuid.is_none()
    }
}
