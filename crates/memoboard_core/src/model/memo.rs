//! Memo domain model.
//!
//! # Invariants
//! - `like_count` must equal the number of `memo_likes` rows for this
//!   memo; only the like toggle path may change it.
//! - `user_uuid` identifies the owner; ownership never changes.

use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a memo.
pub type MemoId = Uuid;

/// Stored memo record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memo {
    /// Stable global ID.
    pub uuid: MemoId,
    /// Memo body text.
    pub content: String,
    /// Display name captured from the author at creation time.
    pub author_name: String,
    /// Owning user reference.
    pub user_uuid: UserId,
    /// Denormalized like counter, kept equal to the like-row count.
    pub like_count: i64,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds; touched on content updates.
    pub updated_at: i64,
}
