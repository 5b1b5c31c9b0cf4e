//! Comment repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide comment CRUD, reply-aware cascade deletion and the
//!   comment like toggle.
//!
//! # Invariants
//! - A reply's parent must exist, belong to the same memo, and be
//!   top-level (one nesting level only); enforced at creation inside
//!   the insert transaction.
//! - Comment like counts are always derived from `comment_likes`;
//!   there is no stored counter to drift.
//! - Deleting a comment removes reply likes, replies and own likes
//!   before the comment row itself.

use crate::model::comment::{Comment, CommentId};
use crate::model::memo::MemoId;
use crate::model::user::{Actor, UserId};
use crate::policy;
use crate::repo::{ensure_connection_ready, parse_stored_uuid, MutationKind, RepoError, RepoResult};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const COMMENT_SELECT_SQL: &str = "SELECT
    uuid,
    content,
    author_name,
    user_uuid,
    memo_uuid,
    parent_uuid,
    created_at,
    updated_at
FROM comments";

/// Comment read model carrying the derived like count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentWithLikes {
    pub comment: Comment,
    pub like_count: i64,
}

/// Request model for creating one comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub memo_id: MemoId,
    /// Parent comment for replies; `None` creates a top-level comment.
    pub parent_id: Option<CommentId>,
    pub content: String,
}

/// Repository interface for comment operations.
pub trait CommentRepository {
    /// Creates one comment after validating memo and parent references.
    fn create_comment(&mut self, request: &NewComment, actor: &Actor) -> RepoResult<CommentId>;
    /// Gets one comment with its derived like count.
    fn get_comment(&self, id: CommentId) -> RepoResult<Option<CommentWithLikes>>;
    /// Replaces comment content after an in-transaction ownership check.
    fn update_comment(&mut self, id: CommentId, content: &str, actor: &Actor)
        -> RepoResult<Comment>;
    /// Deletes a comment, its replies and all their likes in one
    /// transaction.
    fn delete_comment(&mut self, id: CommentId, actor: &Actor) -> RepoResult<()>;
    /// Toggles the actor's like on a comment; returns the derived
    /// post-mutation count.
    fn toggle_like(&mut self, id: CommentId, user_id: UserId) -> RepoResult<i64>;
}

/// SQLite-backed comment repository.
pub struct SqliteCommentRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteCommentRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl CommentRepository for SqliteCommentRepository<'_> {
    fn create_comment(&mut self, request: &NewComment, actor: &Actor) -> RepoResult<CommentId> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let memo_uuid = request.memo_id.to_string();
        let memo_exists: i64 = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM memos WHERE uuid = ?1);",
            [memo_uuid.as_str()],
            |row| row.get(0),
        )?;
        if memo_exists == 0 {
            return Err(RepoError::MemoNotFound(request.memo_id));
        }

        if let Some(parent_id) = request.parent_id {
            validate_parent_in_tx(&tx, parent_id, request.memo_id)?;
        }

        let id = Uuid::new_v4();
        tx.execute(
            "INSERT INTO comments (uuid, content, author_name, user_uuid, memo_uuid, parent_uuid)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                id.to_string(),
                request.content.as_str(),
                actor.username.as_str(),
                actor.user_id.to_string(),
                memo_uuid.as_str(),
                request.parent_id.map(|parent| parent.to_string()),
            ],
        )?;

        tx.commit()?;
        Ok(id)
    }

    fn get_comment(&self, id: CommentId) -> RepoResult<Option<CommentWithLikes>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                c.uuid,
                c.content,
                c.author_name,
                c.user_uuid,
                c.memo_uuid,
                c.parent_uuid,
                c.created_at,
                c.updated_at,
                (SELECT COUNT(*) FROM comment_likes cl
                 WHERE cl.comment_uuid = c.uuid) AS like_count
             FROM comments c
             WHERE c.uuid = ?1;",
        )?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_comment_with_likes_row(row)?));
        }
        Ok(None)
    }

    fn update_comment(
        &mut self,
        id: CommentId,
        content: &str,
        actor: &Actor,
    ) -> RepoResult<Comment> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let owner = comment_owner_in_tx(&tx, id)?.ok_or(RepoError::CommentNotFound(id))?;
        policy::authorize(actor, owner).map_err(|reason| RepoError::Denied {
            op: MutationKind::UpdateComment,
            reason,
        })?;

        tx.execute(
            "UPDATE comments
             SET content = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), content],
        )?;

        let comment = tx.query_row(
            &format!("{COMMENT_SELECT_SQL} WHERE uuid = ?1;"),
            [id.to_string()],
            |row| Ok(parse_comment_row(row)),
        )??;

        tx.commit()?;
        Ok(comment)
    }

    fn delete_comment(&mut self, id: CommentId, actor: &Actor) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let owner = comment_owner_in_tx(&tx, id)?.ok_or(RepoError::CommentNotFound(id))?;
        policy::authorize(actor, owner).map_err(|reason| RepoError::Denied {
            op: MutationKind::DeleteComment,
            reason,
        })?;

        let comment_uuid = id.to_string();

        // Reply likes, replies, own likes, then the comment row.
        tx.execute(
            "DELETE FROM comment_likes
             WHERE comment_uuid IN (SELECT uuid FROM comments WHERE parent_uuid = ?1);",
            [comment_uuid.as_str()],
        )?;
        tx.execute(
            "DELETE FROM comments WHERE parent_uuid = ?1;",
            [comment_uuid.as_str()],
        )?;
        tx.execute(
            "DELETE FROM comment_likes WHERE comment_uuid = ?1;",
            [comment_uuid.as_str()],
        )?;
        tx.execute(
            "DELETE FROM comments WHERE uuid = ?1;",
            [comment_uuid.as_str()],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn toggle_like(&mut self, id: CommentId, user_id: UserId) -> RepoResult<i64> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        if comment_owner_in_tx(&tx, id)?.is_none() {
            return Err(RepoError::CommentNotFound(id));
        }

        let comment_uuid = id.to_string();
        let user_uuid = user_id.to_string();

        let liked: i64 = tx.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM comment_likes
                WHERE comment_uuid = ?1 AND user_uuid = ?2
            );",
            params![comment_uuid.as_str(), user_uuid.as_str()],
            |row| row.get(0),
        )?;

        if liked == 1 {
            tx.execute(
                "DELETE FROM comment_likes WHERE comment_uuid = ?1 AND user_uuid = ?2;",
                params![comment_uuid.as_str(), user_uuid.as_str()],
            )?;
        } else {
            tx.execute(
                "INSERT INTO comment_likes (comment_uuid, user_uuid) VALUES (?1, ?2);",
                params![comment_uuid.as_str(), user_uuid.as_str()],
            )?;
        }

        let count: i64 = tx.query_row(
            "SELECT COUNT(*) FROM comment_likes WHERE comment_uuid = ?1;",
            [comment_uuid.as_str()],
            |row| row.get(0),
        )?;

        tx.commit()?;
        Ok(count)
    }
}

pub(crate) fn parse_comment_row(row: &Row<'_>) -> RepoResult<Comment> {
    let uuid_text: String = row.get("uuid")?;
    let user_text: String = row.get("user_uuid")?;
    let memo_text: String = row.get("memo_uuid")?;
    let parent_uuid = match row.get::<_, Option<String>>("parent_uuid")? {
        Some(value) => Some(parse_stored_uuid(&value, "comments.parent_uuid")?),
        None => None,
    };

    Ok(Comment {
        uuid: parse_stored_uuid(&uuid_text, "comments.uuid")?,
        content: row.get("content")?,
        author_name: row.get("author_name")?,
        user_uuid: parse_stored_uuid(&user_text, "comments.user_uuid")?,
        memo_uuid: parse_stored_uuid(&memo_text, "comments.memo_uuid")?,
        parent_uuid,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub(crate) fn parse_comment_with_likes_row(row: &Row<'_>) -> RepoResult<CommentWithLikes> {
    Ok(CommentWithLikes {
        comment: parse_comment_row(row)?,
        like_count: row.get("like_count")?,
    })
}

fn comment_owner_in_tx(tx: &Transaction<'_>, id: CommentId) -> RepoResult<Option<UserId>> {
    let mut stmt = tx.prepare("SELECT user_uuid FROM comments WHERE uuid = ?1;")?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        let owner_text: String = row.get(0)?;
        return Ok(Some(parse_stored_uuid(&owner_text, "comments.user_uuid")?));
    }
    Ok(None)
}

fn validate_parent_in_tx(
    tx: &Transaction<'_>,
    parent_id: CommentId,
    memo_id: MemoId,
) -> RepoResult<()> {
    let mut stmt = tx.prepare("SELECT memo_uuid, parent_uuid FROM comments WHERE uuid = ?1;")?;
    let mut rows = stmt.query([parent_id.to_string()])?;
    let row = match rows.next()? {
        Some(row) => row,
        None => return Err(RepoError::CommentNotFound(parent_id)),
    };

    let parent_memo_text: String = row.get(0)?;
    let parent_memo = parse_stored_uuid(&parent_memo_text, "comments.memo_uuid")?;
    if parent_memo != memo_id {
        return Err(RepoError::InvalidParent {
            parent: parent_id,
            details: "belongs to a different memo",
        });
    }

    if row.get::<_, Option<String>>(1)?.is_some() {
        return Err(RepoError::InvalidParent {
            parent: parent_id,
            details: "is itself a reply; nesting is one level deep",
        });
    }

    Ok(())
}
