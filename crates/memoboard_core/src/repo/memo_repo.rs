//! Memo repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide memo CRUD, like-toggle and cascade-delete persistence.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `like_count` is written as the derived row count inside the same
//!   transaction as the like mutation, so it can never drift from the
//!   `memo_likes` table (and a previously drifted value self-heals).
//! - Cascade deletion removes dependents strictly before the rows they
//!   reference: memo likes, then comment likes, then replies, then
//!   top-level comments, then the memo.
//! - Ownership checks run inside the mutating transaction.

use crate::model::memo::{Memo, MemoId};
use crate::model::user::{Actor, UserId};
use crate::policy;
use crate::repo::comment_repo::{parse_comment_with_likes_row, CommentWithLikes};
use crate::repo::{ensure_connection_ready, parse_stored_uuid, MutationKind, RepoError, RepoResult};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const MEMO_SELECT_SQL: &str = "SELECT
    uuid,
    content,
    author_name,
    user_uuid,
    like_count,
    created_at,
    updated_at
FROM memos";

/// Repository interface for memo operations.
pub trait MemoRepository {
    /// Creates one memo owned by the actor and returns its stable id.
    fn create_memo(&self, content: &str, actor: &Actor) -> RepoResult<MemoId>;
    /// Gets one memo by id.
    fn get_memo(&self, id: MemoId) -> RepoResult<Option<Memo>>;
    /// Lists all memos, newest-modified first (uuid tiebreak).
    fn list_memos(&self) -> RepoResult<Vec<Memo>>;
    /// Lists a memo's comments with derived like counts.
    fn comments_with_likes(&self, memo_id: MemoId) -> RepoResult<Vec<CommentWithLikes>>;
    /// Replaces memo content after an in-transaction ownership check.
    fn update_memo(&mut self, id: MemoId, content: &str, actor: &Actor) -> RepoResult<Memo>;
    /// Deletes a memo and every dependent row in one transaction.
    fn delete_memo(&mut self, id: MemoId, actor: &Actor) -> RepoResult<()>;
    /// Toggles the actor's like on a memo; returns the post-mutation count.
    fn toggle_like(&mut self, id: MemoId, user_id: UserId) -> RepoResult<i64>;
}

/// SQLite-backed memo repository.
pub struct SqliteMemoRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteMemoRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl MemoRepository for SqliteMemoRepository<'_> {
    fn create_memo(&self, content: &str, actor: &Actor) -> RepoResult<MemoId> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO memos (uuid, content, author_name, user_uuid, like_count)
             VALUES (?1, ?2, ?3, ?4, 0);",
            params![
                id.to_string(),
                content,
                actor.username.as_str(),
                actor.user_id.to_string(),
            ],
        )?;
        Ok(id)
    }

    fn get_memo(&self, id: MemoId) -> RepoResult<Option<Memo>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MEMO_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_memo_row(row)?));
        }
        Ok(None)
    }

    fn list_memos(&self) -> RepoResult<Vec<Memo>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MEMO_SELECT_SQL} ORDER BY updated_at DESC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut memos = Vec::new();
        while let Some(row) = rows.next()? {
            memos.push(parse_memo_row(row)?);
        }
        Ok(memos)
    }

    fn comments_with_likes(&self, memo_id: MemoId) -> RepoResult<Vec<CommentWithLikes>> {
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
             WHERE c.memo_uuid = ?1
             ORDER BY c.created_at ASC, c.uuid ASC;",
        )?;
        let mut rows = stmt.query([memo_id.to_string()])?;
        let mut comments = Vec::new();
        while let Some(row) = rows.next()? {
            comments.push(parse_comment_with_likes_row(row)?);
        }
        Ok(comments)
    }

    fn update_memo(&mut self, id: MemoId, content: &str, actor: &Actor) -> RepoResult<Memo> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let owner = memo_owner_in_tx(&tx, id)?.ok_or(RepoError::MemoNotFound(id))?;
        policy::authorize(actor, owner).map_err(|reason| RepoError::Denied {
            op: MutationKind::UpdateMemo,
            reason,
        })?;

        tx.execute(
            "UPDATE memos
             SET content = ?2,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), content],
        )?;

        let memo = tx.query_row(
            &format!("{MEMO_SELECT_SQL} WHERE uuid = ?1;"),
            [id.to_string()],
            |row| Ok(parse_memo_row(row)),
        )??;

        tx.commit()?;
        Ok(memo)
    }

    fn delete_memo(&mut self, id: MemoId, actor: &Actor) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let owner = memo_owner_in_tx(&tx, id)?.ok_or(RepoError::MemoNotFound(id))?;
        policy::authorize(actor, owner).map_err(|reason| RepoError::Denied {
            op: MutationKind::DeleteMemo,
            reason,
        })?;

        let memo_uuid = id.to_string();

        // Dependents strictly before the rows they reference.
        tx.execute(
            "DELETE FROM memo_likes WHERE memo_uuid = ?1;",
            [memo_uuid.as_str()],
        )?;
        tx.execute(
            "DELETE FROM comment_likes
             WHERE comment_uuid IN (SELECT uuid FROM comments WHERE memo_uuid = ?1);",
            [memo_uuid.as_str()],
        )?;
        tx.execute(
            "DELETE FROM comments WHERE memo_uuid = ?1 AND parent_uuid IS NOT NULL;",
            [memo_uuid.as_str()],
        )?;
        tx.execute(
            "DELETE FROM comments WHERE memo_uuid = ?1;",
            [memo_uuid.as_str()],
        )?;
        tx.execute("DELETE FROM memos WHERE uuid = ?1;", [memo_uuid.as_str()])?;

        tx.commit()?;
        Ok(())
    }

    fn toggle_like(&mut self, id: MemoId, user_id: UserId) -> RepoResult<i64> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        if memo_owner_in_tx(&tx, id)?.is_none() {
            return Err(RepoError::MemoNotFound(id));
        }

        let memo_uuid = id.to_string();
        let user_uuid = user_id.to_string();

        let liked: i64 = tx.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM memo_likes
                WHERE memo_uuid = ?1 AND user_uuid = ?2
            );",
            params![memo_uuid.as_str(), user_uuid.as_str()],
            |row| row.get(0),
        )?;

        if liked == 1 {
            tx.execute(
                "DELETE FROM memo_likes WHERE memo_uuid = ?1 AND user_uuid = ?2;",
                params![memo_uuid.as_str(), user_uuid.as_str()],
            )?;
        } else {
            tx.execute(
                "INSERT INTO memo_likes (memo_uuid, user_uuid) VALUES (?1, ?2);",
                params![memo_uuid.as_str(), user_uuid.as_str()],
            )?;
        }

        // Write the derived count rather than incrementing, so the
        // counter always matches the like rows even if it drifted before.
        tx.execute(
            "UPDATE memos
             SET like_count = (SELECT COUNT(*) FROM memo_likes WHERE memo_uuid = ?1)
             WHERE uuid = ?1;",
            [memo_uuid.as_str()],
        )?;

        let count: i64 = tx.query_row(
            "SELECT like_count FROM memos WHERE uuid = ?1;",
            [memo_uuid.as_str()],
            |row| row.get(0),
        )?;

        tx.commit()?;
        Ok(count)
    }
}

pub(crate) fn parse_memo_row(row: &Row<'_>) -> RepoResult<Memo> {
    let uuid_text: String = row.get("uuid")?;
    let user_text: String = row.get("user_uuid")?;
    Ok(Memo {
        uuid: parse_stored_uuid(&uuid_text, "memos.uuid")?,
        content: row.get("content")?,
        author_name: row.get("author_name")?,
        user_uuid: parse_stored_uuid(&user_text, "memos.user_uuid")?,
        like_count: row.get("like_count")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn memo_owner_in_tx(tx: &Transaction<'_>, id: MemoId) -> RepoResult<Option<UserId>> {
    let mut stmt = tx.prepare("SELECT user_uuid FROM memos WHERE uuid = ?1;")?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        let owner_text: String = row.get(0)?;
        return Ok(Some(parse_stored_uuid(&owner_text, "memos.user_uuid")?));
    }
    Ok(None)
}
