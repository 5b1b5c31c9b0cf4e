//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service orchestration.
//! - Run every multi-step mutation inside one immediate transaction.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`MemoNotFound`, `Denied`)
//!   in addition to DB transport errors.
//! - Authorization runs inside the same transaction as the write it
//!   gates, so a concurrent delete cannot slip between check and write.

use crate::db::DbError;
use crate::model::comment::CommentId;
use crate::model::memo::MemoId;
use crate::model::user::UserId;
use crate::policy::AccessDenied;
use rusqlite::{Connection, ErrorCode};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod comment_repo;
pub mod memo_repo;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Mutation being denied; lets callers present distinct messages for
/// update-denied vs delete-denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    UpdateMemo,
    DeleteMemo,
    UpdateComment,
    DeleteComment,
}

impl Display for MutationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::UpdateMemo => "update memo",
            Self::DeleteMemo => "delete memo",
            Self::UpdateComment => "update comment",
            Self::DeleteComment => "delete comment",
        };
        write!(f, "{label}")
    }
}

/// Generic repository error for board persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    MemoNotFound(MemoId),
    CommentNotFound(CommentId),
    UserNotFound(UserId),
    /// Actor is authenticated but not permitted to perform the mutation.
    Denied {
        op: MutationKind,
        reason: AccessDenied,
    },
    /// Store-level conflict (busy/locked writer, unique violation).
    /// Surfaced to the caller, never retried here.
    Conflict(String),
    /// Parent reference rejected at comment creation.
    InvalidParent {
        parent: CommentId,
        details: &'static str,
    },
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::MemoNotFound(id) => write!(f, "memo not found: {id}"),
            Self::CommentNotFound(id) => write!(f, "comment not found: {id}"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::Denied { op, reason } => write!(f, "{op} denied: {reason}"),
            Self::Conflict(message) => write!(f, "storage conflict: {message}"),
            Self::InvalidParent { parent, details } => {
                write!(f, "invalid parent comment {parent}: {details}")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted board data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection not migrated: schema version {actual_version}, expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        // Busy/locked means a concurrent writer won the race; callers
        // decide whether to retry.
        if let rusqlite::Error::SqliteFailure(failure, ref message) = value {
            if matches!(
                failure.code,
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked
            ) {
                return Self::Conflict(
                    message
                        .clone()
                        .unwrap_or_else(|| "database is busy".to_string()),
                );
            }
        }
        Self::Db(DbError::Sqlite(value))
    }
}

pub(crate) fn parse_stored_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

/// Required schema surface shared by all board repositories.
const REQUIRED_TABLES: &[(&str, &[&str])] = &[
    ("users", &["uuid", "username", "password", "role"]),
    (
        "memos",
        &[
            "uuid",
            "content",
            "author_name",
            "user_uuid",
            "like_count",
            "created_at",
            "updated_at",
        ],
    ),
    (
        "comments",
        &[
            "uuid",
            "content",
            "author_name",
            "user_uuid",
            "memo_uuid",
            "parent_uuid",
        ],
    ),
    ("memo_likes", &["memo_uuid", "user_uuid"]),
    ("comment_likes", &["comment_uuid", "user_uuid"]),
];

/// Verifies the connection was opened through `db::open_db` and carries
/// the full board schema.
pub(crate) fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = crate::db::migrations::latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for (table, columns) in REQUIRED_TABLES.iter().copied() {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for column in columns.iter().copied() {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
