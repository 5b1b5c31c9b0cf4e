//! User repository contract and SQLite implementation.
//!
//! Exists so the core can persist the accounts its foreign keys point
//! at; credential validation happens upstream of the core.

use crate::model::user::{User, UserId, UserRole};
use crate::repo::{ensure_connection_ready, parse_stored_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, ErrorCode, Row};

const USER_SELECT_SQL: &str = "SELECT uuid, username, password, role FROM users";

/// Repository interface for user records.
pub trait UserRepository {
    /// Persists one user; duplicate usernames yield `Conflict`.
    fn create_user(&self, user: &User) -> RepoResult<UserId>;
    /// Gets one user by id.
    fn get_user(&self, id: UserId) -> RepoResult<Option<User>>;
    /// Gets one user by unique username.
    fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, user: &User) -> RepoResult<UserId> {
        let result = self.conn.execute(
            "INSERT INTO users (uuid, username, password, role)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                user.uuid.to_string(),
                user.username.as_str(),
                user.password.as_str(),
                role_to_db(user.role),
            ],
        );

        match result {
            Ok(_) => Ok(user.uuid),
            Err(rusqlite::Error::SqliteFailure(failure, _))
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                Err(RepoError::Conflict(format!(
                    "username `{}` already exists",
                    user.username
                )))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn get_user(&self, id: UserId) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE username = ?1;"))?;
        let mut rows = stmt.query([username])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let uuid_text: String = row.get("uuid")?;
    let role_text: String = row.get("role")?;
    let role = parse_role(&role_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid role `{role_text}` in users.role"))
    })?;

    Ok(User {
        uuid: parse_stored_uuid(&uuid_text, "users.uuid")?,
        username: row.get("username")?,
        password: row.get("password")?,
        role,
    })
}

fn role_to_db(role: UserRole) -> &'static str {
    match role {
        UserRole::User => "user",
        UserRole::Admin => "admin",
    }
}

fn parse_role(value: &str) -> Option<UserRole> {
    match value {
        "user" => Some(UserRole::User),
        "admin" => Some(UserRole::Admin),
        _ => None,
    }
}
