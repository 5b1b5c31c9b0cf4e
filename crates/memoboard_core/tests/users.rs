use memoboard_core::db::open_db_in_memory;
use memoboard_core::{RepoError, SqliteUserRepository, User, UserRepository, UserRole};
use rusqlite::Connection;

#[test]
fn create_and_get_user_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    let user = User::new("alice", "opaque", UserRole::User);
    let id = repo.create_user(&user).unwrap();

    let loaded = repo.get_user(id).unwrap().unwrap();
    assert_eq!(loaded, user);

    let by_name = repo.find_by_username("alice").unwrap().unwrap();
    assert_eq!(by_name.uuid, id);
    assert_eq!(by_name.role, UserRole::User);
}

#[test]
fn duplicate_username_is_a_conflict() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    repo.create_user(&User::new("bob", "opaque", UserRole::User))
        .unwrap();
    let err = repo
        .create_user(&User::new("bob", "other", UserRole::Admin))
        .unwrap_err();
    assert!(matches!(err, RepoError::Conflict(_)));
}

#[test]
fn missing_user_reads_return_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteUserRepository::try_new(&conn).unwrap();

    assert!(repo.get_user(uuid::Uuid::new_v4()).unwrap().is_none());
    assert!(repo.find_by_username("nobody").unwrap().is_none());
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteUserRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_missing_required_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!(
        "PRAGMA user_version = {};",
        memoboard_core::db::migrations::latest_version()
    ))
    .unwrap();

    let result = SqliteUserRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("users"))
    ));
}
