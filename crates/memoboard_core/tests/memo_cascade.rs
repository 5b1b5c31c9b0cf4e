use memoboard_core::db::open_db_in_memory;
use memoboard_core::{
    Actor, CommentService, MemoService, MemoServiceError, MutationKind, SqliteCommentRepository,
    SqliteMemoRepository, SqliteUserRepository, User, UserRepository, UserRole,
};
use rusqlite::Connection;
use uuid::Uuid;

#[test]
fn delete_memo_leaves_no_dependent_rows() {
    let mut conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "author", UserRole::User);
    let commenter = seed_user(&conn, "commenter", UserRole::User);

    let memo_id = {
        let repo = SqliteMemoRepository::try_new(&mut conn).unwrap();
        let mut service = MemoService::new(repo);
        let memo = service.create_memo("doomed memo", &author).unwrap();
        service.toggle_like(memo.id, commenter.user_id).unwrap();
        memo.id
    };

    {
        let repo = SqliteCommentRepository::try_new(&mut conn).unwrap();
        let mut comments = CommentService::new(repo);
        let top = comments
            .create_comment(memo_id, None, "top-level", &commenter)
            .unwrap();
        let reply = comments
            .create_comment(memo_id, Some(top.id), "a reply", &author)
            .unwrap();
        comments.toggle_like(top.id, author.user_id).unwrap();
        comments.toggle_like(reply.id, commenter.user_id).unwrap();
    }

    {
        let repo = SqliteMemoRepository::try_new(&mut conn).unwrap();
        let mut service = MemoService::new(repo);
        service.delete_memo(memo_id, &author).unwrap();
    }

    assert_eq!(count(&conn, "memos", "uuid", memo_id), 0);
    assert_eq!(count(&conn, "comments", "memo_uuid", memo_id), 0);
    assert_eq!(count(&conn, "memo_likes", "memo_uuid", memo_id), 0);
    let orphaned_comment_likes: i64 = conn
        .query_row("SELECT COUNT(*) FROM comment_likes;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(orphaned_comment_likes, 0);
}

#[test]
fn delete_by_non_owner_user_is_denied_and_leaves_state_intact() {
    let mut conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "author", UserRole::User);
    let stranger = seed_user(&conn, "stranger", UserRole::User);

    let memo_id = {
        let repo = SqliteMemoRepository::try_new(&mut conn).unwrap();
        let mut service = MemoService::new(repo);
        let memo = service.create_memo("protected memo", &author).unwrap();
        service.toggle_like(memo.id, stranger.user_id).unwrap();

        let err = service.delete_memo(memo.id, &stranger).unwrap_err();
        assert!(matches!(
            err,
            MemoServiceError::Denied(MutationKind::DeleteMemo)
        ));
        memo.id
    };

    assert_eq!(count(&conn, "memos", "uuid", memo_id), 1);
    assert_eq!(count(&conn, "memo_likes", "memo_uuid", memo_id), 1);
}

#[test]
fn admin_deletes_foreign_memo() {
    let mut conn = open_db_in_memory().unwrap();
    let author = seed_user(&conn, "author", UserRole::User);
    let admin = seed_user(&conn, "admin", UserRole::Admin);

    let repo = SqliteMemoRepository::try_new(&mut conn).unwrap();
    let mut service = MemoService::new(repo);
    let memo = service.create_memo("any memo", &author).unwrap();

    service.delete_memo(memo.id, &admin).unwrap();
    let err = service.get_memo(memo.id).unwrap_err();
    assert!(matches!(err, MemoServiceError::MemoNotFound(_)));
}

#[test]
fn delete_missing_memo_returns_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let actor = seed_user(&conn, "someone", UserRole::Admin);

    let repo = SqliteMemoRepository::try_new(&mut conn).unwrap();
    let mut service = MemoService::new(repo);
    let err = service.delete_memo(Uuid::new_v4(), &actor).unwrap_err();
    assert!(matches!(err, MemoServiceError::MemoNotFound(_)));
}

// Concrete end-to-end scenario: like twice, denied delete, owner delete.
#[test]
fn like_toggle_then_owner_delete_scenario() {
    let mut conn = open_db_in_memory().unwrap();
    let u1 = seed_user(&conn, "u1", UserRole::User);
    let u2 = seed_user(&conn, "u2", UserRole::User);

    let repo = SqliteMemoRepository::try_new(&mut conn).unwrap();
    let mut service = MemoService::new(repo);
    let m1 = service.create_memo("m1", &u1).unwrap();
    assert_eq!(m1.like_count, 0);

    assert_eq!(service.toggle_like(m1.id, u2.user_id).unwrap(), 1);
    assert_eq!(service.toggle_like(m1.id, u2.user_id).unwrap(), 0);

    let err = service.delete_memo(m1.id, &u2).unwrap_err();
    assert!(matches!(
        err,
        MemoServiceError::Denied(MutationKind::DeleteMemo)
    ));

    service.delete_memo(m1.id, &u1).unwrap();
    let err = service.get_memo(m1.id).unwrap_err();
    assert!(matches!(err, MemoServiceError::MemoNotFound(_)));
}

fn seed_user(conn: &Connection, name: &str, role: UserRole) -> Actor {
    let repo = SqliteUserRepository::try_new(conn).unwrap();
    let user = User::new(name, "opaque", role);
    repo.create_user(&user).unwrap();
    Actor::from(&user)
}

fn count(conn: &Connection, table: &str, column: &str, id: Uuid) -> i64 {
    conn.query_row(
        &format!("SELECT COUNT(*) FROM {table} WHERE {column} = ?1;"),
        [id.to_string()],
        |row| row.get(0),
    )
    .unwrap()
}
