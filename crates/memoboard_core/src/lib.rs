//! Core domain logic for the memo board.
//! This crate is the single source of truth for business invariants:
//! idempotent like toggling, cascade-ordered deletion and
//! ownership-gated mutation.

pub mod db;
pub mod logging;
pub mod model;
pub mod policy;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::comment::{Comment, CommentId};
pub use model::memo::{Memo, MemoId};
pub use model::user::{Actor, User, UserId, UserRole};
pub use policy::{authorize, AccessDenied};
pub use repo::comment_repo::{
    CommentRepository, CommentWithLikes, NewComment, SqliteCommentRepository,
};
pub use repo::memo_repo::{MemoRepository, SqliteMemoRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{MutationKind, RepoError, RepoResult};
pub use service::comment_service::{CommentService, CommentServiceError};
pub use service::memo_service::{MemoService, MemoServiceError};
pub use service::view::{CommentView, MemoView};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
