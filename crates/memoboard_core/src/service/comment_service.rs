//! Comment use-case service.
//!
//! # Responsibility
//! - Provide comment create/update/delete/like APIs.
//!
//! # Invariants
//! - Replies are validated against their parent (same memo, one
//!   nesting level) before the insert.
//! - Like counts returned here are always derived from the like table.

use crate::model::comment::CommentId;
use crate::model::memo::MemoId;
use crate::model::user::{Actor, UserId};
use crate::repo::comment_repo::{CommentRepository, CommentWithLikes, NewComment};
use crate::repo::{MutationKind, RepoError};
use crate::service::view::CommentView;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for comment use-cases.
#[derive(Debug)]
pub enum CommentServiceError {
    /// Target memo does not exist.
    MemoNotFound(MemoId),
    /// Target or parent comment does not exist.
    CommentNotFound(CommentId),
    /// Parent reference is unusable (different memo, nested reply).
    InvalidParent(String),
    /// Actor is authenticated but not permitted to perform the mutation.
    Denied(MutationKind),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for CommentServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MemoNotFound(id) => write!(f, "memo not found: {id}"),
            Self::CommentNotFound(id) => write!(f, "comment not found: {id}"),
            Self::InvalidParent(details) => write!(f, "invalid parent comment: {details}"),
            Self::Denied(op) => write!(f, "{op} denied: actor is not the owner"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent comment state: {details}"),
        }
    }
}

impl Error for CommentServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for CommentServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::MemoNotFound(id) => Self::MemoNotFound(id),
            RepoError::CommentNotFound(id) => Self::CommentNotFound(id),
            RepoError::Denied { op, .. } => Self::Denied(op),
            RepoError::InvalidParent { parent, details } => {
                Self::InvalidParent(format!("{parent} {details}"))
            }
            other => Self::Repo(other),
        }
    }
}

/// Comment service facade over repository implementations.
pub struct CommentService<R: CommentRepository> {
    repo: R,
}

impl<R: CommentRepository> CommentService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one comment (top-level or reply) on a memo.
    pub fn create_comment(
        &mut self,
        memo_id: MemoId,
        parent_id: Option<CommentId>,
        content: impl Into<String>,
        actor: &Actor,
    ) -> Result<CommentView, CommentServiceError> {
        let request = NewComment {
            memo_id,
            parent_id,
            content: content.into(),
        };
        let id = self.repo.create_comment(&request, actor)?;
        info!(
            "event=comment_create module=service status=ok comment_id={id} memo_id={memo_id} user_id={}",
            actor.user_id
        );
        self.view_after_write(id, "created comment not found in read-back")
    }

    /// Replaces comment content; owner or admin only.
    pub fn update_comment(
        &mut self,
        id: CommentId,
        content: impl Into<String>,
        actor: &Actor,
    ) -> Result<CommentView, CommentServiceError> {
        let content = content.into();
        self.repo.update_comment(id, content.as_str(), actor)?;
        info!(
            "event=comment_update module=service status=ok comment_id={id} user_id={}",
            actor.user_id
        );
        self.view_after_write(id, "updated comment not found in read-back")
    }

    /// Deletes a comment with its replies and all their likes; owner or
    /// admin only.
    pub fn delete_comment(&mut self, id: CommentId, actor: &Actor) -> Result<(), CommentServiceError> {
        self.repo.delete_comment(id, actor)?;
        info!(
            "event=comment_delete module=service status=ok comment_id={id} user_id={}",
            actor.user_id
        );
        Ok(())
    }

    /// Toggles the actor's like on a comment and returns the derived
    /// post-mutation count.
    pub fn toggle_like(
        &mut self,
        id: CommentId,
        user_id: UserId,
    ) -> Result<i64, CommentServiceError> {
        let count = self.repo.toggle_like(id, user_id)?;
        info!(
            "event=comment_like_toggle module=service status=ok comment_id={id} user_id={user_id} count={count}"
        );
        Ok(count)
    }

    /// Gets one comment view by id.
    pub fn get_comment(&self, id: CommentId) -> Result<CommentView, CommentServiceError> {
        let entry: CommentWithLikes = self
            .repo
            .get_comment(id)?
            .ok_or(CommentServiceError::CommentNotFound(id))?;
        Ok(CommentView::from(entry))
    }

    fn view_after_write(
        &self,
        id: CommentId,
        details: &'static str,
    ) -> Result<CommentView, CommentServiceError> {
        let entry = self
            .repo
            .get_comment(id)?
            .ok_or(CommentServiceError::InconsistentState(details))?;
        Ok(CommentView::from(entry))
    }
}
