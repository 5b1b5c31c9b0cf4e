//! Memo use-case service.
//!
//! # Responsibility
//! - Provide memo create/get/list/update/delete/like APIs.
//! - Assemble memo views with top-level comments for read responses.
//!
//! # Invariants
//! - Memo list is always sorted newest-modified first.
//! - Reads bypass the role policy; every mutation is gated by it
//!   inside the repository transaction.
//! - Like toggling is strict: two consecutive calls by the same actor
//!   restore the original state and count.

use crate::model::memo::MemoId;
use crate::model::user::{Actor, UserId};
use crate::repo::memo_repo::MemoRepository;
use crate::repo::{MutationKind, RepoError};
use crate::service::view::MemoView;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for memo use-cases.
#[derive(Debug)]
pub enum MemoServiceError {
    /// Target memo does not exist.
    MemoNotFound(MemoId),
    /// Actor is authenticated but not permitted to perform the mutation.
    Denied(MutationKind),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for MemoServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MemoNotFound(id) => write!(f, "memo not found: {id}"),
            Self::Denied(op) => write!(f, "{op} denied: actor is not the owner"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent memo state: {details}"),
        }
    }
}

impl Error for MemoServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for MemoServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::MemoNotFound(id) => Self::MemoNotFound(id),
            RepoError::Denied { op, .. } => Self::Denied(op),
            other => Self::Repo(other),
        }
    }
}

/// Memo service facade over repository implementations.
pub struct MemoService<R: MemoRepository> {
    repo: R,
}

impl<R: MemoRepository> MemoService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one memo owned by the actor.
    pub fn create_memo(
        &self,
        content: impl Into<String>,
        actor: &Actor,
    ) -> Result<MemoView, MemoServiceError> {
        let content = content.into();
        let id = self.repo.create_memo(content.as_str(), actor)?;
        info!(
            "event=memo_create module=service status=ok memo_id={id} user_id={}",
            actor.user_id
        );
        self.view_after_write(id, "created memo not found in read-back")
    }

    /// Gets one memo view by id; replies are filtered out of the
    /// comment list.
    pub fn get_memo(&self, id: MemoId) -> Result<MemoView, MemoServiceError> {
        self.view_of(id)
    }

    /// Lists all memos newest-modified first, each with its top-level
    /// comments.
    pub fn list_memos(&self) -> Result<Vec<MemoView>, MemoServiceError> {
        let memos = self.repo.list_memos()?;
        let mut views = Vec::with_capacity(memos.len());
        for memo in memos {
            let comments = self.repo.comments_with_likes(memo.uuid)?;
            views.push(MemoView::assemble(memo, comments));
        }
        Ok(views)
    }

    /// Replaces memo content; owner or admin only.
    pub fn update_memo(
        &mut self,
        id: MemoId,
        content: impl Into<String>,
        actor: &Actor,
    ) -> Result<MemoView, MemoServiceError> {
        let content = content.into();
        self.repo.update_memo(id, content.as_str(), actor)?;
        info!(
            "event=memo_update module=service status=ok memo_id={id} user_id={}",
            actor.user_id
        );
        self.view_after_write(id, "updated memo not found in read-back")
    }

    /// Deletes a memo with all its comments and likes; owner or admin
    /// only.
    pub fn delete_memo(&mut self, id: MemoId, actor: &Actor) -> Result<(), MemoServiceError> {
        self.repo.delete_memo(id, actor)?;
        info!(
            "event=memo_delete module=service status=ok memo_id={id} user_id={}",
            actor.user_id
        );
        Ok(())
    }

    /// Toggles the actor's like on a memo and returns the post-mutation
    /// count.
    pub fn toggle_like(&mut self, id: MemoId, user_id: UserId) -> Result<i64, MemoServiceError> {
        let count = self.repo.toggle_like(id, user_id)?;
        info!(
            "event=memo_like_toggle module=service status=ok memo_id={id} user_id={user_id} count={count}"
        );
        Ok(count)
    }

    fn view_of(&self, id: MemoId) -> Result<MemoView, MemoServiceError> {
        let memo = self
            .repo
            .get_memo(id)?
            .ok_or(MemoServiceError::MemoNotFound(id))?;
        let comments = self.repo.comments_with_likes(id)?;
        Ok(MemoView::assemble(memo, comments))
    }

    fn view_after_write(
        &self,
        id: MemoId,
        details: &'static str,
    ) -> Result<MemoView, MemoServiceError> {
        let memo = self
            .repo
            .get_memo(id)?
            .ok_or(MemoServiceError::InconsistentState(details))?;
        let comments = self.repo.comments_with_likes(id)?;
        Ok(MemoView::assemble(memo, comments))
    }
}
