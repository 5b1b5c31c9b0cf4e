//! Role policy for ownership-gated mutations.
//!
//! # Responsibility
//! - Decide whether an actor may mutate a resource owned by someone.
//!
//! # Invariants
//! - Pure function, no side effects.
//! - Must run before any mutating write; read paths bypass it.
//! - Admins are always allowed; regular users only on their own
//!   resources.

use crate::model::user::{Actor, UserId, UserRole};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Denial reason returned when a mutation is not permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDenied {
    /// Actor has the `User` role and does not own the resource.
    NotOwner,
}

impl Display for AccessDenied {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotOwner => write!(f, "actor does not own the target resource"),
        }
    }
}

impl Error for AccessDenied {}

/// Decides whether `actor` may mutate a resource owned by
/// `resource_owner`.
pub fn authorize(actor: &Actor, resource_owner: UserId) -> Result<(), AccessDenied> {
    match actor.role {
        UserRole::Admin => Ok(()),
        UserRole::User if actor.user_id == resource_owner => Ok(()),
        UserRole::User => Err(AccessDenied::NotOwner),
    }
}

#[cfg(test)]
mod tests {
    use super::{authorize, AccessDenied};
    use crate::model::user::{Actor, UserRole};
    use uuid::Uuid;

    fn actor(role: UserRole) -> Actor {
        Actor::new(Uuid::new_v4(), "tester", role)
    }

    #[test]
    fn owner_is_allowed() {
        let actor = actor(UserRole::User);
        assert_eq!(authorize(&actor, actor.user_id), Ok(()));
    }

    #[test]
    fn non_owner_user_is_denied() {
        let actor = actor(UserRole::User);
        assert_eq!(
            authorize(&actor, Uuid::new_v4()),
            Err(AccessDenied::NotOwner)
        );
    }

    #[test]
    fn admin_is_allowed_regardless_of_ownership() {
        let actor = actor(UserRole::Admin);
        assert_eq!(authorize(&actor, Uuid::new_v4()), Ok(()));
    }
}
