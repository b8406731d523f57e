pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod restore;
pub mod update;

use crate::domain::users::User;
use crate::shared::error::AppError;
use uuid::Uuid;

fn forbidden() -> AppError {
    AppError::Forbidden("Insufficient permissions".to_string())
}

pub(crate) fn ensure_admin(actor: &User) -> Result<(), AppError> {
    if actor.is_admin() { Ok(()) } else { Err(forbidden()) }
}

/// Admins may act on anyone, everybody else only on themselves.
pub(crate) fn ensure_self_or_admin(actor: &User, target: Uuid) -> Result<(), AppError> {
    if actor.is_admin() || actor.id == target {
        Ok(())
    } else {
        Err(forbidden())
    }
}
