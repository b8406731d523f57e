pub mod auth;
pub mod keys;
pub mod users;

#[cfg(test)]
pub(crate) mod test_support;

use crate::domain::users::DuplicateEmail;
use crate::shared::error::AppError;
use crate::shared::pagination::QueryError;

/// Map a repository failure onto the HTTP-facing error.
pub fn repo_error(err: anyhow::Error) -> AppError {
    if err.downcast_ref::<DuplicateEmail>().is_some() {
        return AppError::Conflict("Email already exists".to_string());
    }
    match err.downcast::<QueryError>() {
        Ok(QueryError(message)) => AppError::BadRequest(message),
        Err(err) => AppError::InternalServerError(err),
    }
}
