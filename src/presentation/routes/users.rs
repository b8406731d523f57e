use crate::infrastructure::state::AppState;
use crate::presentation::handlers::users;
use axum::{
    Router,
    routing::{get, patch, post},
};

/// User routes - handles user CRUD operations
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(users::create_user).get(users::list_users))
        .route(
            "/{id}",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        .route("/{id}/restore", patch(users::restore_user))
}
