use crate::infrastructure::state::AppState;
use crate::presentation::handlers::{auth, oauth};
use axum::{
    Router,
    routing::{get, post},
};

/// Auth routes: credentials, refresh cookie and OAuth providers
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh_token))
        .route("/logout", post(auth::logout))
        .route("/logout-all", post(auth::logout_all))
        .route("/{provider}", get(oauth::authorize))
        .route("/{provider}/callback", get(oauth::callback))
}
