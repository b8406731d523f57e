use crate::infrastructure::state::AppState;
use crate::presentation::handlers;
use crate::presentation::middleware::{cors::cors_layer, i18n};
use crate::presentation::openapi::ApiDoc;
use crate::presentation::routes;
use axum::{Router, middleware, routing::get};
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(handlers::health::health_check))
        .nest("/api/v1/auth", routes::auth::routes())
        .nest("/api/v1/users", routes::users::routes())
        .layer(middleware::from_fn(i18n::locale))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
