use crate::application::auth::login::LoginRequest;
use crate::application::auth::refresh::RefreshResponse;
use crate::application::auth::register::RegisterRequest;
use crate::application::users::create::CreateUserRequest;
use crate::application::users::list::UserFilterParams;
use crate::application::users::update::UpdateUserRequest;
use crate::domain::users::Role;
use crate::presentation::dtos::{AuthResource, UserResource};
use crate::shared::error::{ErrorObject, ErrorResponse};
use crate::shared::pagination::SortOrder;
use crate::shared::response::PageLinks;
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Boilerplate API",
        version = "0.1.0",
        description = "User accounts, JWT authentication with rotating signing keys, refresh tokens and OAuth sign-in."
    ),
    paths(
        crate::presentation::handlers::health::health_check,
        crate::presentation::handlers::auth::register,
        crate::presentation::handlers::auth::login,
        crate::presentation::handlers::auth::refresh_token,
        crate::presentation::handlers::auth::logout,
        crate::presentation::handlers::auth::logout_all,
        crate::presentation::handlers::oauth::authorize,
        crate::presentation::handlers::oauth::callback,
        crate::presentation::handlers::users::create_user,
        crate::presentation::handlers::users::list_users,
        crate::presentation::handlers::users::get_user,
        crate::presentation::handlers::users::update_user,
        crate::presentation::handlers::users::delete_user,
        crate::presentation::handlers::users::restore_user,
    ),
    components(
        schemas(
            Role,
            SortOrder,
            RegisterRequest,
            LoginRequest,
            RefreshResponse,
            CreateUserRequest,
            UpdateUserRequest,
            UserFilterParams,
            UserResource,
            AuthResource,
            PageLinks,
            ErrorResponse,
            ErrorObject,
        )
    ),
    tags(
        (name = "health", description = "Liveness and database connectivity"),
        (name = "auth", description = "Registration, login and token refresh"),
        (name = "oauth", description = "Google, GitHub and Facebook sign-in"),
        (name = "users", description = "User management endpoints")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
