use crate::application::users::create::{CreateUserRequest, CreateUserUseCase};
use crate::application::users::delete::DeleteUserUseCase;
use crate::application::users::get::GetUserUseCase;
use crate::application::users::list::{ListUsersQuery, ListUsersUseCase};
use crate::application::users::restore::RestoreUserUseCase;
use crate::application::users::update::{UpdateUserRequest, UpdateUserUseCase};
use crate::infrastructure::state::AppState;
use crate::presentation::dtos::UserResource;
use crate::presentation::extractors::AuthUser;
use crate::shared::error::{AppError, ErrorResponse};
use crate::shared::pagination::{Page, PaginationLinkBuilder};
use crate::shared::query::Qs;
use crate::shared::response::ApiResponse;
use crate::shared::validation::ValidatedJson;
use axum::{
    Json,
    extract::{OriginalUri, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteUserParams {
    /// Permanently delete instead of soft deleting (admin only)
    pub force: Option<bool>,
}

/// Create a user (admin only)
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserResource>),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 409, description = "Email already exists", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let use_case = CreateUserUseCase::new(state.user_repo.clone(), state.password_service.clone());
    let user = use_case.execute(req, &auth.user).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::created(
            "User created successfully",
            UserResource::from(user),
        )),
    ))
}

/// List users with search, filters and pagination
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Page of users", body = ApiResponse<Page<UserResource>>),
        (status = 400, description = "Invalid query", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    auth: AuthUser,
    Qs(query): Qs<ListUsersQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = ListUsersUseCase::new(state.user_repo.clone())
        .execute(query, &auth.user)
        .await?;

    let links = PaginationLinkBuilder::from_uri(&uri, page.page, page.limit, page.total).build();

    Ok(Json(
        ApiResponse::ok("Users found successfully", page.map(UserResource::from)).with_links(links),
    ))
}

/// Get a user by id
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User found", body = ApiResponse<UserResource>),
        (status = 403, description = "Not your account", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let user = GetUserUseCase::new(state.user_repo.clone())
        .execute(id, &auth.user)
        .await?;

    Ok(Json(ApiResponse::ok(
        "User found successfully",
        UserResource::from(user),
    )))
}

/// Partially update a user
#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<UserResource>),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 403, description = "Not allowed", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Email already exists", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let use_case = UpdateUserUseCase::new(state.user_repo.clone(), state.password_service.clone());
    let user = use_case.execute(id, req, &auth.user).await?;

    Ok(Json(ApiResponse::ok(
        "User updated successfully",
        UserResource::from(user),
    )))
}

/// Soft delete a user, or remove it for good with `?force=true`
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = Uuid, Path, description = "User id"), DeleteUserParams),
    responses(
        (status = 200, description = "User deleted", body = ApiResponse<serde_json::Value>),
        (status = 403, description = "Not allowed", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth: AuthUser,
    Qs(params): Qs<DeleteUserParams>,
) -> Result<impl IntoResponse, AppError> {
    DeleteUserUseCase::new(state.user_repo.clone(), state.refresh_token_repo.clone())
        .execute(id, params.force.unwrap_or(false), &auth.user)
        .await?;

    Ok(Json(ApiResponse::ok(
        "User deleted successfully",
        serde_json::Value::Null,
    )))
}

/// Restore a soft-deleted user (admin only)
#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}/restore",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User restored", body = ApiResponse<UserResource>),
        (status = 403, description = "Admin only", body = ErrorResponse),
        (status = 404, description = "No deleted user with this id", body = ErrorResponse),
        (status = 409, description = "Email taken by an active user", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn restore_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let user = RestoreUserUseCase::new(state.user_repo.clone())
        .execute(id, &auth.user)
        .await?;

    Ok(Json(ApiResponse::ok(
        "User restored successfully",
        UserResource::from(user),
    )))
}
