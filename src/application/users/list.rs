use crate::application::repo_error;
use crate::domain::users::{Role, User, UserFilter, UserRepository};
use crate::shared::error::AppError;
use crate::shared::pagination::{FindAllQuery, Page, SortOrder};
use serde::Deserialize;
use std::sync::Arc;
use time::OffsetDateTime;
use utoipa::{IntoParams, ToSchema};

/// `filter[...]` part of the user listing query
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserFilterParams {
    pub role: Option<Role>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_after: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_before: Option<OffsetDateTime>,
}

/// Query string of `GET /users`, e.g.
/// `?page=2&limit=20&query=john&filter[role]=admin&sort=ASC&sortField=name`
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    pub query: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort: Option<SortOrder>,
    pub sort_field: Option<String>,
    pub with_deleted: Option<String>,
    #[param(value_type = Option<Object>, style = DeepObject, explode)]
    pub filter: Option<UserFilterParams>,
}

impl ListUsersQuery {
    fn split(self) -> (FindAllQuery, UserFilterParams) {
        (
            FindAllQuery {
                query: self.query,
                page: self.page,
                limit: self.limit,
                sort: self.sort,
                sort_field: self.sort_field,
                with_deleted: self.with_deleted,
            },
            self.filter.unwrap_or_default(),
        )
    }
}

pub struct ListUsersUseCase {
    repo: Arc<dyn UserRepository>,
}

impl ListUsersUseCase {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    #[tracing::instrument(skip(self, query, actor), fields(actor = %actor.id))]
    pub async fn execute(&self, query: ListUsersQuery, actor: &User) -> Result<Page<User>, AppError> {
        let (find_all, params) = query.split();
        let filter = UserFilter {
            role: params.role,
            created_after: params.created_after,
            created_before: params.created_before,
            allow_with_deleted: actor.is_admin(),
        };

        self.repo.list(&find_all, &filter).await.map_err(repo_error)
    }
}
