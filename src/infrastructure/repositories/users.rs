use crate::domain::users::{
    DuplicateEmail, NewUser, UpdateUser, User, UserFilter, UserRepository, normalize_email,
};
use crate::infrastructure::db::DbPool;
use crate::infrastructure::db::models::users::{USER_COLUMNS, UserDbModel};
use crate::infrastructure::db::paginate::{
    Condition, ConditionOperator, ConditionValue, SearchOptions, TableSpec,
    find_with_pagination_and_search,
};
use crate::shared::pagination::{FindAllQuery, Page};
use async_trait::async_trait;
use uuid::Uuid;

pub const USERS_TABLE: TableSpec = TableSpec {
    table: "users",
    columns: &[
        "id",
        "name",
        "email",
        "password_hash",
        "role",
        "created_at",
        "updated_at",
        "deleted_at",
    ],
    search_fields: &["name", "email"],
    sort_fields: &[
        ("id", "id"),
        ("name", "name"),
        ("email", "email"),
        ("role", "role"),
        ("createdAt", "created_at"),
        ("updatedAt", "updated_at"),
    ],
    relations: &[(
        "refresh_tokens",
        "LEFT JOIN refresh_tokens ON refresh_tokens.user_id = users.id",
    )],
    soft_delete_column: Some("deleted_at"),
    created_at_column: "created_at",
};

/// Search options for a user listing.
pub fn user_search_options(filter: &UserFilter) -> SearchOptions {
    let mut conditions = Vec::new();

    if let Some(role) = filter.role {
        conditions.push(Condition::equal(
            "role",
            ConditionValue::Text(role.as_str().to_string()),
        ));
    }
    if let Some(after) = filter.created_after {
        conditions.push(Condition::new(
            "created_at",
            ConditionOperator::Gt,
            ConditionValue::DateTime(after),
        ));
    }
    if let Some(before) = filter.created_before {
        conditions.push(Condition::new(
            "created_at",
            ConditionOperator::Lt,
            ConditionValue::DateTime(before),
        ));
    }

    SearchOptions {
        conditions,
        allow_with_deleted: filter.allow_with_deleted,
        ..Default::default()
    }
}

fn map_unique_violation(err: sqlx::Error) -> anyhow::Error {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => DuplicateEmail.into(),
        _ => err.into(),
    }
}

#[derive(Clone)]
pub struct MySqlUserRepository {
    pool: DbPool,
}

impl MySqlUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, id: Uuid, include_deleted: bool) -> Result<Option<User>, anyhow::Error> {
        let sql = if include_deleted {
            format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS)
        } else {
            format!(
                "SELECT {} FROM users WHERE id = ? AND deleted_at IS NULL",
                USER_COLUMNS
            )
        };

        let row = sqlx::query_as::<_, UserDbModel>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(User::try_from).transpose()
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    #[tracing::instrument(skip(self, new_user), fields(email = %new_user.email))]
    async fn create(&self, new_user: NewUser) -> Result<User, anyhow::Error> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, role)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(&new_user.name)
        .bind(normalize_email(&new_user.email))
        .bind(&new_user.password_hash)
        .bind(new_user.role.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        self.fetch(id, true)
            .await?
            .ok_or_else(|| anyhow::anyhow!("User {} missing after insert", id))
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, anyhow::Error> {
        self.fetch(id, false).await
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_id_with_deleted(&self, id: Uuid) -> Result<Option<User>, anyhow::Error> {
        self.fetch(id, true).await
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, anyhow::Error> {
        let sql = format!(
            "SELECT {} FROM users WHERE email = ? AND deleted_at IS NULL",
            USER_COLUMNS
        );

        let row = sqlx::query_as::<_, UserDbModel>(&sql)
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await?;

        row.map(User::try_from).transpose()
    }

    #[tracing::instrument(skip(self, filter))]
    async fn list(
        &self,
        query: &FindAllQuery,
        filter: &UserFilter,
    ) -> Result<Page<User>, anyhow::Error> {
        let options = user_search_options(filter);
        let page = find_with_pagination_and_search::<UserDbModel>(
            &self.pool,
            &USERS_TABLE,
            query,
            &options,
        )
        .await?;

        let items = page
            .items
            .into_iter()
            .map(User::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(items, page.total, page.page, page.limit))
    }

    #[tracing::instrument(skip(self, update))]
    async fn update(&self, id: Uuid, update: UpdateUser) -> Result<User, anyhow::Error> {
        let mut updates = Vec::new();

        if update.name.is_some() {
            updates.push("name = ?");
        }
        if update.email.is_some() {
            updates.push("email = ?");
        }
        if update.password_hash.is_some() {
            updates.push("password_hash = ?");
        }
        if update.role.is_some() {
            updates.push("role = ?");
        }
        updates.push("updated_at = CURRENT_TIMESTAMP(6)");

        let query = format!(
            "UPDATE users SET {} WHERE id = ? AND deleted_at IS NULL",
            updates.join(", ")
        );

        let mut statement = sqlx::query(&query);

        if let Some(name) = update.name {
            statement = statement.bind(name);
        }
        if let Some(email) = update.email {
            statement = statement.bind(normalize_email(&email));
        }
        if let Some(password_hash) = update.password_hash {
            statement = statement.bind(password_hash);
        }
        if let Some(role) = update.role {
            statement = statement.bind(role.as_str());
        }
        statement = statement.bind(id);

        statement
            .execute(&self.pool)
            .await
            .map_err(map_unique_violation)?;

        self.fetch(id, false)
            .await?
            .ok_or_else(|| anyhow::anyhow!("User {} not found", id))
    }

    #[tracing::instrument(skip(self))]
    async fn soft_delete(&self, id: Uuid) -> Result<bool, anyhow::Error> {
        let result = sqlx::query(
            "UPDATE users SET deleted_at = CURRENT_TIMESTAMP(6) WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self))]
    async fn restore(&self, id: Uuid) -> Result<bool, anyhow::Error> {
        let result = sqlx::query(
            "UPDATE users SET deleted_at = NULL WHERE id = ? AND deleted_at IS NOT NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> Result<bool, anyhow::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
