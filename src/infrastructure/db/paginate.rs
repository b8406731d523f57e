//! Paginated, searchable listing over any table.
//!
//! Every identifier that reaches the SQL text comes either from a static
//! [`TableSpec`] or passes [`is_identifier`]; user-supplied values are always bound.

use crate::infrastructure::db::DbPool;
use crate::shared::pagination::{FindAllQuery, Page, QueryError};
use sqlx::mysql::MySqlRow;
use sqlx::{FromRow, MySql, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

/// Static description of a listable table.
#[derive(Debug, Clone, Copy)]
pub struct TableSpec {
    pub table: &'static str,
    /// Selected columns, without the table prefix
    pub columns: &'static [&'static str],
    pub search_fields: &'static [&'static str],
    /// API sort name to column
    pub sort_fields: &'static [(&'static str, &'static str)],
    /// Relation name to join clause
    pub relations: &'static [(&'static str, &'static str)],
    pub soft_delete_column: Option<&'static str>,
    pub created_at_column: &'static str,
}

/// Fields of a joined table included in the free-text search.
#[derive(Debug, Clone)]
pub struct RelationSearch {
    pub table: String,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConditionOperator {
    #[default]
    Equal,
    Like,
    Lt,
    Gt,
    Between,
    In,
    NotIn,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConditionValue {
    Text(String),
    Int(i64),
    Bool(bool),
    Uuid(Uuid),
    DateTime(OffsetDateTime),
    Range(Box<ConditionValue>, Box<ConditionValue>),
    List(Vec<ConditionValue>),
}

#[derive(Debug, Clone)]
pub struct Condition {
    pub field: String,
    pub operator: ConditionOperator,
    pub value: ConditionValue,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: ConditionOperator, value: ConditionValue) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    pub fn equal(field: impl Into<String>, value: ConditionValue) -> Self {
        Self::new(field, ConditionOperator::Equal, value)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    pub relations: Vec<String>,
    pub relation_search: Vec<RelationSearch>,
    pub conditions: Vec<Condition>,
    pub allow_with_deleted: bool,
}

/// `name` or `table.name`, ASCII alphanumerics and underscores only.
pub fn is_identifier(value: &str) -> bool {
    let mut parts = value.split('.');
    let valid = |p: &str| {
        !p.is_empty()
            && p.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            && !p.starts_with(|c: char| c.is_ascii_digit())
    };

    match (parts.next(), parts.next(), parts.next()) {
        (Some(a), None, _) => valid(a),
        (Some(a), Some(b), None) => valid(a) && valid(b),
        _ => false,
    }
}

fn validate(spec: &TableSpec, options: &SearchOptions) -> Result<(), QueryError> {
    let requested = |table: &str| options.relations.iter().any(|r| r == table);
    if !options.relation_search.iter().all(|rs| requested(&rs.table)) {
        return Err(QueryError(
            "Missing required relations for the specified search fields in relations.".to_string(),
        ));
    }

    for relation in &options.relations {
        if !spec.relations.iter().any(|(name, _)| name == relation) {
            return Err(QueryError(format!("Unknown relation: {}", relation)));
        }
    }

    for rs in &options.relation_search {
        if !is_identifier(&rs.table) || !rs.fields.iter().all(|f| is_identifier(f)) {
            return Err(QueryError(format!("Invalid search field in {}", rs.table)));
        }
    }

    for condition in &options.conditions {
        if !is_identifier(&condition.field) {
            return Err(QueryError(format!("Invalid condition field: {}", condition.field)));
        }
    }

    Ok(())
}

fn qualified(spec: &TableSpec, field: &str) -> String {
    if field.contains('.') {
        field.to_string()
    } else {
        format!("{}.{}", spec.table, field)
    }
}

fn push_value(builder: &mut QueryBuilder<'static, MySql>, value: &ConditionValue) -> Result<(), QueryError> {
    match value {
        ConditionValue::Text(v) => {
            builder.push_bind(v.clone());
        }
        ConditionValue::Int(v) => {
            builder.push_bind(*v);
        }
        ConditionValue::Bool(v) => {
            builder.push_bind(*v);
        }
        ConditionValue::Uuid(v) => {
            builder.push_bind(*v);
        }
        ConditionValue::DateTime(v) => {
            builder.push_bind(*v);
        }
        ConditionValue::Range(..) | ConditionValue::List(_) => {
            return Err(QueryError("Condition value must be a scalar".to_string()));
        }
    }
    Ok(())
}

fn push_condition(
    builder: &mut QueryBuilder<'static, MySql>,
    spec: &TableSpec,
    condition: &Condition,
) -> Result<(), QueryError> {
    let column = qualified(spec, &condition.field);

    match (condition.operator, &condition.value) {
        (ConditionOperator::Like, value) => {
            let text = match value {
                ConditionValue::Text(t) => t.clone(),
                ConditionValue::Int(i) => i.to_string(),
                _ => return Err(QueryError("LIKE expects a text value".to_string())),
            };
            builder.push(format!(" AND {} LIKE ", column));
            builder.push_bind(format!("%{}%", text));
        }
        (ConditionOperator::Between, ConditionValue::Range(start, end)) => {
            builder.push(format!(" AND {} BETWEEN ", column));
            push_value(builder, start)?;
            builder.push(" AND ");
            push_value(builder, end)?;
        }
        (ConditionOperator::Between, _) => {
            return Err(QueryError("BETWEEN expects a start and an end".to_string()));
        }
        (ConditionOperator::In | ConditionOperator::NotIn, ConditionValue::List(values)) => {
            if values.is_empty() {
                if condition.operator == ConditionOperator::In {
                    builder.push(" AND 1 = 0");
                }
                return Ok(());
            }
            let keyword = if condition.operator == ConditionOperator::In {
                "IN"
            } else {
                "NOT IN"
            };
            builder.push(format!(" AND {} {} (", column, keyword));
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    builder.push(", ");
                }
                push_value(builder, value)?;
            }
            builder.push(")");
        }
        (ConditionOperator::In | ConditionOperator::NotIn, _) => {
            return Err(QueryError("IN expects a list of values".to_string()));
        }
        (operator, value) => {
            let symbol = match operator {
                ConditionOperator::Lt => "<",
                ConditionOperator::Gt => ">",
                _ => "=",
            };
            builder.push(format!(" AND {} {} ", column, symbol));
            push_value(builder, value)?;
        }
    }

    Ok(())
}

fn push_from_and_filters(
    builder: &mut QueryBuilder<'static, MySql>,
    spec: &TableSpec,
    query: &FindAllQuery,
    options: &SearchOptions,
) -> Result<(), QueryError> {
    builder.push(format!(" FROM {}", spec.table));

    for relation in &options.relations {
        if let Some((_, join)) = spec.relations.iter().find(|(name, _)| name == relation) {
            builder.push(format!(" {}", join));
        }
    }

    builder.push(" WHERE 1 = 1");

    if let Some(column) = spec.soft_delete_column {
        if !(options.allow_with_deleted && query.wants_deleted()) {
            builder.push(format!(" AND {}.{} IS NULL", spec.table, column));
        }
    }

    if let Some(term) = query.search_term() {
        let mut columns: Vec<String> = spec
            .search_fields
            .iter()
            .map(|f| format!("{}.{}", spec.table, f))
            .collect();
        for rs in &options.relation_search {
            columns.extend(rs.fields.iter().map(|f| format!("{}.{}", rs.table, f)));
        }

        if !columns.is_empty() {
            let pattern = format!("%{}%", term.to_lowercase());
            builder.push(" AND (");
            for (i, column) in columns.iter().enumerate() {
                if i > 0 {
                    builder.push(" OR ");
                }
                builder.push(format!("LOWER({}) LIKE ", column));
                builder.push_bind(pattern.clone());
            }
            builder.push(")");
        }
    }

    for condition in &options.conditions {
        push_condition(builder, spec, condition)?;
    }

    Ok(())
}

/// Row query for one page.
pub fn build_select(
    spec: &TableSpec,
    query: &FindAllQuery,
    options: &SearchOptions,
) -> Result<QueryBuilder<'static, MySql>, QueryError> {
    validate(spec, options)?;

    let distinct = if options.relations.is_empty() { "" } else { "DISTINCT " };
    let columns = spec
        .columns
        .iter()
        .map(|c| format!("{}.{}", spec.table, c))
        .collect::<Vec<_>>()
        .join(", ");

    let mut builder = QueryBuilder::new(format!("SELECT {}{}", distinct, columns));
    push_from_and_filters(&mut builder, spec, query, options)?;

    let order = match (query.sort, query.sort_field.as_deref()) {
        (Some(sort), Some(field)) => {
            let column = spec
                .sort_fields
                .iter()
                .find(|(name, _)| *name == field)
                .map(|(_, column)| *column)
                .ok_or_else(|| QueryError(format!("Invalid sort field: {}", field)))?;
            format!("{}.{} {}", spec.table, column, sort.as_sql())
        }
        _ => format!("{}.{} DESC", spec.table, spec.created_at_column),
    };

    builder.push(format!(" ORDER BY {}", order));
    builder.push(" LIMIT ");
    builder.push_bind(query.limit());
    builder.push(" OFFSET ");
    builder.push_bind(query.offset());

    Ok(builder)
}

/// Total matching rows, ignoring pagination.
pub fn build_count(
    spec: &TableSpec,
    query: &FindAllQuery,
    options: &SearchOptions,
) -> Result<QueryBuilder<'static, MySql>, QueryError> {
    validate(spec, options)?;

    let select = if options.relations.is_empty() {
        "SELECT COUNT(*)".to_string()
    } else {
        format!("SELECT COUNT(DISTINCT {}.id)", spec.table)
    };

    let mut builder = QueryBuilder::new(select);
    push_from_and_filters(&mut builder, spec, query, options)?;
    Ok(builder)
}

/// Runs the count and page queries and assembles a [`Page`].
///
/// Invalid requests and query execution failures surface as [`QueryError`].
pub async fn find_with_pagination_and_search<T>(
    pool: &DbPool,
    spec: &TableSpec,
    query: &FindAllQuery,
    options: &SearchOptions,
) -> Result<Page<T>, QueryError>
where
    T: for<'r> FromRow<'r, MySqlRow> + Send + Unpin,
{
    let mut count = build_count(spec, query, options)?;
    let total: i64 = count
        .build_query_scalar::<i64>()
        .fetch_one(pool)
        .await
        .map_err(|e| QueryError(e.to_string()))?;

    let mut select = build_select(spec, query, options)?;
    let items: Vec<T> = select
        .build_query_as::<T>()
        .fetch_all(pool)
        .await
        .map_err(|e| QueryError(e.to_string()))?;

    Ok(Page::new(items, total, query.page(), query.limit()))
}
