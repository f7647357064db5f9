use std::{collections::HashMap, fmt, str::FromStr};

use anyhow::Context;
use derive_builder::Builder;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow},
    FromRow,
};

use crate::error::QueryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    Real,
    Text,
}

impl FieldKind {
    /// Turn a raw query string value into something the store compares natively.
    ///
    /// Booleans are stored as 0/1, so `true`/`false`/`1`/`0` (any case) are
    /// accepted and bound as integers.
    pub fn coerce(self, raw: &str) -> Option<FilterValue> {
        let trimmed = raw.trim();
        match self {
            Self::Bool => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "1" => Some(FilterValue::Bool(true)),
                "false" | "0" => Some(FilterValue::Bool(false)),
                _ => None,
            },
            Self::Real => trimmed
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(FilterValue::Real),
            Self::Text => Some(FilterValue::Text(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl Field {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

/// One entry of the select list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    cast: Option<&'static str>,
}

impl Column {
    pub const fn plain(name: &'static str) -> Self {
        Self { name, cast: None }
    }

    /// A numeric column decoded as `f64`. `NUMERIC` and `INTEGER` columns
    /// hand whole numbers back as integers, so the value is cast on the way out.
    pub const fn real(name: &'static str) -> Self {
        Self {
            name,
            cast: Some("REAL"),
        }
    }

    fn select_expr(&self) -> String {
        match self.cast {
            Some(ty) => format!("CAST({0} AS {ty}) AS {0}", self.name),
            None => self.name.to_string(),
        }
    }
}

/// Per-table metadata driving the generic query.
///
/// Table and column names only ever reach SQL from here, so they are never
/// influenced by request input.
#[derive(Debug, Clone, Copy)]
pub struct EntityConfig {
    pub table: &'static str,
    /// JSON key wrapping a single record
    pub singular: &'static str,
    /// JSON key wrapping a list of records
    pub plural: &'static str,
    pub columns: &'static [Column],
    pub filters: &'static [Field],
    pub sorts: &'static [&'static str],
}

impl EntityConfig {
    pub fn filter(&self, name: &str) -> Option<&'static Field> {
        self.filters.iter().find(|field| field.name == name)
    }

    pub fn sort(&self, name: &str) -> Option<&'static str> {
        self.sorts.iter().copied().find(|field| *field == name)
    }
}

pub trait Entity: for<'r> FromRow<'r, SqliteRow> + serde::Serialize + Send + Unpin {
    const CONFIG: EntityConfig;
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Bool(bool),
    Real(f64),
    Text(String),
}

impl FilterValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Bool(_) => FieldKind::Bool,
            Self::Real(_) => FieldKind::Real,
            Self::Text(_) => FieldKind::Text,
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Real(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub value: FilterValue,
}

/// Equality predicates, all of which must hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters(Vec<Filter>);

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: FilterValue) -> Self {
        self.0.push(Filter {
            field: field.into(),
            value,
        });
        self
    }

    /// Pick the filterable fields of `config` out of query string parameters.
    ///
    /// Parameters that don't name a filterable field are ignored, and absent
    /// fields add no predicate.
    pub fn from_params(
        config: &EntityConfig,
        params: &HashMap<String, String>,
    ) -> Result<Self, QueryError> {
        let mut filters = Self::new();
        for field in config.filters {
            let Some(raw) = params.get(field.name) else {
                continue;
            };
            let value = field
                .kind
                .coerce(raw)
                .ok_or_else(|| QueryError::InvalidFilter {
                    field: field.name.to_string(),
                    value: raw.clone(),
                })?;
            filters = filters.with(field.name, value);
        }
        Ok(filters)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Filter> {
        self.0.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortBy {
    pub field: String,
    pub direction: Direction,
}

impl SortBy {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Desc,
        }
    }
}

/// What to fetch. When several are set, `id` wins over `filters`, which wins
/// over `sort_by`. With none set every row is returned.
#[derive(Debug, Clone, Default, Builder)]
#[builder(default, build_fn(error = "QueryError"))]
pub struct QueryProps {
    #[builder(setter(into, strip_option))]
    pub id: Option<i64>,
    #[builder(setter(into, strip_option))]
    pub filters: Option<Filters>,
    #[builder(setter(into, strip_option))]
    pub sort_by: Option<SortBy>,
}

#[derive(Debug, PartialEq)]
pub enum Outcome<E> {
    One(E),
    /// never empty
    Many(Vec<E>),
    Empty,
}

impl<E> Outcome<E> {
    fn from_rows(rows: Vec<E>) -> Self {
        if rows.is_empty() {
            Self::Empty
        } else {
            Self::Many(rows)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn into_rows(self) -> Vec<E> {
        match self {
            Self::One(row) => vec![row],
            Self::Many(rows) => rows,
            Self::Empty => Vec::new(),
        }
    }

    pub fn require_many(self, not_found: impl Into<String>) -> Result<Vec<E>, QueryError> {
        let rows = self.into_rows();
        if rows.is_empty() {
            return Err(QueryError::NotFound(not_found.into()));
        }
        Ok(rows)
    }

    pub fn require_one(self, not_found: impl Into<String>) -> Result<E, QueryError> {
        self.into_rows()
            .into_iter()
            .next()
            .ok_or_else(|| QueryError::NotFound(not_found.into()))
    }
}

/// Render the statement for `props`, leaving every value as a `?` placeholder.
pub fn select_sql(config: &EntityConfig, props: &QueryProps) -> Result<String, QueryError> {
    let columns: Vec<String> = config.columns.iter().map(Column::select_expr).collect();
    let mut sql = format!("SELECT {} FROM {}", columns.join(", "), config.table);

    if props.id.is_some() {
        sql.push_str(" WHERE id = ?");
    } else if let Some(filters) = &props.filters {
        let mut predicates = Vec::new();
        for filter in filters.iter() {
            let field = config
                .filter(&filter.field)
                .ok_or_else(|| QueryError::UnknownField(filter.field.clone()))?;
            if field.kind != filter.value.kind() {
                return Err(QueryError::InvalidFilter {
                    field: filter.field.clone(),
                    value: filter.value.to_string(),
                });
            }
            predicates.push(format!("{} = ?", field.name));
        }
        if !predicates.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&predicates.join(" AND "));
        }
        sql.push_str(" ORDER BY id ASC");
    } else if let Some(sort) = &props.sort_by {
        let field = config
            .sort(&sort.field)
            .ok_or_else(|| QueryError::UnknownField(sort.field.clone()))?;
        sql.push_str(&format!(
            " ORDER BY {field} {}, id ASC",
            sort.direction.as_sql()
        ));
    } else {
        sql.push_str(" ORDER BY id ASC");
    }

    Ok(sql)
}

#[tracing::instrument(level = "debug", skip(pool), fields(table = E::CONFIG.table))]
pub async fn query<E: Entity>(
    pool: &SqlitePool,
    props: QueryProps,
) -> Result<Outcome<E>, QueryError> {
    let sql = select_sql(&E::CONFIG, &props)?;
    tracing::debug!("{sql}");

    let mut query = sqlx::query_as::<_, E>(&sql);

    if let Some(id) = props.id {
        let row = query.bind(id).fetch_optional(pool).await?;
        return Ok(row.map_or(Outcome::Empty, Outcome::One));
    }

    if let Some(filters) = &props.filters {
        for filter in filters.iter() {
            query = match &filter.value {
                FilterValue::Bool(v) => query.bind(*v),
                FilterValue::Real(v) => query.bind(*v),
                FilterValue::Text(v) => query.bind(v.clone()),
            };
        }
    }

    let rows = query.fetch_all(pool).await?;
    Ok(Outcome::from_rows(rows))
}

/// Open the store read-only. The database file has to exist already.
pub async fn connect(url: &str) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)
        .with_context(|| format!("invalid database url {url}"))?
        .read_only(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .with_context(|| format!("fail to open database {url}"))?;
    Ok(pool)
}

/// Fail early when the store lacks a table the server is going to query.
pub async fn ensure_tables(pool: &SqlitePool, tables: &[&EntityConfig]) -> anyhow::Result<()> {
    for config in tables {
        let found: Option<(String,)> =
            sqlx::query_as("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
                .bind(config.table)
                .fetch_optional(pool)
                .await
                .with_context(|| format!("fail to look up table {}", config.table))?;
        if found.is_none() {
            anyhow::bail!("table `{}` is missing from the database", config.table);
        }
        tracing::debug!("found table {}", config.table);
    }
    Ok(())
}
