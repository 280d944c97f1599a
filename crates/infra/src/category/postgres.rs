//! Postgres-backed category repository.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | RepositoryError | Scenario |
//! |------------|----------------------|-----------------|----------|
//! | Database (unique violation) on `insert` | `23505` | `AlreadyExists(id)` | Insert of an id that is already stored |
//! | Database (other) | Any | `Storage` | Constraint or statement failures |
//! | PoolClosed | N/A | `Storage` | Connection pool was closed |
//! | Other | N/A | `Storage` | Network errors, decoding failures, etc. |
//!
//! Rows that fail entity validation on load become `LoadEntity` (see
//! [`super::mapper`]).
//!
//! ## Search
//!
//! `search` runs a `COUNT(*)` and a page query sharing the same `WHERE`
//! clause. The filter is a case-insensitive substring match on `name` with the
//! LIKE metacharacters of the term escaped. Only [`CategorySortField`]
//! columns reach `ORDER BY`; `name` is compared with `COLLATE "C"` (byte
//! order).

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::{Span, debug, field, instrument};
use uuid::Uuid;

use catalog_category::{Category, CategorySortField, DEFAULT_SORT, SORTABLE_FIELDS};
use catalog_core::{
    Entity, EntityKey, Repository, RepositoryError, RepositoryResult, SearchParams, SearchResult,
    SearchableRepository, SortDirection,
};

use super::mapper::CategoryRow;

/// DDL for the `categories` table, one statement per entry.
pub const CATEGORY_SCHEMA: [&str; 2] = [
    r#"
    CREATE TABLE IF NOT EXISTS categories (
        id UUID PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        description TEXT NULL,
        is_active BOOLEAN NOT NULL,
        created_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS categories_created_at_idx ON categories (created_at)
    "#,
];

const SELECT_COLUMNS: &str = "id, name, description, is_active, created_at";

const FILTER_CLAUSE: &str = r#"($1::text IS NULL OR name ILIKE $1 ESCAPE '\')"#;

/// Postgres category repository.
///
/// Uses the SQLx pool (thread-safe); the struct is cheap to clone.
#[derive(Debug, Clone)]
pub struct PostgresCategoryRepository {
    pool: Arc<PgPool>,
}

impl PostgresCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the `categories` table and its index when missing.
    #[instrument(skip(self), err)]
    pub async fn ensure_schema(&self) -> RepositoryResult<()> {
        for statement in CATEGORY_SCHEMA {
            sqlx::query(statement)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        }
        Ok(())
    }

    async fn fetch_row(&self, id: Uuid) -> RepositoryResult<Option<CategoryRow>> {
        let row = sqlx::query(&format!("SELECT {SELECT_COLUMNS} FROM categories WHERE id = $1"))
            .bind(id)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_id", e))?;

        row.map(|row| CategoryRow::from_row(&row).map_err(|e| map_sqlx_error("decode_row", e)))
            .transpose()
    }
}

#[async_trait]
impl Repository<Category> for PostgresCategoryRepository {
    #[instrument(skip(self, entity), fields(category_id = %entity.unique_entity_id()), err)]
    async fn insert(&self, entity: Category) -> RepositoryResult<()> {
        let row = CategoryRow::from_entity(&entity);

        sqlx::query(
            r#"
            INSERT INTO categories (id, name, description, is_active, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(row.id)
        .bind(&row.name)
        .bind(&row.description)
        .bind(row.is_active)
        .bind(row.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                RepositoryError::AlreadyExists(row.id.to_string())
            } else {
                map_sqlx_error("insert", e)
            }
        })?;

        Ok(())
    }

    #[instrument(skip(self), fields(category_id = %id), err)]
    async fn find_by_id(&self, id: EntityKey) -> RepositoryResult<Category> {
        // A key that is not a UUID cannot match a stored row.
        let uuid = Uuid::parse_str(id.as_str()).map_err(|_| RepositoryError::not_found(&id))?;

        self.fetch_row(uuid)
            .await?
            .ok_or_else(|| RepositoryError::not_found(&id))?
            .into_entity()
    }

    #[instrument(skip(self), fields(row_count = field::Empty), err)]
    async fn find_all(&self) -> RepositoryResult<Vec<Category>> {
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM categories ORDER BY created_at ASC"
        ))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_all", e))?;

        Span::current().record("row_count", rows.len());
        decode_rows(&rows)
    }

    #[instrument(skip(self, entity), fields(category_id = %entity.unique_entity_id()), err)]
    async fn update(&self, entity: Category) -> RepositoryResult<()> {
        let row = CategoryRow::from_entity(&entity);

        let result = sqlx::query(
            r#"
            UPDATE categories
            SET name = $2, description = $3, is_active = $4, created_at = $5
            WHERE id = $1
            "#,
        )
        .bind(row.id)
        .bind(&row.name)
        .bind(&row.description)
        .bind(row.is_active)
        .bind(row.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found(row.id));
        }
        Ok(())
    }

    #[instrument(skip(self), fields(category_id = %id), err)]
    async fn delete(&self, id: EntityKey) -> RepositoryResult<()> {
        let uuid = Uuid::parse_str(id.as_str()).map_err(|_| RepositoryError::not_found(&id))?;

        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(uuid)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found(&id));
        }
        Ok(())
    }
}

#[async_trait]
impl SearchableRepository<Category> for PostgresCategoryRepository {
    fn sortable_fields(&self) -> Vec<&'static str> {
        SORTABLE_FIELDS.to_vec()
    }

    #[instrument(
        skip(self, params),
        fields(
            page = params.page(),
            per_page = params.per_page(),
            sort = ?params.sort(),
            filter = ?params.filter(),
            total = field::Empty
        ),
        err
    )]
    async fn search(&self, params: SearchParams) -> RepositoryResult<SearchResult<Category>> {
        let pattern = params.filter().map(like_pattern);

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM categories WHERE {FILTER_CLAUSE}"
        ))
        .bind(pattern.as_deref())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("search_count", e))?;

        let order = order_clause(params.sort(), params.sort_dir());
        let rows = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM categories WHERE {FILTER_CLAUSE} ORDER BY {order} LIMIT $2 OFFSET $3"
        ))
        .bind(pattern.as_deref())
        .bind(i64::from(params.per_page()))
        .bind(i64::try_from(params.offset()).unwrap_or(i64::MAX))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("search_page", e))?;

        Span::current().record("total", total);
        debug!(order = %order, returned = rows.len(), "category page fetched");

        let items = decode_rows(&rows)?;
        Ok(SearchResult::new(items, u64::try_from(total).unwrap_or(0), &params))
    }
}

fn decode_rows(rows: &[sqlx::postgres::PgRow]) -> RepositoryResult<Vec<Category>> {
    rows.iter()
        .map(|row| {
            CategoryRow::from_row(row)
                .map_err(|e| map_sqlx_error("decode_row", e))?
                .into_entity()
        })
        .collect()
}

/// `%term%` with `\`, `%` and `_` escaped.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn column(field: CategorySortField) -> &'static str {
    match field {
        CategorySortField::Name => r#"name COLLATE "C""#,
        CategorySortField::CreatedAt => "created_at",
    }
}

/// `ORDER BY` body. Unknown fields fall back to [`DEFAULT_SORT`]. Ties are
/// broken by `created_at ASC, id ASC` so LIMIT/OFFSET pages never overlap.
pub(crate) fn order_clause(sort: Option<&str>, sort_dir: Option<SortDirection>) -> String {
    let (field, dir) = match sort.and_then(CategorySortField::parse) {
        Some(field) => (field, sort_dir.unwrap_or(SortDirection::Asc)),
        None => DEFAULT_SORT,
    };
    match field {
        CategorySortField::CreatedAt => format!("created_at {}, id ASC", dir.as_sql()),
        other => format!("{} {}, created_at ASC, id ASC", column(other), dir.as_sql()),
    }
}

/// Map SQLx errors to RepositoryError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            RepositoryError::Storage(msg)
        }
        sqlx::Error::PoolClosed => {
            RepositoryError::storage(format!("connection pool closed in {}", operation))
        }
        _ => RepositoryError::storage(format!("sqlx error in {}: {}", operation, err)),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        return db_err.code().as_deref() == Some("23505");
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("a"), "%a%");
        assert_eq!(like_pattern("50%_off"), r"%50\%\_off%");
        assert_eq!(like_pattern(r"C:\"), r"%C:\\%");
    }

    #[test]
    fn order_clause_allow_lists_columns() {
        assert_eq!(
            order_clause(Some("name"), Some(SortDirection::Desc)),
            r#"name COLLATE "C" DESC, created_at ASC, id ASC"#
        );
        assert_eq!(
            order_clause(Some("name"), None),
            r#"name COLLATE "C" ASC, created_at ASC, id ASC"#
        );
        assert_eq!(
            order_clause(Some("created_at"), Some(SortDirection::Asc)),
            "created_at ASC, id ASC"
        );
        assert_eq!(
            order_clause(Some("description"), Some(SortDirection::Asc)),
            "created_at DESC, id ASC"
        );
        assert_eq!(
            order_clause(Some("name; DROP TABLE categories"), None),
            "created_at DESC, id ASC"
        );
        assert_eq!(order_clause(None, None), "created_at DESC, id ASC");
    }

    #[test]
    fn every_sortable_field_orders_by_its_own_column() {
        for name in SORTABLE_FIELDS {
            let field = CategorySortField::parse(name).unwrap();
            let clause = order_clause(Some(name), Some(SortDirection::Desc));
            assert!(clause.starts_with(&format!("{} DESC", column(field))), "{clause}");
            assert!(clause.ends_with(", id ASC"), "{clause}");
        }
    }

    #[test]
    fn database_errors_outside_insert_are_storage_errors() {
        for err in [sqlx::Error::RowNotFound, sqlx::Error::PoolTimedOut, sqlx::Error::PoolClosed] {
            assert!(matches!(map_sqlx_error("update", err), RepositoryError::Storage(_)));
        }
    }

    #[test]
    fn pool_closed_is_a_storage_error() {
        let err = map_sqlx_error("find_all", sqlx::Error::PoolClosed);
        assert_eq!(err, RepositoryError::Storage("connection pool closed in find_all".into()));
        assert!(!is_unique_violation(&sqlx::Error::PoolClosed));
    }

    /// Runs against a real database: `DATABASE_URL=... cargo test -- --ignored`.
    /// Clears the `categories` table.
    mod live {
        use super::*;
        use catalog_category::CategoryProperties;
        use catalog_core::{Entity, SearchInput};

        use crate::config::DatabaseConfig;

        async fn repository() -> PostgresCategoryRepository {
            let pool = DatabaseConfig::from_env()
                .expect("DATABASE_URL must be set")
                .connect()
                .await
                .expect("database reachable");
            let repository = PostgresCategoryRepository::new(pool);
            repository.ensure_schema().await.unwrap();
            sqlx::query("DELETE FROM categories")
                .execute(&*repository.pool)
                .await
                .unwrap();
            repository
        }

        fn category(name: &str) -> Category {
            Category::create(CategoryProperties::named(name)).unwrap()
        }

        #[tokio::test]
        #[ignore = "requires DATABASE_URL"]
        async fn crud_round_trip() {
            let repository = repository().await;
            let mut entity = category("Movie");

            repository.insert(entity.clone()).await.unwrap();
            let err = repository.insert(entity.clone()).await.unwrap_err();
            assert_eq!(err, RepositoryError::AlreadyExists(entity.id().to_string()));

            let found = repository.find_by_id(entity.id().into()).await.unwrap();
            assert_eq!(found.name(), "Movie");
            assert_eq!(found.created_at().timestamp_micros(), entity.created_at().timestamp_micros());

            entity.update("Documentary", Some("real life".into())).unwrap();
            entity.deactivate();
            repository.update(entity.clone()).await.unwrap();
            let found = repository.find_by_id(entity.id().into()).await.unwrap();
            assert_eq!(found.description(), Some("real life"));
            assert!(!found.is_active());

            repository.delete(entity.id().into()).await.unwrap();
            assert!(matches!(
                repository.find_by_id(entity.id().into()).await,
                Err(RepositoryError::NotFound(_))
            ));
            assert!(matches!(
                repository.delete(entity.id().into()).await,
                Err(RepositoryError::NotFound(_))
            ));
            assert!(matches!(
                repository.find_by_id("fake-id".into()).await,
                Err(RepositoryError::NotFound(_))
            ));
        }

        #[tokio::test]
        #[ignore = "requires DATABASE_URL"]
        async fn search_matches_in_memory_ordering() {
            let repository = repository().await;
            for name in ["a", "AAA", "AaA", "b", "c", "50%"] {
                repository.insert(category(name)).await.unwrap();
            }
            let names = |result: &SearchResult<Category>| {
                result.items().iter().map(|c| c.name().to_string()).collect::<Vec<_>>()
            };
            let input = |page| SearchInput::default().with_page(page).with_per_page(2).with_sort("name").with_filter("a");

            let first = repository.search(input(1).into()).await.unwrap();
            assert_eq!(names(&first), ["AAA", "AaA"]);
            assert_eq!((first.total(), first.last_page()), (3, 2));

            let second = repository.search(input(2).into()).await.unwrap();
            assert_eq!(names(&second), ["a"]);

            let desc = repository.search(input(1).with_sort_dir("desc").into()).await.unwrap();
            assert_eq!(names(&desc), ["a", "AaA"]);

            let literal = repository
                .search(SearchInput::default().with_filter("%").into())
                .await
                .unwrap();
            assert_eq!(names(&literal), ["50%"]);
        }

        #[tokio::test]
        #[ignore = "requires DATABASE_URL"]
        async fn tied_names_page_like_the_in_memory_store() {
            use catalog_category::CategoryInMemoryRepository;
            use chrono::{Duration, TimeZone, Utc};

            let repository = repository().await;
            let base = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
            let items: Vec<Category> = (0..5)
                .map(|i| {
                    Category::create(CategoryProperties {
                        name: "dup".into(),
                        created_at: Some(base + Duration::seconds(i)),
                        ..Default::default()
                    })
                    .unwrap()
                })
                .collect();
            for item in &items {
                repository.insert(item.clone()).await.unwrap();
            }
            let in_memory = CategoryInMemoryRepository::with_items(items.clone());

            for sort in [None, Some("name")] {
                let mut seen = Vec::new();
                for page in 1..=3 {
                    let mut input = SearchInput::default().with_page(page).with_per_page(2);
                    if let Some(sort) = sort {
                        input = input.with_sort(sort);
                    }
                    let stored = repository.search(input.clone().into()).await.unwrap();
                    let expected = in_memory.search(input.into()).await.unwrap();

                    let ids: Vec<String> = stored.items().iter().map(|c| c.id().to_string()).collect();
                    let expected_ids: Vec<String> =
                        expected.items().iter().map(|c| c.id().to_string()).collect();
                    assert_eq!(ids, expected_ids, "sort {sort:?}, page {page}");
                    seen.extend(ids);
                }
                seen.sort();
                seen.dedup();
                assert_eq!(seen.len(), items.len(), "sort {sort:?}");
            }
        }
    }
}
