//! Category repository contract and its search strategy.

use std::ops::Deref;

use async_trait::async_trait;

use catalog_core::{
    EntityKey, InMemorySearchableRepository, Repository, RepositoryResult, SearchConfig,
    SearchParams, SearchResult, SearchableRepository, SortDirection, SortKey,
};

use crate::category::Category;

/// Fields a category search may be sorted by. Every search implementation
/// derives its allow-list from this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategorySortField {
    Name,
    CreatedAt,
}

impl CategorySortField {
    pub const ALL: [CategorySortField; 2] = [CategorySortField::Name, CategorySortField::CreatedAt];

    pub const fn name(self) -> &'static str {
        match self {
            CategorySortField::Name => "name",
            CategorySortField::CreatedAt => "created_at",
        }
    }

    /// `None` for anything outside the allow-list.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }

    pub fn key(self, category: &Category) -> SortKey {
        match self {
            CategorySortField::Name => SortKey::from(category.name()),
            CategorySortField::CreatedAt => SortKey::from(category.created_at()),
        }
    }
}

pub const SORTABLE_FIELDS: [&str; 2] = [
    CategorySortField::Name.name(),
    CategorySortField::CreatedAt.name(),
];

/// Ordering applied when no sortable field is requested.
pub const DEFAULT_SORT: (CategorySortField, SortDirection) =
    (CategorySortField::CreatedAt, SortDirection::Desc);

/// Searchable repository of categories.
pub trait CategoryRepository: SearchableRepository<Category> {}

impl<T> CategoryRepository for T where T: SearchableRepository<Category> + ?Sized {}

/// Case-insensitive substring match on the name.
pub fn matches_filter(category: &Category, filter: &str) -> bool {
    category.name().to_lowercase().contains(&filter.to_lowercase())
}

/// Filter on `name`, sortable by every [`CategorySortField`], [`DEFAULT_SORT`]
/// otherwise.
pub fn search_config() -> SearchConfig<Category> {
    let (default_field, default_dir) = DEFAULT_SORT;
    CategorySortField::ALL
        .into_iter()
        .fold(SearchConfig::new(matches_filter), |config, field| {
            config.sortable(field.name(), move |c: &Category| field.key(c))
        })
        .default_sort(default_field.name(), default_dir)
}

/// In-memory category repository for tests/dev.
#[derive(Debug)]
pub struct CategoryInMemoryRepository {
    inner: InMemorySearchableRepository<Category>,
}

impl CategoryInMemoryRepository {
    pub fn new() -> Self {
        Self {
            inner: InMemorySearchableRepository::new(search_config()),
        }
    }

    pub fn with_items(items: Vec<Category>) -> Self {
        Self {
            inner: InMemorySearchableRepository::with_items(search_config(), items),
        }
    }
}

impl Default for CategoryInMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for CategoryInMemoryRepository {
    type Target = InMemorySearchableRepository<Category>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[async_trait]
impl Repository<Category> for CategoryInMemoryRepository {
    async fn insert(&self, entity: Category) -> RepositoryResult<()> {
        self.inner.insert(entity).await
    }

    async fn find_by_id(&self, id: EntityKey) -> RepositoryResult<Category> {
        self.inner.find_by_id(id).await
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Category>> {
        self.inner.find_all().await
    }

    async fn update(&self, entity: Category) -> RepositoryResult<()> {
        self.inner.update(entity).await
    }

    async fn delete(&self, id: EntityKey) -> RepositoryResult<()> {
        self.inner.delete(id).await
    }
}

#[async_trait]
impl SearchableRepository<Category> for CategoryInMemoryRepository {
    fn sortable_fields(&self) -> Vec<&'static str> {
        self.inner.sortable_fields()
    }

    async fn search(&self, params: SearchParams) -> RepositoryResult<SearchResult<Category>> {
        self.inner.search(params).await
    }
}
