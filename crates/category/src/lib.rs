//! Category bounded context.
//!
//! The `Category` entity and its validation rules, the repository contract with
//! its search strategy (filter on name, sortable `name`/`created_at`, newest
//! first by default), an in-memory repository, and the category use cases.
//! Storage drivers live in `catalog-infra`.

pub mod application;
pub mod category;
pub mod repository;

pub use application::{
    CategoryOutput, CreateCategory, CreateCategoryInput, DeleteCategory, DeleteCategoryInput,
    GetCategory, GetCategoryInput, ListCategories, ListCategoriesInput, ListCategoriesOutput,
    UpdateCategory, UpdateCategoryInput,
};
pub use category::{Category, CategoryProperties, CategoryProps, CategoryValidator, NAME_MAX_LENGTH};
pub use repository::{
    matches_filter, search_config, CategoryInMemoryRepository, CategoryRepository, CategorySortField,
    DEFAULT_SORT, SORTABLE_FIELDS,
};
