//! Category use cases.
//!
//! Each executor owns a repository handle (any [`CategoryRepository`], usually
//! behind an `Arc`) and implements [`catalog_core::UseCase`].
//!
//! [`CategoryRepository`]: crate::repository::CategoryRepository

pub mod create_category;
pub mod delete_category;
pub mod dto;
pub mod get_category;
pub mod list_categories;
pub mod update_category;

pub use create_category::{CreateCategory, CreateCategoryInput};
pub use delete_category::{DeleteCategory, DeleteCategoryInput};
pub use dto::CategoryOutput;
pub use get_category::{GetCategory, GetCategoryInput};
pub use list_categories::{ListCategories, ListCategoriesInput, ListCategoriesOutput};
pub use update_category::{UpdateCategory, UpdateCategoryInput};
