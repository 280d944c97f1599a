use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use catalog_core::{ApplicationError, UseCase};

use crate::application::dto::CategoryOutput;
use crate::category::{Category, CategoryProperties};
use crate::repository::CategoryRepository;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCategoryInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Build a category from the input and insert it.
pub struct CreateCategory<R> {
    repository: R,
}

impl<R: CategoryRepository> CreateCategory<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R: CategoryRepository> UseCase for CreateCategory<R> {
    type Input = CreateCategoryInput;
    type Output = CategoryOutput;

    #[instrument(skip(self, input), err)]
    async fn execute(&self, input: CreateCategoryInput) -> Result<CategoryOutput, ApplicationError> {
        let entity = Category::create(CategoryProperties {
            name: input.name,
            description: input.description,
            is_active: input.is_active,
            created_at: None,
        })?;
        let output = CategoryOutput::from(&entity);

        self.repository.insert(entity).await?;
        info!(category_id = %output.id, "category created");

        Ok(output)
    }
}
