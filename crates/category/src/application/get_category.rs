use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use catalog_core::{ApplicationError, UseCase};

use crate::application::dto::CategoryOutput;
use crate::repository::CategoryRepository;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetCategoryInput {
    pub id: String,
}

/// Load one category by id.
pub struct GetCategory<R> {
    repository: R,
}

impl<R: CategoryRepository> GetCategory<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R: CategoryRepository> UseCase for GetCategory<R> {
    type Input = GetCategoryInput;
    type Output = CategoryOutput;

    #[instrument(skip(self), fields(category_id = %input.id), err)]
    async fn execute(&self, input: GetCategoryInput) -> Result<CategoryOutput, ApplicationError> {
        let entity = self.repository.find_by_id(input.id.into()).await?;
        Ok(CategoryOutput::from(entity))
    }
}
