use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use catalog_core::{ApplicationError, UseCase};

use crate::repository::CategoryRepository;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteCategoryInput {
    pub id: String,
}

/// Remove a category. Unknown ids are `NotFound`.
pub struct DeleteCategory<R> {
    repository: R,
}

impl<R: CategoryRepository> DeleteCategory<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R: CategoryRepository> UseCase for DeleteCategory<R> {
    type Input = DeleteCategoryInput;
    type Output = ();

    #[instrument(skip(self), fields(category_id = %input.id), err)]
    async fn execute(&self, input: DeleteCategoryInput) -> Result<(), ApplicationError> {
        self.repository.delete(input.id.into()).await?;
        info!("category deleted");
        Ok(())
    }
}
