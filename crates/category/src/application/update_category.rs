use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use catalog_core::{ApplicationError, UseCase};

use crate::application::dto::CategoryOutput;
use crate::repository::CategoryRepository;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCategoryInput {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// `Some(true)` activates, `Some(false)` deactivates, `None` leaves the flag alone.
    #[serde(default)]
    pub is_active: Option<bool>,
}

/// Load, change name/description (and optionally the active flag), store.
pub struct UpdateCategory<R> {
    repository: R,
}

impl<R: CategoryRepository> UpdateCategory<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R: CategoryRepository> UseCase for UpdateCategory<R> {
    type Input = UpdateCategoryInput;
    type Output = CategoryOutput;

    #[instrument(skip(self, input), fields(category_id = %input.id), err)]
    async fn execute(&self, input: UpdateCategoryInput) -> Result<CategoryOutput, ApplicationError> {
        let mut entity = self.repository.find_by_id(input.id.as_str().into()).await?;

        entity.update(input.name, input.description)?;
        match input.is_active {
            Some(true) => entity.activate(),
            Some(false) => entity.deactivate(),
            None => {}
        }

        let output = CategoryOutput::from(&entity);
        self.repository.update(entity).await?;
        info!("category updated");

        Ok(output)
    }
}
