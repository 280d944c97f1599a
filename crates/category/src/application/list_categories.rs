use async_trait::async_trait;
use tracing::{debug, instrument};

use catalog_core::{ApplicationError, PaginationOutput, SearchInput, SearchParams, UseCase};

use crate::application::dto::CategoryOutput;
use crate::repository::CategoryRepository;

pub type ListCategoriesInput = SearchInput;
pub type ListCategoriesOutput = PaginationOutput<CategoryOutput>;

/// Normalise the raw search input, search, and project the page.
pub struct ListCategories<R> {
    repository: R,
}

impl<R: CategoryRepository> ListCategories<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl<R: CategoryRepository> UseCase for ListCategories<R> {
    type Input = ListCategoriesInput;
    type Output = ListCategoriesOutput;

    #[instrument(skip(self), err)]
    async fn execute(&self, input: ListCategoriesInput) -> Result<ListCategoriesOutput, ApplicationError> {
        let params = SearchParams::from(input);
        let result = self.repository.search(params).await?;
        debug!(total = result.total(), returned = result.items().len(), "categories listed");

        Ok(PaginationOutput::from_search(result, CategoryOutput::from))
    }
}
