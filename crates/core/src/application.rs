//! Application-layer seedwork: the use-case contract, pagination output and
//! the error surfaced at the use-case boundary.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::DomainError;
use crate::repository::{RepositoryError, SearchResult};

/// Use-case executor: one request type in, one response type out.
#[async_trait]
pub trait UseCase: Send + Sync {
    type Input: Send;
    type Output: Send;

    async fn execute(&self, input: Self::Input) -> Result<Self::Output, ApplicationError>;
}

/// Everything a use case can fail with. Nothing is swallowed on the way up.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ApplicationError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApplicationError::Repository(RepositoryError::NotFound(_)))
    }
}

/// Paginated list returned by list use cases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationOutput<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub current_page: u32,
    pub last_page: u32,
    pub per_page: u32,
}

impl<T> PaginationOutput<T> {
    /// Copy the pagination metadata of `result`, projecting each item with `map`.
    pub fn from_search<E, F>(result: SearchResult<E>, map: F) -> Self
    where
        F: FnMut(E) -> T,
    {
        let total = result.total();
        let current_page = result.current_page();
        let last_page = result.last_page();
        let per_page = result.per_page();

        Self {
            items: result.into_items().into_iter().map(map).collect(),
            total,
            current_page,
            last_page,
            per_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{SearchInput, SearchParams};

    #[test]
    fn pagination_output_copies_metadata() {
        let params: SearchParams = SearchInput::default().with_page(1).with_per_page(2).with_sort("name").into();
        let result = SearchResult::new(vec![1, 2], 3, &params);

        let output = PaginationOutput::from_search(result, |n| n * 10);
        assert_eq!(
            output,
            PaginationOutput {
                items: vec![10, 20],
                total: 3,
                current_page: 1,
                last_page: 2,
                per_page: 2,
            }
        );
    }

    #[test]
    fn wraps_layer_errors() {
        let err: ApplicationError = RepositoryError::not_found("abc").into();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "entity with id abc not found");

        let err: ApplicationError = DomainError::validation("name is required").into();
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "name is required");
    }
}
