//! Repository contracts shared by every storage backend.
//!
//! A repository owns its backing collection (in-memory vector or table) and
//! exposes CRUD plus `search` over one entity type. Entities handed out are
//! independent snapshots: changing one has no effect on stored state until it
//! is passed back through `update`.

pub mod in_memory;
pub mod search;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::entity::Entity;
use crate::error::FieldErrors;
use crate::id::EntityKey;

pub use in_memory::{InMemoryRepository, InMemorySearchableRepository};
pub use search::{
    SearchConfig, SearchInput, SearchParams, SearchResult, SortDirection, SortField, SortKey,
};

/// Repository operation error.
///
/// These are **storage-side** failures, as opposed to domain errors (validation,
/// invariants). None of them is retried inside a repository.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    /// No entity is stored under the given id.
    #[error("entity with id {0} not found")]
    NotFound(String),

    /// An entity with the same id is already stored.
    #[error("entity with id {0} already exists")]
    AlreadyExists(String),

    /// A stored record could not be turned back into a valid entity.
    ///
    /// Signals corrupted persisted data rather than bad user input.
    #[error("stored entity failed validation on load: {0}")]
    LoadEntity(FieldErrors),

    /// Backend failure (connection, query, lock).
    #[error("storage error: {0}")]
    Storage(String),
}

impl RepositoryError {
    pub fn not_found(id: impl core::fmt::Display) -> Self {
        Self::NotFound(id.to_string())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// CRUD contract, uniform across implementations.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    /// Store a new entity. Fails with `AlreadyExists` when the id is taken.
    async fn insert(&self, entity: E) -> RepositoryResult<()>;

    /// Fetch by id (raw string or `UniqueEntityId`). Fails with `NotFound`.
    async fn find_by_id(&self, id: EntityKey) -> RepositoryResult<E>;

    /// Every stored entity in natural storage order.
    async fn find_all(&self) -> RepositoryResult<Vec<E>>;

    /// Replace a stored entity. The lookup happens first; nothing is written on `NotFound`.
    async fn update(&self, entity: E) -> RepositoryResult<()>;

    /// Remove by id. The lookup happens first; nothing is removed on `NotFound`.
    async fn delete(&self, id: EntityKey) -> RepositoryResult<()>;
}

/// Repository with the filter → sort → paginate pipeline.
#[async_trait]
pub trait SearchableRepository<E: Entity>: Repository<E> {
    /// Field names accepted as sort keys.
    fn sortable_fields(&self) -> Vec<&'static str>;

    async fn search(&self, params: SearchParams) -> RepositoryResult<SearchResult<E>>;
}

#[async_trait]
impl<E, R> Repository<E> for Arc<R>
where
    E: Entity,
    R: Repository<E> + ?Sized,
{
    async fn insert(&self, entity: E) -> RepositoryResult<()> {
        (**self).insert(entity).await
    }

    async fn find_by_id(&self, id: EntityKey) -> RepositoryResult<E> {
        (**self).find_by_id(id).await
    }

    async fn find_all(&self) -> RepositoryResult<Vec<E>> {
        (**self).find_all().await
    }

    async fn update(&self, entity: E) -> RepositoryResult<()> {
        (**self).update(entity).await
    }

    async fn delete(&self, id: EntityKey) -> RepositoryResult<()> {
        (**self).delete(id).await
    }
}

#[async_trait]
impl<E, R> SearchableRepository<E> for Arc<R>
where
    E: Entity,
    R: SearchableRepository<E> + ?Sized,
{
    fn sortable_fields(&self) -> Vec<&'static str> {
        (**self).sortable_fields()
    }

    async fn search(&self, params: SearchParams) -> RepositoryResult<SearchResult<E>> {
        (**self).search(params).await
    }
}
