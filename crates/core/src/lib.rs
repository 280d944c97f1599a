//! `catalog-core` — domain foundation building blocks.
//!
//! Identity, entities, value objects, validation, repository contracts and the
//! in-memory search pipeline shared by every bounded context. No storage
//! driver lives here.

pub mod application;
pub mod entity;
pub mod error;
pub mod id;
pub mod repository;
pub mod validation;
pub mod value_object;

pub use application::{ApplicationError, PaginationOutput, UseCase};
pub use entity::Entity;
pub use error::{DomainError, DomainResult, FieldErrors};
pub use id::{EntityKey, UniqueEntityId};
pub use repository::{
    InMemoryRepository, InMemorySearchableRepository, Repository, RepositoryError,
    RepositoryResult, SearchConfig, SearchInput, SearchParams, SearchResult,
    SearchableRepository, SortDirection, SortKey,
};
pub use validation::{FieldsValidator, Rule, ValidatorRules};
pub use value_object::{deep_freeze, Frozen, FrozenPayload, Payload, SharedDate, ValueObject};
