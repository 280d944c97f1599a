//! In-memory repositories.
//!
//! Intended for tests/dev and as the reference behaviour for persistent
//! implementations. Not optimized for performance.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::entity::Entity;
use crate::id::EntityKey;

use super::search::{SearchConfig, SearchParams, SearchResult};
use super::{Repository, RepositoryError, RepositoryResult, SearchableRepository};

/// Vector-backed repository keeping insertion order.
#[derive(Debug)]
pub struct InMemoryRepository<E> {
    items: RwLock<Vec<E>>,
}

impl<E> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
        }
    }
}

impl<E: Entity> InMemoryRepository<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store directly, bypassing `insert`.
    pub fn with_items(items: Vec<E>) -> Self {
        Self {
            items: RwLock::new(items),
        }
    }

    /// Snapshot of the stored entities in storage order.
    pub fn items(&self) -> RepositoryResult<Vec<E>> {
        Ok(self.read()?.clone())
    }

    /// Replace the whole backing collection.
    pub fn set_items(&self, items: Vec<E>) -> RepositoryResult<()> {
        *self.write()? = items;
        Ok(())
    }

    pub(crate) fn read(&self) -> RepositoryResult<RwLockReadGuard<'_, Vec<E>>> {
        self.items
            .read()
            .map_err(|_| RepositoryError::storage("lock poisoned"))
    }

    fn write(&self) -> RepositoryResult<RwLockWriteGuard<'_, Vec<E>>> {
        self.items
            .write()
            .map_err(|_| RepositoryError::storage("lock poisoned"))
    }

    fn position(items: &[E], id: &str) -> RepositoryResult<usize> {
        items
            .iter()
            .position(|item| item.id() == id)
            .ok_or_else(|| RepositoryError::not_found(id))
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for InMemoryRepository<E> {
    async fn insert(&self, entity: E) -> RepositoryResult<()> {
        let mut items = self.write()?;
        if items.iter().any(|item| item.id() == entity.id()) {
            return Err(RepositoryError::AlreadyExists(entity.id().to_string()));
        }
        items.push(entity);
        Ok(())
    }

    async fn find_by_id(&self, id: EntityKey) -> RepositoryResult<E> {
        let items = self.read()?;
        let index = Self::position(&items, id.as_str())?;
        Ok(items[index].clone())
    }

    async fn find_all(&self) -> RepositoryResult<Vec<E>> {
        self.items()
    }

    async fn update(&self, entity: E) -> RepositoryResult<()> {
        let mut items = self.write()?;
        let index = Self::position(&items, entity.id())?;
        items[index] = entity;
        Ok(())
    }

    async fn delete(&self, id: EntityKey) -> RepositoryResult<()> {
        let mut items = self.write()?;
        let index = Self::position(&items, id.as_str())?;
        items.remove(index);
        Ok(())
    }
}

/// In-memory repository with the filter → sort → paginate pipeline.
///
/// The filter predicate, sortable fields and default ordering come from the
/// injected [`SearchConfig`].
#[derive(Debug)]
pub struct InMemorySearchableRepository<E> {
    store: InMemoryRepository<E>,
    config: SearchConfig<E>,
}

impl<E: Entity> InMemorySearchableRepository<E> {
    pub fn new(config: SearchConfig<E>) -> Self {
        Self {
            store: InMemoryRepository::new(),
            config,
        }
    }

    pub fn with_items(config: SearchConfig<E>, items: Vec<E>) -> Self {
        Self {
            store: InMemoryRepository::with_items(items),
            config,
        }
    }

    pub fn config(&self) -> &SearchConfig<E> {
        &self.config
    }

    pub fn items(&self) -> RepositoryResult<Vec<E>> {
        self.store.items()
    }

    pub fn set_items(&self, items: Vec<E>) -> RepositoryResult<()> {
        self.store.set_items(items)
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for InMemorySearchableRepository<E> {
    async fn insert(&self, entity: E) -> RepositoryResult<()> {
        self.store.insert(entity).await
    }

    async fn find_by_id(&self, id: EntityKey) -> RepositoryResult<E> {
        self.store.find_by_id(id).await
    }

    async fn find_all(&self) -> RepositoryResult<Vec<E>> {
        self.store.find_all().await
    }

    async fn update(&self, entity: E) -> RepositoryResult<()> {
        self.store.update(entity).await
    }

    async fn delete(&self, id: EntityKey) -> RepositoryResult<()> {
        self.store.delete(id).await
    }
}

#[async_trait]
impl<E: Entity> SearchableRepository<E> for InMemorySearchableRepository<E> {
    fn sortable_fields(&self) -> Vec<&'static str> {
        self.config.sortable_fields()
    }

    async fn search(&self, params: SearchParams) -> RepositoryResult<SearchResult<E>> {
        let items = self.store.read()?;

        let filtered = self
            .config
            .apply_filter(items.iter().collect(), params.filter());
        let sorted = self
            .config
            .apply_sort(&filtered, params.sort(), params.sort_dir());
        let page = SearchConfig::apply_paginate(&sorted, params.page(), params.per_page());

        tracing::debug!(
            stored = items.len(),
            filtered = filtered.len(),
            returned = page.len(),
            page = params.page(),
            per_page = params.per_page(),
            "in-memory search"
        );

        let total = filtered.len() as u64;
        let page = page.into_iter().cloned().collect();
        Ok(SearchResult::new(page, total, &params))
    }
}
