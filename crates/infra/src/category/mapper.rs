//! Row ↔ entity mapping.
//!
//! Stored rows go back through entity validation; a row that no longer
//! satisfies the category rules surfaces as `RepositoryError::LoadEntity`.

use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::postgres::PgRow;
use tracing::warn;
use uuid::Uuid;

use catalog_category::{Category, CategoryProperties};
use catalog_core::{DomainError, Entity, RepositoryError, RepositoryResult, UniqueEntityId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, PgRow> for CategoryRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(CategoryRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl CategoryRow {
    pub fn from_entity(entity: &Category) -> Self {
        CategoryRow {
            id: entity.unique_entity_id().as_uuid(),
            name: entity.name().to_string(),
            description: entity.description().map(str::to_string),
            is_active: entity.is_active(),
            created_at: entity.created_at(),
        }
    }

    /// Rebuild the entity, re-running its validation.
    pub fn into_entity(self) -> RepositoryResult<Category> {
        let id = self.id;
        let properties = CategoryProperties {
            name: self.name,
            description: self.description,
            is_active: Some(self.is_active),
            created_at: Some(self.created_at),
        };

        Category::new(properties, Some(UniqueEntityId::from_uuid(id))).map_err(|err| match err {
            DomainError::EntityValidation(errors) => {
                warn!(category_id = %id, errors = %errors, "stored category failed validation");
                RepositoryError::LoadEntity(errors)
            }
            other => RepositoryError::storage(format!("failed to load category {id}: {other}")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn row(name: &str) -> CategoryRow {
        CategoryRow {
            id: Uuid::parse_str("5490020a-e866-4229-9adc-aa44b83234c4").unwrap(),
            name: name.to_string(),
            description: None,
            is_active: true,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn row_becomes_entity() {
        let entity = row("Movie").into_entity().unwrap();

        assert_eq!(entity.id(), "5490020a-e866-4229-9adc-aa44b83234c4");
        assert_eq!(entity.name(), "Movie");
        assert_eq!(entity.description(), None);
        assert!(entity.is_active());
        assert_eq!(entity.created_at(), Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn invalid_row_is_a_load_error() {
        let err = row("").into_entity().unwrap_err();

        match err {
            RepositoryError::LoadEntity(errors) => {
                assert_eq!(errors.get("name").unwrap(), ["name is required"]);
            }
            other => panic!("expected LoadEntity, got {other:?}"),
        }
    }

    #[test]
    fn entity_to_row_and_back() {
        let original = row("Documentary");
        let entity = original.clone().into_entity().unwrap();

        assert_eq!(CategoryRow::from_entity(&entity), original);
    }

    #[test]
    fn uppercase_id_survives_the_row_round_trip() {
        let id = UniqueEntityId::parse("DF96EAC1-52C9-4000-833B-E0DE54D8C096").unwrap();
        let entity = Category::new(CategoryProperties::named("Movie"), Some(id)).unwrap();

        let reloaded = CategoryRow::from_entity(&entity).into_entity().unwrap();

        assert_eq!(reloaded.to_json(), entity.to_json());
        assert_eq!(reloaded.id(), "df96eac1-52c9-4000-833b-e0de54d8c096");
    }
}
