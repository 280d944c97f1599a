use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_core::Entity;

use crate::category::Category;

/// Read-side projection of a category returned by every use case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryOutput {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Category> for CategoryOutput {
    fn from(entity: &Category) -> Self {
        Self {
            id: entity.id().to_string(),
            name: entity.name().to_string(),
            description: entity.description().map(str::to_string),
            is_active: entity.is_active(),
            created_at: entity.created_at(),
        }
    }
}

impl From<Category> for CategoryOutput {
    fn from(entity: Category) -> Self {
        Self::from(&entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    use crate::category::CategoryProperties;

    #[test]
    fn projects_every_field() {
        let created_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let entity = Category::create(CategoryProperties {
            name: "Movie".into(),
            description: Some("some description".into()),
            is_active: Some(true),
            created_at: Some(created_at),
        })
        .unwrap();

        let output = CategoryOutput::from(&entity);

        assert_eq!(
            serde_json::to_value(&output).unwrap(),
            json!({
                "id": entity.id(),
                "name": "Movie",
                "description": "some description",
                "is_active": true,
                "created_at": "2024-03-01T12:00:00Z",
            })
        );
        assert_eq!(serde_json::to_value(&output).unwrap(), entity.to_json());
    }
}
