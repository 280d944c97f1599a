use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_core::{DomainError, DomainResult, Entity, FieldsValidator, Rule, UniqueEntityId};

pub const NAME_MAX_LENGTH: usize = 255;

/// Construction input. Optional fields take their defaults in [`Category::new`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryProperties {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl CategoryProperties {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Property bag of a stored category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryProps {
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Field rules for categories.
pub struct CategoryValidator;

impl CategoryValidator {
    pub fn create() -> FieldsValidator {
        FieldsValidator::new()
            .field("name", [Rule::Required, Rule::String, Rule::MaxLength(NAME_MAX_LENGTH)])
            .field("description", [Rule::String])
            .field("is_active", [Rule::Boolean])
            .field("created_at", [Rule::Date])
    }
}

/// Entity: Category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    id: UniqueEntityId,
    props: CategoryProps,
}

impl Category {
    /// Validate and build. A missing `id` gets a fresh one; `is_active`
    /// defaults to `true`, `created_at` to now.
    pub fn new(properties: CategoryProperties, id: Option<UniqueEntityId>) -> DomainResult<Self> {
        let props = CategoryProps {
            name: properties.name,
            description: properties.description,
            is_active: properties.is_active.unwrap_or(true),
            created_at: properties.created_at.unwrap_or_else(Utc::now),
        };
        Self::validate(&props)?;

        Ok(Self {
            id: id.unwrap_or_default(),
            props,
        })
    }

    pub fn create(properties: CategoryProperties) -> DomainResult<Self> {
        Self::new(properties, None)
    }

    pub fn validate(props: &CategoryProps) -> DomainResult<()> {
        CategoryValidator::create()
            .validate(props)
            .map_err(DomainError::EntityValidation)
    }

    pub fn name(&self) -> &str {
        &self.props.name
    }

    pub fn description(&self) -> Option<&str> {
        self.props.description.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.props.is_active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.props.created_at
    }

    /// Change name and description. Nothing is assigned when validation fails.
    pub fn update(&mut self, name: impl Into<String>, description: Option<String>) -> DomainResult<()> {
        let candidate = CategoryProps {
            name: name.into(),
            description,
            ..self.props.clone()
        };
        Self::validate(&candidate)?;
        self.props = candidate;
        Ok(())
    }

    pub fn activate(&mut self) {
        self.props.is_active = true;
    }

    pub fn deactivate(&mut self) {
        self.props.is_active = false;
    }
}

impl Entity for Category {
    type Props = CategoryProps;

    fn unique_entity_id(&self) -> &UniqueEntityId {
        &self.id
    }

    fn props(&self) -> &CategoryProps {
        &self.props
    }
}
