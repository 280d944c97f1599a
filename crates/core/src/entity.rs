//! Entity trait: identity + continuity across state changes.

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::id::UniqueEntityId;

/// Entity marker + minimal interface.
///
/// An entity owns a [`UniqueEntityId`] fixed at construction and a property
/// bag (`Props`) that changes only through the entity's own methods.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Property bag of the entity. Serialized flat next to `id` by [`Entity::to_json`].
    type Props: Serialize;

    /// Returns the entity identifier.
    fn unique_entity_id(&self) -> &UniqueEntityId;

    /// Returns the property bag.
    fn props(&self) -> &Self::Props;

    /// String form of the identifier.
    fn id(&self) -> &str {
        self.unique_entity_id().value()
    }

    /// JSON projection: `{ "id": ..., ...props }`.
    fn to_json(&self) -> JsonValue {
        let mut object = Map::new();
        object.insert("id".to_string(), JsonValue::String(self.id().to_string()));

        match serde_json::to_value(self.props()) {
            Ok(JsonValue::Object(props)) => object.extend(props),
            Ok(JsonValue::Null) => {}
            Ok(other) => {
                object.insert("props".to_string(), other);
            }
            Err(e) => {
                tracing::warn!(id = %self.id(), error = %e, "entity props failed to serialize");
            }
        }

        JsonValue::Object(object)
    }
}
