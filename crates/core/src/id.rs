//! Entity identity.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Identifier of an entity: a validated UUID kept in its canonical string form.
///
/// Two ids are equal when their wrapped values are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UniqueEntityId(String);

impl UniqueEntityId {
    /// Generate a fresh random (v4) identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap an existing identifier, rejecting anything that is not UUID-shaped.
    /// Any accepted spelling (uppercase, simple, braced, URN) is stored as the
    /// lowercase hyphenated form.
    pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        let uuid = Uuid::parse_str(&value)
            .map_err(|_| DomainError::invalid_id(format!("id must be a valid UUID, got '{value}'")))?;
        Ok(Self::from_uuid(uuid))
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid.hyphenated().to_string())
    }

    pub fn value(&self) -> &str {
        &self.0
    }

    pub fn as_uuid(&self) -> Uuid {
        // Only constructed from validated input.
        Uuid::parse_str(&self.0).unwrap_or_default()
    }
}

impl Default for UniqueEntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<str> for UniqueEntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for UniqueEntityId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for UniqueEntityId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for UniqueEntityId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<UniqueEntityId> for String {
    fn from(value: UniqueEntityId) -> Self {
        value.0
    }
}

impl From<Uuid> for UniqueEntityId {
    fn from(value: Uuid) -> Self {
        Self::from_uuid(value)
    }
}

/// Lookup key accepted by repositories: a raw string or a [`UniqueEntityId`],
/// normalised to its string form. UUID-shaped strings are canonicalised the
/// same way [`UniqueEntityId::parse`] does; anything else is kept as is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityKey(String);

impl EntityKey {
    fn canonical(value: String) -> Self {
        match Uuid::parse_str(&value) {
            Ok(uuid) => Self(uuid.hyphenated().to_string()),
            Err(_) => Self(value),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for EntityKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityKey {
    fn from(value: &str) -> Self {
        Self::canonical(value.to_string())
    }
}

impl From<String> for EntityKey {
    fn from(value: String) -> Self {
        Self::canonical(value)
    }
}

impl From<&String> for EntityKey {
    fn from(value: &String) -> Self {
        Self::canonical(value.clone())
    }
}

impl From<UniqueEntityId> for EntityKey {
    fn from(value: UniqueEntityId) -> Self {
        Self(value.0)
    }
}

impl From<&UniqueEntityId> for EntityKey {
    fn from(value: &UniqueEntityId) -> Self {
        Self(value.0.clone())
    }
}
