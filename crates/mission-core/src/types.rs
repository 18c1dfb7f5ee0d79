//! Core types for missions
//!
//! Identifiers and the foreign entities a mission refers to:
//! - Mission identifiers (ULID for sortability)
//! - Person, location and product identifiers (opaque, owned elsewhere)
//! - [`EntityRef`], a reference that may or may not be expanded in memory

use mission_registry::TeamId;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use ulid::Ulid;

/// Unique mission identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MissionId(pub Ulid);

impl MissionId {
    /// Generate new mission ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for MissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an identifier issued by the owning store
            #[inline]
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow as string slice
            #[inline]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

opaque_id!(
    /// Identifier of a participant
    PersonId
);
opaque_id!(
    /// Identifier of a location
    LocationId
);

/// Identifier of a product.
///
/// Outcome payloads carry product ids either as strings or as integers;
/// both deserialize to the same textual form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Wrap a product identifier
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self(s),
            Raw::Number(n) => Self(n.to_string()),
        })
    }
}

/// An entity owned outside this subsystem
pub trait Entity {
    /// Identifier type
    type Id: Clone + fmt::Debug + PartialEq;

    /// Identifier of this entity
    fn id(&self) -> &Self::Id;
}

/// A participant, as far as missions are concerned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub team: TeamId,
}

impl Person {
    /// Create person
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<PersonId>, team: impl Into<TeamId>) -> Self {
        Self {
            id: id.into(),
            team: team.into(),
        }
    }
}

impl Entity for Person {
    type Id = PersonId;

    fn id(&self) -> &PersonId {
        &self.id
    }
}

/// A location missions are performed at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
}

impl Entity for Location {
    type Id = LocationId;

    fn id(&self) -> &LocationId {
        &self.id
    }
}

/// Reference to a foreign entity, either bare or expanded
#[derive(Debug, Clone, PartialEq)]
pub enum EntityRef<T: Entity> {
    /// Only the identifier is known
    Id(T::Id),
    /// The entity was loaded
    Expanded(T),
}

impl<T: Entity> EntityRef<T> {
    /// Identifier, whether or not the entity is expanded
    #[must_use]
    pub fn id(&self) -> &T::Id {
        match self {
            Self::Id(id) => id,
            Self::Expanded(entity) => entity.id(),
        }
    }

    /// The loaded entity, if expanded
    #[must_use]
    pub fn expanded(&self) -> Option<&T> {
        match self {
            Self::Id(_) => None,
            Self::Expanded(entity) => Some(entity),
        }
    }
}

impl From<PersonId> for EntityRef<Person> {
    fn from(id: PersonId) -> Self {
        Self::Id(id)
    }
}

impl From<Person> for EntityRef<Person> {
    fn from(person: Person) -> Self {
        Self::Expanded(person)
    }
}

impl From<LocationId> for EntityRef<Location> {
    fn from(id: LocationId) -> Self {
        Self::Id(id)
    }
}

impl From<Location> for EntityRef<Location> {
    fn from(location: Location) -> Self {
        Self::Expanded(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mission_ids_are_unique() {
        assert_ne!(MissionId::new(), MissionId::new());
    }

    #[test]
    fn product_id_accepts_text_and_integer() {
        let text: ProductId = serde_json::from_str("\"p-1\"").unwrap();
        let number: ProductId = serde_json::from_str("42").unwrap();
        assert_eq!(text.as_str(), "p-1");
        assert_eq!(number, ProductId::from("42"));
        assert_eq!(serde_json::to_string(&number).unwrap(), "\"42\"");
    }

    #[test]
    fn entity_ref_id_is_stable_across_expansion() {
        let person = Person::new("p1", "team1");
        let bare: EntityRef<Person> = PersonId::from("p1").into();
        let expanded: EntityRef<Person> = person.clone().into();

        assert_eq!(bare.id(), expanded.id());
        assert!(bare.expanded().is_none());
        assert_eq!(expanded.expanded(), Some(&person));
    }
}
