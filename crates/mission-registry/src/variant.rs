//! Mission variant registry
//!
//! Provides [`VariantRegistry`], the explicit table of supported mission
//! variants. It is built once at startup and shared read-only.

use crate::kind::{short_identifier, MissionKind};
use crate::shape::OutcomeShape;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Registry errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Variant registered twice
    #[error("mission variant already registered: {0}")]
    DuplicateVariant(String),

    /// Type name or short identifier does not name a registered variant
    #[error("unknown mission type: {0}")]
    UnknownMissionType(String),
}

/// Definition of one mission variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantDefinition {
    /// Variant discriminant
    pub kind: MissionKind,
    /// Highest value any team may receive for one mission of this type
    pub max_points: u32,
    /// Structural definition of the outcome payload
    pub outcome_shape: OutcomeShape,
}

impl VariantDefinition {
    /// Built-in definition for `kind`
    #[must_use]
    pub fn builtin(kind: MissionKind) -> Self {
        Self {
            kind,
            max_points: kind.default_max_points(),
            outcome_shape: kind.default_outcome_shape(),
        }
    }

    /// Internal type name
    #[inline]
    #[must_use]
    pub fn type_id(&self) -> &'static str {
        self.kind.type_name()
    }

    /// External short identifier
    #[inline]
    #[must_use]
    pub fn identifier(&self) -> String {
        short_identifier(self.kind.type_name())
    }
}

/// Table of registered mission variants, keyed by discriminant.
///
/// Iteration follows registration order.
#[derive(Debug, Clone, Default)]
pub struct VariantRegistry {
    variants: IndexMap<MissionKind, VariantDefinition>,
}

impl VariantRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            variants: IndexMap::new(),
        }
    }

    /// Create registry with every built-in variant
    #[must_use]
    pub fn with_defaults() -> Self {
        let variants = MissionKind::ALL
            .into_iter()
            .map(|kind| (kind, VariantDefinition::builtin(kind)))
            .collect();
        Self { variants }
    }

    /// Register a variant
    ///
    /// # Errors
    /// - `RegistryError::DuplicateVariant` if `kind` is already registered
    pub fn register(
        &mut self,
        kind: MissionKind,
        max_points: u32,
        outcome_shape: OutcomeShape,
    ) -> Result<(), RegistryError> {
        if self.variants.contains_key(&kind) {
            return Err(RegistryError::DuplicateVariant(kind.type_name().to_string()));
        }
        self.variants.insert(
            kind,
            VariantDefinition {
                kind,
                max_points,
                outcome_shape,
            },
        );
        Ok(())
    }

    /// Resolve a variant by internal type name
    ///
    /// # Errors
    /// - `RegistryError::UnknownMissionType` if the name is outside the
    ///   closed set or was never registered
    pub fn resolve(&self, type_id: &str) -> Result<&VariantDefinition, RegistryError> {
        type_id
            .parse::<MissionKind>()
            .ok()
            .and_then(|kind| self.variants.get(&kind))
            .ok_or_else(|| RegistryError::UnknownMissionType(type_id.to_string()))
    }

    /// Resolve a variant by discriminant
    #[must_use]
    pub fn get(&self, kind: MissionKind) -> Option<&VariantDefinition> {
        self.variants.get(&kind)
    }

    /// Short identifier for a registered type name
    ///
    /// # Errors
    /// - `RegistryError::UnknownMissionType` if `type_id` is not registered
    pub fn identifier_for(&self, type_id: &str) -> Result<String, RegistryError> {
        self.resolve(type_id).map(VariantDefinition::identifier)
    }

    /// Inverse of [`identifier_for`](Self::identifier_for).
    ///
    /// Applies the same mechanical transform to every registered type name
    /// and compares exactly; no case folding.
    ///
    /// # Errors
    /// - `RegistryError::UnknownMissionType` if no registered variant matches
    pub fn resolve_by_identifier(&self, short_id: &str) -> Result<&'static str, RegistryError> {
        if short_id.is_empty() {
            return Err(RegistryError::UnknownMissionType(String::new()));
        }
        self.variants
            .values()
            .find(|v| v.identifier() == short_id)
            .map(VariantDefinition::type_id)
            .ok_or_else(|| RegistryError::UnknownMissionType(short_id.to_string()))
    }

    /// Registered type names in registration order
    #[must_use]
    pub fn type_ids(&self) -> Vec<&'static str> {
        self.variants.keys().map(|k| k.type_name()).collect()
    }

    /// Iterate over definitions in registration order
    pub fn iter(&self) -> impl Iterator<Item = &VariantDefinition> {
        self.variants.values()
    }

    /// Number of registered variants
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn registry_new_empty() {
        let registry = VariantRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.resolve("AddLocationMission").is_err());
    }

    #[test]
    fn registry_with_defaults() {
        let registry = VariantRegistry::with_defaults();
        assert_eq!(registry.len(), MissionKind::ALL.len());
        assert_eq!(registry.resolve("VisitBonusMission").unwrap().max_points, 100);
    }

    #[test]
    fn register_duplicate_fails() {
        let mut registry = VariantRegistry::new();
        registry
            .register(MissionKind::AddLocation, 10, OutcomeShape::Boolean)
            .unwrap();
        let err = registry
            .register(MissionKind::AddLocation, 5, OutcomeShape::Boolean)
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateVariant("AddLocationMission".to_string())
        );
        assert_eq!(registry.resolve("AddLocationMission").unwrap().max_points, 10);
    }

    #[test]
    fn resolve_unknown_type() {
        let registry = VariantRegistry::with_defaults();
        let err = registry.resolve("NotARealMission").unwrap_err();
        assert_eq!(
            err,
            RegistryError::UnknownMissionType("NotARealMission".to_string())
        );
    }

    #[test]
    fn unregistered_builtin_is_unknown() {
        let mut registry = VariantRegistry::new();
        registry
            .register(MissionKind::RateOptions, 10, MissionKind::RateOptions.default_outcome_shape())
            .unwrap();
        assert!(registry.resolve("AddLocationMission").is_err());
        assert!(registry.resolve_by_identifier("addLocation").is_err());
    }

    #[test]
    fn identifier_examples() {
        let registry = VariantRegistry::with_defaults();
        assert_eq!(registry.identifier_for("AddLocationMission").unwrap(), "addLocation");
        assert_eq!(registry.resolve_by_identifier("rateOptions").unwrap(), "RateOptionsMission");
    }

    #[test]
    fn identifier_lookup_is_case_sensitive() {
        let registry = VariantRegistry::with_defaults();
        assert!(registry.resolve_by_identifier("AddLocation").is_err());
        assert!(registry.resolve_by_identifier("addlocation").is_err());
        assert!(registry.resolve_by_identifier("addLocationMission").is_err());
        assert!(registry.resolve_by_identifier("").is_err());
    }

    #[test]
    fn type_ids_follow_registration_order() {
        let mut registry = VariantRegistry::new();
        registry
            .register(MissionKind::EffortValue, 10, OutcomeShape::Number)
            .unwrap();
        registry
            .register(MissionKind::AddLocation, 10, OutcomeShape::Boolean)
            .unwrap();
        assert_eq!(registry.type_ids(), vec!["EffortValueMission", "AddLocationMission"]);
    }

    proptest! {
        #[test]
        fn prop_identifier_round_trip(idx in 0..MissionKind::ALL.len()) {
            let registry = VariantRegistry::with_defaults();
            let type_id = MissionKind::ALL[idx].type_name();
            let short = registry.identifier_for(type_id).unwrap();
            prop_assert_eq!(registry.resolve_by_identifier(&short).unwrap(), type_id);
        }
    }
}
