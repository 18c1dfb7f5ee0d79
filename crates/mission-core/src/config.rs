//! Mission configuration
//!
//! Loaded from TOML. Every section is optional; an empty document yields the
//! built-in team and variant tables.
//!
//! ```toml
//! [[teams]]
//! id = "red"
//! display_name = "Red"
//!
//! [[teams]]
//! id = "npc"
//! display_name = "Observers"
//! scoring = false
//!
//! [max_points]
//! VisitBonusMission = 50
//! ```

use mission_registry::{default_teams, MissionKind, RegistryError, TeamEntry, TeamRegistry, VariantRegistry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Document is not valid TOML or has the wrong structure
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Override names a type outside the variant set
    #[error("unknown mission type in max_points: {0}")]
    UnknownMissionType(String),

    /// Team table is present but empty
    #[error("team table is empty")]
    NoTeams,

    /// Registry construction failed
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
}

/// Team table and per-variant point ceilings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionConfig {
    /// Teams in declaration order
    #[serde(default = "default_teams")]
    pub teams: Vec<TeamEntry>,

    /// Max points keyed by internal type name; unlisted types keep their default
    #[serde(default)]
    pub max_points: BTreeMap<String, u32>,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            teams: default_teams(),
            max_points: BTreeMap::new(),
        }
    }
}

impl MissionConfig {
    /// Parse from a TOML document
    ///
    /// # Errors
    /// - `ConfigError::Parse` if the document is malformed
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// - `ConfigError::Io` if the file cannot be read
    /// - `ConfigError::Parse` if the document is malformed
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Add a team
    #[must_use]
    pub fn with_team(mut self, entry: TeamEntry) -> Self {
        self.teams.push(entry);
        self
    }

    /// Override the ceiling of one variant
    #[must_use]
    pub fn with_max_points(mut self, kind: MissionKind, max_points: u32) -> Self {
        self.max_points.insert(kind.type_name().to_string(), max_points);
        self
    }

    /// Build the team registry
    ///
    /// # Errors
    /// - `ConfigError::NoTeams` if the team table is empty
    pub fn build_team_registry(&self) -> Result<TeamRegistry, ConfigError> {
        if self.teams.is_empty() {
            return Err(ConfigError::NoTeams);
        }
        Ok(TeamRegistry::new(self.teams.iter().cloned()))
    }

    /// Build the variant registry: every built-in variant, with overrides applied
    ///
    /// # Errors
    /// - `ConfigError::UnknownMissionType` if an override names an unknown type
    pub fn build_variant_registry(&self) -> Result<VariantRegistry, ConfigError> {
        let mut overrides = BTreeMap::new();
        for (name, &max) in &self.max_points {
            let kind: MissionKind = name
                .parse()
                .map_err(|_| ConfigError::UnknownMissionType(name.clone()))?;
            overrides.insert(kind, max);
        }

        let mut registry = VariantRegistry::new();
        for kind in MissionKind::ALL {
            let max = overrides
                .get(&kind)
                .copied()
                .unwrap_or_else(|| kind.default_max_points());
            registry.register(kind, max, kind.default_outcome_shape())?;
        }
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_yields_defaults() {
        let config = MissionConfig::from_toml_str("").unwrap();
        assert_eq!(config, MissionConfig::default());

        let teams = config.build_team_registry().unwrap();
        let variants = config.build_variant_registry().unwrap();
        assert_eq!(teams.len(), 6);
        assert_eq!(variants.len(), MissionKind::ALL.len());
    }

    #[test]
    fn overrides_apply() {
        let config = MissionConfig::from_toml_str(
            r#"
            [[teams]]
            id = "red"
            display_name = "Red"

            [[teams]]
            id = "npc"
            display_name = "Observers"
            scoring = false

            [max_points]
            VisitBonusMission = 50
            "#,
        )
        .unwrap();

        let teams = config.build_team_registry().unwrap();
        assert!(teams.is_scoring("red"));
        assert!(!teams.is_scoring("npc"));
        assert!(!teams.is_valid_team("team1"));

        let variants = config.build_variant_registry().unwrap();
        assert_eq!(variants.resolve("VisitBonusMission").unwrap().max_points, 50);
        assert_eq!(variants.resolve("AddLocationMission").unwrap().max_points, 10);
    }

    #[test]
    fn unknown_override_rejected() {
        let config = MissionConfig::default().with_max_points(MissionKind::BuyOptions, 5);
        assert!(config.build_variant_registry().is_ok());

        let mut config = MissionConfig::default();
        config.max_points.insert("NotARealMission".into(), 5);
        let err = config.build_variant_registry().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownMissionType(name) if name == "NotARealMission"));
    }

    #[test]
    fn empty_team_table_rejected() {
        let config = MissionConfig::from_toml_str("teams = []").unwrap();
        assert!(matches!(config.build_team_registry(), Err(ConfigError::NoTeams)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[max_points]\nOfferQualityMission = 3").unwrap();

        let config = MissionConfig::load(file.path()).unwrap();
        assert_eq!(config.max_points.get("OfferQualityMission"), Some(&3));
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = MissionConfig::load(dir.path().join("missions.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn builder_appends_team() {
        let config = MissionConfig::default().with_team(TeamEntry::scoring("team6", "Team 6"));
        assert!(config.build_team_registry().unwrap().is_valid_team("team6"));
    }
}
