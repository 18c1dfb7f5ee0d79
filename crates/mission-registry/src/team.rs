//! Team registry
//!
//! The fixed, ordered set of teams that points may be attributed to.
//! Built once at startup (defaults or configuration) and read-only afterwards.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Identifier of the built-in observer team
pub const OBSERVER_TEAM: &str = "npc";

/// Team identifier as it appears in point maps (`"team1"`, `"npc"`, ...)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(String);

impl TeamId {
    /// Create team identifier
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TeamId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TeamId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for TeamId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A registered team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamEntry {
    /// Identifier used as the key in point maps
    pub id: TeamId,
    /// Human-readable name
    pub display_name: String,
    /// Whether points earned by this team count towards location scores.
    /// The observer team is registered but does not score.
    #[serde(default = "default_scoring")]
    pub scoring: bool,
}

fn default_scoring() -> bool {
    true
}

impl TeamEntry {
    /// Create a scoring team entry
    #[must_use]
    pub fn scoring(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: TeamId::new(id),
            display_name: display_name.into(),
            scoring: true,
        }
    }

    /// Create a non-scoring observer entry
    #[must_use]
    pub fn observer(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: TeamId::new(id),
            display_name: display_name.into(),
            scoring: false,
        }
    }
}

/// Ordered lookup table of valid teams
#[derive(Debug, Clone, Default)]
pub struct TeamRegistry {
    teams: Vec<TeamEntry>,
}

impl TeamRegistry {
    /// Create registry from an explicit, ordered list.
    ///
    /// Later duplicates of an id are ignored so the first declaration wins.
    #[must_use]
    pub fn new(entries: impl IntoIterator<Item = TeamEntry>) -> Self {
        let mut teams: Vec<TeamEntry> = Vec::new();
        for entry in entries {
            if !teams.iter().any(|t| t.id == entry.id) {
                teams.push(entry);
            }
        }
        Self { teams }
    }

    /// Registry with the five player teams and the observer team
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(default_teams())
    }

    /// Team identifiers in registration order
    #[must_use]
    pub fn list_teams(&self) -> Vec<&TeamId> {
        self.teams.iter().map(|t| &t.id).collect()
    }

    /// Check whether `id` names a registered team
    #[inline]
    #[must_use]
    pub fn is_valid_team(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Look up a team entry
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&TeamEntry> {
        self.teams.iter().find(|t| t.id.as_str() == id)
    }

    /// Whether points for `id` count towards scores.
    /// Unknown teams never score.
    #[must_use]
    pub fn is_scoring(&self, id: &str) -> bool {
        self.get(id).is_some_and(|t| t.scoring)
    }

    /// Scoring teams in registration order
    pub fn scoring_teams(&self) -> impl Iterator<Item = &TeamEntry> {
        self.teams.iter().filter(|t| t.scoring)
    }

    /// Iterate over all entries
    pub fn iter(&self) -> impl Iterator<Item = &TeamEntry> {
        self.teams.iter()
    }

    /// Number of registered teams
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.teams.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}

/// The built-in team table
#[must_use]
pub fn default_teams() -> Vec<TeamEntry> {
    vec![
        TeamEntry::scoring("team1", "Team 1"),
        TeamEntry::scoring("team2", "Team 2"),
        TeamEntry::scoring("team3", "Team 3"),
        TeamEntry::scoring("team4", "Team 4"),
        TeamEntry::scoring("team5", "Team 5"),
        TeamEntry::observer(OBSERVER_TEAM, "Observers"),
    ]
}
