//! Point maps
//!
//! [`ProposedPoints`] is what a caller submits; [`Points`] is what survives
//! validation and is stored on a mission.

use mission_registry::TeamId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Caller-supplied allocation.
///
/// Values are kept as received so non-integers can be rejected rather
/// than silently truncated.
pub type ProposedPoints = BTreeMap<TeamId, f64>;

/// Validated per-team allocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Points(BTreeMap<TeamId, u32>);

impl Points {
    /// Empty allocation
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocation giving `value` to a single team
    #[must_use]
    pub fn single(team: TeamId, value: u32) -> Self {
        Self(BTreeMap::from([(team, value)]))
    }

    /// Points held by `team`, if it has an entry
    #[inline]
    #[must_use]
    pub fn get(&self, team: &str) -> Option<u32> {
        self.0.get(team).copied()
    }

    /// The team holding a nonzero value, if any.
    ///
    /// A validated allocation has at most one.
    #[must_use]
    pub fn awarded(&self) -> Option<(&TeamId, u32)> {
        self.0.iter().find(|(_, v)| **v > 0).map(|(t, v)| (t, *v))
    }

    /// Teams holding a nonzero value
    #[must_use]
    pub fn nonzero_teams(&self) -> Vec<&TeamId> {
        self.0.iter().filter(|(_, v)| **v > 0).map(|(t, _)| t).collect()
    }

    /// Sum of all values
    #[must_use]
    pub fn total(&self) -> u64 {
        self.0.values().map(|v| u64::from(*v)).sum()
    }

    /// Iterate entries in team order
    pub fn iter(&self) -> impl Iterator<Item = (&TeamId, u32)> {
        self.0.iter().map(|(t, v)| (t, *v))
    }

    /// Number of entries, zero-valued ones included
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if there are no entries
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(TeamId, u32)> for Points {
    fn from_iter<I: IntoIterator<Item = (TeamId, u32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
