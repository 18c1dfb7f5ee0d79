//! Points allocation validation
//!
//! Enforces the attribution invariant: every value is an integer in
//! `0..=max_points`, and only the completing person's team may hold a
//! nonzero value.

use crate::points::{Points, ProposedPoints};
use mission_registry::{RegistryError, TeamId, TeamRegistry, VariantRegistry};
use std::sync::Arc;

/// Points validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PointsError {
    /// Mission type not registered
    #[error("unknown mission type: {0}")]
    UnknownMissionType(String),

    /// Value is fractional, negative, non-finite or above the ceiling
    #[error("invalid points for {mission_type}: {value} for team '{team}' (allowed 0..={max_points})")]
    InvalidPointValue {
        mission_type: String,
        team: TeamId,
        value: f64,
        max_points: u32,
    },

    /// Nonzero value for a team other than the completing person's
    #[error("mission points attributed to wrong team: {team} instead of {expected}")]
    MisattributedPoints { team: TeamId, expected: TeamId },

    /// Team not present in the team registry
    #[error("unknown team: {0}")]
    UnknownTeam(TeamId),

    /// Registry failure other than a missing type
    #[error(transparent)]
    Registry(RegistryError),
}

impl From<RegistryError> for PointsError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::UnknownMissionType(t) => Self::UnknownMissionType(t),
            other => Self::Registry(other),
        }
    }
}

/// Validate a proposal against a known ceiling.
///
/// Pure core of [`PointsValidator::validate`]: no registry lookups beyond the
/// optional team check. Entries are visited in team order and the first
/// violation is returned.
///
/// # Errors
/// - `PointsError::UnknownTeam` if `is_valid_team` rejects a key
/// - `PointsError::InvalidPointValue` for out-of-range or fractional values
/// - `PointsError::MisattributedPoints` for nonzero values outside `team`
pub fn validate_allocation(
    mission_type: &str,
    max_points: u32,
    proposed: Option<&ProposedPoints>,
    team: &TeamId,
    is_valid_team: impl Fn(&TeamId) -> bool,
) -> Result<Points, PointsError> {
    let proposed = match proposed {
        Some(p) if !p.is_empty() => p,
        _ => return Ok(Points::single(team.clone(), max_points)),
    };

    let mut validated = Vec::with_capacity(proposed.len());
    for (t, &value) in proposed {
        if !is_valid_team(t) {
            return Err(PointsError::UnknownTeam(t.clone()));
        }

        let points = as_point_value(value, max_points).ok_or_else(|| {
            PointsError::InvalidPointValue {
                mission_type: mission_type.to_string(),
                team: t.clone(),
                value,
                max_points,
            }
        })?;

        if points > 0 && t != team {
            return Err(PointsError::MisattributedPoints {
                team: t.clone(),
                expected: team.clone(),
            });
        }

        validated.push((t.clone(), points));
    }

    Ok(validated.into_iter().collect())
}

/// Integer value in `0..=max`, or `None`
fn as_point_value(value: f64, max: u32) -> Option<u32> {
    if !value.is_finite() || value.fract() != 0.0 || value < 0.0 || value > f64::from(max) {
        return None;
    }
    // In range and integral, so the cast is exact.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Some(value as u32)
}

/// Points allocation validator
///
/// Holds shared, read-only handles to the registries; cheap to clone.
#[derive(Debug, Clone)]
pub struct PointsValidator {
    variants: Arc<VariantRegistry>,
    teams: Arc<TeamRegistry>,
}

impl PointsValidator {
    /// Create new validator
    #[inline]
    #[must_use]
    pub fn new(variants: Arc<VariantRegistry>, teams: Arc<TeamRegistry>) -> Self {
        Self { variants, teams }
    }

    /// Validate or default the allocation for one mission
    ///
    /// # Arguments
    /// * `mission_type` - Internal type name
    /// * `proposed` - Caller-supplied allocation; `None` or empty means default
    /// * `team` - Team of the completing person
    ///
    /// # Returns
    /// `{ team: max_points }` when nothing was proposed, otherwise the
    /// proposal unchanged
    ///
    /// # Errors
    /// - `PointsError::UnknownMissionType` if the type is not registered
    /// - `PointsError::UnknownTeam` if `team` or a proposal key is not registered
    /// - `PointsError::InvalidPointValue` / `PointsError::MisattributedPoints`
    ///   on the first violating entry
    pub fn validate(
        &self,
        mission_type: &str,
        proposed: Option<&ProposedPoints>,
        team: &TeamId,
    ) -> Result<Points, PointsError> {
        let variant = self.variants.resolve(mission_type)?;

        if !self.teams.is_valid_team(team.as_str()) {
            return Err(PointsError::UnknownTeam(team.clone()));
        }

        validate_allocation(mission_type, variant.max_points, proposed, team, |t| {
            self.teams.is_valid_team(t.as_str())
        })
    }

    /// Ceiling for a registered type
    ///
    /// # Errors
    /// - `PointsError::UnknownMissionType` if the type is not registered
    pub fn max_points(&self, mission_type: &str) -> Result<u32, PointsError> {
        Ok(self.variants.resolve(mission_type)?.max_points)
    }

    /// Shared team registry
    #[inline]
    #[must_use]
    pub fn teams(&self) -> &TeamRegistry {
        &self.teams
    }

    /// Shared variant registry
    #[inline]
    #[must_use]
    pub fn variants(&self) -> &VariantRegistry {
        &self.variants
    }
}
