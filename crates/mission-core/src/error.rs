//! Error types for mission creation
//!
//! Every failure of the creation pipeline maps to one [`MissionError`]
//! variant with a stable [`code`](MissionError::code), so an outer layer can
//! translate it without inspecting messages.

use crate::collaborators::CollaboratorError;
use crate::outcome::OutcomeError;
use crate::types::{MissionId, PersonId};
use mission_points::PointsError;
use mission_registry::{RegistryError, TeamId};

/// Main mission error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MissionError {
    /// Type not present in the variant registry
    #[error("unknown mission type: {0}")]
    UnknownMissionType(String),

    /// Outcome payload rejected
    #[error("invalid outcome: {0}")]
    InvalidOutcome(#[from] OutcomeError),

    /// Person reference is dangling
    #[error("person not found: {0}")]
    PersonNotFound(PersonId),

    /// Point value fractional, negative or above the ceiling
    #[error("invalid points for {mission_type}: {value} for team '{team}' (allowed 0..={max_points})")]
    InvalidPointValue {
        mission_type: String,
        team: TeamId,
        value: f64,
        max_points: u32,
    },

    /// Nonzero points outside the completing person's team
    #[error("mission points attributed to wrong team: {team} instead of {expected}")]
    MisattributedPoints { team: TeamId, expected: TeamId },

    /// Team not present in the team registry
    #[error("unknown team: {0}")]
    UnknownTeam(TeamId),

    /// Location rejected the completion notification
    #[error("location notification failed for mission {mission}: {source}")]
    NotificationFailed {
        mission: MissionId,
        source: CollaboratorError,
        /// Whether the inserted record was discarded again
        rolled_back: bool,
    },

    /// Lookup or store failure
    #[error("collaborator failed: {0}")]
    Collaborator(#[from] CollaboratorError),

    /// Registry failure other than a missing type
    #[error("registry error: {0}")]
    Registry(RegistryError),
}

impl MissionError {
    /// Stable machine-readable code
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownMissionType(_) => "UNKNOWN_MISSION_TYPE",
            Self::InvalidOutcome(_) => "INVALID_OUTCOME",
            Self::PersonNotFound(_) => "PERSON_NOT_FOUND",
            Self::InvalidPointValue { .. } => "INVALID_POINT_VALUE",
            Self::MisattributedPoints { .. } => "MISATTRIBUTED_POINTS",
            Self::UnknownTeam(_) => "UNKNOWN_TEAM",
            Self::NotificationFailed { .. } => "NOTIFICATION_FAILED",
            Self::Collaborator(_) => "COLLABORATOR_FAILED",
            Self::Registry(_) => "REGISTRY_ERROR",
        }
    }

    /// Check if the request itself was at fault
    #[inline]
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            Self::NotificationFailed { .. } | Self::Collaborator(_) | Self::Registry(_)
        )
    }

    /// Check if the caller may retry the same request
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NotificationFailed { .. } | Self::Collaborator(_))
    }
}

impl From<PointsError> for MissionError {
    fn from(err: PointsError) -> Self {
        match err {
            PointsError::UnknownMissionType(t) => Self::UnknownMissionType(t),
            PointsError::InvalidPointValue {
                mission_type,
                team,
                value,
                max_points,
            } => Self::InvalidPointValue {
                mission_type,
                team,
                value,
                max_points,
            },
            PointsError::MisattributedPoints { team, expected } => {
                Self::MisattributedPoints { team, expected }
            }
            PointsError::UnknownTeam(team) => Self::UnknownTeam(team),
            PointsError::Registry(err) => Self::Registry(err),
        }
    }
}

impl From<RegistryError> for MissionError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::UnknownMissionType(t) => Self::UnknownMissionType(t),
            other => Self::Registry(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let errors = [
            MissionError::UnknownMissionType("X".into()),
            MissionError::InvalidOutcome(OutcomeError::UnknownProduct("p".into())),
            MissionError::PersonNotFound("p1".into()),
            MissionError::InvalidPointValue {
                mission_type: "AddLocationMission".into(),
                team: "team1".into(),
                value: 11.0,
                max_points: 10,
            },
            MissionError::MisattributedPoints {
                team: "team2".into(),
                expected: "team1".into(),
            },
            MissionError::UnknownTeam("team9".into()),
            MissionError::NotificationFailed {
                mission: MissionId::new(),
                source: CollaboratorError::unavailable("location", "down"),
                rolled_back: true,
            },
            MissionError::Collaborator(CollaboratorError::unavailable("store", "down")),
            MissionError::Registry(RegistryError::DuplicateVariant("X".into())),
        ];
        let mut codes: Vec<&str> = errors.iter().map(MissionError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn client_errors_are_not_retryable() {
        let err = MissionError::PersonNotFound("ghost".into());
        assert!(err.is_client_error());
        assert!(!err.is_retryable());

        let err = MissionError::Collaborator(CollaboratorError::unavailable("people", "timeout"));
        assert!(!err.is_client_error());
        assert!(err.is_retryable());
    }

    #[test]
    fn points_errors_keep_their_kind() {
        let err: MissionError = PointsError::MisattributedPoints {
            team: "team4".into(),
            expected: "team3".into(),
        }
        .into();
        assert_eq!(err.code(), "MISATTRIBUTED_POINTS");

        let err: MissionError = PointsError::UnknownMissionType("Nope".into()).into();
        assert_eq!(err, MissionError::UnknownMissionType("Nope".into()));
    }

    #[test]
    fn duplicate_variant_is_not_an_unknown_type() {
        let dup = RegistryError::DuplicateVariant("AddLocationMission".into());
        let err = MissionError::from(dup.clone());
        assert_eq!(err, MissionError::Registry(dup.clone()));
        assert_eq!(err.code(), "REGISTRY_ERROR");
        assert!(!err.is_client_error());
        assert!(!err.is_retryable());

        let err: MissionError = PointsError::Registry(dup.clone()).into();
        assert_eq!(err, MissionError::Registry(dup));
    }
}
