//! Mission records
//!
//! A mission moves through three types, one per lifecycle state:
//! [`MissionRequest`] (constructing), [`PendingMission`] (validated, not yet
//! persisted) and [`Mission`] (persisted and notified). A [`PendingMission`]
//! can only come out of the lifecycle controller.

use crate::outcome::MissionOutcome;
use crate::types::{EntityRef, Location, LocationId, MissionId, Person, PersonId};
use chrono::{DateTime, Utc};
use mission_points::{Points, ProposedPoints};
use mission_registry::{short_identifier, MissionKind, TeamId};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Raw creation request as received from a caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionRequest {
    /// Internal type name, e.g. `"AddLocationMission"`
    #[serde(rename = "type")]
    pub mission_type: String,
    pub person: PersonId,
    pub location: LocationId,
    /// Unvalidated outcome payload
    pub outcome: Value,
    /// Proposed allocation; absent or empty means full credit to the person's team
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<ProposedPoints>,
    /// Completion timestamp, set when the mission completes immediately
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<DateTime<Utc>>,
}

impl MissionRequest {
    /// Create request with default points and no completion timestamp
    #[must_use]
    pub fn new(
        mission_type: impl Into<String>,
        person: impl Into<PersonId>,
        location: impl Into<LocationId>,
        outcome: Value,
    ) -> Self {
        Self {
            mission_type: mission_type.into(),
            person: person.into(),
            location: location.into(),
            outcome,
            points: None,
            completed: None,
        }
    }

    /// Propose an explicit allocation
    #[must_use]
    pub fn with_points<I, T>(mut self, points: I) -> Self
    where
        I: IntoIterator<Item = (T, f64)>,
        T: Into<TeamId>,
    {
        self.points = Some(points.into_iter().map(|(t, v)| (t.into(), v)).collect());
        self
    }

    /// Mark completed at `at`
    #[must_use]
    pub fn completed_at(mut self, at: DateTime<Utc>) -> Self {
        self.completed = Some(at);
        self
    }

    /// Mark completed now
    #[must_use]
    pub fn completed_now(self) -> Self {
        self.completed_at(Utc::now())
    }
}

/// A mission that passed validation but has not been persisted
#[derive(Debug, Clone, PartialEq)]
pub struct PendingMission {
    pub(crate) mission: Mission,
}

impl PendingMission {
    /// The validated mission
    #[inline]
    #[must_use]
    pub fn mission(&self) -> &Mission {
        &self.mission
    }

    /// Kind of the pending mission
    #[inline]
    #[must_use]
    pub fn kind(&self) -> MissionKind {
        self.mission.kind()
    }
}

/// A mission as held in memory
#[derive(Debug, Clone, PartialEq)]
pub struct Mission {
    pub id: MissionId,
    pub person: EntityRef<Person>,
    pub location: EntityRef<Location>,
    pub points: Points,
    pub outcome: MissionOutcome,
    pub completed: Option<DateTime<Utc>>,
}

impl Mission {
    /// Variant of this mission; fixed at creation
    #[inline]
    #[must_use]
    pub fn kind(&self) -> MissionKind {
        self.outcome.kind()
    }

    /// Internal type name
    #[inline]
    #[must_use]
    pub fn type_id(&self) -> &'static str {
        self.kind().type_name()
    }

    /// Identifier of the completing person
    #[inline]
    #[must_use]
    pub fn person_id(&self) -> &PersonId {
        self.person.id()
    }

    /// Identifier of the location
    #[inline]
    #[must_use]
    pub fn location_id(&self) -> &LocationId {
        self.location.id()
    }

    /// External representation with references flattened to ids
    #[must_use]
    pub fn to_view(&self) -> MissionView {
        MissionView {
            id: self.id,
            mission_type: short_identifier(self.type_id()),
            completed: self.completed,
            outcome: self.outcome.clone(),
            points: self.points.clone(),
            person: self.person_id().clone(),
            location: self.location_id().clone(),
        }
    }
}

/// External shape of a mission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissionView {
    pub id: MissionId,
    /// Short identifier, e.g. `"addLocation"`
    #[serde(rename = "type")]
    pub mission_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<DateTime<Utc>>,
    #[serde(serialize_with = "serialize_payload")]
    pub outcome: MissionOutcome,
    pub points: Points,
    pub person: PersonId,
    pub location: LocationId,
}

fn serialize_payload<S: Serializer>(outcome: &MissionOutcome, serializer: S) -> Result<S::Ok, S::Error> {
    outcome.serialize_payload(serializer)
}

impl From<&Mission> for MissionView {
    fn from(mission: &Mission) -> Self {
        mission.to_view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn mission(person: EntityRef<Person>, location: EntityRef<Location>) -> Mission {
        Mission {
            id: MissionId::new(),
            person,
            location,
            points: Points::single("team1".into(), 10),
            outcome: MissionOutcome::AddLocation(true),
            completed: None,
        }
    }

    #[test]
    fn view_flattens_references() {
        let bare = mission(PersonId::from("p1").into(), LocationId::from("l1").into());
        let expanded = Mission {
            person: Person::new("p1", "team1").into(),
            location: Location {
                id: "l1".into(),
                name: "Green Cafe".into(),
            }
            .into(),
            ..bare.clone()
        };

        let a = serde_json::to_value(bare.to_view()).unwrap();
        let b = serde_json::to_value(expanded.to_view()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a["person"], json!("p1"));
        assert_eq!(a["location"], json!("l1"));
    }

    #[test]
    fn view_shape() {
        let m = mission(PersonId::from("p1").into(), LocationId::from("l1").into());
        let view = serde_json::to_value(m.to_view()).unwrap();
        assert_eq!(
            view,
            json!({
                "id": m.id.to_string(),
                "type": "addLocation",
                "outcome": true,
                "points": {"team1": 10},
                "person": "p1",
                "location": "l1",
            })
        );
    }

    #[test]
    fn view_includes_completion_when_set() {
        let at = Utc::now();
        let m = Mission {
            completed: Some(at),
            ..mission(PersonId::from("p1").into(), LocationId::from("l1").into())
        };
        let view = serde_json::to_value(m.to_view()).unwrap();
        assert_eq!(view["completed"], serde_json::to_value(at).unwrap());
    }

    #[test]
    fn request_deserializes_external_form() {
        let request: MissionRequest = serde_json::from_value(json!({
            "type": "RateOptionsMission",
            "person": "p2",
            "location": "l1",
            "outcome": [{"product": "p", "info": 4}],
            "points": {"team2": 5},
        }))
        .unwrap();
        assert_eq!(request.mission_type, "RateOptionsMission");
        assert_eq!(request.points.unwrap().get("team2"), Some(&5.0));
        assert!(request.completed.is_none());
    }

    #[test]
    fn request_builder() {
        let request = MissionRequest::new("VisitBonusMission", "p3", "l1", json!(true))
            .with_points([("team3", 50.0), ("team4", 0.0)])
            .completed_now();
        assert_eq!(request.points.as_ref().map(|p| p.len()), Some(2));
        assert!(request.completed.is_some());
    }
}
