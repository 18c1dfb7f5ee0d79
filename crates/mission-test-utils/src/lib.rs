//! Testing utilities for the mission workspace
//!
//! In-memory collaborators with call counters and failure injection, plus
//! fixtures for building a ready-to-use [`MissionLifecycle`].

#![allow(missing_docs)]

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use mission_core::{
    CollaboratorError, Collaborators, LocationId, LocationNotifier, Mission, MissionId,
    MissionLifecycle, MissionStore, Person, PersonDirectory, PersonId, ProductCatalog, ProductId,
    SaveOutcome,
};
use mission_registry::{MissionKind, TeamId, TeamRegistry, VariantRegistry};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Location used by fixtures
pub const TEST_LOCATION: &str = "location-1";

/// Product known to the fixture catalog
pub const TEST_PRODUCT: &str = "product-1";

/// Person directory backed by a map
#[derive(Debug, Default)]
pub struct InMemoryPeople {
    people: DashMap<PersonId, Person>,
    lookups: AtomicUsize,
    unavailable: AtomicBool,
}

impl InMemoryPeople {
    /// Empty directory
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a person on `team`
    #[must_use]
    pub fn with_person(self, id: impl Into<PersonId>, team: impl Into<TeamId>) -> Self {
        self.insert(Person::new(id, team));
        self
    }

    /// Add or replace a person
    pub fn insert(&self, person: Person) {
        self.people.insert(person.id.clone(), person);
    }

    /// Move a person to another team
    pub fn reassign(&self, id: &PersonId, team: impl Into<TeamId>) {
        if let Some(mut person) = self.people.get_mut(id) {
            person.team = team.into();
        }
    }

    /// Make every following lookup fail
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of lookups served, failed ones included
    #[must_use]
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PersonDirectory for InMemoryPeople {
    async fn find_person_by_id(&self, id: &PersonId) -> Result<Option<Person>, CollaboratorError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CollaboratorError::unavailable("people", "directory offline"));
        }
        Ok(self.people.get(id).map(|p| p.clone()))
    }
}

/// Product catalog backed by a set
#[derive(Debug, Default)]
pub struct InMemoryProducts {
    products: DashSet<ProductId>,
    lookups: AtomicUsize,
}

impl InMemoryProducts {
    /// Empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a known product
    #[must_use]
    pub fn with_product(self, id: impl Into<String>) -> Self {
        self.products.insert(ProductId::new(id));
        self
    }

    /// Number of existence checks served
    #[must_use]
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProductCatalog for InMemoryProducts {
    async fn product_exists(&self, id: &ProductId) -> Result<bool, CollaboratorError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.products.contains(id))
    }
}

/// Accumulated state of one location
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationTally {
    /// Missions completed here, in notification order
    pub missions: Vec<MissionId>,
    /// Points per scoring team
    pub points: BTreeMap<TeamId, u64>,
}

/// Location notifier that accumulates points per location.
///
/// Only teams the registry marks as scoring are added to a tally.
#[derive(Debug)]
pub struct InMemoryLocations {
    teams: Arc<TeamRegistry>,
    tallies: DashMap<LocationId, LocationTally>,
    notifications: DashMap<MissionId, usize>,
    calls: AtomicUsize,
    rejecting: AtomicBool,
}

impl InMemoryLocations {
    /// Notifier that tallies the scoring teams of `teams`
    #[must_use]
    pub fn new(teams: Arc<TeamRegistry>) -> Self {
        Self {
            teams,
            tallies: DashMap::new(),
            notifications: DashMap::new(),
            calls: AtomicUsize::new(0),
            rejecting: AtomicBool::new(false),
        }
    }

    /// Make every following notification fail
    pub fn set_rejecting(&self, rejecting: bool) {
        self.rejecting.store(rejecting, Ordering::SeqCst);
    }

    /// Total notification attempts
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Accepted notifications for one mission
    #[must_use]
    pub fn notifications_for(&self, id: &MissionId) -> usize {
        self.notifications.get(id).map_or(0, |n| *n)
    }

    /// Current tally of a location; empty if never notified
    #[must_use]
    pub fn tally(&self, id: &LocationId) -> LocationTally {
        self.tallies.get(id).map(|t| t.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LocationNotifier for InMemoryLocations {
    async fn notify_mission_completed(&self, mission: &Mission) -> Result<(), CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.rejecting.load(Ordering::SeqCst) {
            return Err(CollaboratorError::rejected("location", "location closed"));
        }

        *self.notifications.entry(mission.id).or_insert(0) += 1;

        let mut tally = self.tallies.entry(mission.location_id().clone()).or_default();
        tally.missions.push(mission.id);
        for (team, value) in mission.points.iter() {
            if self.teams.is_scoring(team.as_str()) {
                *tally.points.entry(team.clone()).or_insert(0) += u64::from(value);
            }
        }
        Ok(())
    }
}

/// Mission store backed by a map
#[derive(Debug, Default)]
pub struct InMemoryStore {
    missions: DashMap<MissionId, Mission>,
    saves: AtomicUsize,
    discards: AtomicUsize,
    failing_saves: AtomicBool,
    failing_discards: AtomicBool,
}

impl InMemoryStore {
    /// Empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following save fail
    pub fn set_failing_saves(&self, failing: bool) {
        self.failing_saves.store(failing, Ordering::SeqCst);
    }

    /// Make every following discard fail
    pub fn set_failing_discards(&self, failing: bool) {
        self.failing_discards.store(failing, Ordering::SeqCst);
    }

    /// Stored copy of a mission
    #[must_use]
    pub fn get(&self, id: &MissionId) -> Option<Mission> {
        self.missions.get(id).map(|m| m.clone())
    }

    /// Check if a mission is stored
    #[must_use]
    pub fn contains(&self, id: &MissionId) -> bool {
        self.missions.contains_key(id)
    }

    /// Number of stored missions
    #[must_use]
    pub fn len(&self) -> usize {
        self.missions.len()
    }

    /// Check if nothing is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.missions.is_empty()
    }

    /// Save attempts, failed ones included
    #[must_use]
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Discard attempts, failed ones included
    #[must_use]
    pub fn discards(&self) -> usize {
        self.discards.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MissionStore for InMemoryStore {
    async fn save(&self, mission: &Mission) -> Result<SaveOutcome, CollaboratorError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.failing_saves.load(Ordering::SeqCst) {
            return Err(CollaboratorError::unavailable("store", "write failed"));
        }
        Ok(match self.missions.insert(mission.id, mission.clone()) {
            None => SaveOutcome::Inserted,
            Some(_) => SaveOutcome::Updated,
        })
    }

    async fn discard(&self, id: &MissionId) -> Result<(), CollaboratorError> {
        self.discards.fetch_add(1, Ordering::SeqCst);
        if self.failing_discards.load(Ordering::SeqCst) {
            return Err(CollaboratorError::unavailable("store", "delete failed"));
        }
        self.missions.remove(id);
        Ok(())
    }
}

/// A lifecycle wired to in-memory collaborators
#[derive(Debug, Clone)]
pub struct TestHarness {
    pub people: Arc<InMemoryPeople>,
    pub locations: Arc<InMemoryLocations>,
    pub products: Arc<InMemoryProducts>,
    pub store: Arc<InMemoryStore>,
    pub lifecycle: MissionLifecycle,
}

impl TestHarness {
    /// Harness over the given registries.
    ///
    /// Registers one person per team (see [`person_on`]) and [`TEST_PRODUCT`].
    #[must_use]
    pub fn with_registries(variants: Arc<VariantRegistry>, teams: Arc<TeamRegistry>) -> Self {
        let people = Arc::new(InMemoryPeople::new());
        for team in teams.iter() {
            people.insert(Person::new(person_on(team.id.as_str()), team.id.clone()));
        }
        let locations = Arc::new(InMemoryLocations::new(Arc::clone(&teams)));
        let products = Arc::new(InMemoryProducts::new().with_product(TEST_PRODUCT));
        let store = Arc::new(InMemoryStore::new());

        let collaborators = Collaborators::new(
            people.clone(),
            locations.clone(),
            products.clone(),
            store.clone(),
        );
        let lifecycle = MissionLifecycle::new(variants, teams, collaborators);

        Self {
            people,
            locations,
            products,
            store,
            lifecycle,
        }
    }
}

/// Harness with the built-in registries
#[must_use]
pub fn setup_lifecycle() -> TestHarness {
    TestHarness::with_registries(
        Arc::new(VariantRegistry::with_defaults()),
        Arc::new(TeamRegistry::with_defaults()),
    )
}

/// Fixture person id for a member of `team`
#[must_use]
pub fn person_on(team: &str) -> PersonId {
    PersonId::new(format!("person-{team}"))
}

/// An outcome payload `kind` accepts; product references use [`TEST_PRODUCT`]
#[must_use]
pub fn valid_outcome(kind: MissionKind) -> Value {
    match kind {
        MissionKind::AddLocation | MissionKind::VisitBonus | MissionKind::HasOptions => json!(true),
        MissionKind::WantVegan => json!({
            "expressions": ["more vegan options"],
            "others": [],
        }),
        MissionKind::WhatOptions | MissionKind::BuyOptions => {
            json!([{"product": TEST_PRODUCT, "info": "tasty"}])
        }
        MissionKind::RateOptions => json!([{"product": TEST_PRODUCT, "info": 4}]),
        MissionKind::GiveFeedback => json!({"feedback": "Great place", "didNotDoIt": false}),
        MissionKind::OfferQuality | MissionKind::EffortValue => json!(3),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mission_core::MissionRequest;

    #[tokio::test]
    async fn harness_creates_missions() {
        let harness = setup_lifecycle();
        let request = MissionRequest::new(
            "AddLocationMission",
            person_on("team1"),
            TEST_LOCATION,
            valid_outcome(MissionKind::AddLocation),
        );
        let mission = harness.lifecycle.create_mission(request).await.unwrap();

        assert!(harness.store.contains(&mission.id));
        assert_eq!(harness.locations.notifications_for(&mission.id), 1);
    }

    #[tokio::test]
    async fn observer_points_are_not_tallied() {
        let harness = setup_lifecycle();
        for team in ["team2", "npc"] {
            let request = MissionRequest::new(
                "HasOptionsMission",
                person_on(team),
                TEST_LOCATION,
                valid_outcome(MissionKind::HasOptions),
            );
            harness.lifecycle.create_mission(request).await.unwrap();
        }

        let tally = harness.locations.tally(&LocationId::from(TEST_LOCATION));
        assert_eq!(tally.missions.len(), 2);
        assert_eq!(tally.points.get("team2"), Some(&10));
        assert!(!tally.points.contains_key("npc"));
    }

    #[tokio::test]
    async fn store_reports_updates() {
        let store = InMemoryStore::new();
        let harness = setup_lifecycle();
        let request = MissionRequest::new(
            "EffortValueMission",
            person_on("team3"),
            TEST_LOCATION,
            valid_outcome(MissionKind::EffortValue),
        );
        let pending = harness.lifecycle.validate_request(request).await.unwrap();

        assert_eq!(store.save(pending.mission()).await.unwrap(), SaveOutcome::Inserted);
        assert_eq!(store.save(pending.mission()).await.unwrap(), SaveOutcome::Updated);
        assert_eq!(store.len(), 1);
    }
}
