//! Mission lifecycle controller
//!
//! Sequences the creation pipeline: resolve the variant, check the outcome,
//! look up the completing person, validate points, persist, then notify the
//! location. Each step runs only once the previous one succeeded.

use crate::collaborators::{Collaborators, SaveOutcome};
use crate::config::{ConfigError, MissionConfig};
use crate::error::MissionError;
use crate::mission::{Mission, MissionRequest, PendingMission};
use crate::outcome::{MissionOutcome, OutcomeError};
use crate::types::{EntityRef, MissionId, Person, PersonId};
use mission_points::{PointsValidator, ProposedPoints};
use mission_registry::{TeamId, TeamRegistry, VariantRegistry};
use std::sync::Arc;

/// Mission lifecycle controller
///
/// Holds the read-only registries and the collaborator handles. Cheap to
/// clone; clones share everything.
#[derive(Debug, Clone)]
pub struct MissionLifecycle {
    variants: Arc<VariantRegistry>,
    teams: Arc<TeamRegistry>,
    points: PointsValidator,
    collaborators: Collaborators,
}

impl MissionLifecycle {
    /// Create new controller
    #[must_use]
    pub fn new(
        variants: Arc<VariantRegistry>,
        teams: Arc<TeamRegistry>,
        collaborators: Collaborators,
    ) -> Self {
        let points = PointsValidator::new(Arc::clone(&variants), Arc::clone(&teams));
        Self {
            variants,
            teams,
            points,
            collaborators,
        }
    }

    /// Create controller with registries built from configuration
    ///
    /// # Errors
    /// Propagates registry construction errors from `config`
    pub fn from_config(
        config: &MissionConfig,
        collaborators: Collaborators,
    ) -> Result<Self, ConfigError> {
        Ok(Self::new(
            Arc::new(config.build_variant_registry()?),
            Arc::new(config.build_team_registry()?),
            collaborators,
        ))
    }

    /// Variant registry in use
    #[inline]
    #[must_use]
    pub fn variants(&self) -> &VariantRegistry {
        &self.variants
    }

    /// Team registry in use
    #[inline]
    #[must_use]
    pub fn teams(&self) -> &TeamRegistry {
        &self.teams
    }

    /// Create, persist and announce a mission
    ///
    /// # Workflow
    /// 1. Resolve the variant
    /// 2. Check the outcome against its shape and resolve product references
    /// 3. Look up the completing person's team
    /// 4. Validate or default the points allocation
    /// 5. Construct the mission
    /// 6. Persist; notify the location on first insert only
    ///
    /// # Errors
    /// The first failing step's error; later steps do not run. A failed
    /// notification discards the inserted record again and reports
    /// `MissionError::NotificationFailed`.
    #[tracing::instrument(skip(self, request), fields(mission_type = %request.mission_type, person = %request.person))]
    pub async fn create_mission(&self, request: MissionRequest) -> Result<Mission, MissionError> {
        let pending = match self.validate_request(request).await {
            Ok(pending) => pending,
            Err(e) => {
                if e.is_client_error() {
                    tracing::warn!(code = e.code(), "Mission rejected: {}", e);
                } else {
                    tracing::error!(code = e.code(), "Mission validation failed: {}", e);
                }
                return Err(e);
            }
        };

        let mission = self.commit(pending).await?;
        tracing::info!(
            mission = %mission.id,
            points = mission.points.total(),
            "Mission created"
        );
        Ok(mission)
    }

    /// Run every pre-persistence step and produce a validated mission
    ///
    /// Touches the person directory and product catalog but never the store
    /// or the location.
    ///
    /// # Errors
    /// - `MissionError::UnknownMissionType` if the type is not registered
    /// - `MissionError::InvalidOutcome` on shape mismatch or unknown product
    /// - `MissionError::PersonNotFound` if the person reference is dangling
    /// - points errors from the allocation validator
    /// - `MissionError::Collaborator` if a lookup fails
    pub async fn validate_request(
        &self,
        request: MissionRequest,
    ) -> Result<PendingMission, MissionError> {
        let MissionRequest {
            mission_type,
            person,
            location,
            outcome,
            points,
            completed,
        } = request;

        let variant = self.variants.resolve(&mission_type)?;
        tracing::debug!("Resolved variant {}", variant.type_id());

        let outcome = MissionOutcome::parse(variant.kind, &variant.outcome_shape, &outcome)?;
        self.resolve_products(&outcome).await?;
        tracing::debug!("Outcome accepted");

        let person = self
            .collaborators
            .people
            .find_person_by_id(&person)
            .await?
            .ok_or_else(|| MissionError::PersonNotFound(person.clone()))?;
        tracing::debug!("Completing team: {}", person.team);

        let points = self
            .points
            .validate(variant.type_id(), points.as_ref(), &person.team)?;

        Ok(PendingMission {
            mission: Mission {
                id: MissionId::new(),
                person: EntityRef::Expanded(person),
                location: EntityRef::Id(location),
                points,
                outcome,
                completed,
            },
        })
    }

    /// Persist a validated mission and notify its location
    ///
    /// # Errors
    /// - `MissionError::Collaborator` if the store fails
    /// - `MissionError::NotificationFailed` if the location rejects the
    ///   notification; the inserted record is discarded first
    pub async fn commit(&self, pending: PendingMission) -> Result<Mission, MissionError> {
        let mission = pending.mission;
        self.persist(&mission).await?;
        Ok(mission)
    }

    /// Persist an existing mission again
    ///
    /// The outcome's product references are resolved again and the points
    /// are re-validated against the completing person's current team. The
    /// record written is the caller's mission carrying the validated
    /// allocation, so an empty map is stored as full credit to that team.
    /// The location is notified only if the store reports a fresh insert, so
    /// re-saving a persisted mission never notifies twice.
    ///
    /// # Errors
    /// - `MissionError::InvalidOutcome` if a referenced product is unknown
    /// - points errors if the stored allocation no longer validates
    /// - `MissionError::PersonNotFound` if the person has disappeared
    /// - `MissionError::Collaborator` / `MissionError::NotificationFailed`
    ///   as for [`commit`](Self::commit)
    pub async fn save_mission(&self, mission: &Mission) -> Result<SaveOutcome, MissionError> {
        self.resolve_products(&mission.outcome).await?;

        let team = self.team_of(&mission.person).await?;
        let proposed: ProposedPoints = mission
            .points
            .iter()
            .map(|(t, v)| (t.clone(), f64::from(v)))
            .collect();
        let points = self
            .points
            .validate(mission.type_id(), Some(&proposed), &team)?;

        if points == mission.points {
            return self.persist(mission).await;
        }
        tracing::debug!(mission = %mission.id, "Storing normalised points allocation");
        let normalised = Mission {
            points,
            ..mission.clone()
        };
        self.persist(&normalised).await
    }

    async fn persist(&self, mission: &Mission) -> Result<SaveOutcome, MissionError> {
        let saved = self.collaborators.store.save(mission).await.map_err(|e| {
            tracing::error!(mission = %mission.id, "Store failed: {}", e);
            MissionError::Collaborator(e)
        })?;

        if saved == SaveOutcome::Updated {
            tracing::debug!(mission = %mission.id, "Already persisted, skipping notification");
            return Ok(saved);
        }

        if let Err(source) = self
            .collaborators
            .locations
            .notify_mission_completed(mission)
            .await
        {
            tracing::error!(mission = %mission.id, "Location notification failed: {}", source);
            let rolled_back = match self.collaborators.store.discard(&mission.id).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::error!(mission = %mission.id, "Rollback failed: {}", e);
                    false
                }
            };
            return Err(MissionError::NotificationFailed {
                mission: mission.id,
                source,
                rolled_back,
            });
        }

        tracing::debug!(mission = %mission.id, location = %mission.location_id(), "Location notified");
        Ok(saved)
    }

    async fn resolve_products(&self, outcome: &MissionOutcome) -> Result<(), MissionError> {
        for product in outcome.product_refs() {
            if !self.collaborators.products.product_exists(product).await? {
                return Err(OutcomeError::UnknownProduct(product.clone()).into());
            }
        }
        Ok(())
    }

    async fn team_of(&self, person: &EntityRef<Person>) -> Result<TeamId, MissionError> {
        if let Some(p) = person.expanded() {
            return Ok(p.team.clone());
        }
        let id: &PersonId = person.id();
        self.collaborators
            .people
            .find_person_by_id(id)
            .await?
            .map(|p| p.team)
            .ok_or_else(|| MissionError::PersonNotFound(id.clone()))
    }
}
