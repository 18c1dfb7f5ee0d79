//! Mission lifecycle simulator
//!
//! Generates random creation requests, valid and invalid, runs them through a
//! [`MissionLifecycle`](mission_core::MissionLifecycle) wired to in-memory
//! collaborators and checks every result against an independent prediction.
//!
//! Invariants checked:
//! - A request is accepted exactly when the prediction says so, and a
//!   rejection carries the predicted error code
//! - A created mission has at most one nonzero team, the person's own, and
//!   no value above the variant's ceiling
//! - Absent points default to full credit for the person's team
//! - Every created mission was notified exactly once, re-saves included
//! - A rejected request leaves the store untouched and notifies nobody
//!   unless the notification itself was what failed

use mission_core::{ConfigError, Mission, MissionConfig, MissionId, MissionRequest};
use mission_points::ProposedPoints;
use mission_registry::{MissionKind, TeamId, TeamRegistry, VariantRegistry};
use mission_test_utils::{person_on, valid_outcome, TestHarness, TEST_LOCATION};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

/// Team id that is never registered
const UNKNOWN_TEAM: &str = "team-unregistered";

/// Simulator configuration
#[derive(Debug, Clone, Serialize)]
pub struct SimulatorConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    /// Creation requests to generate
    pub missions: u64,
    /// Stop at the first violation
    pub stop_on_first_violation: bool,
    /// Probability that the location rejects a notification
    pub notification_failure_rate: f64,
    /// Registries to simulate against
    #[serde(skip)]
    pub registries: MissionConfig,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            missions: 1000,
            stop_on_first_violation: false,
            notification_failure_rate: 0.0,
            registries: MissionConfig::default(),
        }
    }
}

/// A generated request together with what the generator knows about it
#[derive(Debug, Clone)]
struct Scenario {
    request: MissionRequest,
    /// Team of the person, `None` for a dangling reference
    team: Option<TeamId>,
    outcome_valid: bool,
    notification_fails: bool,
}

/// A broken invariant
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// Predicted success, got an error
    UnexpectedRejection {
        index: u64,
        mission_type: String,
        code: String,
    },
    /// Predicted an error, got a mission
    UnexpectedAcceptance {
        index: u64,
        mission_type: String,
        expected: String,
    },
    /// Rejected with a different error than predicted
    WrongErrorCode {
        index: u64,
        expected: String,
        actual: String,
    },
    /// Created mission breaks the points invariant
    PointsInvariant { mission: MissionId, detail: String },
    /// Created mission was not notified exactly once
    NotificationCount { mission: MissionId, count: usize },
    /// Rejected request left a side effect behind
    SideEffectOnRejection { index: u64, detail: String },
}

/// Counters gathered during a run
#[derive(Debug, Clone, Default, Serialize)]
pub struct SimulatorStats {
    pub requests_attempted: u64,
    pub missions_created: u64,
    pub requests_rejected: u64,
    pub resaves: u64,
    pub notifications: u64,
    pub points_awarded: u64,
    pub rejections_by_code: BTreeMap<String, u64>,
}

/// Final report from the simulator
#[derive(Debug, Clone, Serialize)]
pub struct SimulatorReport {
    pub config: SimulatorConfig,
    pub stats: SimulatorStats,
    pub violations: Vec<Violation>,
}

impl SimulatorReport {
    /// Check if the run found no violation
    #[must_use]
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    /// Generate text report
    #[must_use]
    pub fn generate_text(&self) -> String {
        let mut report = String::new();

        report.push_str("=== Mission Simulator Report ===\n\n");
        let _ = writeln!(report, "Seed: {}", self.config.seed);
        let _ = writeln!(report, "Requests Attempted: {}", self.stats.requests_attempted);
        let _ = writeln!(report, "Missions Created: {}", self.stats.missions_created);
        let _ = writeln!(report, "Requests Rejected: {}", self.stats.requests_rejected);
        let _ = writeln!(report, "Re-saves: {}", self.stats.resaves);
        let _ = writeln!(report, "Notifications: {}", self.stats.notifications);
        let _ = writeln!(report, "Points Awarded: {}", self.stats.points_awarded);

        if !self.stats.rejections_by_code.is_empty() {
            report.push_str("\nRejections:\n");
            for (code, count) in &self.stats.rejections_by_code {
                let _ = writeln!(report, "  {code}: {count}");
            }
        }

        let _ = writeln!(report, "\nViolations: {}", self.violations.len());
        if !self.violations.is_empty() {
            report.push_str("\n=== Violations ===\n");
            for (i, v) in self.violations.iter().enumerate() {
                let _ = writeln!(report, "{}. {:?}", i + 1, v);
            }
        }

        let _ = write!(
            report,
            "\n=== Result: {} ===\n",
            if self.passed() { "PASS" } else { "FAIL" }
        );
        report
    }

    /// Generate JSON report
    ///
    /// # Errors
    /// Propagates serialization errors
    pub fn generate_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&json!({
            "passed": self.passed(),
            "config": self.config,
            "stats": self.stats,
            "violations": self.violations,
        }))
    }
}

/// Run the mission simulator
///
/// # Errors
/// - `ConfigError` if the configured registries cannot be built
pub async fn run_simulator(config: SimulatorConfig) -> Result<SimulatorReport, ConfigError> {
    let variants = Arc::new(config.registries.build_variant_registry()?);
    let teams = Arc::new(config.registries.build_team_registry()?);
    let harness = TestHarness::with_registries(Arc::clone(&variants), Arc::clone(&teams));

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut stats = SimulatorStats::default();
    let mut violations = Vec::new();
    let mut created: Vec<Mission> = Vec::new();

    for index in 0..config.missions {
        if !created.is_empty() && rng.random_bool(0.1) {
            let mission = &created[rng.random_range(0..created.len())];
            resave(&harness, mission, &mut stats, &mut violations).await;
        }

        let scenario = generate_scenario(&mut rng, &variants, &teams, config.notification_failure_rate);
        let expected = predict(&scenario, &variants, &teams);

        harness.locations.set_rejecting(scenario.notification_fails);
        let calls_before = harness.locations.calls();
        let stored_before = harness.store.len();

        stats.requests_attempted += 1;
        let mission_type = scenario.request.mission_type.clone();
        let found_before = violations.len();

        match harness.lifecycle.create_mission(scenario.request.clone()).await {
            Ok(mission) => {
                stats.missions_created += 1;
                stats.notifications += 1;
                stats.points_awarded += mission.points.total();

                if let Some(code) = expected {
                    violations.push(Violation::UnexpectedAcceptance {
                        index,
                        mission_type,
                        expected: code.to_string(),
                    });
                }
                check_created(&harness, &scenario, &mission, &variants, &mut violations);
                created.push(mission);
            }
            Err(e) => {
                stats.requests_rejected += 1;
                *stats.rejections_by_code.entry(e.code().to_string()).or_insert(0) += 1;

                match expected {
                    None => violations.push(Violation::UnexpectedRejection {
                        index,
                        mission_type,
                        code: e.code().to_string(),
                    }),
                    Some(code) if code != e.code() => violations.push(Violation::WrongErrorCode {
                        index,
                        expected: code.to_string(),
                        actual: e.code().to_string(),
                    }),
                    Some(_) => {}
                }

                let expected_calls = calls_before + usize::from(expected == Some("NOTIFICATION_FAILED"));
                if harness.locations.calls() != expected_calls {
                    violations.push(Violation::SideEffectOnRejection {
                        index,
                        detail: format!(
                            "{} notification attempts, expected {}",
                            harness.locations.calls() - calls_before,
                            expected_calls - calls_before
                        ),
                    });
                }
                if harness.store.len() != stored_before {
                    violations.push(Violation::SideEffectOnRejection {
                        index,
                        detail: "rejected mission left in store".to_string(),
                    });
                }
            }
        }

        if violations.len() > found_before {
            tracing::warn!("Violation at request {}", index);
            if config.stop_on_first_violation {
                break;
            }
        }
    }

    harness.locations.set_rejecting(false);
    tracing::info!(
        created = stats.missions_created,
        rejected = stats.requests_rejected,
        violations = violations.len(),
        "Simulation finished"
    );

    Ok(SimulatorReport {
        config,
        stats,
        violations,
    })
}

async fn resave(
    harness: &TestHarness,
    mission: &Mission,
    stats: &mut SimulatorStats,
    violations: &mut Vec<Violation>,
) {
    // A location outage must not matter: nothing should be notified.
    harness.locations.set_rejecting(true);
    let result = harness.lifecycle.save_mission(mission).await;
    harness.locations.set_rejecting(false);

    stats.resaves += 1;
    if let Err(e) = result {
        violations.push(Violation::PointsInvariant {
            mission: mission.id,
            detail: format!("re-save rejected: {e}"),
        });
    }
    let count = harness.locations.notifications_for(&mission.id);
    if count != 1 {
        violations.push(Violation::NotificationCount {
            mission: mission.id,
            count,
        });
    }
}

fn check_created(
    harness: &TestHarness,
    scenario: &Scenario,
    mission: &Mission,
    variants: &VariantRegistry,
    violations: &mut Vec<Violation>,
) {
    let mut broken = |detail: String| {
        violations.push(Violation::PointsInvariant {
            mission: mission.id,
            detail,
        });
    };

    let max = variants.get(mission.kind()).map_or(0, |v| v.max_points);
    let nonzero = mission.points.nonzero_teams();
    if nonzero.len() > 1 {
        broken(format!("{} teams hold points", nonzero.len()));
    }
    if let (Some(team), Some(awarded)) = (&scenario.team, nonzero.first()) {
        if *awarded != team {
            broken(format!("points awarded to {awarded}, person is on {team}"));
        }
    }
    for (team, value) in mission.points.iter() {
        if value > max {
            broken(format!("{team} holds {value} above ceiling {max}"));
        }
    }
    let defaulted = scenario.request.points.as_ref().map_or(true, ProposedPoints::is_empty);
    if defaulted {
        if let Some(team) = &scenario.team {
            if mission.points.get(team.as_str()) != Some(max) || mission.points.len() != 1 {
                broken(format!("default allocation is not {{{team}: {max}}}"));
            }
        }
    }

    let count = harness.locations.notifications_for(&mission.id);
    if count != 1 {
        violations.push(Violation::NotificationCount {
            mission: mission.id,
            count,
        });
    }
}

/// Error code the lifecycle should return, or `None` for success.
///
/// Mirrors the pipeline order: variant, outcome, person, points, notification.
fn predict(scenario: &Scenario, variants: &VariantRegistry, teams: &TeamRegistry) -> Option<&'static str> {
    let Ok(variant) = variants.resolve(&scenario.request.mission_type) else {
        return Some("UNKNOWN_MISSION_TYPE");
    };
    if !scenario.outcome_valid {
        return Some("INVALID_OUTCOME");
    }
    let Some(actor) = &scenario.team else {
        return Some("PERSON_NOT_FOUND");
    };
    if !teams.is_valid_team(actor.as_str()) {
        return Some("UNKNOWN_TEAM");
    }
    for (team, &value) in scenario.request.points.iter().flatten() {
        if !teams.is_valid_team(team.as_str()) {
            return Some("UNKNOWN_TEAM");
        }
        if value.fract() != 0.0 || value < 0.0 || value > f64::from(variant.max_points) {
            return Some("INVALID_POINT_VALUE");
        }
        if value > 0.0 && team != actor {
            return Some("MISATTRIBUTED_POINTS");
        }
    }
    if scenario.notification_fails {
        return Some("NOTIFICATION_FAILED");
    }
    None
}

fn generate_scenario(
    rng: &mut StdRng,
    variants: &VariantRegistry,
    teams: &TeamRegistry,
    notification_failure_rate: f64,
) -> Scenario {
    let registered = variants.type_ids();
    let team_ids: Vec<&TeamId> = teams.list_teams();

    let (mission_type, kind) = if registered.is_empty() || rng.random_bool(0.08) {
        let bogus = ["NotARealMission", "addLocation", "Mission", ""];
        (bogus[rng.random_range(0..bogus.len())].to_string(), None)
    } else {
        let name = registered[rng.random_range(0..registered.len())];
        (name.to_string(), name.parse::<MissionKind>().ok())
    };

    let team = if team_ids.is_empty() || rng.random_bool(0.05) {
        None
    } else {
        Some(team_ids[rng.random_range(0..team_ids.len())].clone())
    };
    let person = team
        .as_ref()
        .map_or_else(|| person_on("ghost"), |t| person_on(t.as_str()));

    let outcome_valid = rng.random_bool(0.9);
    let outcome = match kind {
        Some(kind) if outcome_valid => valid_outcome(kind),
        _ => json!("not an outcome"),
    };

    let max = kind
        .and_then(|k| variants.get(k))
        .map_or(10, |v| v.max_points);
    let points = if rng.random_bool(0.4) {
        None
    } else {
        let mut proposal = ProposedPoints::new();
        for _ in 0..rng.random_range(1..=2) {
            let key = if team_ids.is_empty() || rng.random_bool(0.05) {
                TeamId::from(UNKNOWN_TEAM)
            } else if let (Some(actor), true) = (&team, rng.random_bool(0.6)) {
                actor.clone()
            } else {
                team_ids[rng.random_range(0..team_ids.len())].clone()
            };
            proposal.insert(key, random_value(rng, max));
        }
        Some(proposal)
    };

    Scenario {
        request: MissionRequest {
            mission_type,
            person,
            location: TEST_LOCATION.into(),
            outcome,
            points,
            completed: None,
        },
        team,
        outcome_valid,
        notification_fails: rng.random_bool(notification_failure_rate.clamp(0.0, 1.0)),
    }
}

fn random_value(rng: &mut StdRng, max: u32) -> f64 {
    match rng.random_range(0..10) {
        0 => f64::from(max) + f64::from(rng.random_range(1..5u32)),
        1 => f64::from(rng.random_range(0..max.max(1))) + 0.5,
        2 => -1.0,
        3 => 0.0,
        _ => f64::from(rng.random_range(0..=max)),
    }
}
