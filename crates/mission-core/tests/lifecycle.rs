//! End-to-end mission creation against in-memory collaborators

use mission_core::{
    LocationId, Mission, MissionError, MissionId, MissionOutcome, MissionRequest, OutcomeError,
    SaveOutcome,
};
use mission_points::Points;
use mission_registry::{MissionKind, TeamRegistry, VariantRegistry, OBSERVER_TEAM};
use mission_test_utils::{person_on, setup_lifecycle, valid_outcome, TestHarness, TEST_LOCATION};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;

fn request(kind: MissionKind, team: &str) -> MissionRequest {
    MissionRequest::new(kind.type_name(), person_on(team), TEST_LOCATION, valid_outcome(kind))
}

#[tokio::test]
async fn add_location_defaults_to_full_credit() {
    let harness = setup_lifecycle();

    let mission = harness
        .lifecycle
        .create_mission(request(MissionKind::AddLocation, "team1"))
        .await
        .unwrap();

    let view = serde_json::to_value(mission.to_view()).unwrap();
    assert_eq!(view["type"], json!("addLocation"));
    assert_eq!(view["points"], json!({"team1": 10}));
    assert_eq!(view["person"], json!("person-team1"));
    assert_eq!(view["location"], json!(TEST_LOCATION));
    assert!(view.get("completed").is_none());
}

#[tokio::test]
async fn rate_options_partial_credit() {
    let harness = setup_lifecycle();

    let mission = harness
        .lifecycle
        .create_mission(
            MissionRequest::new(
                "RateOptionsMission",
                person_on("team2"),
                TEST_LOCATION,
                json!([{"product": "product-1", "info": 4}]),
            )
            .with_points([("team2", 5.0)]),
        )
        .await
        .unwrap();

    assert_eq!(mission.points.get("team2"), Some(5));
    assert_eq!(mission.points.len(), 1);
    assert_eq!(harness.products.lookups(), 1);
}

#[tokio::test]
async fn visit_bonus_misattributed() {
    let harness = setup_lifecycle();

    let err = harness
        .lifecycle
        .create_mission(
            request(MissionKind::VisitBonus, "team3").with_points([("team3", 50.0), ("team4", 1.0)]),
        )
        .await
        .unwrap_err();

    assert_eq!(
        err,
        MissionError::MisattributedPoints {
            team: "team4".into(),
            expected: "team3".into(),
        }
    );
    assert!(harness.store.is_empty());
    assert_eq!(harness.locations.calls(), 0);
}

#[tokio::test]
async fn unknown_type_touches_nothing() {
    let harness = setup_lifecycle();

    let err = harness
        .lifecycle
        .create_mission(MissionRequest::new(
            "NotARealMission",
            person_on("team1"),
            TEST_LOCATION,
            json!(true),
        ))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "UNKNOWN_MISSION_TYPE");
    assert_eq!(harness.people.lookups(), 0);
    assert_eq!(harness.locations.calls(), 0);
    assert_eq!(harness.store.saves(), 0);
}

#[tokio::test]
async fn notification_happens_once() {
    let harness = setup_lifecycle();

    let mission = harness
        .lifecycle
        .create_mission(request(MissionKind::GiveFeedback, "team5"))
        .await
        .unwrap();
    assert_eq!(harness.locations.notifications_for(&mission.id), 1);

    let saved = harness.lifecycle.save_mission(&mission).await.unwrap();
    assert_eq!(saved, SaveOutcome::Updated);
    assert_eq!(harness.locations.notifications_for(&mission.id), 1);
    assert_eq!(harness.locations.calls(), 1);
    assert_eq!(harness.store.saves(), 2);
}

#[tokio::test]
async fn failed_notification_leaves_no_record() {
    let harness = setup_lifecycle();
    harness.locations.set_rejecting(true);

    let err = harness
        .lifecycle
        .create_mission(request(MissionKind::BuyOptions, "team1"))
        .await
        .unwrap_err();

    assert!(matches!(err, MissionError::NotificationFailed { rolled_back: true, .. }));
    assert!(harness.store.is_empty());
    assert_eq!(harness.store.discards(), 1);
}

#[tokio::test]
async fn failed_rollback_is_flagged() {
    let harness = setup_lifecycle();
    harness.locations.set_rejecting(true);
    harness.store.set_failing_discards(true);

    let err = harness
        .lifecycle
        .create_mission(request(MissionKind::BuyOptions, "team1"))
        .await
        .unwrap_err();

    match err {
        MissionError::NotificationFailed {
            mission,
            rolled_back,
            ..
        } => {
            assert!(!rolled_back);
            assert!(harness.store.contains(&mission));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn people_outage_is_retryable() {
    let harness = setup_lifecycle();
    harness.people.set_unavailable(true);

    let err = harness
        .lifecycle
        .create_mission(request(MissionKind::HasOptions, "team1"))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "COLLABORATOR_FAILED");
    assert!(err.is_retryable());
    assert_eq!(harness.store.saves(), 0);
}

#[tokio::test]
async fn unknown_product_rejected_before_lookup() {
    let harness = setup_lifecycle();

    let err = harness
        .lifecycle
        .create_mission(MissionRequest::new(
            "WhatOptionsMission",
            person_on("team1"),
            TEST_LOCATION,
            json!([{"product": 404, "info": "?"}]),
        ))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "INVALID_OUTCOME");
    assert_eq!(harness.people.lookups(), 0);
}

#[tokio::test]
async fn observer_scores_nothing_at_location() {
    let harness = setup_lifecycle();

    let mission = harness
        .lifecycle
        .create_mission(request(MissionKind::VisitBonus, OBSERVER_TEAM))
        .await
        .unwrap();
    assert_eq!(mission.points.get(OBSERVER_TEAM), Some(100));

    let tally = harness.locations.tally(&LocationId::from(TEST_LOCATION));
    assert_eq!(tally.missions, vec![mission.id]);
    assert!(tally.points.is_empty());
}

#[tokio::test]
async fn resave_after_team_change_is_rejected() {
    let harness = setup_lifecycle();

    let mut mission = harness
        .lifecycle
        .create_mission(request(MissionKind::OfferQuality, "team1"))
        .await
        .unwrap();

    // Drop the cached person so the save looks the team up again.
    mission.person = mission.person_id().clone().into();
    harness.people.reassign(mission.person_id(), "team2");

    let err = harness.lifecycle.save_mission(&mission).await.unwrap_err();
    assert_eq!(err.code(), "MISATTRIBUTED_POINTS");
    assert_eq!(harness.store.saves(), 1);
}

fn unsaved(team: &str, kind: MissionKind, outcome: serde_json::Value) -> Mission {
    Mission {
        id: MissionId::new(),
        person: person_on(team).into(),
        location: LocationId::from(TEST_LOCATION).into(),
        points: Points::default(),
        outcome: MissionOutcome::decode(kind, &outcome).unwrap(),
        completed: None,
    }
}

#[tokio::test]
async fn saving_unsaved_mission_stores_default_points() {
    let harness = setup_lifecycle();
    let mission = unsaved("team2", MissionKind::AddLocation, json!(true));

    let saved = harness.lifecycle.save_mission(&mission).await.unwrap();
    assert_eq!(saved, SaveOutcome::Inserted);

    let stored = harness.store.get(&mission.id).unwrap();
    assert_eq!(stored.points.get("team2"), Some(10));
    assert_eq!(stored.points.len(), 1);
    assert_eq!(harness.locations.notifications_for(&mission.id), 1);
    let tally = harness.locations.tally(&LocationId::from(TEST_LOCATION));
    assert_eq!(tally.points.get("team2"), Some(&10));
}

#[tokio::test]
async fn saving_unsaved_mission_checks_products() {
    let harness = setup_lifecycle();
    let mission = unsaved(
        "team1",
        MissionKind::RateOptions,
        json!([{"product": "ghost", "info": 1}]),
    );

    let err = harness.lifecycle.save_mission(&mission).await.unwrap_err();
    assert_eq!(
        err,
        MissionError::InvalidOutcome(OutcomeError::UnknownProduct("ghost".into()))
    );
    assert_eq!(harness.products.lookups(), 1);
    assert_eq!(harness.store.saves(), 0);
    assert_eq!(harness.locations.calls(), 0);
}

#[tokio::test]
async fn completed_timestamp_is_kept() {
    let harness = setup_lifecycle();

    let mission = harness
        .lifecycle
        .create_mission(request(MissionKind::WantVegan, "team4").completed_now())
        .await
        .unwrap();

    assert!(mission.completed.is_some());
    let view = serde_json::to_value(mission.to_view()).unwrap();
    assert!(view.get("completed").is_some());
    assert_eq!(view["outcome"]["expressions"], json!(["more vegan options"]));
}

#[tokio::test]
async fn custom_registries_are_honoured() {
    let mut variants = VariantRegistry::new();
    variants
        .register(MissionKind::HasOptions, 3, MissionKind::HasOptions.default_outcome_shape())
        .unwrap();
    let harness = TestHarness::with_registries(
        Arc::new(variants),
        Arc::new(TeamRegistry::with_defaults()),
    );

    let mission = harness
        .lifecycle
        .create_mission(request(MissionKind::HasOptions, "team1"))
        .await
        .unwrap();
    assert_eq!(mission.points.get("team1"), Some(3));

    let err = harness
        .lifecycle
        .create_mission(request(MissionKind::AddLocation, "team1"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "UNKNOWN_MISSION_TYPE");
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Runtime::new().unwrap()
}

fn any_kind() -> impl Strategy<Value = MissionKind> {
    (0..MissionKind::ALL.len()).prop_map(|i| MissionKind::ALL[i])
}

fn any_team() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["team1", "team2", "team3", "team4", "team5", OBSERVER_TEAM])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_default_allocation(kind in any_kind(), team in any_team()) {
        let harness = setup_lifecycle();
        let mission = runtime()
            .block_on(harness.lifecycle.create_mission(request(kind, team)))
            .unwrap();
        prop_assert_eq!(mission.points.get(team), Some(kind.default_max_points()));
        prop_assert_eq!(mission.points.len(), 1);
        prop_assert_eq!(harness.locations.notifications_for(&mission.id), 1);
    }

    #[test]
    fn prop_over_max_rejected(kind in any_kind(), team in any_team()) {
        let harness = setup_lifecycle();
        let over = f64::from(kind.default_max_points()) + 1.0;
        let err = runtime()
            .block_on(harness.lifecycle.create_mission(request(kind, team).with_points([(team, over)])))
            .unwrap_err();
        prop_assert_eq!(err.code(), "INVALID_POINT_VALUE");
        prop_assert_eq!(harness.locations.calls(), 0);
    }

    #[test]
    fn prop_other_team_zero_ok_nonzero_rejected(
        kind in any_kind(),
        team in any_team(),
        other in any_team(),
    ) {
        prop_assume!(team != other);
        let harness = setup_lifecycle();
        let rt = runtime();

        let zero = rt
            .block_on(harness.lifecycle.create_mission(request(kind, team).with_points([(other, 0.0)])))
            .unwrap();
        prop_assert_eq!(zero.points.get(other), Some(0));

        let err = rt
            .block_on(harness.lifecycle.create_mission(request(kind, team).with_points([(other, 1.0)])))
            .unwrap_err();
        prop_assert_eq!(err.code(), "MISATTRIBUTED_POINTS");
    }
}
