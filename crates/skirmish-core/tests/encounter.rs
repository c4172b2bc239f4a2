//! Integration tests: whole encounters driven through `CombatManager`.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use skirmish_core::components::{ActionPoints, Position};
use skirmish_core::{CombatError, CombatManager, EncounterConfig, ParticipantSpec};
use skirmish_events::{Event, EventKind, EventRecorder};
use skirmish_types::{
    CombatState, Controller, Entity, Faction, Key, RejectionReason, SizeClass, SkillId,
};

fn config(participants: Vec<ParticipantSpec>) -> EncounterConfig {
    let mut config = EncounterConfig::default();
    config.timing.fade_in_seconds = 0.0;
    config.timing.celebration_seconds = 0.0;
    config.timing.fade_out_seconds = 0.0;
    config.timing.think_seconds = 0.0;
    config.timing.seconds_per_hex = 0.25;
    config.timing.preparation_rate = 100.0;
    config.participants = participants;
    config
}

/// A ready human hero at (0,0) and a slow AI foe in the far corner.
fn duel() -> CombatManager {
    let mut hero = ParticipantSpec::new("Hero", Faction::Party, Key::new(0, 0))
        .controlled_by(Controller::Human)
        .with_action_points(6);
    hero.initial_preparation = 100.0;
    let foe = ParticipantSpec::new("Brute", Faction::Hostile, Key::new(7, 23))
        .controlled_by(Controller::Ai)
        .with_threshold(1000.0);
    CombatManager::new(&config(vec![hero, foe])).expect("valid encounter")
}

fn until_input(manager: &mut CombatManager) -> Entity {
    for _ in 0..20 {
        if manager.awaiting_input().is_some() {
            break;
        }
        manager.update(0.1).expect("tick");
    }
    manager.awaiting_input().expect("an actor became ready")
}

fn click(manager: &mut CombatManager, key: Key) {
    let (x, y) = manager.field().center(key).expect("hex on field");
    manager.interaction(x, y);
}

fn rejections(recorder: &EventRecorder) -> Vec<RejectionReason> {
    recorder
        .of_kind(EventKind::SkillRejected)
        .into_iter()
        .filter_map(|e| match e {
            Event::SkillRejected { reason, .. } => Some(reason),
            _ => None,
        })
        .collect()
}

fn action_points(manager: &CombatManager, actor: Entity) -> u32 {
    manager
        .world()
        .component::<ActionPoints>(actor)
        .map_or(0, |ap| ap.current)
}

#[test]
fn clicked_destination_is_walked_hex_by_hex() {
    let mut manager = duel();
    let hero = until_input(&mut manager);
    let recorder = EventRecorder::attach(manager.bus());

    click(&mut manager, Key::new(3, 2));
    manager.confirm();
    manager.update(0.0).unwrap();
    assert_eq!(manager.state(), CombatState::Executing);
    assert_eq!(recorder.of_kind(EventKind::MovementCommenced).len(), 1);

    for _ in 0..6 {
        manager.update(0.25).unwrap();
    }

    let progressed = recorder.of_kind(EventKind::MovementProgressed);
    assert_eq!(progressed.len(), 6);
    let costs: Vec<f64> = progressed
        .iter()
        .filter_map(|e| match e {
            Event::MovementProgressed {
                cumulative_cost, ..
            } => Some(*cumulative_cost),
            _ => None,
        })
        .collect();
    assert!(costs.windows(2).all(|w| w[1] > w[0]));
    assert_eq!(
        progressed.last(),
        Some(&Event::MovementProgressed {
            entity: hero,
            at: Key::new(3, 2),
            cumulative_cost: 6.0,
        })
    );

    assert_eq!(
        manager.world().component::<Position>(hero),
        Some(&Position(Key::new(3, 2)))
    );
    assert_eq!(action_points(&manager, hero), 0);
    assert_eq!(manager.state(), CombatState::AwaitingInput);
    assert_eq!(
        recorder.of_kind(EventKind::SkillConcluded),
        vec![Event::SkillConcluded {
            entity: hero,
            skill: SkillId::new("move"),
            action_points_spent: 6,
        }]
    );
}

#[test]
fn end_turn_releases_the_token_and_restores_action_points() {
    let mut manager = duel();
    let hero = until_input(&mut manager);

    click(&mut manager, Key::new(0, 2));
    manager.confirm();
    manager.update(0.0).unwrap();
    manager.update(0.25).unwrap();
    assert_eq!(action_points(&manager, hero), 5);

    manager.end_turn();
    manager.update(0.0).unwrap();
    assert_eq!(manager.token_holder(), None);
    assert_eq!(manager.awaiting_input(), None);
    assert_eq!(manager.state(), CombatState::Preparing);
    assert_eq!(action_points(&manager, hero), 6);
}

#[test]
fn refused_requests_are_published() {
    let mut manager = duel();
    let hero = until_input(&mut manager);
    let recorder = EventRecorder::attach(manager.bus());

    manager.select_skill(SkillId::new("fireball"));
    manager.interaction(-500, -500);
    manager.select_skill(SkillId::new("strike"));
    click(&mut manager, Key::new(7, 23));
    manager.cancel();
    manager.update(0.0).unwrap();

    assert_eq!(
        rejections(&recorder),
        vec![
            RejectionReason::UnknownSkill,
            RejectionReason::NoSuchHex,
            RejectionReason::OutOfRange,
        ]
    );
    assert_eq!(manager.state(), CombatState::AwaitingInput);
    assert_eq!(manager.awaiting_input(), Some(hero));
}

#[test]
fn unaffordable_move_is_refused() {
    let mut manager = duel();
    until_input(&mut manager);
    let recorder = EventRecorder::attach(manager.bus());

    click(&mut manager, Key::new(0, 20));
    manager.update(0.0).unwrap();
    assert_eq!(
        rejections(&recorder),
        vec![RejectionReason::InsufficientActionPoints]
    );
    assert_eq!(manager.state(), CombatState::SelectingTarget);
}

#[test]
fn input_during_a_move_is_refused() {
    let mut manager = duel();
    until_input(&mut manager);
    click(&mut manager, Key::new(3, 2));
    manager.confirm();
    manager.update(0.0).unwrap();

    let recorder = EventRecorder::attach(manager.bus());
    manager.end_turn();
    manager.update(0.0).unwrap();
    assert_eq!(rejections(&recorder), vec![RejectionReason::InvalidState]);
    assert_eq!(manager.state(), CombatState::Executing);
}

#[test]
fn blocked_route_at_confirmation_concludes_without_moving() {
    let mut manager = duel();
    let hero = until_input(&mut manager);
    click(&mut manager, Key::new(0, 2));
    manager.update(0.0).unwrap();
    assert_eq!(manager.state(), CombatState::ConfirmingSelectedTarget);

    manager
        .spawn_obstacle(Key::new(0, 2), SizeClass::Small, f64::INFINITY)
        .unwrap();
    let recorder = EventRecorder::attach(manager.bus());
    manager.confirm();
    manager.update(0.0).unwrap();

    assert_eq!(
        recorder.of_kind(EventKind::MovementConcluded),
        vec![Event::MovementConcluded {
            entity: hero,
            at: Key::new(0, 0),
            moved: false,
        }]
    );
    assert_eq!(rejections(&recorder), vec![RejectionReason::Unreachable]);
    assert_eq!(manager.state(), CombatState::SelectingTarget);
}

#[test]
fn clicking_the_selected_hex_again_confirms() {
    let mut manager = duel();
    until_input(&mut manager);
    click(&mut manager, Key::new(1, 1));
    click(&mut manager, Key::new(0, 2));
    click(&mut manager, Key::new(0, 2));
    manager.update(0.0).unwrap();
    assert_eq!(manager.state(), CombatState::Executing);
}

#[test]
fn hover_previews_move_cost() {
    let mut manager = duel();
    until_input(&mut manager);
    let recorder = EventRecorder::attach(manager.bus());

    let (x, y) = manager.field().center(Key::new(0, 4)).unwrap();
    manager.mouse_position(x, y);
    manager.select_skill(SkillId::new("move"));
    // Same hex, but a move is now selected.
    manager.mouse_position(x.saturating_add(1), y);
    let (x, y) = manager.field().center(Key::new(0, 2)).unwrap();
    manager.mouse_position(x, y);
    manager.update(0.0).unwrap();

    assert_eq!(
        recorder.of_kind(EventKind::HoverChanged),
        vec![
            Event::HoverChanged {
                key: Some(Key::new(0, 4)),
                preview_cost: None,
            },
            Event::HoverChanged {
                key: Some(Key::new(0, 4)),
                preview_cost: Some(2.0),
            },
            Event::HoverChanged {
                key: Some(Key::new(0, 2)),
                preview_cost: Some(1.0),
            },
        ]
    );
}

#[test]
fn hover_without_change_is_quiet() {
    let mut manager = duel();
    until_input(&mut manager);
    let recorder = EventRecorder::attach(manager.bus());

    let (x, y) = manager.field().center(Key::new(0, 2)).unwrap();
    manager.select_skill(SkillId::new("move"));
    manager.mouse_position(x, y);
    manager.mouse_position(x, y);
    manager.update(0.0).unwrap();
    assert_eq!(recorder.of_kind(EventKind::HoverChanged).len(), 1);
}

#[test]
fn non_finite_initial_preparation_is_refused() {
    let mut ready = ParticipantSpec::new("Hero", Faction::Party, Key::new(0, 0));
    ready.initial_preparation = f64::NAN;
    let foe = ParticipantSpec::new("Brute", Faction::Hostile, Key::new(7, 23));
    assert!(matches!(
        CombatManager::new(&config(vec![ready, foe])),
        Err(CombatError::InvalidConfig { .. })
    ));

    let mut manager = CombatManager::new(&config(Vec::new())).unwrap();
    let mut spec = ParticipantSpec::new("Hero", Faction::Party, Key::new(0, 0));
    spec.initial_preparation = f64::INFINITY;
    assert!(manager.spawn_participant(&spec).is_err());
    assert_eq!(manager.world().entity_count(), 0);
}

#[test]
fn ai_duel_runs_to_completion() {
    let party = ParticipantSpec::new("Knight", Faction::Party, Key::new(3, 2))
        .controlled_by(Controller::Ai)
        .with_health(50);
    let hostile = ParticipantSpec::new("Ogre", Faction::Hostile, Key::new(3, 20))
        .controlled_by(Controller::Ai)
        .sized(SizeClass::Medium)
        .with_health(50);
    let mut config = config(vec![party, hostile]);
    config.timing.seconds_per_hex = 0.0;
    let mut manager = CombatManager::new(&config).unwrap();

    let recorder = EventRecorder::attach(manager.bus());
    let mut ticks = 0;
    while !manager.is_finished() && ticks < 5_000 {
        manager.update(0.1).unwrap();
        assert!(manager.world().tagged(skirmish_core::components::TURN_TOKEN).len() <= 1);
        ticks += 1;
    }

    assert!(manager.is_finished(), "encounter stalled after {ticks} ticks");
    assert!(manager.winner().is_some());
    assert_eq!(recorder.of_kind(EventKind::EncounterConcluded).len(), 1);
    assert_eq!(recorder.of_kind(EventKind::ActorDefeated).len(), 1);

    // Grants and ends strictly alternate.
    let turns: Vec<EventKind> = recorder
        .events()
        .iter()
        .map(Event::kind)
        .filter(|k| matches!(k, EventKind::TurnGranted | EventKind::TurnEnded))
        .collect();
    assert!(!turns.is_empty());
    for pair in turns.chunks(2) {
        assert_eq!(pair[0], EventKind::TurnGranted);
        if let Some(end) = pair.get(1) {
            assert_eq!(*end, EventKind::TurnEnded);
        }
    }
}

#[test]
fn same_seed_replays_identically() {
    let run = || {
        let party = ParticipantSpec::new("Knight", Faction::Party, Key::new(3, 2))
            .controlled_by(Controller::Ai);
        let hostile = ParticipantSpec::new("Ogre", Faction::Hostile, Key::new(3, 20))
            .controlled_by(Controller::Ai);
        let mut config = config(vec![party, hostile]);
        config.timing.seconds_per_hex = 0.0;
        let mut manager = CombatManager::new(&config).unwrap();
        let recorder = EventRecorder::attach(manager.bus());
        for _ in 0..400 {
            manager.update(0.1).unwrap();
        }
        recorder.detach()
    };
    assert_eq!(run(), run());
}
