//! Combat system integration tests
//!
//! End-to-end scenarios through the public API: packet derivation into
//! tissue and wounds, guard geometry in the hit roll, range gating, replay
//! determinism and data-integrity propagation.

use arc_melee::combat::context::{Pairing, Prepared};
use arc_melee::combat::{
    build_context, derive_packet, hit_chance, resolve_tissue, CombatEvent, CombatStats,
    Combatant, CommittedAction, Encounter, EventLog, Outcome, Reach, ResolutionEntry,
    ScriptedRandom, Side, Species, Stakes, StreamRandom, SynergyRules, TickResolver,
    WoundLedger, WoundReport, WoundSeverity,
};
use arc_melee::core::types::{AgentId, TeamId};
use arc_melee::core::{CombatError, ResolutionConfig};
use arc_melee::data::{builtin, CombatTables, DataTables};

fn ids() -> (AgentId, AgentId) {
    (AgentId::from_u128(1), AgentId::from_u128(2))
}

fn duel(red_weapon: &str, blue_weapon: &str, range: Reach) -> Encounter {
    let (red, blue) = ids();
    let mut encounter = Encounter::new();
    encounter.add(Combatant::new(red, "Red", TeamId(0), &Species::human()).with_weapon(red_weapon));
    encounter.add(Combatant::new(blue, "Blue", TeamId(1), &Species::human()).with_weapon(blue_weapon));
    encounter.engage(red, blue, range);
    encounter
}

/// One unarmoured strike on the right forearm of an average combatant
fn strike_forearm(tables: &CombatTables, weapon: &str, technique: &str) -> WoundReport {
    let config = ResolutionConfig::default();
    let plan = tables.body_plan("humanoid").unwrap();
    let part = plan.part("right_forearm").unwrap();
    let template = tables.tissue_template(&part.tissue_template).unwrap();

    let packet = derive_packet(
        tables.weapon(weapon).unwrap(),
        tables.technique(technique).unwrap(),
        &CombatStats::default(),
        Stakes::Committed,
        1.0,
        &config,
    );
    let outcome = resolve_tissue(
        tables,
        template,
        packet.axes(),
        packet.penetration,
        part.geometry.thickness_cm,
        &config,
    )
    .unwrap();

    let mut ledger = WoundLedger::new();
    ledger.apply(plan, part, &outcome, &config)
}

#[test]
fn test_needle_goes_deep_but_axe_takes_the_arm() {
    let tables = builtin::tables();

    let needle = strike_forearm(&tables, "stiletto", "thrust");
    assert!(needle.depth > 0.95, "needle depth {}", needle.depth);
    assert!(needle.severity < WoundSeverity::Destroyed);
    assert!(needle.severed.is_empty());

    let axe = strike_forearm(&tables, "axe", "overhead_chop");
    assert_eq!(axe.severity, WoundSeverity::Destroyed);
    assert!(axe.lost.severed);
    assert!(axe.severed.contains(&"right_forearm".to_string()));
    assert!(axe.severed.contains(&"right_hand".to_string()));
}

/// Open chance for `technique` against Blue, with or without a guard held
fn open_chance(tables: &CombatTables, technique: &str, guard: Option<&str>) -> f32 {
    let config = ResolutionConfig::default();
    let (red, blue) = ids();
    let encounter = duel("axe", "arming_sword", Reach::Short);
    let attack = CommittedAction::new(red, technique, 0.0, 0.5).at(blue);
    let held = guard.map(|g| CommittedAction::new(blue, g, 0.0, 1.0));
    let pairing = Pairing {
        target: Some(blue),
        defence: held.as_ref(),
        ..Pairing::default()
    };

    match build_context(tables, &encounter, &attack, pairing).unwrap() {
        Prepared::Ready(ctx) => hit_chance(&ctx, &SynergyRules::default(), &config).open,
        Prepared::Skipped(reason) => panic!("skipped: {:?}", reason),
    }
}

#[test]
fn test_high_guard_opens_the_middle_and_closes_the_top() {
    let tables = builtin::tables();
    let config = ResolutionConfig::default();

    // swing is mid height, overhead_chop high
    let mid_open = open_chance(&tables, "swing", None);
    let mid_guarded = open_chance(&tables, "swing", Some("high_guard"));
    assert!((mid_guarded - mid_open - config.opening_bonus).abs() < 1e-5);

    let high_open = open_chance(&tables, "overhead_chop", None);
    let high_guarded = open_chance(&tables, "overhead_chop", Some("high_guard"));
    assert!((high_open - high_guarded - config.guard_penalty).abs() < 1e-5);
}

#[test]
fn test_short_weapon_at_long_range_never_reaches_the_pipeline() {
    let tables = builtin::tables();
    let config = ResolutionConfig::default();
    let resolver = TickResolver::new(&tables, &config);
    let (red, blue) = ids();
    let mut encounter = duel("stiletto", "spear", Reach::Medium);
    let mut rng = ScriptedRandom::default();
    let mut log = EventLog::new();

    let actions = vec![CommittedAction::new(red, "thrust", 0.0, 0.5).at(blue)];
    let entries = resolver.resolve(&actions, &mut encounter, &mut rng, &mut log).unwrap();

    assert_eq!(
        entries[0].outcome,
        Outcome::OutOfRange {
            reach: Reach::Grapple,
            range: Reach::Medium
        }
    );
    // No roll was drawn and nothing was wounded
    assert!(encounter.get(blue).unwrap().wounds.iter().next().is_none());
    assert!(log.wounds().next().is_none());
}

fn replay(values: &[f32]) -> (Vec<ResolutionEntry>, Vec<CombatEvent>) {
    let tables = builtin::tables();
    let config = ResolutionConfig::default();
    let resolver = TickResolver::new(&tables, &config);
    let (red, blue) = ids();
    let mut encounter = duel("axe", "arming_sword", Reach::Short);
    let mut rng = ScriptedRandom::new(values.iter().copied());
    let mut log = EventLog::new();

    let actions = vec![
        CommittedAction::new(red, "overhead_chop", 0.1, 0.6).at(blue),
        CommittedAction::new(blue, "parry", 0.0, 0.4),
        CommittedAction::new(blue, "thrust", 0.5, 0.9).at(red),
    ];
    let entries = resolver.resolve(&actions, &mut encounter, &mut rng, &mut log).unwrap();
    (entries, log.events)
}

#[test]
fn test_scripted_replay_is_byte_identical() {
    let values = [0.2, 0.35, 0.1, 0.8];
    let (entries_a, events_a) = replay(&values);
    let (entries_b, events_b) = replay(&values);

    assert_eq!(
        serde_json::to_string(&entries_a).unwrap(),
        serde_json::to_string(&entries_b).unwrap()
    );
    assert_eq!(
        serde_json::to_string(&events_a).unwrap(),
        serde_json::to_string(&events_b).unwrap()
    );
    assert_eq!(entries_a.len(), 2);
}

#[test]
fn test_seeded_duel_is_repeatable() {
    let run = |seed: u64| {
        let tables = builtin::tables();
        let config = ResolutionConfig::default();
        let resolver = TickResolver::new(&tables, &config);
        let (red, blue) = ids();
        let mut encounter = duel("arming_sword", "mace", Reach::Short);
        let mut rng = StreamRandom::new(seed);
        let mut log = EventLog::new();
        let mut entries = Vec::new();

        for _ in 0..5 {
            let actions = vec![
                CommittedAction::new(red, "swing", 0.0, 0.5).at(blue),
                CommittedAction::new(blue, "swing", 0.3, 0.8).at(red),
            ];
            entries.extend(resolver.resolve(&actions, &mut encounter, &mut rng, &mut log).unwrap());
        }
        assert_eq!(encounter.tick, 5);
        serde_json::to_string(&(entries, log.events)).unwrap()
    };

    assert_eq!(run(7), run(7));
}

#[test]
fn test_every_attack_is_reported_each_tick() {
    let tables = builtin::tables();
    let config = ResolutionConfig::default();
    let resolver = TickResolver::new(&tables, &config);
    let (red, blue) = ids();
    let mut encounter = duel("arming_sword", "arming_sword", Reach::Short);
    let mut rng = StreamRandom::new(11);
    let mut log = EventLog::new();

    for _ in 0..3 {
        let actions = vec![
            CommittedAction::new(red, "thrust", 0.0, 0.5).at(blue),
            CommittedAction::new(blue, "swing", 0.2, 0.7).at(red),
        ];
        let entries = resolver.resolve(&actions, &mut encounter, &mut rng, &mut log).unwrap();
        assert_eq!(entries.len(), 2);
    }
    let resolved = log
        .iter()
        .filter(|e| matches!(e, CombatEvent::TechniqueResolved { .. }))
        .count();
    assert_eq!(resolved, 6);
}

#[test]
fn test_unknown_armour_aborts_the_tick() {
    let tables = builtin::tables();
    let config = ResolutionConfig::default();
    let resolver = TickResolver::new(&tables, &config);
    let (red, blue) = ids();
    let mut encounter = duel("axe", "arming_sword", Reach::Short);
    encounter.add(
        Combatant::new(blue, "Blue", TeamId(1), &Species::human())
            .with_weapon("arming_sword")
            .with_armour(&["mithril_coat"]),
    );
    let mut rng = ScriptedRandom::default().with_fallback(0.0);
    let mut log = EventLog::new();

    // Blue's thrust lands on Red first; Red's swing then trips on the coat
    let actions = vec![
        CommittedAction::new(blue, "thrust", 0.0, 0.3).at(red),
        CommittedAction::new(red, "swing", 0.4, 0.8).at(blue),
    ];
    let before = encounter.engagements.get(red, blue);
    let err = resolver
        .resolve(&actions, &mut encounter, &mut rng, &mut log)
        .unwrap_err();

    assert!(matches!(err, CombatError::UnknownArmourPiece(ref id) if id == "mithril_coat"));
    assert!(err.is_data_integrity());

    // Nothing from the aborted tick is kept
    assert_eq!(encounter.tick, 0);
    assert!(log.is_empty());
    assert!(encounter.get(red).unwrap().wounds.iter().next().is_none());
    assert!(encounter.get(blue).unwrap().wounds.iter().next().is_none());
    assert_eq!(encounter.engagements.get(red, blue), before);
    assert_eq!(encounter.get(red).unwrap().weapon.as_deref(), Some("axe"));
}

#[test]
fn test_default_combatant_presents_a_weapon_arm() {
    let tables = builtin::tables();
    let (red, blue) = ids();
    let encounter = duel("axe", "arming_sword", Reach::Short);
    assert_eq!(encounter.get(blue).unwrap().stance.dominant, Side::Right);

    let attack = CommittedAction::new(red, "swing", 0.0, 0.5).at(blue);
    let pairing = Pairing {
        target: Some(blue),
        ..Pairing::default()
    };
    let Prepared::Ready(ctx) = build_context(&tables, &encounter, &attack, pairing).unwrap() else {
        panic!("pair was skipped");
    };
    let weight = |part: &str| ctx.defender.exposure.get(part).map_or(0.0, |e| e.weight);
    assert!(weight("right_forearm") > weight("left_forearm"));
    assert!(weight("right_hand") > weight("left_hand"));
}

#[test]
fn test_counter_attack_exposes_the_defenders_arm() {
    let tables = builtin::tables();
    let (red, blue) = ids();
    let encounter = duel("axe", "arming_sword", Reach::Short);
    let attack = CommittedAction::new(red, "swing", 0.0, 0.5).at(blue);
    let counter = CommittedAction::new(blue, "thrust", 0.1, 0.6).at(red);

    let forearm = |defender_action: Option<&CommittedAction>| {
        let pairing = Pairing {
            target: Some(blue),
            defender_action,
            ..Pairing::default()
        };
        match build_context(&tables, &encounter, &attack, pairing).unwrap() {
            Prepared::Ready(ctx) => ctx.defender.exposure.get("right_forearm").map_or(0.0, |e| e.weight),
            Prepared::Skipped(reason) => panic!("skipped: {:?}", reason),
        }
    };
    // A thrust extends the sword arm toward the attacker
    assert!(forearm(Some(&counter)) > forearm(None));
}

#[test]
fn test_unknown_technique_aborts_before_anything_resolves() {
    let tables = builtin::tables();
    let config = ResolutionConfig::default();
    let resolver = TickResolver::new(&tables, &config);
    let (red, blue) = ids();
    let mut encounter = duel("axe", "arming_sword", Reach::Short);
    let mut log = EventLog::new();

    let actions = vec![
        CommittedAction::new(red, "swing", 0.0, 0.5).at(blue),
        CommittedAction::new(blue, "whirlwind", 0.1, 0.5).at(red),
    ];
    let err = resolver
        .resolve(&actions, &mut encounter, &mut ScriptedRandom::default(), &mut log)
        .unwrap_err();

    assert!(matches!(err, CombatError::UnknownTechnique(_)));
    assert!(log.is_empty());
    assert_eq!(encounter.tick, 0);
}
