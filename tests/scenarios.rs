//! Expected-outcome scenarios
//!
//! Every built-in scenario must hold against the built-in tables, and a
//! scenario authored in TOML runs the same way once merged in.

use arc_melee::combat::{OutcomeKind, Strike};
use arc_melee::core::ResolutionConfig;
use arc_melee::data::{builtin, ScenarioMeasure, TableFile};

#[test]
fn test_builtin_scenarios_hold() {
    let tables = builtin::tables();
    let config = ResolutionConfig::default();
    let scenarios = tables.scenarios();
    assert_eq!(scenarios.len(), builtin::scenarios().len());

    for scenario in scenarios {
        let mismatches = scenario.check(&tables, &config).unwrap();
        assert!(mismatches.is_empty(), "{}: {:?}", scenario.id, mismatches);
    }
}

#[test]
fn test_rear_blow_passes_frontal_plate() {
    let tables = builtin::tables();
    let config = ResolutionConfig::default();
    let scenario = tables
        .scenarios()
        .into_iter()
        .find(|s| s.id == "mace_behind_breastplate")
        .unwrap();

    match scenario.run(&tables, &config).unwrap() {
        Strike::Landed { armour, reached, .. } => {
            assert_eq!(armour.len(), 1);
            assert!(reached > 0.0);
        }
        other => panic!("plate stopped a blow from behind: {:?}", other),
    }
}

#[test]
fn test_scenario_from_toml() {
    let file = TableFile::from_toml_str(
        r#"
[[scenarios]]
id = "stiletto_into_dwarf"
description = "Needle thrust into a bare dwarf"

[scenarios.attacker]
weapon = "stiletto"
technique = "thrust"
speed = 7.0

[scenarios.defender]
species = "dwarf"

[scenarios.expected]
outcome = "hit"
packet_geometry_min = 0.5
"#,
    )
    .unwrap();
    assert_eq!(file.scenarios.len(), 1);
    let scenario = &file.scenarios[0];
    assert_eq!(scenario.attacker.species, "human");
    assert_eq!(scenario.defender.target_part, "torso");

    let mut tables = builtin::tables();
    tables.merge(file.clone());
    let config = ResolutionConfig::default();
    let strike = scenario.run(&tables, &config).unwrap();
    assert_eq!(ScenarioMeasure::of(&strike).outcome, OutcomeKind::Hit);
    assert!(scenario.check(&tables, &config).unwrap().is_empty());
}

#[test]
fn test_scenario_with_unknown_weapon_fails_cleanly() {
    let file = TableFile::from_toml_str(
        r#"
[[scenarios]]
id = "glaive"

[scenarios.attacker]
weapon = "glaive"
technique = "swing"

[scenarios.defender]
"#,
    )
    .unwrap();
    let err = file.scenarios[0]
        .run(&builtin::tables(), &ResolutionConfig::default())
        .unwrap_err();
    assert!(err.is_data_integrity());
}
