//! Built-in reference dataset
//!
//! One humanoid, one amorphous plan, the tissue and armour materials they
//! need, the species built on them, the stock weapons and techniques, and
//! a handful of expected-outcome scenarios.

use crate::combat::armor::{ArmourMaterial, ArmourPiece, Coverage, LayerSlot, Totality};
use crate::combat::body::{
    Anatomy, BodyPartDef, BodyPlan, ExposureWeight, Height, PartFlags, PartGeometry, PartTag, Side,
};
use crate::combat::action::Stakes;
use crate::combat::engagement::RelativeAngle;
use crate::combat::events::OutcomeKind;
use crate::combat::penetration::{LayerCoefficients, Susceptibility};
use crate::combat::species::Species;
use crate::combat::technique::Technique;
use crate::combat::tissue::{TissueLayerDef, TissueMaterial, TissueTemplate};
use crate::combat::weapons::WeaponTemplate;
use crate::data::scenario::{AttackerSpec, CombatScenario, DefenderSpec, ExpectedOutcome};
use crate::data::CombatTables;

/// Everything below in one registry
pub fn tables() -> CombatTables {
    let mut tables = CombatTables::new();

    for weapon in weapons() {
        tables.insert_weapon(weapon);
    }
    for technique in techniques() {
        tables.insert_technique(technique);
    }
    for material in tissue_materials() {
        tables.insert_tissue_material(material);
    }
    for template in tissue_templates() {
        tables.insert_tissue_template(template);
    }
    for material in armour_materials() {
        tables.insert_armour_material(material);
    }
    for piece in armour_pieces() {
        tables.insert_armour_piece(piece);
    }
    tables.insert_body_plan(humanoid_plan());
    tables.insert_body_plan(ooze_plan());
    for species in species() {
        tables.insert_species(species);
    }
    for scenario in scenarios() {
        tables.insert_scenario(scenario);
    }

    tracing::debug!("Built-in combat tables: {} entries", tables.len());
    tables
}

pub fn weapons() -> Vec<WeaponTemplate> {
    vec![
        WeaponTemplate::arming_sword(),
        WeaponTemplate::axe(),
        WeaponTemplate::stiletto(),
        WeaponTemplate::mace(),
        WeaponTemplate::spear(),
        WeaponTemplate::heater_shield(),
        WeaponTemplate::fists(),
        WeaponTemplate::pseudopod(),
    ]
}

pub fn techniques() -> Vec<Technique> {
    vec![
        Technique::overhead_chop(),
        Technique::swing(),
        Technique::thrust(),
        Technique::sweep(),
        Technique::high_guard(),
        Technique::low_guard(),
        Technique::parry(),
        Technique::block(),
        Technique::dodge(),
        Technique::advance(),
        Technique::retreat(),
        Technique::sidestep(),
    ]
}

pub fn species() -> Vec<Species> {
    vec![Species::human(), Species::dwarf(), Species::ooze()]
}

fn attacker(weapon: &str, technique: &str, stakes: Stakes) -> AttackerSpec {
    AttackerSpec {
        species: "human".into(),
        weapon: weapon.into(),
        technique: technique.into(),
        stakes,
        power: None,
        speed: None,
        skill: None,
    }
}

fn defender(armour: &[&str], target_part: &str, angle: RelativeAngle) -> DefenderSpec {
    DefenderSpec {
        species: "human".into(),
        armour: armour.iter().map(|s| s.to_string()).collect(),
        target_part: target_part.into(),
        angle,
    }
}

pub fn scenarios() -> Vec<CombatScenario> {
    vec![
        CombatScenario {
            id: "axe_chop_bare_forearm".into(),
            description: "Committed overhead chop on an unarmoured forearm".into(),
            attacker: attacker("axe", "overhead_chop", Stakes::Committed),
            defender: defender(&[], "right_forearm", RelativeAngle::Frontal),
            expected: ExpectedOutcome {
                outcome: Some(OutcomeKind::Hit),
                damage_dealt_min: Some(1.0),
                packet_energy_min: Some(100.0),
                penetrated_layers_max: Some(0),
                ..Default::default()
            },
        },
        CombatScenario {
            id: "sword_thrust_breastplate".into(),
            description: "Tentative thrust turned by frontal plate".into(),
            attacker: attacker("arming_sword", "thrust", Stakes::Probing),
            defender: defender(&["breastplate"], "torso", RelativeAngle::Frontal),
            expected: ExpectedOutcome {
                outcome: Some(OutcomeKind::Deflected),
                damage_dealt_max: Some(0.0),
                penetrated_layers_max: Some(0),
                ..Default::default()
            },
        },
        CombatScenario {
            id: "mace_behind_breastplate".into(),
            description: "Mace to the back where a breastplate gives no cover".into(),
            attacker: attacker("mace", "swing", Stakes::Committed),
            defender: defender(&["breastplate"], "torso", RelativeAngle::Rear),
            expected: ExpectedOutcome {
                outcome: Some(OutcomeKind::Hit),
                armour_deflected: Some(false),
                penetrated_layers_max: Some(0),
                ..Default::default()
            },
        },
    ]
}

/// Shielding (deflection, absorption, dispersion) then (threshold, ratio)
/// for geometry, energy and rigidity
fn coeffs(
    shielding: (f32, f32, f32),
    geometry: (f32, f32),
    energy: (f32, f32),
    rigidity: (f32, f32),
) -> LayerCoefficients {
    LayerCoefficients {
        deflection: shielding.0,
        absorption: shielding.1,
        dispersion: shielding.2,
        geometry: Susceptibility::new(geometry.0, geometry.1),
        energy: Susceptibility::new(energy.0, energy.1),
        rigidity: Susceptibility::new(rigidity.0, rigidity.1),
    }
}

fn tissue(id: &str, name: &str, structural: bool, layer: LayerCoefficients) -> TissueMaterial {
    TissueMaterial {
        id: id.into(),
        name: name.into(),
        layer,
        structural,
    }
}

pub fn tissue_materials() -> Vec<TissueMaterial> {
    vec![
        tissue("skin", "Skin", false, coeffs((0.05, 0.05, 0.05), (0.05, 0.95), (2.0, 0.9), (0.05, 0.95))),
        tissue("fat", "Fat", false, coeffs((0.0, 0.1, 0.1), (0.0, 0.95), (1.0, 0.9), (0.0, 0.95))),
        tissue("muscle", "Muscle", false, coeffs((0.0, 0.15, 0.1), (0.1, 0.9), (5.0, 0.85), (0.1, 0.9))),
        tissue("bone", "Bone", true, coeffs((0.15, 0.2, 0.2), (0.45, 0.6), (40.0, 0.5), (0.5, 0.5))),
        tissue("tendon", "Tendon", true, coeffs((0.05, 0.15, 0.15), (0.3, 0.7), (20.0, 0.6), (0.35, 0.6))),
        tissue("organ", "Organ", false, coeffs((0.0, 0.1, 0.1), (0.05, 0.95), (2.0, 0.9), (0.05, 0.95))),
        tissue("membrane", "Membrane", false, coeffs((0.05, 0.05, 0.05), (0.05, 0.9), (1.0, 0.9), (0.05, 0.9))),
        tissue("gel", "Gel", false, coeffs((0.0, 0.3, 0.2), (0.0, 0.95), (1.0, 0.9), (0.0, 0.95))),
    ]
}

fn template(id: &str, name: &str, layers: &[(&str, f32)]) -> TissueTemplate {
    TissueTemplate {
        id: id.into(),
        name: name.into(),
        layers: layers
            .iter()
            .map(|&(material, thickness_ratio)| TissueLayerDef {
                material: material.into(),
                thickness_ratio,
            })
            .collect(),
    }
}

pub fn tissue_templates() -> Vec<TissueTemplate> {
    vec![
        template("limb", "Limb", &[("skin", 0.08), ("fat", 0.10), ("muscle", 0.52), ("bone", 0.30)]),
        template(
            "core",
            "Core",
            &[("skin", 0.06), ("fat", 0.14), ("muscle", 0.25), ("bone", 0.15), ("organ", 0.40)],
        ),
        template("skull", "Skull", &[("skin", 0.10), ("fat", 0.05), ("bone", 0.45), ("organ", 0.40)]),
        template("extremity", "Extremity", &[("skin", 0.15), ("fat", 0.05), ("tendon", 0.30), ("bone", 0.50)]),
        template(
            "neck",
            "Neck",
            &[("skin", 0.10), ("fat", 0.10), ("muscle", 0.45), ("bone", 0.15), ("organ", 0.20)],
        ),
        template("organ", "Organ", &[("organ", 1.0)]),
        template("ooze", "Ooze", &[("membrane", 0.10), ("gel", 0.90)]),
    ]
}

fn armour(id: &str, name: &str, layer: LayerCoefficients) -> ArmourMaterial {
    ArmourMaterial {
        id: id.into(),
        name: name.into(),
        layer,
    }
}

pub fn armour_materials() -> Vec<ArmourMaterial> {
    vec![
        armour("plate", "Plate", coeffs((0.35, 0.15, 0.3), (0.7, 0.3), (90.0, 0.35), (0.8, 0.4))),
        armour("mail", "Mail", coeffs((0.1, 0.1, 0.35), (0.55, 0.5), (40.0, 0.6), (0.5, 0.6))),
        armour("gambeson", "Quilted Linen", coeffs((0.0, 0.4, 0.3), (0.3, 0.8), (10.0, 0.6), (0.3, 0.85))),
        armour("leather", "Hardened Leather", coeffs((0.1, 0.2, 0.2), (0.35, 0.7), (20.0, 0.7), (0.4, 0.8))),
        armour("cloth", "Cloth", coeffs((0.0, 0.05, 0.05), (0.05, 0.95), (1.0, 0.95), (0.05, 0.95))),
    ]
}

fn coverage(tags: &[&str], side: Option<Side>, slot: LayerSlot, totality: Totality) -> Coverage {
    Coverage {
        part_tags: tags.iter().map(|t| PartTag::new(*t)).collect(),
        side,
        slot,
        totality,
    }
}

fn piece(id: &str, name: &str, material: &str, coverage: Vec<Coverage>) -> ArmourPiece {
    ArmourPiece {
        id: id.into(),
        name: name.into(),
        material: material.into(),
        coverage,
    }
}

pub fn armour_pieces() -> Vec<ArmourPiece> {
    use LayerSlot::*;
    use Totality::*;

    vec![
        piece(
            "gambeson",
            "Gambeson",
            "gambeson",
            vec![coverage(&["torso", "abdomen", "upper_arm"], None, Padding, Total)],
        ),
        piece(
            "hauberk",
            "Mail Hauberk",
            "mail",
            vec![coverage(&["torso", "abdomen", "upper_arm"], None, Mail, Total)],
        ),
        piece(
            "surcoat",
            "Surcoat",
            "cloth",
            vec![coverage(&["torso", "abdomen"], None, Cloak, Comprehensive)],
        ),
        piece(
            "breastplate",
            "Breastplate",
            "plate",
            vec![coverage(&["torso"], None, Outer, Frontal)],
        ),
        piece(
            "right_vambrace",
            "Right Vambrace",
            "plate",
            vec![coverage(&["forearm"], Some(Side::Right), Outer, Total)],
        ),
        piece(
            "left_vambrace",
            "Left Vambrace",
            "plate",
            vec![coverage(&["forearm"], Some(Side::Left), Outer, Total)],
        ),
        piece(
            "helm",
            "Helm",
            "plate",
            vec![coverage(&["head"], None, Outer, Total)],
        ),
        piece(
            "leather_jerkin",
            "Leather Jerkin",
            "leather",
            vec![coverage(&["torso", "abdomen"], None, Outer, Comprehensive)],
        ),
    ]
}

/// Builder for one part; flags and extras are set on the returned value
fn part(
    name: &str,
    tag: &str,
    side: Side,
    parent: Option<&str>,
    template: &str,
    height: Height,
    exposure: ExposureWeight,
    geometry: (f32, f32, f32),
) -> BodyPartDef {
    BodyPartDef {
        name: name.into(),
        tag: PartTag::new(tag),
        side,
        parent: parent.map(Into::into),
        enclosing: None,
        tissue_template: template.into(),
        has_major_artery: false,
        flags: PartFlags::default(),
        geometry: PartGeometry {
            thickness_cm: geometry.0,
            length_cm: geometry.1,
            area_cm2: geometry.2,
        },
        height,
        exposure,
    }
}

/// Upper arm, forearm and hand on one side
fn arm(side: Side, prefix: &str) -> Vec<BodyPartDef> {
    use ExposureWeight::*;

    let upper = format!("{}_upper_arm", prefix);
    let fore = format!("{}_forearm", prefix);
    let hand = format!("{}_hand", prefix);

    let mut upper_arm = part(&upper, "upper_arm", side, Some("torso"), "limb", Height::Mid, Authored(0.07), (10.0, 30.0, 600.0));
    upper_arm.has_major_artery = true;
    let forearm = part(&fore, "forearm", side, Some(upper.as_str()), "limb", Height::Mid, Inherit(0.7), (8.0, 27.0, 450.0));
    let mut grip = part(&hand, "hand", side, Some(fore.as_str()), "extremity", Height::Mid, Inherit(0.5), (3.0, 19.0, 180.0));
    grip.flags.can_grasp = true;

    vec![upper_arm, forearm, grip]
}

/// Thigh, shin and foot on one side
fn leg(side: Side, prefix: &str) -> Vec<BodyPartDef> {
    use ExposureWeight::*;

    let thigh_name = format!("{}_thigh", prefix);
    let shin_name = format!("{}_shin", prefix);
    let foot_name = format!("{}_foot", prefix);

    let mut thigh = part(&thigh_name, "thigh", side, Some("torso"), "limb", Height::Low, Authored(0.09), (16.0, 45.0, 1100.0));
    thigh.has_major_artery = true;
    let shin = part(&shin_name, "shin", side, Some(thigh_name.as_str()), "limb", Height::Low, Inherit(0.8), (10.0, 42.0, 700.0));
    let mut foot = part(&foot_name, "foot", side, Some(shin_name.as_str()), "extremity", Height::Low, Inherit(0.4), (6.0, 26.0, 250.0));
    foot.flags.can_stand = true;

    vec![thigh, shin, foot]
}

pub fn humanoid_plan() -> BodyPlan {
    use ExposureWeight::*;

    let mut torso = part("torso", "torso", Side::Center, None, "core", Height::Mid, Authored(0.30), (24.0, 50.0, 2400.0));
    torso.flags.vital = true;

    let abdomen = part("abdomen", "abdomen", Side::Center, Some("torso"), "core", Height::Mid, Authored(0.12), (22.0, 25.0, 1200.0));

    let mut neck = part("neck", "neck", Side::Center, Some("torso"), "neck", Height::High, Authored(0.04), (11.0, 10.0, 120.0));
    neck.flags.vital = true;
    neck.has_major_artery = true;

    let mut head = part("head", "head", Side::Center, Some("neck"), "skull", Height::High, Authored(0.08), (16.0, 23.0, 600.0));
    head.flags.vital = true;
    head.flags.can_see = true;
    head.flags.can_hear = true;

    let mut brain = part("brain", "brain", Side::Center, Some("head"), "organ", Height::High, Hidden, (12.0, 16.0, 150.0));
    brain.enclosing = Some("head".into());
    brain.flags.vital = true;
    brain.flags.internal = true;

    let mut parts = vec![torso, abdomen, neck, head, brain];
    parts.extend(arm(Side::Left, "left"));
    parts.extend(arm(Side::Right, "right"));
    parts.extend(leg(Side::Left, "left"));
    parts.extend(leg(Side::Right, "right"));

    BodyPlan::new("humanoid", "Humanoid", Anatomy::Articulated, 175.0, 75.0, parts)
}

/// Amorphous blob: a static exposure table, no stance composition
pub fn ooze_plan() -> BodyPlan {
    use ExposureWeight::*;

    let mut mass = part("mass", "mass", Side::Center, None, "ooze", Height::Low, Authored(0.8), (40.0, 80.0, 5000.0));
    mass.flags.vital = true;
    let mut pseudopod = part("pseudopod", "pseudopod", Side::Center, Some("mass"), "ooze", Height::Mid, Authored(0.2), (8.0, 60.0, 400.0));
    pseudopod.flags.can_grasp = true;

    BodyPlan::new("ooze", "Ooze", Anatomy::Static, 60.0, 90.0, vec![mass, pseudopod])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataTables;

    #[test]
    fn test_every_part_template_exists() {
        let tables = tables();
        for plan in [humanoid_plan(), ooze_plan()] {
            for part in &plan.parts {
                assert!(
                    tables.tissue_template(&part.tissue_template).is_ok(),
                    "{} uses {}",
                    part.name,
                    part.tissue_template
                );
            }
        }
    }

    #[test]
    fn test_templates_sum_to_one() {
        for template in tissue_templates() {
            assert!(
                (template.thickness_total() - 1.0).abs() < 1e-4,
                "{} sums to {}",
                template.id,
                template.thickness_total()
            );
        }
    }

    #[test]
    fn test_torso_is_first_exposed_part() {
        let plan = humanoid_plan();
        assert_eq!(plan.base_exposures()[0].part, "torso");
    }

    #[test]
    fn test_humanoid_has_two_hands_and_feet() {
        let plan = humanoid_plan();
        assert_eq!(plan.parts.iter().filter(|p| p.flags.can_grasp).count(), 2);
        assert_eq!(plan.parts.iter().filter(|p| p.flags.can_stand).count(), 2);
    }

    #[test]
    fn test_species_reference_known_plans_and_weapons() {
        let tables = tables();
        for species in species() {
            let plan = tables.body_plan(&species.body_plan).unwrap();
            for natural in &species.natural_weapons {
                assert!(tables.weapon(&natural.weapon).is_ok(), "{} wields {}", species.id, natural.weapon);
                assert!(plan.parts.iter().any(|p| p.tag == natural.required_part));
            }
        }
        assert_eq!(tables.species("ooze").unwrap().body_plan, "ooze");
    }
}
