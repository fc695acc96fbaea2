//! Species
//!
//! What a combatant is before anything is put in their hands: a body plan,
//! vital pools and how fast they refill, overall size, and the natural
//! weapons used once nothing is held.

use serde::{Deserialize, Serialize};

use crate::combat::body::{BodyPlan, PartTag};
use crate::combat::wounds::WoundLedger;

/// Height (relative to the plan's base) at which reach grows one band
pub const TALL_REACH_HEIGHT: f32 = 1.5;
/// Height below which reach shrinks one band
pub const SHORT_REACH_HEIGHT: f32 = 0.6;

/// The three pools a body runs on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Vitals {
    /// Litres, roughly; reaching zero is death
    pub blood: f32,
    pub stamina: f32,
    pub focus: f32,
}

/// Size relative to the body plan's base height and mass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeModifiers {
    pub height: f32,
    pub mass: f32,
}

impl Default for SizeModifiers {
    fn default() -> Self {
        Self {
            height: 1.0,
            mass: 1.0,
        }
    }
}

impl SizeModifiers {
    /// Reach bands gained (or lost) from stature alone
    pub fn reach_steps(&self) -> i8 {
        if self.height >= TALL_REACH_HEIGHT {
            1
        } else if self.height <= SHORT_REACH_HEIGHT {
            -1
        } else {
            0
        }
    }
}

/// A weapon the body grows, usable while the part it needs remains
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NaturalWeapon {
    pub weapon: String,
    /// Region tag of the part that wields it
    pub required_part: PartTag,
}

impl NaturalWeapon {
    pub fn new(weapon: impl Into<String>, required_part: impl Into<String>) -> Self {
        Self {
            weapon: weapon.into(),
            required_part: PartTag::new(required_part),
        }
    }

    /// Some part with the required tag is still attached
    pub fn usable(&self, plan: &BodyPlan, wounds: &WoundLedger) -> bool {
        plan.parts
            .iter()
            .any(|p| p.tag == self.required_part && !wounds.is_severed(&p.name))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    pub id: String,
    pub name: String,
    pub body_plan: String,
    pub base_blood: f32,
    pub base_stamina: f32,
    pub base_focus: f32,
    /// Per tick; absent means the pool does not refill in combat
    #[serde(default)]
    pub stamina_recovery: Option<f32>,
    #[serde(default)]
    pub focus_recovery: Option<f32>,
    #[serde(default)]
    pub blood_recovery: Option<f32>,
    #[serde(default)]
    pub size: SizeModifiers,
    #[serde(default)]
    pub tags: Vec<String>,
    /// In order of preference
    #[serde(default)]
    pub natural_weapons: Vec<NaturalWeapon>,
}

impl Species {
    /// Full pools for a fresh combatant
    pub fn pools(&self) -> Vitals {
        Vitals {
            blood: self.base_blood,
            stamina: self.base_stamina,
            focus: self.base_focus,
        }
    }

    /// Per-tick refill of each pool
    pub fn recovery(&self) -> Vitals {
        Vitals {
            blood: self.blood_recovery.unwrap_or(0.0),
            stamina: self.stamina_recovery.unwrap_or(0.0),
            focus: self.focus_recovery.unwrap_or(0.0),
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn human() -> Self {
        Self {
            id: "human".into(),
            name: "Human".into(),
            body_plan: "humanoid".into(),
            base_blood: 5.0,
            base_stamina: 1.0,
            base_focus: 1.0,
            stamina_recovery: Some(0.05),
            focus_recovery: Some(0.05),
            blood_recovery: None,
            size: SizeModifiers::default(),
            tags: vec!["sapient".into()],
            natural_weapons: vec![NaturalWeapon::new("fists", "hand")],
        }
    }

    /// Short, heavy and hard to tire
    pub fn dwarf() -> Self {
        Self {
            id: "dwarf".into(),
            name: "Dwarf".into(),
            body_plan: "humanoid".into(),
            base_blood: 4.5,
            base_stamina: 1.2,
            base_focus: 1.0,
            stamina_recovery: Some(0.07),
            focus_recovery: Some(0.05),
            blood_recovery: None,
            size: SizeModifiers {
                height: 0.75,
                mass: 1.1,
            },
            tags: vec!["sapient".into()],
            natural_weapons: vec![NaturalWeapon::new("fists", "hand")],
        }
    }

    pub fn ooze() -> Self {
        Self {
            id: "ooze".into(),
            name: "Ooze".into(),
            body_plan: "ooze".into(),
            base_blood: 8.0,
            base_stamina: 1.0,
            base_focus: 0.0,
            stamina_recovery: Some(0.1),
            focus_recovery: None,
            blood_recovery: Some(0.1),
            size: SizeModifiers {
                height: 0.4,
                mass: 1.2,
            },
            tags: vec!["mindless".into(), "amorphous".into()],
            natural_weapons: vec![NaturalWeapon::new("pseudopod", "pseudopod")],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::penetration::LayerVerdict;
    use crate::combat::tissue::{TissueLayerDamage, TissueOutcome};
    use crate::core::config::ResolutionConfig;
    use crate::data::builtin;

    #[test]
    fn test_pools_and_recovery_default_missing_rates_to_zero() {
        let human = Species::human();
        assert_eq!(human.pools().blood, 5.0);
        assert_eq!(human.recovery().stamina, 0.05);
        assert_eq!(human.recovery().blood, 0.0);
        assert!(human.has_tag("sapient"));
    }

    #[test]
    fn test_stature_changes_reach() {
        assert_eq!(SizeModifiers::default().reach_steps(), 0);
        assert_eq!(Species::ooze().size.reach_steps(), -1);
        let giant = SizeModifiers {
            height: 2.0,
            mass: 3.0,
        };
        assert_eq!(giant.reach_steps(), 1);
    }

    #[test]
    fn test_natural_weapon_needs_an_attached_part() {
        let plan = builtin::humanoid_plan();
        let config = ResolutionConfig::default();
        let fists = NaturalWeapon::new("fists", "hand");
        let mut wounds = WoundLedger::new();
        assert!(fists.usable(&plan, &wounds));

        let severing = TissueOutcome {
            layers: vec![TissueLayerDamage {
                material: "bone".into(),
                thickness_ratio: 1.0,
                structural: true,
                verdict: LayerVerdict::Penetrated,
                deposited: 50.0,
                volume_loss: 1.0,
            }],
            depth: 1.0,
            ..Default::default()
        };
        for hand in ["left_hand", "right_hand"] {
            let part = plan.part(hand).unwrap();
            wounds.apply(&plan, part, &severing, &config);
        }
        assert!(wounds.is_severed("left_hand"));
        assert!(!fists.usable(&plan, &wounds));
    }

    #[test]
    fn test_species_parses_from_toml() {
        let species: Species = toml::from_str(
            r#"
id = "troll"
name = "Troll"
body_plan = "humanoid"
base_blood = 9.0
base_stamina = 1.5
base_focus = 0.5
blood_recovery = 0.2
tags = ["regenerates"]

[size]
height = 1.6
mass = 2.5

[[natural_weapons]]
weapon = "fists"
required_part = "hand"
"#,
        )
        .unwrap();
        assert_eq!(species.recovery().blood, 0.2);
        assert_eq!(species.size.reach_steps(), 1);
        assert_eq!(species.natural_weapons[0].required_part, PartTag::new("hand"));
        assert_eq!(species.stamina_recovery, None);
    }
}
