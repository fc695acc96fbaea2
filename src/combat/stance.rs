//! Compositional stance
//!
//! A stance is not a named pose. It is a grip, an arm contribution, a body
//! contribution and a dominant side; the exposure synthesizer turns those
//! into a weighted body map. Guard height rides along for hit-chance math.

use serde::{Deserialize, Serialize};

use crate::combat::body::{Height, Side};
use crate::combat::weapons::{WeaponCategory, WeaponTemplate};

/// How the combatant holds what they fight with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GripCategory {
    #[default]
    OneHanded,
    TwoHanded,
    WeaponAndShield,
    Polearm,
    Unarmed,
}

/// Per-limb exposure multipliers for a grip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GripPattern {
    pub weapon_arm: f32,
    pub off_arm: f32,
    pub core: f32,
    pub support: f32,
}

impl GripCategory {
    pub fn pattern(self) -> GripPattern {
        use GripCategory::*;

        let (weapon_arm, off_arm, core, support) = match self {
            OneHanded => (1.2, 0.8, 1.0, 1.0),
            TwoHanded => (1.1, 1.1, 0.9, 1.0),
            // Shield covers the off arm and much of the trunk
            WeaponAndShield => (1.1, 0.5, 0.7, 0.9),
            Polearm => (1.2, 1.2, 0.8, 1.0),
            Unarmed => (1.2, 1.2, 1.0, 1.0),
        };
        GripPattern {
            weapon_arm,
            off_arm,
            core,
            support,
        }
    }

    /// Both manipulators hold the weapon
    pub fn both_hands(self) -> bool {
        matches!(self, GripCategory::TwoHanded | GripCategory::Polearm)
    }

    /// Grip implied by what is in hand
    ///
    /// A shield in the off hand makes a single-handed grip weapon-and-shield.
    /// Two-handed weapons leave no hand for it.
    pub fn for_equipment(main: &WeaponTemplate, off_hand: Option<&WeaponTemplate>) -> Self {
        let shield = off_hand.map_or(false, |item| item.category == WeaponCategory::Shield);
        match main.grip {
            GripCategory::OneHanded | GripCategory::Unarmed if shield => GripCategory::WeaponAndShield,
            grip => grip,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    #[default]
    Square,
    /// Dominant side forward
    Bladed,
    /// Off side forward
    BladedReverse,
}

impl Facing {
    /// Which side leads for a given dominant side
    pub fn lead_side(self, dominant: Side) -> Side {
        match self {
            Facing::Square | Facing::Bladed => dominant,
            Facing::BladedReverse => dominant.opposite(),
        }
    }

    pub fn is_bladed(self) -> bool {
        !matches!(self, Facing::Square)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Lean {
    #[default]
    Upright,
    Forward,
    Back,
}

/// What the arms are doing (from the active technique or the held guard)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ArmContribution {
    /// Weapon arm raised or lowered to this band
    pub height_override: Option<Height>,
    /// 0 = chambered, 1 = fully extended
    pub extension: f32,
    /// Extra exposure of the grasping parts
    pub hand_exposure: f32,
}

/// What the legs and trunk are doing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BodyContribution {
    pub facing: Facing,
    /// 0 = upright, 1 = deep crouch
    pub crouch: f32,
    pub lean: Lean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Guard {
    pub height: Height,
    #[serde(default)]
    pub covers_adjacent: bool,
}

impl Guard {
    pub fn new(height: Height, covers_adjacent: bool) -> Self {
        Self {
            height,
            covers_adjacent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stance {
    pub grip: GripCategory,
    #[serde(default)]
    pub arm: ArmContribution,
    #[serde(default)]
    pub body: BodyContribution,
    pub dominant: Side,
    #[serde(default)]
    pub guard: Option<Guard>,
}

impl Default for Stance {
    /// Right-handed, one-handed, square and upright
    fn default() -> Self {
        Self {
            grip: GripCategory::default(),
            arm: ArmContribution::default(),
            body: BodyContribution::default(),
            dominant: Side::Right,
            guard: None,
        }
    }
}

impl Stance {
    pub fn new(grip: GripCategory, dominant: Side) -> Self {
        Self {
            grip,
            dominant,
            ..Default::default()
        }
    }

    pub fn with_guard(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }

    pub fn with_arm(mut self, arm: ArmContribution) -> Self {
        self.arm = arm;
        self
    }

    pub fn with_body(mut self, body: BodyContribution) -> Self {
        self.body = body;
        self
    }
}

/// Stamina charged for confirming a new stance
///
/// Whether adjusting a guard costs a flat fee or scales with how far the
/// stance moves is left to the caller.
pub trait StanceCost {
    fn cost(&self, from: &Stance, to: &Stance) -> f32;
}

/// Any change costs the same
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlatStanceCost {
    pub per_change: f32,
}

impl StanceCost for FlatStanceCost {
    fn cost(&self, from: &Stance, to: &Stance) -> f32 {
        if from == to {
            0.0
        } else {
            self.per_change
        }
    }
}

/// Cost grows with the distance between the two stances
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeltaStanceCost {
    pub per_guard_step: f32,
    pub per_facing_change: f32,
    pub per_crouch: f32,
    pub per_extension: f32,
}

impl Default for DeltaStanceCost {
    fn default() -> Self {
        Self {
            per_guard_step: 0.03,
            per_facing_change: 0.02,
            per_crouch: 0.05,
            per_extension: 0.02,
        }
    }
}

impl StanceCost for DeltaStanceCost {
    fn cost(&self, from: &Stance, to: &Stance) -> f32 {
        let guard_steps = match (from.guard, to.guard) {
            (Some(a), Some(b)) => a.height.distance(b.height) as f32,
            (None, None) => 0.0,
            _ => 1.0,
        };
        let facing = if from.body.facing == to.body.facing {
            0.0
        } else {
            1.0
        };

        guard_steps * self.per_guard_step
            + facing * self.per_facing_change
            + (from.body.crouch - to.body.crouch).abs() * self.per_crouch
            + (from.arm.extension - to.arm.extension).abs() * self.per_extension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bladed_reverse_leads_with_off_side() {
        assert_eq!(Facing::Bladed.lead_side(Side::Right), Side::Right);
        assert_eq!(Facing::BladedReverse.lead_side(Side::Right), Side::Left);
    }

    #[test]
    fn test_shield_grip_covers_off_arm() {
        let pattern = GripCategory::WeaponAndShield.pattern();
        assert!(pattern.off_arm < pattern.weapon_arm);
        assert!(pattern.core < 1.0);
    }

    #[test]
    fn test_grip_follows_equipment() {
        let sword = WeaponTemplate::arming_sword();
        let shield = WeaponTemplate::heater_shield();
        let spear = WeaponTemplate::spear();
        let fists = WeaponTemplate::fists();

        assert_eq!(GripCategory::for_equipment(&sword, None), GripCategory::OneHanded);
        assert_eq!(GripCategory::for_equipment(&sword, Some(&shield)), GripCategory::WeaponAndShield);
        assert_eq!(GripCategory::for_equipment(&spear, Some(&shield)), GripCategory::Polearm);
        assert_eq!(GripCategory::for_equipment(&fists, None), GripCategory::Unarmed);
        // A second sword is not a shield
        assert_eq!(GripCategory::for_equipment(&sword, Some(&sword)), GripCategory::OneHanded);
    }

    #[test]
    fn test_default_stance_is_right_handed() {
        assert_eq!(Stance::default().dominant, Side::Right);
        assert_eq!(Stance::default().grip, GripCategory::OneHanded);
    }

    #[test]
    fn test_flat_cost_ignores_distance() {
        let cost = FlatStanceCost { per_change: 0.1 };
        let from = Stance::new(GripCategory::OneHanded, Side::Right)
            .with_guard(Guard::new(Height::Low, false));
        let near = from.with_guard(Guard::new(Height::Mid, false));
        let far = from.with_guard(Guard::new(Height::High, false));

        assert_eq!(cost.cost(&from, &from), 0.0);
        assert_eq!(cost.cost(&from, &near), cost.cost(&from, &far));
    }

    #[test]
    fn test_delta_cost_scales_with_distance() {
        let cost = DeltaStanceCost::default();
        let from = Stance::new(GripCategory::OneHanded, Side::Right)
            .with_guard(Guard::new(Height::Low, false));
        let near = from.with_guard(Guard::new(Height::Mid, false));
        let far = from.with_guard(Guard::new(Height::High, false));

        assert!(cost.cost(&from, &far) > cost.cost(&from, &near));
        assert_eq!(cost.cost(&from, &from), 0.0);
    }
}
