//! Exposure synthesis
//!
//! Turns a body plan and a compositional stance into a weighted map of
//! what can be struck. Each stage takes an exposure map and returns a new
//! one; the order is fixed:
//!
//! 1. grip base pattern
//! 2. height override
//! 3. extension scaling
//! 4. hand exposure bonus
//! 5. lead/rear resolution
//! 6. facing and angle modifiers
//! 7. crouch and lean
//!
//! Invalid grip/posture combinations are rejected before a stance is
//! confirmed, so no stage can fail.

use serde::{Deserialize, Serialize};

use crate::combat::body::{Anatomy, BodyPlan, Height, PartTag, Side};
use crate::combat::constants::*;
use crate::combat::engagement::RelativeAngle;
use crate::combat::stance::{ArmContribution, BodyContribution, Facing, GripCategory, Lean, Stance};

/// Functional role of a part chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Limb {
    Manipulator,
    Support,
    Core,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Lead,
    Rear,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartExposure {
    pub part: String,
    pub tag: PartTag,
    pub side: Side,
    pub height: Height,
    pub weight: f32,
    pub limb: Limb,
    pub grasp: bool,
    pub orientation: Option<Orientation>,
}

/// Weighted, unnormalized distribution over exposed parts
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExposureMap {
    entries: Vec<PartExposure>,
}

impl ExposureMap {
    pub fn new(entries: Vec<PartExposure>) -> Self {
        let mut map = Self { entries };
        map.clamp_weights();
        map
    }

    pub fn entries(&self) -> &[PartExposure] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &PartExposure> {
        self.entries.iter()
    }

    pub fn get(&self, part: &str) -> Option<&PartExposure> {
        self.entries.iter().find(|e| e.part == part)
    }

    pub fn total_weight(&self) -> f32 {
        self.entries.iter().map(|e| e.weight).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Part names in map order
    pub fn parts(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.part.as_str()).collect()
    }

    /// New map without the parts matching `excluded`
    pub fn without(&self, excluded: impl Fn(&str) -> bool) -> ExposureMap {
        ExposureMap {
            entries: self
                .entries
                .iter()
                .filter(|e| !excluded(&e.part))
                .cloned()
                .collect(),
        }
    }

    /// New map with every weight transformed; weights never go negative
    fn scaled(&self, f: impl Fn(&PartExposure) -> f32) -> ExposureMap {
        let entries = self
            .entries
            .iter()
            .map(|e| PartExposure {
                weight: (e.weight * f(e)).max(0.0),
                ..e.clone()
            })
            .collect();
        ExposureMap { entries }
    }

    fn clamp_weights(&mut self) {
        for e in &mut self.entries {
            if !e.weight.is_finite() || e.weight < 0.0 {
                e.weight = 0.0;
            }
        }
    }
}

/// Does this entry belong to an arm holding the weapon?
fn is_weapon_arm(e: &PartExposure, grip: GripCategory, dominant: Side) -> bool {
    e.limb == Limb::Manipulator
        && (grip.both_hands() || e.side == dominant || e.side == Side::Center)
}

/// Stage 1: scale limbs by how the grip carries them
pub fn grip_base(base: &[PartExposure], grip: GripCategory, dominant: Side) -> ExposureMap {
    let pattern = grip.pattern();
    ExposureMap::new(base.to_vec()).scaled(|e| match e.limb {
        Limb::Manipulator if is_weapon_arm(e, grip, dominant) => pattern.weapon_arm,
        Limb::Manipulator => pattern.off_arm,
        Limb::Support => pattern.support,
        Limb::Core => pattern.core,
    })
}

/// Stage 2: move the weapon arm to the overridden height band
pub fn apply_height_override(
    map: &ExposureMap,
    arm: &ArmContribution,
    grip: GripCategory,
    dominant: Side,
) -> ExposureMap {
    let Some(height) = arm.height_override else {
        return map.clone();
    };
    let entries = map
        .entries
        .iter()
        .map(|e| {
            let mut e = e.clone();
            if is_weapon_arm(&e, grip, dominant) {
                e.height = height;
            }
            e
        })
        .collect();
    ExposureMap { entries }
}

/// Stage 3: an extended arm is easier to reach and covers the trunk a little
pub fn apply_extension(
    map: &ExposureMap,
    arm: &ArmContribution,
    grip: GripCategory,
    dominant: Side,
) -> ExposureMap {
    let ext = arm.extension.clamp(0.0, 1.0);
    if ext == 0.0 {
        return map.clone();
    }
    map.scaled(|e| {
        if is_weapon_arm(e, grip, dominant) {
            1.0 + EXTENSION_EXPOSURE_SCALE * ext
        } else if e.limb == Limb::Core {
            1.0 - EXTENSION_CORE_COVER * ext
        } else {
            1.0
        }
    })
}

/// Stage 4: extra exposure of the grasping parts
pub fn apply_hand_bonus(map: &ExposureMap, arm: &ArmContribution) -> ExposureMap {
    if arm.hand_exposure == 0.0 {
        return map.clone();
    }
    map.scaled(|e| if e.grasp { 1.0 + arm.hand_exposure } else { 1.0 })
}

/// Stage 5: tag sided parts as lead or rear
pub fn resolve_orientation(map: &ExposureMap, facing: Facing, dominant: Side) -> ExposureMap {
    let lead = facing.lead_side(dominant);
    let entries = map
        .entries
        .iter()
        .map(|e| {
            let orientation = if e.side == Side::Center || lead == Side::Center {
                None
            } else if e.side == lead {
                Some(Orientation::Lead)
            } else {
                Some(Orientation::Rear)
            };
            PartExposure {
                orientation,
                ..e.clone()
            }
        })
        .collect();
    ExposureMap { entries }
}

/// Stage 6a: bladed stances present the lead side
pub fn apply_facing(map: &ExposureMap, facing: Facing) -> ExposureMap {
    if !facing.is_bladed() {
        return map.clone();
    }
    map.scaled(|e| match e.orientation {
        Some(Orientation::Lead) => BLADED_LEAD_MULT,
        Some(Orientation::Rear) => BLADED_REAR_MULT,
        None => BLADED_CENTER_MULT,
    })
}

/// Stage 6b: the attacker's angle favours the side it comes from
pub fn apply_angle(map: &ExposureMap, angle: RelativeAngle) -> ExposureMap {
    let (lead, rear) = match angle {
        RelativeAngle::Frontal => return map.clone(),
        RelativeAngle::Flank | RelativeAngle::Rear => (FLANK_LEAD_MULT, FLANK_REAR_MULT),
        RelativeAngle::Outside => (LINE_SIDE_MULT, 1.0),
        RelativeAngle::Inside => (1.0, LINE_SIDE_MULT),
    };
    map.scaled(|e| match e.orientation {
        Some(Orientation::Lead) => lead,
        Some(Orientation::Rear) => rear,
        None => 1.0,
    })
}

/// Stage 7: crouching hides the legs, leaning shifts weight between bands
pub fn apply_posture(map: &ExposureMap, body: &BodyContribution) -> ExposureMap {
    let crouch = body.crouch.clamp(0.0, 1.0);
    let (high_lean, support_lean) = match body.lean {
        Lean::Upright => (1.0, 1.0),
        Lean::Forward => (1.0 + LEAN_HIGH_SHIFT, 1.0 - LEAN_SUPPORT_SHIFT),
        Lean::Back => (1.0 - LEAN_HIGH_SHIFT, 1.0 + LEAN_SUPPORT_SHIFT),
    };
    map.scaled(|e| {
        let mut mult = 1.0;
        if e.limb == Limb::Support {
            mult *= (1.0 - CROUCH_SUPPORT_COVER * crouch) * support_lean;
        }
        if e.height == Height::High {
            mult *= (1.0 + CROUCH_HIGH_EXPOSE * crouch) * high_lean;
        }
        mult
    })
}

/// Run the full pipeline for a defender
///
/// Static anatomies skip composition and return their table unchanged.
pub fn synthesize(plan: &BodyPlan, stance: &Stance, angle: RelativeAngle) -> ExposureMap {
    let base = plan.base_exposures();
    if plan.anatomy == Anatomy::Static {
        return ExposureMap::new(base.to_vec());
    }

    let grip = stance.grip;
    let dominant = stance.dominant;

    let map = grip_base(base, grip, dominant);
    let map = apply_height_override(&map, &stance.arm, grip, dominant);
    let map = apply_extension(&map, &stance.arm, grip, dominant);
    let map = apply_hand_bonus(&map, &stance.arm);
    let map = resolve_orientation(&map, stance.body.facing, dominant);
    let map = apply_facing(&map, stance.body.facing);
    let map = apply_angle(&map, angle);
    let map = apply_posture(&map, &stance.body);

    tracing::trace!(
        "Synthesized exposure for {}: {} parts, total weight {:.3}",
        plan.id,
        map.len(),
        map.total_weight()
    );
    map
}
