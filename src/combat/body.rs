//! Body plans: data-driven anatomy for hit location and wound tracking
//!
//! Part tags are an open set. Behaviour that is anatomy-generic is written
//! against capability flags (grasp, stand, vital) rather than tag identity,
//! so a new species only needs a new plan.

use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::combat::exposure::{Limb, PartExposure};

/// Wound severity categories (not f32)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum WoundSeverity {
    /// No wound
    #[default]
    None,
    /// Cosmetic only
    Scratch,
    /// Painful but functional
    Minor,
    /// Impaired function, bleeding
    Serious,
    /// Disabled, severe bleeding
    Critical,
    /// Limb gone / organ destroyed
    Destroyed,
}

/// Region tag of a body part ("torso", "hand", "tentacle", ...)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartTag(pub String);

impl PartTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
    #[default]
    Center,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
            Side::Center => Side::Center,
        }
    }
}

/// Height band of a part or an attack
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Height {
    Low,
    Mid,
    High,
}

impl Height {
    pub fn all() -> [Height; 3] {
        [Height::Low, Height::Mid, Height::High]
    }

    /// Number of bands between two heights
    pub fn distance(self, other: Height) -> u8 {
        (self as i8 - other as i8).unsigned_abs()
    }

    pub fn is_adjacent(self, other: Height) -> bool {
        self.distance(other) == 1
    }
}

/// Capability flags of a body part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PartFlags {
    pub vital: bool,
    pub internal: bool,
    pub can_grasp: bool,
    pub can_stand: bool,
    pub can_see: bool,
    pub can_hear: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PartGeometry {
    pub thickness_cm: f32,
    pub length_cm: f32,
    pub area_cm2: f32,
}

/// How a part's hit weight is authored
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExposureWeight {
    /// Explicit weight in the plan's exposure table
    Authored(f32),
    /// Share of the parent's expanded weight
    Inherit(f32),
    /// Never struck directly (enclosed organs)
    #[default]
    Hidden,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyPartDef {
    pub name: String,
    pub tag: PartTag,
    #[serde(default)]
    pub side: Side,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub enclosing: Option<String>,
    pub tissue_template: String,
    #[serde(default)]
    pub has_major_artery: bool,
    #[serde(default)]
    pub flags: PartFlags,
    #[serde(default)]
    pub geometry: PartGeometry,
    pub height: Height,
    #[serde(default)]
    pub exposure: ExposureWeight,
}

/// Whether a plan composes stance exposure or uses its table as-is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Anatomy {
    /// Limbs move with grip, technique and footwork
    #[default]
    Articulated,
    /// Amorphous or rigid bodies: one static exposure table
    Static,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyPlan {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub anatomy: Anatomy,
    pub base_height_cm: f32,
    pub base_mass_kg: f32,
    pub parts: Vec<BodyPartDef>,
    /// Expanded exposure table, built on first use
    #[serde(skip)]
    exposures: OnceLock<Vec<PartExposure>>,
}

impl BodyPlan {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        anatomy: Anatomy,
        base_height_cm: f32,
        base_mass_kg: f32,
        parts: Vec<BodyPartDef>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            anatomy,
            base_height_cm,
            base_mass_kg,
            parts,
            exposures: OnceLock::new(),
        }
    }

    pub fn part(&self, name: &str) -> Option<&BodyPartDef> {
        self.parts.iter().find(|p| p.name == name)
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.parts.iter().position(|p| p.name == name)
    }

    /// Direct children of a part
    pub fn children(&self, name: &str) -> Vec<&BodyPartDef> {
        self.parts
            .iter()
            .filter(|p| p.parent.as_deref() == Some(name))
            .collect()
    }

    /// All parts below `name` in the hierarchy
    pub fn descendants(&self, name: &str) -> Vec<&BodyPartDef> {
        let mut found: Vec<&BodyPartDef> = Vec::new();
        let mut frontier = vec![name.to_string()];
        while let Some(current) = frontier.pop() {
            for child in self.children(&current) {
                if found.iter().any(|p| p.name == child.name) {
                    continue;
                }
                frontier.push(child.name.clone());
                found.push(child);
            }
        }
        found
    }

    /// The plan's exposure table with child weights expanded
    ///
    /// Computed once per plan; resolution never pays the expansion cost.
    pub fn base_exposures(&self) -> &[PartExposure] {
        self.exposures.get_or_init(|| expand_exposures(self))
    }
}

/// Expand authored and inherited weights into a flat exposure table
fn expand_exposures(plan: &BodyPlan) -> Vec<PartExposure> {
    let limbs = classify_limbs(plan);
    let mut weights: Vec<Option<f32>> = vec![None; plan.parts.len()];

    for i in 0..plan.parts.len() {
        resolve_weight(plan, i, &mut weights, 0);
    }

    let table: Vec<PartExposure> = plan
        .parts
        .iter()
        .enumerate()
        .filter(|(_, part)| !matches!(part.exposure, ExposureWeight::Hidden))
        .map(|(i, part)| PartExposure {
            part: part.name.clone(),
            tag: part.tag.clone(),
            side: part.side,
            height: part.height,
            weight: weights[i].unwrap_or(0.0).max(0.0),
            limb: limbs[i],
            grasp: part.flags.can_grasp,
            orientation: None,
        })
        .collect();

    tracing::debug!(
        "Expanded exposure table for {}: {} parts",
        plan.id,
        table.len()
    );
    table
}

fn resolve_weight(plan: &BodyPlan, i: usize, weights: &mut [Option<f32>], depth: usize) -> f32 {
    if let Some(w) = weights[i] {
        return w;
    }
    // A parent chain longer than the plan means a cycle
    if depth > plan.parts.len() {
        return 0.0;
    }

    let part = &plan.parts[i];
    let weight = match part.exposure {
        ExposureWeight::Authored(w) => w,
        ExposureWeight::Hidden => 0.0,
        ExposureWeight::Inherit(ratio) => {
            match part.parent.as_deref().and_then(|p| plan.index_of(p)) {
                Some(parent) => resolve_weight(plan, parent, weights, depth + 1) * ratio,
                None => {
                    tracing::warn!(
                        "{}: part {} inherits exposure but has no known parent",
                        plan.id,
                        part.name
                    );
                    0.0
                }
            }
        }
    };
    weights[i] = Some(weight);
    weight
}

/// Mark the chains that end in a grasping or standing part
///
/// A chain runs from the capable part up through its parents and stops
/// below the first vital part (or the root).
fn classify_limbs(plan: &BodyPlan) -> Vec<Limb> {
    let mut limbs = vec![Limb::Core; plan.parts.len()];

    for (i, part) in plan.parts.iter().enumerate() {
        let limb = if part.flags.can_grasp {
            Limb::Manipulator
        } else if part.flags.can_stand {
            Limb::Support
        } else {
            continue;
        };

        let mut current = Some(i);
        let mut steps = 0;
        while let Some(idx) = current {
            let p = &plan.parts[idx];
            if p.flags.vital || steps > plan.parts.len() {
                break;
            }
            limbs[idx] = limb;
            steps += 1;
            current = p.parent.as_deref().and_then(|name| plan.index_of(name));
            if let Some(next) = current {
                if plan.parts[next].parent.is_none() {
                    break;
                }
            }
        }
    }

    limbs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::builtin;

    #[test]
    fn test_height_adjacency() {
        assert!(Height::Low.is_adjacent(Height::Mid));
        assert!(Height::High.is_adjacent(Height::Mid));
        assert!(!Height::Low.is_adjacent(Height::High));
        assert_eq!(Height::Low.distance(Height::High), 2);
    }

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Left.opposite(), Side::Right);
        assert_eq!(Side::Center.opposite(), Side::Center);
    }

    #[test]
    fn test_child_weight_inherits_from_parent() {
        let plan = builtin::humanoid_plan();
        let table = plan.base_exposures();
        let upper = table.iter().find(|e| e.part == "right_upper_arm").unwrap();
        let fore = table.iter().find(|e| e.part == "right_forearm").unwrap();
        let hand = table.iter().find(|e| e.part == "right_hand").unwrap();
        assert!((fore.weight - upper.weight * 0.7).abs() < 1e-5);
        assert!((hand.weight - fore.weight * 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_hidden_parts_not_exposed() {
        let plan = builtin::humanoid_plan();
        assert!(plan.part("brain").is_some());
        assert!(plan.base_exposures().iter().all(|e| e.part != "brain"));
    }

    #[test]
    fn test_expansion_is_memoized() {
        let plan = builtin::humanoid_plan();
        let first = plan.base_exposures().as_ptr();
        let second = plan.base_exposures().as_ptr();
        assert_eq!(first, second);
    }

    #[test]
    fn test_limb_chains_follow_capability_flags() {
        let plan = builtin::humanoid_plan();
        let table = plan.base_exposures();
        let limb_of = |name: &str| table.iter().find(|e| e.part == name).unwrap().limb;
        assert_eq!(limb_of("left_hand"), Limb::Manipulator);
        assert_eq!(limb_of("left_upper_arm"), Limb::Manipulator);
        assert_eq!(limb_of("right_foot"), Limb::Support);
        assert_eq!(limb_of("right_thigh"), Limb::Support);
        assert_eq!(limb_of("torso"), Limb::Core);
        assert_eq!(limb_of("head"), Limb::Core);
    }

    #[test]
    fn test_descendants_of_severed_limb() {
        let plan = builtin::humanoid_plan();
        let below: Vec<&str> = plan
            .descendants("left_upper_arm")
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert!(below.contains(&"left_forearm"));
        assert!(below.contains(&"left_hand"));
        assert!(!below.contains(&"right_hand"));
    }

    #[test]
    fn test_severity_ordering() {
        assert!(WoundSeverity::Destroyed > WoundSeverity::Critical);
        assert!(WoundSeverity::Minor > WoundSeverity::Scratch);
    }
}
