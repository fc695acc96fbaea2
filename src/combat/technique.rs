//! Technique definitions
//!
//! A technique is what a committed action does: an attack (swing or thrust
//! at a height), a defence (guard, parry, block, dodge) or footwork. The
//! same record carries the axis bias applied to the weapon's constants, the
//! damage instances, stat scaling and the arm contribution it makes to the
//! actor's own exposure while it runs.

use serde::{Deserialize, Serialize};

use crate::combat::body::Height;
use crate::combat::damage::DamageKind;
use crate::combat::engagement::RelativeAngle;
use crate::combat::stance::{ArmContribution, Guard};
use crate::combat::stats::{Accessor, StatSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TechniqueRole {
    Offensive,
    Defensive,
    Footwork,
}

/// Weapon mode a technique needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AttackMode {
    Swing,
    Thrust,
    #[default]
    None,
}

/// Kind of active defence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefenseKind {
    Parry,
    Block,
    Dodge,
    Deflect,
}

/// Which side of the defender an attack prefers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SidePreference {
    #[default]
    Any,
    Lead,
    Rear,
}

/// How an offensive technique picks its targets when none is given
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TargetQuery {
    /// The explicit target, or the first engaged enemy
    #[default]
    Single,
    /// Every engaged enemy
    AllEnemies,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Channels {
    pub weapon: bool,
    pub off_hand: bool,
    pub footwork: bool,
}

impl Channels {
    /// Occupies at least one channel
    pub fn any(&self) -> bool {
        self.weapon || self.off_hand || self.footwork
    }

    /// Both want the same channel
    pub fn conflicts(&self, other: &Channels) -> bool {
        (self.weapon && other.weapon)
            || (self.off_hand && other.off_hand)
            || (self.footwork && other.footwork)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageInstance {
    pub amount: f32,
    pub kinds: Vec<DamageKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scaling {
    pub ratio: f32,
    pub stats: StatSource,
}

impl Default for Scaling {
    fn default() -> Self {
        Self {
            ratio: 1.0,
            stats: StatSource::Single(Accessor::Power),
        }
    }
}

/// How much each kind of active defence works against this attack
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefenseMults {
    pub deflect: f32,
    pub parry: f32,
    pub dodge: f32,
    pub block: f32,
}

impl Default for DefenseMults {
    fn default() -> Self {
        Self {
            deflect: 1.0,
            parry: 1.0,
            dodge: 1.0,
            block: 1.0,
        }
    }
}

impl DefenseMults {
    pub fn for_kind(&self, kind: DefenseKind) -> f32 {
        match kind {
            DefenseKind::Parry => self.parry,
            DefenseKind::Block => self.block,
            DefenseKind::Dodge => self.dodge,
            DefenseKind::Deflect => self.deflect,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OffensiveOverlay {
    pub to_hit_bonus: f32,
    pub damage_mult: f32,
}

impl Default for OffensiveOverlay {
    fn default() -> Self {
        Self {
            to_hit_bonus: 0.0,
            damage_mult: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DefensiveOverlay {
    pub defense_bonus: f32,
}

/// Multipliers on the weapon's constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisBias {
    pub geometry: f32,
    pub energy: f32,
    pub rigidity: f32,
}

impl Default for AxisBias {
    fn default() -> Self {
        Self {
            geometry: 1.0,
            energy: 1.0,
            rigidity: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FootworkEffect {
    /// Negative closes, positive opens
    pub range_steps: i8,
    /// Angle the actor ends at relative to the opponent's facing
    pub angle: Option<RelativeAngle>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Technique {
    pub id: String,
    pub name: String,
    pub role: TechniqueRole,
    #[serde(default)]
    pub attack_mode: AttackMode,
    #[serde(default)]
    pub target_height: Option<Height>,
    #[serde(default)]
    pub secondary_height: Option<Height>,
    #[serde(default)]
    pub guard_height: Option<Height>,
    #[serde(default)]
    pub covers_adjacent: bool,
    /// 0 = trivial, 1 = very hard
    #[serde(default)]
    pub difficulty: f32,
    #[serde(default)]
    pub channels: Channels,
    #[serde(default)]
    pub damage: Vec<DamageInstance>,
    #[serde(default)]
    pub scaling: Scaling,
    #[serde(default)]
    pub defense_mults: DefenseMults,
    #[serde(default)]
    pub offense: OffensiveOverlay,
    #[serde(default)]
    pub defense: DefensiveOverlay,
    #[serde(default)]
    pub axis_bias: AxisBias,
    #[serde(default)]
    pub arm: ArmContribution,
    #[serde(default)]
    pub side_preference: SidePreference,
    #[serde(default)]
    pub target: TargetQuery,
    #[serde(default)]
    pub defense_kind: Option<DefenseKind>,
    #[serde(default)]
    pub footwork: Option<FootworkEffect>,
}

impl Technique {
    fn base(id: &str, name: &str, role: TechniqueRole) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
            attack_mode: AttackMode::None,
            target_height: None,
            secondary_height: None,
            guard_height: None,
            covers_adjacent: false,
            difficulty: 0.0,
            channels: Channels::default(),
            damage: Vec::new(),
            scaling: Scaling::default(),
            defense_mults: DefenseMults::default(),
            offense: OffensiveOverlay::default(),
            defense: DefensiveOverlay::default(),
            axis_bias: AxisBias::default(),
            arm: ArmContribution::default(),
            side_preference: SidePreference::Any,
            target: TargetQuery::Single,
            defense_kind: None,
            footwork: None,
        }
    }

    pub fn is_offensive(&self) -> bool {
        self.role == TechniqueRole::Offensive
    }

    pub fn is_defensive(&self) -> bool {
        self.role == TechniqueRole::Defensive
    }

    /// Guard this technique holds while it runs
    pub fn guard(&self) -> Option<Guard> {
        self.guard_height
            .map(|height| Guard::new(height, self.covers_adjacent))
    }

    /// Damage kind of the first instance (blunt when none is given)
    pub fn primary_kind(&self) -> DamageKind {
        self.damage
            .iter()
            .flat_map(|d| d.kinds.iter())
            .next()
            .copied()
            .unwrap_or(DamageKind::Bludgeon)
    }

    pub fn base_amount(&self) -> f32 {
        self.damage.iter().map(|d| d.amount).sum()
    }

    /// Common technique: Overhead chop
    pub fn overhead_chop() -> Self {
        Self {
            attack_mode: AttackMode::Swing,
            target_height: Some(Height::High),
            secondary_height: Some(Height::Mid),
            difficulty: 0.2,
            channels: Channels {
                weapon: true,
                ..Default::default()
            },
            damage: vec![DamageInstance {
                amount: 30.0,
                kinds: vec![DamageKind::Slash],
            }],
            scaling: Scaling {
                ratio: 1.0,
                stats: StatSource::Average(Accessor::Speed, Accessor::Power),
            },
            defense_mults: DefenseMults {
                block: 1.2,
                ..Default::default()
            },
            arm: ArmContribution {
                height_override: Some(Height::High),
                extension: 0.6,
                hand_exposure: 0.2,
            },
            ..Self::base("overhead_chop", "Overhead Chop", TechniqueRole::Offensive)
        }
    }

    /// Common technique: Side swing at the lead side
    pub fn swing() -> Self {
        Self {
            attack_mode: AttackMode::Swing,
            target_height: Some(Height::Mid),
            secondary_height: Some(Height::High),
            difficulty: 0.1,
            channels: Channels {
                weapon: true,
                ..Default::default()
            },
            damage: vec![DamageInstance {
                amount: 24.0,
                kinds: vec![DamageKind::Slash],
            }],
            scaling: Scaling {
                ratio: 1.0,
                stats: StatSource::Average(Accessor::Speed, Accessor::Power),
            },
            arm: ArmContribution {
                height_override: None,
                extension: 0.7,
                hand_exposure: 0.1,
            },
            side_preference: SidePreference::Lead,
            ..Self::base("swing", "Swing", TechniqueRole::Offensive)
        }
    }

    /// Common technique: Straight thrust
    pub fn thrust() -> Self {
        Self {
            attack_mode: AttackMode::Thrust,
            target_height: Some(Height::Mid),
            secondary_height: Some(Height::High),
            difficulty: 0.15,
            channels: Channels {
                weapon: true,
                ..Default::default()
            },
            damage: vec![DamageInstance {
                amount: 8.0,
                kinds: vec![DamageKind::Pierce],
            }],
            scaling: Scaling {
                ratio: 1.0,
                stats: StatSource::Average(Accessor::Dexterity, Accessor::Power),
            },
            defense_mults: DefenseMults {
                parry: 0.8,
                dodge: 1.1,
                ..Default::default()
            },
            arm: ArmContribution {
                height_override: None,
                extension: 0.9,
                hand_exposure: 0.1,
            },
            ..Self::base("thrust", "Thrust", TechniqueRole::Offensive)
        }
    }

    /// Common technique: Wide sweep at every engaged enemy
    pub fn sweep() -> Self {
        Self {
            difficulty: 0.35,
            damage: vec![DamageInstance {
                amount: 18.0,
                kinds: vec![DamageKind::Slash],
            }],
            offense: OffensiveOverlay {
                to_hit_bonus: -0.05,
                damage_mult: 0.8,
            },
            target: TargetQuery::AllEnemies,
            ..Self::swing()
        }
        .renamed("sweep", "Sweep")
    }

    /// Common technique: High guard
    pub fn high_guard() -> Self {
        Self {
            guard_height: Some(Height::High),
            covers_adjacent: false,
            defense: DefensiveOverlay {
                defense_bonus: 0.05,
            },
            arm: ArmContribution {
                height_override: Some(Height::High),
                extension: 0.3,
                hand_exposure: 0.0,
            },
            ..Self::base("high_guard", "High Guard", TechniqueRole::Defensive)
        }
    }

    /// Common technique: Low guard covering the middle too
    pub fn low_guard() -> Self {
        Self {
            guard_height: Some(Height::Low),
            covers_adjacent: true,
            defense: DefensiveOverlay {
                defense_bonus: 0.03,
            },
            arm: ArmContribution {
                height_override: Some(Height::Low),
                extension: 0.2,
                hand_exposure: 0.0,
            },
            ..Self::base("low_guard", "Low Guard", TechniqueRole::Defensive)
        }
    }

    /// Common technique: Parry
    pub fn parry() -> Self {
        Self {
            guard_height: Some(Height::Mid),
            covers_adjacent: true,
            difficulty: 0.2,
            channels: Channels {
                weapon: true,
                ..Default::default()
            },
            defense: DefensiveOverlay {
                defense_bonus: 0.15,
            },
            defense_kind: Some(DefenseKind::Parry),
            arm: ArmContribution {
                height_override: None,
                extension: 0.5,
                hand_exposure: 0.1,
            },
            ..Self::base("parry", "Parry", TechniqueRole::Defensive)
        }
    }

    /// Common technique: Shield block
    pub fn block() -> Self {
        Self {
            guard_height: Some(Height::Mid),
            covers_adjacent: true,
            channels: Channels {
                off_hand: true,
                ..Default::default()
            },
            defense: DefensiveOverlay {
                defense_bonus: 0.2,
            },
            defense_kind: Some(DefenseKind::Block),
            ..Self::base("block", "Block", TechniqueRole::Defensive)
        }
    }

    /// Common technique: Dodge
    pub fn dodge() -> Self {
        Self {
            difficulty: 0.1,
            channels: Channels {
                footwork: true,
                ..Default::default()
            },
            defense: DefensiveOverlay {
                defense_bonus: 0.15,
            },
            defense_kind: Some(DefenseKind::Dodge),
            ..Self::base("dodge", "Dodge", TechniqueRole::Defensive)
        }
    }

    /// Common technique: Advance one reach step
    pub fn advance() -> Self {
        Self {
            channels: Channels {
                footwork: true,
                ..Default::default()
            },
            footwork: Some(FootworkEffect {
                range_steps: -1,
                angle: None,
            }),
            ..Self::base("advance", "Advance", TechniqueRole::Footwork)
        }
    }

    /// Common technique: Retreat one reach step
    pub fn retreat() -> Self {
        Self {
            channels: Channels {
                footwork: true,
                ..Default::default()
            },
            footwork: Some(FootworkEffect {
                range_steps: 1,
                angle: Some(RelativeAngle::Frontal),
            }),
            ..Self::base("retreat", "Retreat", TechniqueRole::Footwork)
        }
    }

    /// Common technique: Sidestep to the opponent's flank
    pub fn sidestep() -> Self {
        Self {
            channels: Channels {
                footwork: true,
                ..Default::default()
            },
            footwork: Some(FootworkEffect {
                range_steps: 0,
                angle: Some(RelativeAngle::Flank),
            }),
            ..Self::base("sidestep", "Sidestep", TechniqueRole::Footwork)
        }
    }

    fn renamed(mut self, id: &str, name: &str) -> Self {
        self.id = id.into();
        self.name = name.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thrust_is_mid_and_extended() {
        let thrust = Technique::thrust();
        assert_eq!(thrust.target_height, Some(Height::Mid));
        assert!((thrust.arm.extension - 0.9).abs() < 1e-6);
        assert_eq!(thrust.primary_kind(), DamageKind::Pierce);
    }

    #[test]
    fn test_high_guard_does_not_cover_adjacent() {
        let guard = Technique::high_guard().guard().unwrap();
        assert_eq!(guard.height, Height::High);
        assert!(!guard.covers_adjacent);
    }

    #[test]
    fn test_channel_conflicts() {
        let thrust = Technique::thrust().channels;
        assert!(thrust.conflicts(&Technique::parry().channels));
        assert!(!thrust.conflicts(&Technique::block().channels));
        assert!(!thrust.conflicts(&Technique::advance().channels));
        assert!(!Technique::high_guard().channels.any());
        assert!(!Technique::high_guard().channels.conflicts(&thrust));
    }

    #[test]
    fn test_roles() {
        assert!(Technique::overhead_chop().is_offensive());
        assert!(Technique::parry().is_defensive());
        assert_eq!(Technique::advance().role, TechniqueRole::Footwork);
    }

    #[test]
    fn test_sweep_targets_all_enemies() {
        let sweep = Technique::sweep();
        assert_eq!(sweep.id, "sweep");
        assert_eq!(sweep.target, TargetQuery::AllEnemies);
        assert_eq!(sweep.attack_mode, AttackMode::Swing);
    }

    #[test]
    fn test_primary_kind_defaults_to_blunt() {
        assert_eq!(Technique::high_guard().primary_kind(), DamageKind::Bludgeon);
    }

    #[test]
    fn test_defense_mults_lookup() {
        let thrust = Technique::thrust();
        assert_eq!(thrust.defense_mults.for_kind(DefenseKind::Parry), 0.8);
        assert_eq!(thrust.defense_mults.for_kind(DefenseKind::Block), 1.0);
    }
}
