//! Damage packets
//!
//! A packet describes one strike on three independent axes:
//! - geometry: how concentrated the striking surface is (0 flat, 1 needle)
//! - momentum: energy-like magnitude of the blow
//! - rigidity: structural backing of the striking surface
//!
//! plus a raw amount and a damage kind. Producers that only know amount and
//! kind may leave the axes empty; kind-based fallbacks fill them in.

use serde::{Deserialize, Serialize};

use crate::combat::action::Stakes;
use crate::combat::penetration::LayerPacket;
use crate::combat::stats::{CombatStats, StatClass};
use crate::combat::technique::{Scaling, Technique};
use crate::combat::weapons::WeaponTemplate;
use crate::core::config::ResolutionConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageKind {
    Slash,
    Pierce,
    Bludgeon,
}

impl DamageKind {
    pub fn fallback_geometry(self) -> f32 {
        match self {
            DamageKind::Slash => 0.6,
            DamageKind::Pierce => 0.9,
            DamageKind::Bludgeon => 0.1,
        }
    }

    pub fn fallback_rigidity(self) -> f32 {
        match self {
            DamageKind::Slash => 0.6,
            DamageKind::Pierce => 0.7,
            DamageKind::Bludgeon => 0.9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Packet {
    pub amount: f32,
    pub kind: DamageKind,
    pub penetration: f32,
    pub geometry: Option<f32>,
    pub momentum: Option<f32>,
    pub rigidity: Option<f32>,
}

impl Packet {
    /// Amount and kind only; axes fall back to kind defaults
    pub fn simple(amount: f32, kind: DamageKind) -> Self {
        Self {
            amount,
            kind,
            penetration: 0.0,
            geometry: None,
            momentum: None,
            rigidity: None,
        }
    }

    pub fn geometry(&self) -> f32 {
        self.geometry
            .unwrap_or_else(|| self.kind.fallback_geometry())
    }

    pub fn momentum(&self) -> f32 {
        self.momentum.unwrap_or(self.amount)
    }

    pub fn rigidity(&self) -> f32 {
        self.rigidity
            .unwrap_or_else(|| self.kind.fallback_rigidity())
    }

    /// Scale amount and momentum (stakes, grazes)
    pub fn scaled(&self, mult: f32) -> Packet {
        let mult = mult.max(0.0);
        Packet {
            amount: self.amount * mult,
            momentum: Some(self.momentum() * mult),
            ..*self
        }
    }

    /// The four numbers the layer walk consumes
    pub fn axes(&self) -> LayerPacket {
        LayerPacket {
            amount: self.amount.max(0.0),
            momentum: self.momentum().max(0.0),
            geometry: self.geometry().clamp(0.0, 1.0),
            rigidity: self.rigidity().clamp(0.0, 1.0),
        }
    }
}

/// Momentum split into its stat-driven terms
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MomentumTerms {
    /// Sum of velocity-class ratios squared, weighted by share
    pub velocity: f32,
    /// Sum of mass-class ratios, weighted by share
    pub mass: f32,
}

impl MomentumTerms {
    pub fn total(&self) -> f32 {
        self.velocity + self.mass
    }
}

/// Stat contribution to momentum
///
/// Velocity stats enter squared, mass stats linearly. `heft` (0..1, see
/// [`WeaponTemplate::heft`]) splits the weight between the two classes: a
/// light weapon rides on speed, a heavy one on the arm behind it. Shares are
/// normalised, so an average combatant still totals 1.0.
pub fn momentum_terms(scaling: &Scaling, stats: &CombatStats, baseline: f32, heft: f32) -> MomentumTerms {
    let accessors = scaling.stats.accessors();
    let heft = heft.clamp(0.0, 1.0);
    let weight = |class: StatClass| match class {
        StatClass::Velocity => 1.0 - heft,
        StatClass::Mass => heft,
    };
    let total: f32 = accessors.iter().map(|a| weight(a.class())).sum();

    let mut terms = MomentumTerms {
        velocity: 0.0,
        mass: 0.0,
    };
    for &accessor in &accessors {
        // Degenerate heft against a single-class source falls back to equal shares
        let share = if total > f32::EPSILON {
            weight(accessor.class()) / total
        } else {
            1.0 / accessors.len() as f32
        };
        let r = stats.ratio(accessor, baseline);
        match accessor.class() {
            StatClass::Velocity => terms.velocity += share * r * r,
            StatClass::Mass => terms.mass += share * r,
        }
    }
    terms
}

/// Mean stat ratio of the scaling source (linear in every stat)
fn linear_ratio(scaling: &Scaling, stats: &CombatStats, baseline: f32) -> f32 {
    let accessors = scaling.stats.accessors();
    let total: f32 = accessors.iter().map(|&a| stats.ratio(a, baseline)).sum();
    total / accessors.len() as f32
}

/// Combine weapon, technique, stats and stakes into a packet
///
/// `extra_mult` carries action-level modifiers (damage multiplier, graze).
pub fn derive_packet(
    weapon: &WeaponTemplate,
    technique: &Technique,
    stats: &CombatStats,
    stakes: Stakes,
    extra_mult: f32,
    config: &ResolutionConfig,
) -> Packet {
    let baseline = config.stat_baseline;
    let scaling = &technique.scaling;
    let bias = &technique.axis_bias;

    let heft = weapon.heft(technique.attack_mode);
    let terms = momentum_terms(scaling, stats, baseline, heft);
    let momentum =
        weapon.reference_energy_j * bias.energy * scaling.ratio * terms.total();
    let amount = technique.base_amount() * scaling.ratio * linear_ratio(scaling, stats, baseline);

    let mult = config.stakes.tier(stakes).damage_mult * technique.offense.damage_mult * extra_mult;

    Packet {
        amount: (amount * mult).max(0.0),
        kind: technique.primary_kind(),
        penetration: weapon.penetration,
        geometry: Some((weapon.geometry_coeff * bias.geometry).clamp(0.0, 1.0)),
        momentum: Some((momentum * mult).max(0.0)),
        rigidity: Some((weapon.rigidity_coeff * bias.rigidity).clamp(0.0, 1.0)),
    }
}
