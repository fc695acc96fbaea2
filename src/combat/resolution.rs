//! Resolution of one attacker/defender pair
//!
//! Hit roll, location, packet, armour, tissue, wound. Misses, deflections
//! and skipped pairs are outcomes; only table lookups fail.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::combat::action::Stakes;
use crate::combat::armor::{layers_for, resolve_armour, ArmourFacing, ArmourLayerReport};
use crate::combat::body::{BodyPartDef, BodyPlan};
use crate::combat::context::{ResolutionContext, SkipReason};
use crate::combat::damage::{derive_packet, Packet};
use crate::combat::engagement::RelativeAngle;
use crate::combat::events::OutcomeKind;
use crate::combat::hit_location::{guard_modifier, select_location, AttackProfile};
use crate::combat::random::{RandomSource, RandomStream};
use crate::combat::stance::Stance;
use crate::combat::state::Combatant;
use crate::combat::stats::CombatStats;
use crate::combat::technique::{AttackMode, DefenseKind, Technique};
use crate::combat::tissue::{resolve_tissue, TissueOutcome};
use crate::combat::weapons::{Reach, WeaponCategory, WeaponTemplate};
use crate::combat::wounds::{WoundLedger, WoundReport};
use crate::core::config::ResolutionConfig;
use crate::core::error::{CombatError, Result};
use crate::core::types::AgentId;
use crate::data::DataTables;

/// Hit-chance bonuses for attack/footwork pairs run together
///
/// Keyed by attack mode and footwork technique id. Empty unless a caller
/// fills it.
#[derive(Debug, Clone, Default)]
pub struct SynergyRules {
    bonuses: AHashMap<(AttackMode, String), f32>,
}

impl SynergyRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, mode: AttackMode, footwork: impl Into<String>, bonus: f32) -> Self {
        self.insert(mode, footwork, bonus);
        self
    }

    pub fn insert(&mut self, mode: AttackMode, footwork: impl Into<String>, bonus: f32) {
        self.bonuses.insert((mode, footwork.into()), bonus);
    }

    pub fn bonus(&self, mode: AttackMode, footwork: Option<&str>) -> f32 {
        footwork
            .and_then(|id| self.bonuses.get(&(mode, id.to_string())))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.bonuses.is_empty()
    }
}

/// Terms of the hit chance, kept for reporting
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HitChance {
    /// Chance before the active defence
    pub open: f32,
    /// Amount the active defence removes
    pub defence: f32,
    /// Final clamped chance
    pub chance: f32,
}

/// Compute the hit chance for a prepared pair
pub fn hit_chance(
    ctx: &ResolutionContext<'_>,
    synergy: &SynergyRules,
    config: &ResolutionConfig,
) -> HitChance {
    let attacker = &ctx.attacker;
    let defender = &ctx.defender;
    let technique = attacker.technique;

    let mut open = config.base_hit_chance;
    open -= technique.difficulty.clamp(0.0, 1.0) * config.difficulty_weight;
    open += technique.offense.to_hit_bonus;
    open += attacker.weapon.offense.accuracy;
    open += config.stakes.tier(attacker.stakes).hit_modifier;
    open += config.stakes.tier(defender.stakes()).exposure_bonus;
    open += attacker.control() * config.control_weight;
    if defender.flanked {
        open += config.flank_bonus;
    }
    if defender.stationary {
        open += config.stationary_bonus;
    }
    open += defender.pressure.clamp(0.0, 1.0) * config.pressure_weight;
    open += guard_modifier(technique.target_height, defender.guard, config);
    open += synergy.bonus(
        technique.attack_mode,
        attacker.footwork.map(|f| f.id.as_str()),
    );

    let defence = defender.defence.as_ref().map_or(0.0, |active| {
        let raw = active.technique.defense.defense_bonus + defender.equipment_bonus(active.kind);
        (raw * technique.defense_mults.for_kind(active.kind)).max(0.0)
    });

    let open = open.clamp(config.min_hit_chance, config.max_hit_chance);
    let chance = (open - defence).clamp(config.min_hit_chance, config.max_hit_chance);
    HitChance {
        open,
        defence,
        chance,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitReport {
    pub part: String,
    pub graze: bool,
    pub chance: HitChance,
    pub packet: Packet,
    pub armour: Vec<ArmourLayerReport>,
    /// Amount that got past the armour
    pub reached: f32,
    pub tissue: TissueOutcome,
    pub wound: WoundReport,
    /// Weapon the defender let go of
    pub dropped: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Hit(HitReport),
    /// Armour stopped everything
    Deflected {
        part: String,
        graze: bool,
        armour: Vec<ArmourLayerReport>,
    },
    Miss,
    Defended {
        kind: DefenseKind,
    },
    OutOfRange {
        reach: Reach,
        range: Reach,
    },
    NoValidTarget,
    Skipped {
        reason: SkipReason,
    },
}

impl Outcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Outcome::Hit(report) if report.graze => OutcomeKind::Graze,
            Outcome::Hit(_) => OutcomeKind::Hit,
            Outcome::Deflected { .. } => OutcomeKind::Deflected,
            Outcome::Miss => OutcomeKind::Miss,
            Outcome::Defended { .. } => OutcomeKind::Defended,
            Outcome::OutOfRange { .. } => OutcomeKind::OutOfRange,
            Outcome::NoValidTarget => OutcomeKind::NoValidTarget,
            Outcome::Skipped { .. } => OutcomeKind::Skipped,
        }
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, Outcome::Hit(_))
    }
}

/// One resolved pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionEntry {
    /// Index into the tick's action list
    pub action_index: usize,
    pub actor: AgentId,
    pub target: AgentId,
    pub technique: String,
    pub weapon: String,
    pub outcome: Outcome,
}

/// Does `part` (or anything severed with it) hold the defender's weapon?
fn loses_weapon(plan: &BodyPlan, stance: &Stance, report: &WoundReport) -> bool {
    let holds = |name: &str| {
        plan.part(name).map_or(false, |p| {
            p.flags.can_grasp && (stance.grip.both_hands() || p.side == stance.dominant)
        })
    };
    (report.lost.grasp && holds(&report.part)) || report.severed.iter().any(|p| holds(p))
}

/// Everything about a blow except where it lands
#[derive(Debug, Clone, Copy)]
pub struct Blow<'t> {
    pub weapon: &'t WeaponTemplate,
    pub technique: &'t Technique,
    pub stats: &'t CombatStats,
    pub stakes: Stakes,
    /// Action modifiers, grazes and body mass folded together
    pub damage_mult: f32,
    /// Attacker's angle on the defender
    pub angle: RelativeAngle,
}

/// A blow on a known part, after armour and flesh have had their say
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Strike {
    /// Armour stopped everything
    Stopped {
        packet: Packet,
        armour: Vec<ArmourLayerReport>,
    },
    Landed {
        packet: Packet,
        armour: Vec<ArmourLayerReport>,
        /// Amount that got past the armour
        reached: f32,
        tissue: TissueOutcome,
        wound: WoundReport,
    },
}

impl Strike {
    pub fn packet(&self) -> &Packet {
        match self {
            Strike::Stopped { packet, .. } | Strike::Landed { packet, .. } => packet,
        }
    }

    pub fn armour(&self) -> &[ArmourLayerReport] {
        match self {
            Strike::Stopped { armour, .. } | Strike::Landed { armour, .. } => armour,
        }
    }
}

/// Packet, armour, tissue and wound for a blow landing on `part`
///
/// The wound goes into `wounds`; nothing else is touched.
pub fn strike_part<T: DataTables + ?Sized>(
    tables: &T,
    blow: &Blow<'_>,
    plan: &BodyPlan,
    part: &BodyPartDef,
    worn: &[String],
    wounds: &mut WoundLedger,
    config: &ResolutionConfig,
) -> Result<Strike> {
    // ===== PACKET =====
    let packet = derive_packet(
        blow.weapon,
        blow.technique,
        blow.stats,
        blow.stakes,
        blow.damage_mult,
        config,
    );

    // ===== ARMOUR =====
    let layers = layers_for(tables, worn, &part.tag, part.side)?;
    let facing = ArmourFacing::from_angle(blow.angle);
    let armour = resolve_armour(packet.axes(), packet.penetration, &layers, facing);
    if armour.stopped() {
        return Ok(Strike::Stopped {
            packet,
            armour: armour.layers,
        });
    }

    // ===== TISSUE =====
    let template = tables.tissue_template(&part.tissue_template)?;
    let tissue = resolve_tissue(
        tables,
        template,
        armour.passed,
        packet.penetration,
        part.geometry.thickness_cm,
        config,
    )?;

    // ===== WOUND =====
    let wound = wounds.apply(plan, part, &tissue, config);
    Ok(Strike::Landed {
        packet,
        armour: armour.layers,
        reached: armour.passed.amount,
        tissue,
        wound,
    })
}

/// Run the pipeline for a prepared pair
///
/// Draws one value from the combat stream and, on a hit, one from the
/// location stream. The defender's wounds and weapon are updated in place.
pub fn resolve_attack<T: DataTables + ?Sized>(
    tables: &T,
    ctx: &ResolutionContext<'_>,
    defender: &mut Combatant,
    synergy: &SynergyRules,
    rng: &mut impl RandomSource,
    config: &ResolutionConfig,
) -> Result<Outcome> {
    let attacker = &ctx.attacker;
    let view = &ctx.defender;
    let technique = attacker.technique;

    // ===== HIT ROLL =====
    let chance = hit_chance(ctx, synergy, config);
    let roll = rng.draw(RandomStream::Combat);
    if roll >= chance.chance {
        return Ok(match &view.defence {
            Some(active) if roll < chance.open => Outcome::Defended { kind: active.kind },
            _ => Outcome::Miss,
        });
    }
    let graze = roll >= chance.chance - config.graze_margin;

    // ===== LOCATION =====
    let profile = AttackProfile::from_technique(technique);
    let Some(struck) = select_location(&view.exposure, &profile, rng) else {
        return Ok(Outcome::NoValidTarget);
    };
    let part = view
        .plan
        .part(&struck.part)
        .ok_or_else(|| CombatError::UnknownBodyPart {
            plan: view.plan.id.clone(),
            part: struck.part.clone(),
        })?;

    let mut damage_mult = attacker.modifiers.damage_mult;
    if graze {
        damage_mult *= config.graze_damage_mult;
    }
    // Natural weapons hit as hard as the body behind them
    if attacker.weapon.category == WeaponCategory::Natural {
        damage_mult *= attacker.mass.max(0.0);
    }
    let blow = Blow {
        weapon: attacker.weapon,
        technique,
        stats: &attacker.stats,
        stakes: attacker.stakes,
        damage_mult,
        angle: attacker.engagement.angle,
    };

    match strike_part(tables, &blow, view.plan, part, &view.armour, &mut defender.wounds, config)? {
        Strike::Stopped { armour, .. } => {
            tracing::debug!(
                "{} -> {}: {} stopped by armour on {}",
                attacker.name,
                view.name,
                technique.id,
                part.name
            );
            Ok(Outcome::Deflected {
                part: part.name.clone(),
                graze,
                armour,
            })
        }
        Strike::Landed {
            packet,
            armour,
            reached,
            tissue,
            wound,
        } => {
            // Grip as seen in this exchange, not the stance the defender started with
            let dropped = if loses_weapon(view.plan, &view.stance, &wound) {
                defender.drop_weapon()
            } else {
                None
            };
            if !wound.severed.is_empty() {
                for weapon in defender.prune_natural_weapons(view.plan) {
                    tracing::debug!("{} can no longer use {}", view.name, weapon);
                }
            }

            tracing::debug!(
                "{} -> {}: {} hits {} ({:?}{})",
                attacker.name,
                view.name,
                technique.id,
                part.name,
                wound.severity,
                if graze { ", graze" } else { "" }
            );

            Ok(Outcome::Hit(HitReport {
                part: part.name.clone(),
                graze,
                chance,
                packet,
                armour,
                reached,
                tissue,
                wound,
                dropped,
            }))
        }
    }
}
