//! Attacker/defender views for one resolved pair
//!
//! Everything the pipeline reads is looked up or copied here, so the
//! encounter stays free to be mutated by the outcome.

use serde::{Deserialize, Serialize};

use crate::combat::action::{ActionModifiers, CommittedAction, Stakes};
use crate::combat::body::BodyPlan;
use crate::combat::engagement::Engagement;
use crate::combat::exposure::{synthesize, ExposureMap};
use crate::combat::stance::{Guard, Stance};
use crate::combat::state::Encounter;
use crate::combat::stats::CombatStats;
use crate::combat::technique::{DefenseKind, Technique};
use crate::combat::weapons::{Reach, WeaponTemplate};
use crate::core::error::Result;
use crate::core::types::AgentId;
use crate::data::DataTables;

/// Why a pair was not resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The two are not engaged
    NoEngagement,
    /// The weapon in hand cannot perform the technique's attack mode
    NoWeaponMode,
    /// Actor or target is not in the encounter
    UnknownCombatant,
    /// Actor went down earlier in the tick
    Incapacitated,
    /// Nothing in hand and no natural weapon left
    Disarmed,
}

#[derive(Debug, Clone)]
pub struct AttackerView<'t> {
    pub id: AgentId,
    pub name: String,
    pub technique: &'t Technique,
    pub weapon: &'t WeaponTemplate,
    /// Weapon reach adjusted for the attacker's stature
    pub reach: Reach,
    /// Body mass relative to the plan's base
    pub mass: f32,
    pub stats: CombatStats,
    pub stakes: Stakes,
    pub modifiers: ActionModifiers,
    /// Seen from the attacker
    pub engagement: Engagement,
    /// Footwork the attacker runs alongside the attack
    pub footwork: Option<&'t Technique>,
}

impl AttackerView<'_> {
    /// Control used by the hit roll
    pub fn control(&self) -> f32 {
        self.modifiers
            .advantage_override
            .unwrap_or(self.engagement.control)
    }
}

/// An active defence running while the attack lands
#[derive(Debug, Clone)]
pub struct ActiveDefence<'t> {
    pub technique: &'t Technique,
    pub kind: DefenseKind,
    pub stakes: Stakes,
}

#[derive(Debug, Clone)]
pub struct DefenderView<'t> {
    pub id: AgentId,
    pub name: String,
    pub plan: &'t BodyPlan,
    pub stance: Stance,
    /// `None` when fighting with nothing at all
    pub weapon: Option<&'t WeaponTemplate>,
    pub off_hand: Option<&'t WeaponTemplate>,
    pub armour: Vec<String>,
    pub exposure: ExposureMap,
    pub guard: Option<Guard>,
    pub defence: Option<ActiveDefence<'t>>,
    /// Made no footwork this tick
    pub stationary: bool,
    /// Attacker stands at the flank or rear
    pub flanked: bool,
    /// Pressure the defender is under from this attacker, 0..1
    pub pressure: f32,
}

impl DefenderView<'_> {
    /// Stakes the defender is exposed at
    pub fn stakes(&self) -> Stakes {
        self.defence.as_ref().map_or(Stakes::Committed, |d| d.stakes)
    }

    /// Bonus the defender's equipment adds to an active defence
    pub fn equipment_bonus(&self, kind: DefenseKind) -> f32 {
        let main = self.weapon.map(|w| w.defense).unwrap_or_default();
        match kind {
            DefenseKind::Parry => main.parry,
            DefenseKind::Deflect => main.deflect,
            DefenseKind::Block => self
                .off_hand
                .map_or(main.block, |shield| shield.defense.block.max(main.block)),
            DefenseKind::Dodge => 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolutionContext<'t> {
    pub attacker: AttackerView<'t>,
    pub defender: DefenderView<'t>,
}

#[derive(Debug, Clone)]
pub enum Prepared<'t> {
    Ready(Box<ResolutionContext<'t>>),
    Skipped(SkipReason),
}

/// Inputs of one pairing besides the attack itself
#[derive(Debug, Clone, Copy, Default)]
pub struct Pairing<'a> {
    pub target: Option<AgentId>,
    pub defence: Option<&'a CommittedAction>,
    /// Target's own attack running while this one lands
    pub defender_action: Option<&'a CommittedAction>,
    pub footwork: Option<&'a CommittedAction>,
    /// Target made footwork this tick
    pub target_moved: bool,
}

/// Assemble both views for an attack on `pairing.target`
///
/// Lookup failures are data-integrity errors. A missing engagement or a
/// weapon without the needed mode skips the pair.
pub fn build_context<'t, T: DataTables + ?Sized>(
    tables: &'t T,
    encounter: &Encounter,
    attack: &CommittedAction,
    pairing: Pairing<'_>,
) -> Result<Prepared<'t>> {
    let Some(target_id) = pairing.target else {
        return Ok(Prepared::Skipped(SkipReason::UnknownCombatant));
    };
    let (Some(attacker), Some(defender)) = (encounter.get(attack.actor), encounter.get(target_id))
    else {
        return Ok(Prepared::Skipped(SkipReason::UnknownCombatant));
    };

    let technique = tables.technique(&attack.technique)?;
    let Some(weapon_id) = attacker.active_weapon() else {
        return Ok(Prepared::Skipped(SkipReason::Disarmed));
    };
    let weapon = tables.weapon(weapon_id)?;
    let plan = tables.body_plan(&defender.body_plan)?;

    let Some(engagement) = encounter.engagements.get(attacker.id, defender.id) else {
        return Ok(Prepared::Skipped(SkipReason::NoEngagement));
    };
    if !weapon.supports(technique.attack_mode) {
        return Ok(Prepared::Skipped(SkipReason::NoWeaponMode));
    }

    let footwork = match pairing.footwork {
        Some(action) => Some(tables.technique(&action.technique)?),
        None => None,
    };

    // Grip comes from what the defender holds now, not what they started with
    let mut stance = defender.stance;
    stance.grip = defender.grip(tables)?;
    let mut guard = stance.guard;

    // The defender's own swing extends their arm into the exchange
    let own = match pairing.defender_action {
        Some(action) => Some(tables.technique(&action.technique)?),
        None => None,
    };
    if let Some(own) = own {
        stance.arm = own.arm;
    }

    // Defensive technique reshapes the guard for this hit; its arm wins
    // unless the weapon arm is already busy attacking. Only one with a
    // defence kind also rolls against it.
    let mut defence = None;
    if let Some(action) = pairing.defence {
        let held = tables.technique(&action.technique)?;
        if own.is_none() || held.channels.weapon {
            stance.arm = held.arm;
        }
        guard = held.guard().or(guard);
        defence = held.defense_kind.map(|kind| ActiveDefence {
            technique: held,
            kind,
            stakes: action.stakes,
        });
    }

    let exposure = synthesize(plan, &stance, engagement.angle)
        .without(|part| defender.wounds.is_severed(part));

    let defender_weapon = match defender.active_weapon() {
        Some(id) => Some(tables.weapon(id)?),
        None => None,
    };
    let off_hand = match &defender.off_hand {
        Some(id) => Some(tables.weapon(id)?),
        None => None,
    };
    let pressure = encounter
        .engagements
        .get(defender.id, attacker.id)
        .map_or(0.0, |e| e.pressure);

    Ok(Prepared::Ready(Box::new(ResolutionContext {
        attacker: AttackerView {
            id: attacker.id,
            name: attacker.name.clone(),
            technique,
            weapon,
            reach: weapon.reach.step(attacker.size.reach_steps()),
            mass: attacker.size.mass,
            stats: attacker.stats,
            stakes: attack.stakes,
            modifiers: attack.modifiers,
            engagement,
            footwork,
        },
        defender: DefenderView {
            id: defender.id,
            name: defender.name.clone(),
            plan,
            stance,
            weapon: defender_weapon,
            off_hand,
            armour: defender.armour.clone(),
            exposure,
            guard,
            defence,
            stationary: !pairing.target_moved,
            flanked: engagement.angle.is_flanking(),
            pressure,
        },
    })))
}
