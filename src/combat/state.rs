//! Combatant and encounter state
//!
//! The encounter owns combatants and their engagements. The resolver
//! borrows it mutably for one tick and gives it back.

use serde::{Deserialize, Serialize};

use crate::combat::body::BodyPlan;
use crate::combat::engagement::EngagementTable;
use crate::combat::species::{NaturalWeapon, SizeModifiers, Species, Vitals};
use crate::combat::stance::{GripCategory, Stance, StanceCost};
use crate::combat::stats::CombatStats;
use crate::combat::weapons::Reach;
use crate::combat::wounds::WoundLedger;
use crate::core::config::ResolutionConfig;
use crate::core::error::Result;
use crate::core::types::{AgentId, TeamId, Tick};
use crate::data::DataTables;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Combatant {
    pub id: AgentId,
    pub name: String,
    pub team: TeamId,
    pub species: String,
    pub body_plan: String,
    #[serde(default)]
    pub size: SizeModifiers,
    #[serde(default)]
    pub stats: CombatStats,
    #[serde(default)]
    pub stance: Stance,
    /// Main-hand weapon; `None` once dropped
    #[serde(default)]
    pub weapon: Option<String>,
    #[serde(default)]
    pub off_hand: Option<String>,
    /// Used when nothing is held, first usable wins
    #[serde(default)]
    pub natural_weapons: Vec<NaturalWeapon>,
    /// Worn armour piece ids
    #[serde(default)]
    pub armour: Vec<String>,
    pub vitals: Vitals,
    /// Pool ceilings
    pub capacity: Vitals,
    /// Refilled at the end of every tick
    #[serde(default)]
    pub recovery: Vitals,
    #[serde(default)]
    pub wounds: WoundLedger,
}

impl Combatant {
    pub fn new(id: AgentId, name: impl Into<String>, team: TeamId, species: &Species) -> Self {
        Self {
            id,
            name: name.into(),
            team,
            species: species.id.clone(),
            body_plan: species.body_plan.clone(),
            size: species.size,
            stats: CombatStats::default(),
            stance: Stance::default(),
            weapon: None,
            off_hand: None,
            natural_weapons: species.natural_weapons.clone(),
            armour: Vec::new(),
            vitals: species.pools(),
            capacity: species.pools(),
            recovery: species.recovery(),
            wounds: WoundLedger::new(),
        }
    }

    pub fn with_weapon(mut self, weapon: impl Into<String>) -> Self {
        self.weapon = Some(weapon.into());
        self
    }

    pub fn with_off_hand(mut self, item: impl Into<String>) -> Self {
        self.off_hand = Some(item.into());
        self
    }

    pub fn with_armour(mut self, pieces: &[&str]) -> Self {
        self.armour = pieces.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn with_stats(mut self, stats: CombatStats) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_stance(mut self, stance: Stance) -> Self {
        self.stance = stance;
        self
    }

    /// Weapon the main hand fights with right now
    ///
    /// `None` once the weapon is gone and no natural weapon is left.
    pub fn active_weapon(&self) -> Option<&str> {
        self.weapon
            .as_deref()
            .or_else(|| self.natural_weapons.first().map(|n| n.weapon.as_str()))
    }

    /// Grip implied by what is in hand now
    pub fn grip<T: DataTables + ?Sized>(&self, tables: &T) -> Result<GripCategory> {
        let Some(main) = self.active_weapon() else {
            return Ok(GripCategory::Unarmed);
        };
        let main = tables.weapon(main)?;
        let off_hand = match &self.off_hand {
            Some(id) => Some(tables.weapon(id)?),
            None => None,
        };
        Ok(GripCategory::for_equipment(main, off_hand))
    }

    /// Spend stamina (clamped at zero)
    pub fn spend_stamina(&mut self, amount: f32) {
        self.vitals.stamina = (self.vitals.stamina - amount.max(0.0)).max(0.0);
    }

    pub fn recover_stamina(&mut self, amount: f32) {
        self.vitals.stamina = (self.vitals.stamina + amount.max(0.0)).min(self.capacity.stamina);
    }

    /// Adopt a new stance, paying whatever the cost model charges
    pub fn confirm_stance(&mut self, stance: Stance, cost: &impl StanceCost) -> f32 {
        let charged = cost.cost(&self.stance, &stance).max(0.0);
        self.spend_stamina(charged);
        self.stance = stance;
        charged
    }

    /// Let go of the main-hand weapon
    pub fn drop_weapon(&mut self) -> Option<String> {
        self.weapon.take()
    }

    /// Forget natural weapons whose part is gone; returns what was lost
    pub fn prune_natural_weapons(&mut self, plan: &BodyPlan) -> Vec<String> {
        let (kept, lost): (Vec<_>, Vec<_>) = self
            .natural_weapons
            .drain(..)
            .partition(|n| n.usable(plan, &self.wounds));
        self.natural_weapons = kept;
        lost.into_iter().map(|n| n.weapon).collect()
    }

    /// Bleed and recover for one tick
    ///
    /// Every arterial wound drains `bleed_per_tick`; blood only refills
    /// while nothing is bleeding. Returns the blood lost.
    pub fn end_tick(&mut self, config: &ResolutionConfig) -> f32 {
        let bleeding = self.wounds.bleeding_parts() as f32;
        let lost = (bleeding * config.bleed_per_tick).min(self.vitals.blood.max(0.0));
        self.vitals.blood -= lost;
        if bleeding == 0.0 {
            self.vitals.blood = (self.vitals.blood + self.recovery.blood).min(self.capacity.blood);
        }
        self.recover_stamina(self.recovery.stamina);
        self.vitals.focus = (self.vitals.focus + self.recovery.focus.max(0.0)).min(self.capacity.focus);
        lost
    }

    pub fn is_bled_out(&self) -> bool {
        self.capacity.blood > 0.0 && self.vitals.blood <= 0.0
    }

    pub fn is_incapacitated(&self, plan: &BodyPlan) -> bool {
        self.is_bled_out() || self.wounds.is_incapacitated(plan)
    }

    pub fn is_dead(&self, plan: &BodyPlan) -> bool {
        self.is_bled_out() || self.wounds.is_dead(plan)
    }
}

/// Everything one fight carries between ticks
#[derive(Debug, Clone, Default)]
pub struct Encounter {
    pub tick: Tick,
    combatants: Vec<Combatant>,
    pub engagements: EngagementTable,
}

impl Encounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, combatant: Combatant) {
        self.combatants.retain(|c| c.id != combatant.id);
        self.combatants.push(combatant);
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.combatants.iter().any(|c| c.id == id)
    }

    pub fn get(&self, id: AgentId) -> Option<&Combatant> {
        self.combatants.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Combatant> {
        self.combatants.iter_mut().find(|c| c.id == id)
    }

    pub fn combatants(&self) -> &[Combatant] {
        &self.combatants
    }

    pub fn combatants_mut(&mut self) -> &mut [Combatant] {
        &mut self.combatants
    }

    pub fn engage(&mut self, a: AgentId, b: AgentId, range: Reach) {
        self.engagements.engage(a, b, range);
    }

    pub fn advance_tick(&mut self) -> Tick {
        self.tick += 1;
        self.tick
    }

    /// Engaged opponents on another team, in id order
    pub fn enemies_of(&self, id: AgentId) -> Vec<AgentId> {
        let Some(me) = self.get(id) else {
            return Vec::new();
        };
        self.engagements
            .opponents_of(id)
            .into_iter()
            .filter(|other| self.get(*other).map_or(false, |c| c.team != me.team))
            .collect()
    }
}
