//! Committed actions and the commit/withdraw boundary
//!
//! UI or AI commits actions during the setup phase of a tick. Once the
//! tick starts resolving the queue is drained and nothing is withdrawn.

use serde::{Deserialize, Serialize};

use crate::combat::state::{Combatant, Encounter};
use crate::core::config::ResolutionConfig;
use crate::core::error::{CombatError, Result};
use crate::core::types::{AgentId, TickTime};
use crate::data::DataTables;

/// Risk/reward tier of an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Stakes {
    Probing,
    Guarded,
    #[default]
    Committed,
    Reckless,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionModifiers {
    pub damage_mult: f32,
    /// Replaces the engagement's control in the hit roll
    pub advantage_override: Option<f32>,
}

impl Default for ActionModifiers {
    fn default() -> Self {
        Self {
            damage_mult: 1.0,
            advantage_override: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommittedAction {
    pub actor: AgentId,
    pub technique: String,
    #[serde(default)]
    pub target: Option<AgentId>,
    pub time_start: TickTime,
    pub time_end: TickTime,
    #[serde(default)]
    pub stakes: Stakes,
    #[serde(default)]
    pub modifiers: ActionModifiers,
}

impl CommittedAction {
    pub fn new(
        actor: AgentId,
        technique: impl Into<String>,
        time_start: TickTime,
        time_end: TickTime,
    ) -> Self {
        Self {
            actor,
            technique: technique.into(),
            target: None,
            time_start,
            time_end,
            stakes: Stakes::default(),
            modifiers: ActionModifiers::default(),
        }
    }

    pub fn at(mut self, target: AgentId) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_stakes(mut self, stakes: Stakes) -> Self {
        self.stakes = stakes;
        self
    }

    pub fn with_modifiers(mut self, modifiers: ActionModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Half-open intervals [start, end) share some time
    pub fn overlaps(&self, other: &CommittedAction) -> bool {
        self.time_start < other.time_end && other.time_start < self.time_end
    }

    /// 0 <= start < end <= 1
    pub fn validate_timing(&self) -> Result<()> {
        let valid = self.time_start >= 0.0
            && self.time_end <= 1.0
            && self.time_start < self.time_end;
        if valid {
            Ok(())
        } else {
            Err(CombatError::InvalidAction(format!(
                "timing window [{}, {}) outside 0..1 or empty",
                self.time_start, self.time_end
            )))
        }
    }
}

/// Handle for a pending action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionId(pub u32);

/// Actions committed for the coming tick, in commit order
#[derive(Debug, Clone, Default)]
pub struct ActionQueue {
    pending: Vec<(ActionId, CommittedAction)>,
    next_id: u32,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock in an action
    ///
    /// Rejects bad timing, unknown combatants and unknown techniques, and an
    /// action that needs a channel (weapon, off hand, footwork) the same
    /// actor already occupies during an overlapping window.
    pub fn commit<T: DataTables + ?Sized>(
        &mut self,
        tables: &T,
        encounter: &Encounter,
        action: CommittedAction,
    ) -> Result<ActionId> {
        action.validate_timing()?;
        if !encounter.contains(action.actor) {
            return Err(CombatError::UnknownCombatant(action.actor));
        }
        if let Some(target) = action.target {
            if !encounter.contains(target) {
                return Err(CombatError::UnknownCombatant(target));
            }
        }
        let channels = tables.technique(&action.technique)?.channels;
        for (_, pending) in self.pending.iter().filter(|(_, p)| p.actor == action.actor && p.overlaps(&action)) {
            let held = tables.technique(&pending.technique)?;
            if held.channels.conflicts(&channels) {
                return Err(CombatError::InvalidAction(format!(
                    "{} overlaps {} on a shared channel",
                    action.technique, pending.technique
                )));
            }
        }

        let id = ActionId(self.next_id);
        self.next_id += 1;
        self.pending.push((id, action));
        Ok(id)
    }

    /// Take back a pending action at a stamina cost
    pub fn withdraw(
        &mut self,
        id: ActionId,
        actor: &mut Combatant,
        config: &ResolutionConfig,
    ) -> Result<CommittedAction> {
        let idx = self
            .pending
            .iter()
            .position(|(pending, _)| *pending == id)
            .ok_or_else(|| CombatError::InvalidAction(format!("no pending action {}", id.0)))?;
        if self.pending[idx].1.actor != actor.id {
            return Err(CombatError::InvalidAction(format!(
                "action {} belongs to another combatant",
                id.0
            )));
        }

        let (_, action) = self.pending.remove(idx);
        actor.spend_stamina(config.withdraw_stamina_cost);
        tracing::debug!("{} withdrew {}", actor.name, action.technique);
        Ok(action)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending(&self) -> impl Iterator<Item = &CommittedAction> {
        self.pending.iter().map(|(_, a)| a)
    }

    /// Drain everything for resolution, in commit order
    pub fn take_tick(&mut self) -> Vec<CommittedAction> {
        self.pending.drain(..).map(|(_, a)| a).collect()
    }
}
