//! Events pushed out of resolution
//!
//! The resolver only appends; presentation and logging read.

use serde::{Deserialize, Serialize};

use crate::combat::body::WoundSeverity;
use crate::combat::weapons::Reach;
use crate::combat::wounds::CapabilityLoss;
use crate::core::types::{AgentId, Tick};

/// Short outcome label carried by `TechniqueResolved`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Hit,
    Graze,
    Deflected,
    Miss,
    Defended,
    OutOfRange,
    NoValidTarget,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CombatEvent {
    TechniqueResolved {
        tick: Tick,
        actor: AgentId,
        target: AgentId,
        technique: String,
        weapon: String,
        outcome: OutcomeKind,
        /// Amount that reached tissue
        damage: f32,
    },
    AttackOutOfRange {
        tick: Tick,
        actor: AgentId,
        target: AgentId,
        reach: Reach,
        range: Reach,
    },
    WoundInflicted {
        tick: Tick,
        target: AgentId,
        part: String,
        severity: WoundSeverity,
        lost: CapabilityLoss,
    },
    AdvantageChanged {
        tick: Tick,
        actor: AgentId,
        opponent: AgentId,
        from: f32,
        to: f32,
    },
    WeaponDropped {
        tick: Tick,
        actor: AgentId,
        weapon: String,
    },
}

/// Append-only event stream
pub trait EventSink {
    fn push(&mut self, event: CombatEvent);
}

impl EventSink for Vec<CombatEvent> {
    fn push(&mut self, event: CombatEvent) {
        Vec::push(self, event);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    pub events: Vec<CombatEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CombatEvent> {
        self.events.iter()
    }

    pub fn wounds(&self) -> impl Iterator<Item = &CombatEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, CombatEvent::WoundInflicted { .. }))
    }
}

impl EventSink for EventLog {
    fn push(&mut self, event: CombatEvent) {
        self.events.push(event);
    }
}
