//! Pairwise engagement state
//!
//! One record per pair of combatants: range, control, pressure and where
//! each stands relative to the other's facing. Records persist across ticks;
//! footwork and landed blows mutate them.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::combat::constants::{CONTROL_MAX, CONTROL_MIN};
use crate::combat::weapons::Reach;
use crate::core::types::AgentId;

/// Where a combatant stands relative to the opponent's facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RelativeAngle {
    #[default]
    Frontal,
    /// Inside the opponent's weapon line
    Inside,
    /// Outside the opponent's weapon line
    Outside,
    Flank,
    Rear,
}

impl RelativeAngle {
    /// Attacking from the side or behind
    pub fn is_flanking(self) -> bool {
        matches!(self, RelativeAngle::Flank | RelativeAngle::Rear)
    }
}

/// Engagement seen from one combatant's side
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Engagement {
    pub range: Reach,
    /// Advantage of the viewer, -1..1
    pub control: f32,
    /// Pressure the viewer is under, 0..1
    pub pressure: f32,
    /// Where the viewer stands relative to the opponent's facing
    pub angle: RelativeAngle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EngagementRecord {
    range: Reach,
    /// Control from the lower id's side
    control: f32,
    /// Pressure on [lower, higher]
    pressure: [f32; 2],
    /// Angle of [lower, higher] relative to the other
    angle: [RelativeAngle; 2],
}

impl EngagementRecord {
    fn new(range: Reach) -> Self {
        Self {
            range,
            control: 0.0,
            pressure: [0.0; 2],
            angle: [RelativeAngle::Frontal; 2],
        }
    }
}

/// Canonical key and the viewer's slot in the record
fn key(viewer: AgentId, other: AgentId) -> ((AgentId, AgentId), usize) {
    if viewer <= other {
        ((viewer, other), 0)
    } else {
        ((other, viewer), 1)
    }
}

/// All engagements of an encounter, keyed by unordered pair
#[derive(Debug, Clone, Default)]
pub struct EngagementTable {
    records: AHashMap<(AgentId, AgentId), EngagementRecord>,
}

impl EngagementTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) an engagement at the given range
    pub fn engage(&mut self, a: AgentId, b: AgentId, range: Reach) {
        let (k, _) = key(a, b);
        self.records.insert(k, EngagementRecord::new(range));
    }

    pub fn disengage(&mut self, a: AgentId, b: AgentId) -> bool {
        let (k, _) = key(a, b);
        self.records.remove(&k).is_some()
    }

    pub fn contains(&self, a: AgentId, b: AgentId) -> bool {
        self.records.contains_key(&key(a, b).0)
    }

    /// The engagement from `viewer`'s side
    pub fn get(&self, viewer: AgentId, other: AgentId) -> Option<Engagement> {
        let (k, slot) = key(viewer, other);
        let record = self.records.get(&k)?;
        let control = if slot == 0 {
            record.control
        } else {
            -record.control
        };
        Some(Engagement {
            range: record.range,
            control,
            pressure: record.pressure[slot],
            angle: record.angle[slot],
        })
    }

    /// Move control toward `viewer`; returns (old, new) from the viewer's side
    pub fn shift_control(
        &mut self,
        viewer: AgentId,
        other: AgentId,
        delta: f32,
    ) -> Option<(f32, f32)> {
        let (k, slot) = key(viewer, other);
        let record = self.records.get_mut(&k)?;
        let sign = if slot == 0 { 1.0 } else { -1.0 };
        let old = record.control * sign;
        record.control = (record.control + delta * sign).clamp(CONTROL_MIN, CONTROL_MAX);
        Some((old, record.control * sign))
    }

    /// Add pressure on `target`
    pub fn add_pressure(&mut self, target: AgentId, other: AgentId, delta: f32) {
        let (k, slot) = key(target, other);
        if let Some(record) = self.records.get_mut(&k) {
            record.pressure[slot] = (record.pressure[slot] + delta).clamp(0.0, 1.0);
        }
    }

    pub fn set_angle(&mut self, viewer: AgentId, other: AgentId, angle: RelativeAngle) {
        let (k, slot) = key(viewer, other);
        if let Some(record) = self.records.get_mut(&k) {
            record.angle[slot] = angle;
        }
    }

    pub fn set_range(&mut self, a: AgentId, b: AgentId, range: Reach) {
        if let Some(record) = self.records.get_mut(&key(a, b).0) {
            record.range = range;
        }
    }

    /// Close (negative) or open (positive) the distance by whole reach steps
    pub fn step_range(&mut self, a: AgentId, b: AgentId, steps: i8) -> Option<Reach> {
        let record = self.records.get_mut(&key(a, b).0)?;
        record.range = record.range.step(steps);
        Some(record.range)
    }

    /// Opponents `agent` is engaged with, in id order
    pub fn opponents_of(&self, agent: AgentId) -> Vec<AgentId> {
        let mut opponents: Vec<AgentId> = self
            .records
            .keys()
            .filter_map(|&(a, b)| {
                if a == agent {
                    Some(b)
                } else if b == agent {
                    Some(a)
                } else {
                    None
                }
            })
            .collect();
        opponents.sort();
        opponents
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (AgentId, AgentId) {
        (AgentId::from_u128(1), AgentId::from_u128(2))
    }

    #[test]
    fn test_control_is_perspective_adjusted() {
        let (a, b) = ids();
        let mut table = EngagementTable::new();
        table.engage(a, b, Reach::Short);

        table.shift_control(b, a, 0.3);
        assert!((table.get(b, a).unwrap().control - 0.3).abs() < 1e-6);
        assert!((table.get(a, b).unwrap().control + 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_control_clamped() {
        let (a, b) = ids();
        let mut table = EngagementTable::new();
        table.engage(a, b, Reach::Short);

        let (_, new) = table.shift_control(a, b, 5.0).unwrap();
        assert_eq!(new, CONTROL_MAX);
    }

    #[test]
    fn test_pressure_is_per_side() {
        let (a, b) = ids();
        let mut table = EngagementTable::new();
        table.engage(a, b, Reach::Short);

        table.add_pressure(b, a, 0.4);
        table.add_pressure(b, a, 0.8);
        assert_eq!(table.get(b, a).unwrap().pressure, 1.0);
        assert_eq!(table.get(a, b).unwrap().pressure, 0.0);
    }

    #[test]
    fn test_angle_is_per_side() {
        let (a, b) = ids();
        let mut table = EngagementTable::new();
        table.engage(a, b, Reach::Short);

        table.set_angle(b, a, RelativeAngle::Flank);
        assert_eq!(table.get(b, a).unwrap().angle, RelativeAngle::Flank);
        assert_eq!(table.get(a, b).unwrap().angle, RelativeAngle::Frontal);
    }

    #[test]
    fn test_step_range() {
        let (a, b) = ids();
        let mut table = EngagementTable::new();
        table.engage(a, b, Reach::Long);

        assert_eq!(table.step_range(b, a, -2), Some(Reach::Short));
        assert_eq!(table.get(a, b).unwrap().range, Reach::Short);
    }

    #[test]
    fn test_missing_engagement() {
        let (a, b) = ids();
        let table = EngagementTable::new();
        assert!(table.get(a, b).is_none());
        assert!(table.opponents_of(a).is_empty());
    }
}
