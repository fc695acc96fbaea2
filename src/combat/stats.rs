//! Attacker stats and how techniques read them

use serde::{Deserialize, Serialize};

/// A stat a technique can scale with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accessor {
    Power,
    Speed,
    Agility,
    Dexterity,
    Fortitude,
    Will,
}

/// Which momentum term a stat feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatClass {
    /// Enters momentum quadratically
    Velocity,
    /// Enters momentum linearly
    Mass,
}

impl Accessor {
    pub fn class(self) -> StatClass {
        use Accessor::*;

        match self {
            Speed | Agility | Dexterity => StatClass::Velocity,
            Power | Fortitude | Will => StatClass::Mass,
        }
    }
}

/// One stat, or the mean of two
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatSource {
    Single(Accessor),
    Average(Accessor, Accessor),
}

impl StatSource {
    pub fn accessors(&self) -> Vec<Accessor> {
        match *self {
            StatSource::Single(a) => vec![a],
            StatSource::Average(a, b) => vec![a, b],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatStats {
    pub power: f32,
    pub speed: f32,
    pub agility: f32,
    pub dexterity: f32,
    pub fortitude: f32,
    pub will: f32,
}

impl Default for CombatStats {
    /// Average combatant
    fn default() -> Self {
        Self::uniform(5.0)
    }
}

impl CombatStats {
    pub fn uniform(value: f32) -> Self {
        Self {
            power: value,
            speed: value,
            agility: value,
            dexterity: value,
            fortitude: value,
            will: value,
        }
    }

    pub fn get(&self, accessor: Accessor) -> f32 {
        match accessor {
            Accessor::Power => self.power,
            Accessor::Speed => self.speed,
            Accessor::Agility => self.agility,
            Accessor::Dexterity => self.dexterity,
            Accessor::Fortitude => self.fortitude,
            Accessor::Will => self.will,
        }
    }

    pub fn set(&mut self, accessor: Accessor, value: f32) {
        match accessor {
            Accessor::Power => self.power = value,
            Accessor::Speed => self.speed = value,
            Accessor::Agility => self.agility = value,
            Accessor::Dexterity => self.dexterity = value,
            Accessor::Fortitude => self.fortitude = value,
            Accessor::Will => self.will = value,
        }
    }

    /// Stat divided by the baseline (1.0 for an average combatant)
    pub fn ratio(&self, accessor: Accessor, baseline: f32) -> f32 {
        (self.get(accessor) / baseline).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessor_classes() {
        assert_eq!(Accessor::Speed.class(), StatClass::Velocity);
        assert_eq!(Accessor::Dexterity.class(), StatClass::Velocity);
        assert_eq!(Accessor::Power.class(), StatClass::Mass);
        assert_eq!(Accessor::Will.class(), StatClass::Mass);
    }

    #[test]
    fn test_average_combatant_ratio_is_one() {
        let stats = CombatStats::default();
        assert_eq!(stats.ratio(Accessor::Power, 5.0), 1.0);
    }

    #[test]
    fn test_set_then_get() {
        let mut stats = CombatStats::default();
        stats.set(Accessor::Agility, 8.0);
        assert_eq!(stats.get(Accessor::Agility), 8.0);
        assert_eq!(stats.get(Accessor::Speed), 5.0);
    }
}
