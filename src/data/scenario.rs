//! Expected-outcome fixtures
//!
//! A scenario is one blow against one known part: who swings what, at
//! whom, wearing what, and the bounds the result must fall inside. They
//! load with the rest of the tables and run straight through
//! [`strike_part`], with no hit roll and no location draw.

use serde::{Deserialize, Serialize};

use crate::combat::engagement::RelativeAngle;
use crate::combat::events::OutcomeKind;
use crate::combat::penetration::LayerVerdict;
use crate::combat::resolution::{strike_part, Blow, Strike};
use crate::combat::stats::CombatStats;
use crate::combat::weapons::WeaponCategory;
use crate::combat::wounds::WoundLedger;
use crate::combat::Stakes;
use crate::core::config::ResolutionConfig;
use crate::core::error::{CombatError, Result};
use crate::data::DataTables;

fn default_species() -> String {
    "human".into()
}

fn default_target() -> String {
    "torso".into()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackerSpec {
    #[serde(default = "default_species")]
    pub species: String,
    pub weapon: String,
    pub technique: String,
    #[serde(default)]
    pub stakes: Stakes,
    /// Overrides on an average combatant
    #[serde(default)]
    pub power: Option<f32>,
    #[serde(default)]
    pub speed: Option<f32>,
    /// Applied as dexterity
    #[serde(default)]
    pub skill: Option<f32>,
}

impl AttackerSpec {
    pub fn stats(&self) -> CombatStats {
        let base = CombatStats::default();
        CombatStats {
            power: self.power.unwrap_or(base.power),
            speed: self.speed.unwrap_or(base.speed),
            dexterity: self.skill.unwrap_or(base.dexterity),
            ..base
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefenderSpec {
    #[serde(default = "default_species")]
    pub species: String,
    #[serde(default)]
    pub armour: Vec<String>,
    #[serde(default = "default_target")]
    pub target_part: String,
    /// Attacker's angle on the defender
    #[serde(default)]
    pub angle: RelativeAngle,
}

/// Bounds on the result; absent fields are not checked
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpectedOutcome {
    /// `hit` or `deflected`
    pub outcome: Option<OutcomeKind>,
    pub damage_dealt_min: Option<f32>,
    pub damage_dealt_max: Option<f32>,
    pub packet_energy_min: Option<f32>,
    pub packet_geometry_min: Option<f32>,
    pub armour_deflected: Option<bool>,
    pub penetrated_layers_min: Option<usize>,
    pub penetrated_layers_max: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatScenario {
    pub id: String,
    #[serde(default)]
    pub description: String,
    pub attacker: AttackerSpec,
    pub defender: DefenderSpec,
    #[serde(default)]
    pub expected: ExpectedOutcome,
}

/// What a strike produced, in the terms the bounds use
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioMeasure {
    pub outcome: OutcomeKind,
    /// Energy deposited in the tissue
    pub damage_dealt: f32,
    pub packet_energy: f32,
    pub packet_geometry: f32,
    /// Stopped with at least one layer turning the blow outright
    pub armour_deflected: bool,
    pub penetrated_layers: usize,
}

impl ScenarioMeasure {
    pub fn of(strike: &Strike) -> Self {
        let packet = strike.packet();
        let armour = strike.armour();
        let penetrated_layers = armour
            .iter()
            .filter(|l| l.verdict == LayerVerdict::Penetrated)
            .count();
        let (outcome, damage_dealt, armour_deflected) = match strike {
            Strike::Stopped { armour, .. } => (
                OutcomeKind::Deflected,
                0.0,
                armour.iter().any(|l| l.verdict == LayerVerdict::Deflected),
            ),
            Strike::Landed { tissue, .. } => (
                OutcomeKind::Hit,
                tissue.layers.iter().map(|l| l.deposited).sum(),
                false,
            ),
        };
        Self {
            outcome,
            damage_dealt,
            packet_energy: packet.momentum(),
            packet_geometry: packet.geometry(),
            armour_deflected,
            penetrated_layers,
        }
    }
}

impl ExpectedOutcome {
    /// One line per bound the measure falls outside of
    pub fn mismatches(&self, got: &ScenarioMeasure) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(outcome) = self.outcome {
            if outcome != got.outcome {
                out.push(format!("outcome {:?}, expected {:?}", got.outcome, outcome));
            }
        }
        let mut at_least = |name: &str, value: f32, bound: Option<f32>| {
            if let Some(min) = bound {
                if value < min {
                    out.push(format!("{} {:.2} below {:.2}", name, value, min));
                }
            }
        };
        at_least("damage dealt", got.damage_dealt, self.damage_dealt_min);
        at_least("packet energy", got.packet_energy, self.packet_energy_min);
        at_least("packet geometry", got.packet_geometry, self.packet_geometry_min);
        if let Some(max) = self.damage_dealt_max {
            if got.damage_dealt > max {
                out.push(format!("damage dealt {:.2} above {:.2}", got.damage_dealt, max));
            }
        }
        if let Some(deflected) = self.armour_deflected {
            if deflected != got.armour_deflected {
                out.push(format!("armour deflected {}, expected {}", got.armour_deflected, deflected));
            }
        }
        if let Some(min) = self.penetrated_layers_min {
            if got.penetrated_layers < min {
                out.push(format!("{} layers penetrated, at least {} expected", got.penetrated_layers, min));
            }
        }
        if let Some(max) = self.penetrated_layers_max {
            if got.penetrated_layers > max {
                out.push(format!("{} layers penetrated, at most {} expected", got.penetrated_layers, max));
            }
        }
        out
    }
}

impl CombatScenario {
    /// Strike the target part of a fresh, unwounded defender
    ///
    /// Unknown ids anywhere in the scenario are data-integrity errors.
    pub fn run<T: DataTables + ?Sized>(&self, tables: &T, config: &ResolutionConfig) -> Result<Strike> {
        let attacker = tables.species(&self.attacker.species)?;
        let weapon = tables.weapon(&self.attacker.weapon)?;
        let technique = tables.technique(&self.attacker.technique)?;
        let species = tables.species(&self.defender.species)?;
        let plan = tables.body_plan(&species.body_plan)?;
        let part = plan
            .part(&self.defender.target_part)
            .ok_or_else(|| CombatError::UnknownBodyPart {
                plan: plan.id.clone(),
                part: self.defender.target_part.clone(),
            })?;

        let stats = self.attacker.stats();
        let damage_mult = if weapon.category == WeaponCategory::Natural {
            attacker.size.mass.max(0.0)
        } else {
            1.0
        };
        let blow = Blow {
            weapon,
            technique,
            stats: &stats,
            stakes: self.attacker.stakes,
            damage_mult,
            angle: self.defender.angle,
        };
        let mut wounds = WoundLedger::new();
        strike_part(tables, &blow, plan, part, &self.defender.armour, &mut wounds, config)
    }

    /// Run and compare; empty when every bound holds
    pub fn check<T: DataTables + ?Sized>(&self, tables: &T, config: &ResolutionConfig) -> Result<Vec<String>> {
        let strike = self.run(tables, config)?;
        let measure = ScenarioMeasure::of(&strike);
        let mismatches = self.expected.mismatches(&measure);
        if mismatches.is_empty() {
            tracing::debug!("Scenario {} holds", self.id);
        } else {
            tracing::warn!("Scenario {} failed: {}", self.id, mismatches.join("; "));
        }
        Ok(mismatches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::builtin;

    fn bare_chop() -> CombatScenario {
        CombatScenario {
            id: "bare_chop".into(),
            description: String::new(),
            attacker: AttackerSpec {
                species: "human".into(),
                weapon: "axe".into(),
                technique: "overhead_chop".into(),
                stakes: Stakes::Committed,
                power: None,
                speed: None,
                skill: None,
            },
            defender: DefenderSpec {
                species: "human".into(),
                armour: Vec::new(),
                target_part: "right_forearm".into(),
                angle: RelativeAngle::Frontal,
            },
            expected: ExpectedOutcome {
                outcome: Some(OutcomeKind::Hit),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_stat_overrides_only_touch_named_stats() {
        let spec = AttackerSpec {
            power: Some(8.0),
            skill: Some(2.0),
            ..bare_chop().attacker
        };
        let stats = spec.stats();
        assert_eq!(stats.power, 8.0);
        assert_eq!(stats.dexterity, 2.0);
        assert_eq!(stats.speed, CombatStats::default().speed);
    }

    #[test]
    fn test_bare_chop_lands() {
        let tables = builtin::tables();
        let config = ResolutionConfig::default();
        let strike = bare_chop().run(&tables, &config).unwrap();
        let measure = ScenarioMeasure::of(&strike);
        assert_eq!(measure.outcome, OutcomeKind::Hit);
        assert!(measure.damage_dealt > 0.0);
        assert_eq!(measure.penetrated_layers, 0);
        assert!(bare_chop().check(&tables, &config).unwrap().is_empty());
    }

    #[test]
    fn test_bounds_report_each_miss() {
        let tables = builtin::tables();
        let config = ResolutionConfig::default();
        let mut scenario = bare_chop();
        scenario.expected = ExpectedOutcome {
            outcome: Some(OutcomeKind::Deflected),
            packet_energy_min: Some(1.0e6),
            penetrated_layers_min: Some(1),
            ..Default::default()
        };
        let mismatches = scenario.check(&tables, &config).unwrap();
        assert_eq!(mismatches.len(), 3, "{:?}", mismatches);
    }

    #[test]
    fn test_unknown_part_is_data_integrity() {
        let tables = builtin::tables();
        let mut scenario = bare_chop();
        scenario.defender.target_part = "tail".into();
        let err = scenario.run(&tables, &ResolutionConfig::default()).unwrap_err();
        assert!(matches!(err, CombatError::UnknownBodyPart { .. }));
        assert!(err.is_data_integrity());
    }
}
