//! Resolution configuration with documented constants
//!
//! All tunable numbers of the hit, damage and severity models are collected
//! here. Fixed model constants that are not meant to be tuned live in
//! `combat::constants`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::combat::action::Stakes;
use crate::core::error::{CombatError, Result};

/// What one stakes tier does to the actor's strike and exposure
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StakesTier {
    /// Multiplier on packet amount and momentum
    pub damage_mult: f32,
    /// Added to the actor's own hit chance
    pub hit_modifier: f32,
    /// Added to the hit chance of anyone attacking the actor this tick
    pub exposure_bonus: f32,
}

impl StakesTier {
    const fn new(damage_mult: f32, hit_modifier: f32, exposure_bonus: f32) -> Self {
        Self {
            damage_mult,
            hit_modifier,
            exposure_bonus,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StakesTable {
    pub probing: StakesTier,
    pub guarded: StakesTier,
    pub committed: StakesTier,
    pub reckless: StakesTier,
}

impl Default for StakesTable {
    fn default() -> Self {
        Self {
            probing: StakesTier::new(0.6, 0.05, -0.05),
            guarded: StakesTier::new(0.85, 0.02, -0.02),
            committed: StakesTier::new(1.0, 0.0, 0.0),
            reckless: StakesTier::new(1.3, -0.05, 0.10),
        }
    }
}

impl StakesTable {
    pub fn tier(&self, stakes: Stakes) -> &StakesTier {
        match stakes {
            Stakes::Probing => &self.probing,
            Stakes::Guarded => &self.guarded,
            Stakes::Committed => &self.committed,
            Stakes::Reckless => &self.reckless,
        }
    }
}

/// Configuration for the resolution pipeline
///
/// A TOML file may name any subset of fields; the rest keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionConfig {
    // === HIT CHANCE ===
    /// Chance to land an attack before any modifier
    pub base_hit_chance: f32,

    /// Floor of the final hit chance. Nothing is ever a certain miss.
    pub min_hit_chance: f32,

    /// Ceiling of the final hit chance. Nothing is ever a certain hit.
    pub max_hit_chance: f32,

    /// Hit chance lost per point of technique difficulty (difficulty is 0..1)
    pub difficulty_weight: f32,

    /// Hit chance gained per point of engagement control (control is -1..1)
    pub control_weight: f32,

    /// Bonus when the attacker stands at the defender's flank or rear
    pub flank_bonus: f32,

    /// Bonus against a defender who made no footwork this tick
    pub stationary_bonus: f32,

    /// Penalty when the attack height is the height the guard covers
    pub guard_penalty: f32,

    /// Penalty when the guard covers adjacent heights and the attack is one away
    pub adjacent_guard_penalty: f32,

    /// Bonus for attacking a height the defender's guard leaves open
    pub opening_bonus: f32,

    // === GRAZES ===
    /// Rolls landing within this margin below the hit chance are grazes
    pub graze_margin: f32,

    /// Packet scale applied to a graze
    pub graze_damage_mult: f32,

    // === DAMAGE PACKET ===
    /// Stat value that produces a ratio of 1.0
    ///
    /// Stats are divided by this before entering the momentum terms, so an
    /// average combatant contributes exactly the weapon's reference energy.
    pub stat_baseline: f32,

    /// Risk/reward tiers an actor may commit at
    pub stakes: StakesTable,

    // === TISSUE ===
    /// Damage a tissue layer can take per centimetre of thickness before its
    /// whole volume counts as destroyed
    pub layer_capacity_per_cm: f32,

    /// Minimum wound width, so that even a needle destroys a sliver of tissue
    pub volume_width_floor: f32,

    // === SEVERITY ===
    /// Severity score at which a wound becomes a scratch
    pub scratch_threshold: f32,
    /// Severity score at which a wound becomes minor
    pub minor_threshold: f32,
    /// Severity score at which a wound becomes serious
    pub serious_threshold: f32,
    /// Severity score at which a wound becomes critical
    pub critical_threshold: f32,

    /// Structural (bone, tendon) loss required for a part to be destroyed
    pub destroy_structural_loss: f32,

    /// Thickness-weighted volume loss required for a part to be destroyed
    pub destroy_volume_loss: f32,

    /// Share of penetration depth that counts toward severity
    ///
    /// Keeps deep punctures meaningful without letting depth alone reach
    /// the destroyed state.
    pub depth_severity_weight: f32,

    /// Severity score multiplier for vital parts
    pub vital_severity_factor: f32,

    // === ENGAGEMENT ===
    /// Control moved toward the attacker when a hit lands
    pub control_shift_on_hit: f32,

    /// Control moved toward the defender after an active defence succeeds
    pub control_shift_on_defence: f32,

    /// Pressure added to the defender for each landed hit
    pub pressure_per_hit: f32,

    /// Hit-chance bonus against a defender at full pressure (scales linearly)
    pub pressure_weight: f32,

    // === VITALS ===
    /// Blood lost per tick for each open artery
    pub bleed_per_tick: f32,

    // === COMMANDS ===
    /// Stamina charged for withdrawing a committed action
    pub withdraw_stamina_cost: f32,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            base_hit_chance: 0.70,
            min_hit_chance: 0.05,
            max_hit_chance: 0.95,
            difficulty_weight: 0.20,
            control_weight: 0.15,
            flank_bonus: 0.10,
            stationary_bonus: 0.05,
            guard_penalty: 0.25,
            adjacent_guard_penalty: 0.10,
            opening_bonus: 0.05,

            graze_margin: 0.10,
            graze_damage_mult: 0.40,

            stat_baseline: 5.0,
            stakes: StakesTable::default(),

            layer_capacity_per_cm: 2.0,
            volume_width_floor: 0.10,

            scratch_threshold: 0.02,
            minor_threshold: 0.10,
            serious_threshold: 0.30,
            critical_threshold: 0.60,
            destroy_structural_loss: 0.80,
            destroy_volume_loss: 0.60,
            depth_severity_weight: 0.50,
            vital_severity_factor: 1.25,

            control_shift_on_hit: 0.10,
            control_shift_on_defence: 0.15,
            pressure_per_hit: 0.10,
            pressure_weight: 0.10,

            bleed_per_tick: 0.25,

            withdraw_stamina_cost: 0.10,
        }
    }
}

impl ResolutionConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a (possibly partial) TOML document and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ResolutionConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!("Loaded resolution config from {}", path.display());
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_hit_chance)
            || !(0.0..=1.0).contains(&self.max_hit_chance)
            || self.min_hit_chance >= self.max_hit_chance
        {
            return Err(CombatError::InvalidConfig(format!(
                "hit chance bounds must satisfy 0 <= min ({}) < max ({}) <= 1",
                self.min_hit_chance, self.max_hit_chance
            )));
        }

        let thresholds = [
            self.scratch_threshold,
            self.minor_threshold,
            self.serious_threshold,
            self.critical_threshold,
        ];
        if thresholds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(CombatError::InvalidConfig(format!(
                "severity thresholds must be strictly increasing: {:?}",
                thresholds
            )));
        }

        if self.stat_baseline <= 0.0 || self.layer_capacity_per_cm <= 0.0 {
            return Err(CombatError::InvalidConfig(
                "stat_baseline and layer_capacity_per_cm must be positive".into(),
            ));
        }

        if !(0.0..=1.0).contains(&self.graze_damage_mult) || self.graze_margin < 0.0 {
            return Err(CombatError::InvalidConfig(format!(
                "graze_damage_mult ({}) must be in 0..1 and graze_margin ({}) non-negative",
                self.graze_damage_mult, self.graze_margin
            )));
        }

        if self.pressure_weight < 0.0 || self.bleed_per_tick < 0.0 {
            return Err(CombatError::InvalidConfig(format!(
                "pressure_weight ({}) and bleed_per_tick ({}) must be non-negative",
                self.pressure_weight, self.bleed_per_tick
            )));
        }

        let tiers = [
            self.stakes.probing,
            self.stakes.guarded,
            self.stakes.committed,
            self.stakes.reckless,
        ];
        if tiers.iter().any(|t| t.damage_mult < 0.0) {
            return Err(CombatError::InvalidConfig(
                "stakes damage multipliers must be non-negative".into(),
            ));
        }

        Ok(())
    }
}
