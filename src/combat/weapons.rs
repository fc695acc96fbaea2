//! Weapon templates
//!
//! A weapon is a set of physical constants (mass, inertia, reference energy,
//! edge geometry, structural rigidity) plus the reach it fights at and the
//! profiles it lends to attack and defence. Techniques bias these constants;
//! attacker stats scale them.

use serde::{Deserialize, Serialize};

use crate::combat::stance::GripCategory;
use crate::combat::technique::AttackMode;

/// Distance category - ordinal engagement range
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reach {
    /// Touching distance (fists, daggers)
    Grapple,
    /// Arm's length (swords, maces)
    Short,
    /// Extended arm (bastard swords, axes)
    Medium,
    /// Spear length (spears, halberds)
    Long,
    /// Formation weapons (pikes, lances)
    Pike,
}

impl Reach {
    const ORDER: [Reach; 5] = [
        Reach::Grapple,
        Reach::Short,
        Reach::Medium,
        Reach::Long,
        Reach::Pike,
    ];

    /// Move by whole reach steps, clamped to the ends of the scale
    pub fn step(self, steps: i8) -> Reach {
        let idx = (self as i16 + steps as i16).clamp(0, Self::ORDER.len() as i16 - 1);
        Self::ORDER[idx as usize]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponCategory {
    Sword,
    Axe,
    Mace,
    Dagger,
    Spear,
    Polearm,
    Shield,
    /// Fists, claws, pseudopods
    Natural,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OffensiveProfile {
    /// Flat hit-chance contribution
    pub accuracy: f32,
}

/// How well the weapon serves each kind of active defence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DefensiveProfile {
    pub parry: f32,
    pub block: f32,
    pub deflect: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponTemplate {
    pub id: String,
    pub name: String,
    pub category: WeaponCategory,
    pub weight_kg: f32,
    pub length_m: f32,
    pub swing: bool,
    pub thrust: bool,
    pub reach: Reach,
    #[serde(default)]
    pub grip: GripCategory,
    pub moment_of_inertia: f32,
    pub effective_mass: f32,
    /// Energy delivered by an average wielder with no technique bias
    pub reference_energy_j: f32,
    /// Edge/point concentration, 0 = flat, 1 = needle
    pub geometry_coeff: f32,
    /// Structural backing of the striking surface, 0..1
    pub rigidity_coeff: f32,
    /// Flat reduction of each layer's geometry threshold
    #[serde(default)]
    pub penetration: f32,
    #[serde(default)]
    pub offense: OffensiveProfile,
    #[serde(default)]
    pub defense: DefensiveProfile,
}

/// Inertia at which a swing splits evenly between speed and weight
pub const SWING_INERTIA_REF: f32 = 0.3;
/// Effective mass at which a thrust splits evenly between speed and weight
pub const THRUST_MASS_REF: f32 = 0.8;

impl WeaponTemplate {
    /// Share of delivered momentum carried by the weapon's own weight, 0..1
    ///
    /// Swings turn about the grip, so they read the moment of inertia.
    /// Thrusts drive along the blade and read the effective mass.
    pub fn heft(&self, mode: AttackMode) -> f32 {
        let (value, reference) = match mode {
            AttackMode::Swing => (self.moment_of_inertia, SWING_INERTIA_REF),
            AttackMode::Thrust | AttackMode::None => (self.effective_mass, THRUST_MASS_REF),
        };
        let value = value.max(0.0);
        if value + reference <= 0.0 {
            return 0.5;
        }
        value / (value + reference)
    }

    /// Does the weapon have the mode a technique needs?
    pub fn supports(&self, mode: AttackMode) -> bool {
        match mode {
            AttackMode::Swing => self.swing,
            AttackMode::Thrust => self.thrust,
            AttackMode::None => true,
        }
    }

    /// Common weapon: Arming sword
    pub fn arming_sword() -> Self {
        Self {
            id: "arming_sword".into(),
            name: "Arming Sword".into(),
            category: WeaponCategory::Sword,
            weight_kg: 1.1,
            length_m: 0.95,
            swing: true,
            thrust: true,
            reach: Reach::Short,
            grip: GripCategory::OneHanded,
            moment_of_inertia: 0.18,
            effective_mass: 0.45,
            reference_energy_j: 80.0,
            geometry_coeff: 0.7,
            rigidity_coeff: 0.6,
            penetration: 0.0,
            offense: OffensiveProfile { accuracy: 0.05 },
            defense: DefensiveProfile {
                parry: 0.15,
                block: 0.0,
                deflect: 0.05,
            },
        }
    }

    /// Common weapon: Axe
    pub fn axe() -> Self {
        Self {
            id: "axe".into(),
            name: "Bearded Axe".into(),
            category: WeaponCategory::Axe,
            weight_kg: 1.6,
            length_m: 0.8,
            swing: true,
            thrust: false,
            reach: Reach::Short,
            grip: GripCategory::OneHanded,
            moment_of_inertia: 0.42,
            effective_mass: 1.1,
            reference_energy_j: 120.0,
            geometry_coeff: 0.55,
            rigidity_coeff: 0.9,
            penetration: 0.0,
            offense: OffensiveProfile::default(),
            defense: DefensiveProfile {
                parry: 0.05,
                block: 0.0,
                deflect: 0.0,
            },
        }
    }

    /// Common weapon: Stiletto (needle-like piercer)
    pub fn stiletto() -> Self {
        Self {
            id: "stiletto".into(),
            name: "Stiletto".into(),
            category: WeaponCategory::Dagger,
            weight_kg: 0.25,
            length_m: 0.3,
            swing: false,
            thrust: true,
            reach: Reach::Grapple,
            grip: GripCategory::OneHanded,
            moment_of_inertia: 0.004,
            effective_mass: 0.12,
            reference_energy_j: 15.0,
            geometry_coeff: 0.95,
            rigidity_coeff: 0.35,
            penetration: 0.05,
            offense: OffensiveProfile { accuracy: 0.05 },
            defense: DefensiveProfile::default(),
        }
    }

    /// Common weapon: Mace
    pub fn mace() -> Self {
        Self {
            id: "mace".into(),
            name: "Flanged Mace".into(),
            category: WeaponCategory::Mace,
            weight_kg: 1.4,
            length_m: 0.7,
            swing: true,
            thrust: false,
            reach: Reach::Short,
            grip: GripCategory::OneHanded,
            moment_of_inertia: 0.35,
            effective_mass: 1.0,
            reference_energy_j: 110.0,
            geometry_coeff: 0.15,
            rigidity_coeff: 0.95,
            penetration: 0.0,
            offense: OffensiveProfile::default(),
            defense: DefensiveProfile {
                parry: 0.05,
                block: 0.0,
                deflect: 0.0,
            },
        }
    }

    /// Common weapon: Spear
    pub fn spear() -> Self {
        Self {
            id: "spear".into(),
            name: "Spear".into(),
            category: WeaponCategory::Spear,
            weight_kg: 2.0,
            length_m: 2.2,
            swing: false,
            thrust: true,
            reach: Reach::Long,
            grip: GripCategory::Polearm,
            moment_of_inertia: 0.9,
            effective_mass: 0.8,
            reference_energy_j: 70.0,
            geometry_coeff: 0.85,
            rigidity_coeff: 0.5,
            penetration: 0.05,
            offense: OffensiveProfile { accuracy: 0.05 },
            defense: DefensiveProfile {
                parry: 0.1,
                block: 0.0,
                deflect: 0.05,
            },
        }
    }

    /// Common weapon: Heater shield (off hand)
    pub fn heater_shield() -> Self {
        Self {
            id: "heater_shield".into(),
            name: "Heater Shield".into(),
            category: WeaponCategory::Shield,
            weight_kg: 3.5,
            length_m: 0.75,
            swing: true,
            thrust: false,
            reach: Reach::Grapple,
            grip: GripCategory::WeaponAndShield,
            moment_of_inertia: 0.6,
            effective_mass: 1.5,
            reference_energy_j: 40.0,
            geometry_coeff: 0.05,
            rigidity_coeff: 0.8,
            penetration: 0.0,
            offense: OffensiveProfile::default(),
            defense: DefensiveProfile {
                parry: 0.0,
                block: 0.3,
                deflect: 0.1,
            },
        }
    }

    /// Natural weapon: Pseudopod lash
    pub fn pseudopod() -> Self {
        Self {
            id: "pseudopod".into(),
            name: "Pseudopod".into(),
            category: WeaponCategory::Natural,
            weight_kg: 4.0,
            length_m: 0.6,
            swing: true,
            thrust: false,
            reach: Reach::Short,
            grip: GripCategory::Unarmed,
            moment_of_inertia: 0.25,
            effective_mass: 2.0,
            reference_energy_j: 35.0,
            geometry_coeff: 0.02,
            rigidity_coeff: 0.1,
            penetration: 0.0,
            offense: OffensiveProfile::default(),
            defense: DefensiveProfile::default(),
        }
    }

    /// Common weapon: Fists (unarmed)
    pub fn fists() -> Self {
        Self {
            id: "fists".into(),
            name: "Fists".into(),
            category: WeaponCategory::Natural,
            weight_kg: 0.5,
            length_m: 0.1,
            swing: true,
            thrust: true,
            reach: Reach::Grapple,
            grip: GripCategory::Unarmed,
            moment_of_inertia: 0.01,
            effective_mass: 0.5,
            reference_energy_j: 25.0,
            geometry_coeff: 0.05,
            rigidity_coeff: 0.3,
            penetration: 0.0,
            offense: OffensiveProfile::default(),
            defense: DefensiveProfile {
                parry: 0.0,
                block: 0.05,
                deflect: 0.0,
            },
        }
    }
}

impl Default for WeaponTemplate {
    fn default() -> Self {
        Self::fists()
    }
}
