//! Layer penetration: shielding then per-axis susceptibility
//!
//! Armour and tissue share this walk. A layer first shields the incoming
//! packet (deflection and absorption cut amount and momentum, dispersion
//! blunts geometry), then tests each axis against its threshold. An axis
//! above threshold passes `value * ratio` to the next layer; an axis at or
//! below threshold is stopped outright.

use serde::{Deserialize, Serialize};

use crate::combat::constants::{
    ENERGY_TRANSFER_WEIGHT, GEOMETRY_TRANSFER_WEIGHT, NEGLIGIBLE_AMOUNT, RIGIDITY_TRANSFER_WEIGHT,
};

/// Threshold and pass-through ratio for one axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Susceptibility {
    pub threshold: f32,
    pub ratio: f32,
}

impl Susceptibility {
    pub const fn new(threshold: f32, ratio: f32) -> Self {
        Self { threshold, ratio }
    }
}

/// Material coefficients of one layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerCoefficients {
    pub deflection: f32,
    pub absorption: f32,
    pub dispersion: f32,
    pub geometry: Susceptibility,
    pub energy: Susceptibility,
    pub rigidity: Susceptibility,
}

impl LayerCoefficients {
    /// Shielding clamped to 0..1, ratios clamped non-negative
    pub fn sanitized(&self) -> Self {
        let axis = |s: Susceptibility| Susceptibility {
            threshold: s.threshold,
            ratio: s.ratio.max(0.0),
        };
        Self {
            deflection: self.deflection.clamp(0.0, 1.0),
            absorption: self.absorption.clamp(0.0, 1.0),
            dispersion: self.dispersion.clamp(0.0, 1.0),
            geometry: axis(self.geometry),
            energy: axis(self.energy),
            rigidity: axis(self.rigidity),
        }
    }

    /// Sum of the three shielding coefficients
    pub fn shielding_total(&self) -> f32 {
        self.deflection + self.absorption + self.dispersion
    }
}

/// The numbers a layer walk carries from layer to layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct LayerPacket {
    pub amount: f32,
    pub momentum: f32,
    pub geometry: f32,
    pub rigidity: f32,
}

impl LayerPacket {
    pub fn is_spent(&self) -> bool {
        self.amount < NEGLIGIBLE_AMOUNT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerVerdict {
    /// Nothing breached
    Deflected,
    /// Some axes breached
    Partial,
    /// Geometry and rigidity both breached
    Penetrated,
    /// Layer does not cover the struck facing
    Bypassed,
}

/// Which axes got through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Breach {
    pub geometry: bool,
    pub energy: bool,
    pub rigidity: bool,
}

impl Breach {
    pub fn any(&self) -> bool {
        self.geometry || self.energy || self.rigidity
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerResult {
    pub verdict: LayerVerdict,
    pub breach: Breach,
    /// Packet after shielding, before susceptibility
    pub shielded: LayerPacket,
    /// Packet handed to the next layer
    pub passed: LayerPacket,
}

impl LayerResult {
    /// A layer that was never touched
    pub fn bypassed(packet: &LayerPacket) -> Self {
        Self {
            verdict: LayerVerdict::Bypassed,
            breach: Breach {
                geometry: true,
                energy: true,
                rigidity: true,
            },
            shielded: *packet,
            passed: *packet,
        }
    }
}

/// Walk one layer
///
/// `penetration` lowers the geometry threshold (armour-piercing points).
pub fn resolve_layer(
    packet: &LayerPacket,
    coefficients: &LayerCoefficients,
    penetration: f32,
) -> LayerResult {
    let c = coefficients.sanitized();

    let shield = (1.0 - c.deflection) * (1.0 - c.absorption);
    let shielded = LayerPacket {
        amount: (packet.amount * shield).max(0.0),
        momentum: (packet.momentum * shield).max(0.0),
        geometry: (packet.geometry * (1.0 - c.dispersion)).max(0.0),
        rigidity: packet.rigidity.max(0.0),
    };

    let geometry_threshold = (c.geometry.threshold - penetration.max(0.0)).max(0.0);
    let breach = Breach {
        geometry: shielded.geometry > geometry_threshold,
        energy: shielded.momentum > c.energy.threshold,
        rigidity: shielded.rigidity > c.rigidity.threshold,
    };

    let verdict = match (breach.geometry, breach.rigidity, breach.any()) {
        (true, true, _) => LayerVerdict::Penetrated,
        (_, _, false) => LayerVerdict::Deflected,
        _ => LayerVerdict::Partial,
    };

    let mut transfer = 0.0;
    if breach.geometry {
        transfer += GEOMETRY_TRANSFER_WEIGHT * c.geometry.ratio;
    }
    if breach.energy {
        transfer += ENERGY_TRANSFER_WEIGHT * c.energy.ratio;
    }
    if breach.rigidity {
        transfer += RIGIDITY_TRANSFER_WEIGHT * c.rigidity.ratio;
    }

    let pass = |hit: bool, value: f32, ratio: f32| if hit { value * ratio } else { 0.0 };
    let mut passed = LayerPacket {
        amount: shielded.amount * transfer,
        momentum: pass(breach.energy, shielded.momentum, c.energy.ratio),
        geometry: pass(breach.geometry, shielded.geometry, c.geometry.ratio),
        rigidity: pass(breach.rigidity, shielded.rigidity, c.rigidity.ratio),
    };
    if passed.is_spent() {
        passed = LayerPacket::default();
    }

    LayerResult {
        verdict,
        breach,
        shielded,
        passed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plate() -> LayerCoefficients {
        LayerCoefficients {
            deflection: 0.35,
            absorption: 0.15,
            dispersion: 0.3,
            geometry: Susceptibility::new(0.7, 0.3),
            energy: Susceptibility::new(90.0, 0.35),
            rigidity: Susceptibility::new(0.8, 0.4),
        }
    }

    fn packet(amount: f32, momentum: f32, geometry: f32, rigidity: f32) -> LayerPacket {
        LayerPacket {
            amount,
            momentum,
            geometry,
            rigidity,
        }
    }

    #[test]
    fn test_sword_cut_deflects_off_plate() {
        let result = resolve_layer(&packet(24.0, 80.0, 0.7, 0.6), &plate(), 0.0);
        assert_eq!(result.verdict, LayerVerdict::Deflected);
        assert_eq!(result.passed, LayerPacket::default());
    }

    #[test]
    fn test_heavy_blunt_blow_is_partial() {
        // Shielded momentum 200 * 0.5525 clears the energy threshold
        let result = resolve_layer(&packet(40.0, 200.0, 0.1, 0.95), &plate(), 0.0);
        assert_eq!(result.verdict, LayerVerdict::Partial);
        assert!(result.breach.energy);
        assert!(result.breach.rigidity);
        assert!(!result.breach.geometry);
        assert!(result.passed.amount > 0.0);
        assert_eq!(result.passed.geometry, 0.0);
    }

    #[test]
    fn test_penetration_lowers_geometry_threshold() {
        let p = packet(10.0, 20.0, 0.95, 0.85);
        let without = resolve_layer(&p, &plate(), 0.0);
        let with = resolve_layer(&p, &plate(), 0.1);
        // 0.95 * 0.7 = 0.665: below 0.7, above 0.6
        assert!(!without.breach.geometry);
        assert!(with.breach.geometry);
        assert_eq!(with.verdict, LayerVerdict::Penetrated);
    }

    #[test]
    fn test_transfer_is_weighted_by_breached_axes() {
        let open = LayerCoefficients {
            deflection: 0.0,
            absorption: 0.0,
            dispersion: 0.0,
            geometry: Susceptibility::new(0.0, 1.0),
            energy: Susceptibility::new(0.0, 1.0),
            rigidity: Susceptibility::new(0.0, 1.0),
        };
        let result = resolve_layer(&packet(10.0, 10.0, 0.5, 0.5), &open, 0.0);
        assert!((result.passed.amount - 10.0).abs() < 1e-5);
        assert_eq!(result.verdict, LayerVerdict::Penetrated);
    }

    #[test]
    fn test_more_shielding_never_passes_more() {
        let p = packet(30.0, 120.0, 0.55, 0.9);
        let mut previous = f32::MAX;
        for step in 0..=10 {
            let coeffs = LayerCoefficients {
                deflection: step as f32 * 0.1,
                ..plate()
            };
            let passed = resolve_layer(&p, &coeffs, 0.0).passed.amount;
            assert!(passed <= previous + 1e-6);
            previous = passed;
        }
    }

    #[test]
    fn test_bypassed_layer_passes_everything() {
        let p = packet(30.0, 120.0, 0.55, 0.9);
        let result = LayerResult::bypassed(&p);
        assert_eq!(result.passed, p);
        assert_eq!(result.verdict, LayerVerdict::Bypassed);
    }
}
