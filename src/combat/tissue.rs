//! Tissue templates and the tissue walk
//!
//! Same layer algorithm as armour, but every layer keeps what it absorbed.
//! Penetration depth and destroyed volume are tracked separately: a narrow
//! point goes deep through little volume, a heavy edge wrecks volume near
//! the surface.

use serde::{Deserialize, Serialize};

use crate::combat::penetration::{resolve_layer, LayerCoefficients, LayerPacket, LayerVerdict};
use crate::core::config::ResolutionConfig;
use crate::core::error::Result;
use crate::data::DataTables;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TissueMaterial {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub layer: LayerCoefficients,
    /// Bone, tendon: loss here can take the part off
    #[serde(default)]
    pub structural: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TissueLayerDef {
    pub material: String,
    pub thickness_ratio: f32,
}

/// Ordered layer stack, outermost first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TissueTemplate {
    pub id: String,
    pub name: String,
    pub layers: Vec<TissueLayerDef>,
}

impl TissueTemplate {
    pub fn thickness_total(&self) -> f32 {
        self.layers.iter().map(|l| l.thickness_ratio).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TissueLayerDamage {
    pub material: String,
    pub thickness_ratio: f32,
    pub structural: bool,
    pub verdict: LayerVerdict,
    /// Amount the layer soaked up
    pub deposited: f32,
    /// Fraction of the layer's volume destroyed, 0..1
    pub volume_loss: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TissueOutcome {
    pub layers: Vec<TissueLayerDamage>,
    /// Thickness fraction the point or edge travelled, 0..1
    pub depth: f32,
    /// What came out the far side
    pub exit: LayerPacket,
}

impl TissueOutcome {
    /// Thickness-weighted volume loss over all layers
    pub fn volume_loss(&self) -> f32 {
        weighted_loss(self.layers.iter())
    }

    /// Thickness-weighted volume loss over structural layers only
    pub fn structural_loss(&self) -> f32 {
        weighted_loss(self.layers.iter().filter(|l| l.structural))
    }
}

pub(crate) fn weighted_loss<'a>(layers: impl Iterator<Item = &'a TissueLayerDamage>) -> f32 {
    let (loss, thickness) = layers.fold((0.0, 0.0), |(loss, thickness), l| {
        (loss + l.volume_loss * l.thickness_ratio, thickness + l.thickness_ratio)
    });
    if thickness > 0.0 {
        (loss / thickness).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Walk a packet through a part's tissue stack
pub fn resolve_tissue<T: DataTables + ?Sized>(
    tables: &T,
    template: &TissueTemplate,
    packet: LayerPacket,
    penetration: f32,
    thickness_cm: f32,
    config: &ResolutionConfig,
) -> Result<TissueOutcome> {
    let mut current = packet;
    let mut layers = Vec::with_capacity(template.layers.len());
    let mut depth = 0.0;
    let mut depth_open = true;

    for def in &template.layers {
        if current.is_spent() {
            break;
        }
        let material = tables.tissue_material(&def.material)?;
        let result = resolve_layer(&current, &material.layer, penetration);

        let deflection = material.layer.deflection.clamp(0.0, 1.0);
        let deposited = (current.amount * (1.0 - deflection) - result.passed.amount).max(0.0);
        let capacity = def.thickness_ratio * thickness_cm * config.layer_capacity_per_cm;
        let width = config.volume_width_floor + (1.0 - current.geometry).clamp(0.0, 1.0);
        let volume_loss = if capacity > 0.0 {
            (deposited * width / capacity).min(1.0)
        } else if deposited > 0.0 {
            1.0
        } else {
            0.0
        };

        if depth_open {
            if result.breach.geometry {
                depth += def.thickness_ratio;
            } else {
                if current.geometry > 0.0 {
                    depth += def.thickness_ratio * 0.5;
                }
                depth_open = false;
            }
        }

        tracing::debug!(
            "Tissue layer {}: {:?}, deposited {:.2}, volume {:.2}",
            material.id,
            result.verdict,
            deposited,
            volume_loss
        );

        layers.push(TissueLayerDamage {
            material: material.id.clone(),
            thickness_ratio: def.thickness_ratio,
            structural: material.structural,
            verdict: result.verdict,
            deposited,
            volume_loss,
        });
        current = result.passed;
    }

    let total = template.thickness_total();
    let depth = if total > 0.0 {
        (depth / total).clamp(0.0, 1.0)
    } else {
        0.0
    };

    Ok(TissueOutcome {
        layers,
        depth,
        exit: current,
    })
}
