//! Armour materials, pieces and the armour walk
//!
//! A piece is one material over a set of coverage entries. Each entry names
//! part tags, an optional side, the layer slot it occupies and how much of
//! the part it wraps. For a struck part the worn pieces are collected,
//! ordered outer to inner by slot, and walked with the shared layer
//! algorithm. A layer that does not wrap the struck facing is a gap.

use serde::{Deserialize, Serialize};

use crate::combat::body::{PartTag, Side};
use crate::combat::engagement::RelativeAngle;
use crate::combat::penetration::{resolve_layer, LayerCoefficients, LayerPacket, LayerResult, LayerVerdict};
use crate::core::error::Result;
use crate::data::DataTables;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmourMaterial {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub layer: LayerCoefficients,
}

/// Layer slot, outermost first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerSlot {
    Cloak,
    Outer,
    Mail,
    Padding,
}

/// Facing of the struck surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmourFacing {
    Front,
    Side,
    Back,
}

impl ArmourFacing {
    /// Surface presented to an attacker at this angle
    pub fn from_angle(angle: RelativeAngle) -> Self {
        match angle {
            RelativeAngle::Frontal | RelativeAngle::Inside | RelativeAngle::Outside => {
                ArmourFacing::Front
            }
            RelativeAngle::Flank => ArmourFacing::Side,
            RelativeAngle::Rear => ArmourFacing::Back,
        }
    }
}

/// How far round the part a coverage entry wraps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Totality {
    /// Front, sides and back
    Total,
    /// Front and sides
    Comprehensive,
    /// Front only
    Frontal,
}

impl Totality {
    pub fn covers(self, facing: ArmourFacing) -> bool {
        use ArmourFacing::*;
        use Totality::*;

        match (self, facing) {
            (Total, _) => true,
            (Comprehensive, Front | Side) => true,
            (Frontal, Front) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coverage {
    pub part_tags: Vec<PartTag>,
    /// `None` covers both sides
    #[serde(default)]
    pub side: Option<Side>,
    pub slot: LayerSlot,
    pub totality: Totality,
}

impl Coverage {
    pub fn covers_part(&self, tag: &PartTag, side: Side) -> bool {
        self.part_tags.contains(tag) && self.side.map_or(true, |s| s == side)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmourPiece {
    pub id: String,
    pub name: String,
    pub material: String,
    pub coverage: Vec<Coverage>,
}

/// A worn layer over one part, ready to walk
#[derive(Debug, Clone, Copy)]
pub struct ArmourLayer<'t> {
    pub piece: &'t ArmourPiece,
    pub material: &'t ArmourMaterial,
    pub slot: LayerSlot,
    pub totality: Totality,
}

/// Worn layers over a part, outermost first
///
/// Pieces keep their worn order within a slot.
pub fn layers_for<'t, T: DataTables + ?Sized>(
    tables: &'t T,
    worn: &[String],
    tag: &PartTag,
    side: Side,
) -> Result<Vec<ArmourLayer<'t>>> {
    let mut layers = Vec::new();
    for piece_id in worn {
        let piece = tables.armour_piece(piece_id)?;
        for coverage in piece.coverage.iter().filter(|c| c.covers_part(tag, side)) {
            let material = tables.armour_material(&piece.material)?;
            layers.push(ArmourLayer {
                piece,
                material,
                slot: coverage.slot,
                totality: coverage.totality,
            });
        }
    }
    layers.sort_by_key(|l| l.slot);
    Ok(layers)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmourLayerReport {
    pub piece: String,
    pub material: String,
    pub slot: LayerSlot,
    pub verdict: LayerVerdict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmourOutcome {
    pub layers: Vec<ArmourLayerReport>,
    /// Packet reaching the tissue
    pub passed: LayerPacket,
}

impl ArmourOutcome {
    /// Nothing reached the body
    pub fn stopped(&self) -> bool {
        self.passed.is_spent()
    }

    /// Stopped, with at least one layer turning the blow outright
    pub fn deflected(&self) -> bool {
        self.stopped()
            && self
                .layers
                .iter()
                .any(|l| l.verdict == LayerVerdict::Deflected)
    }
}

/// Walk the layers outer to inner
pub fn resolve_armour(
    packet: LayerPacket,
    penetration: f32,
    layers: &[ArmourLayer<'_>],
    facing: ArmourFacing,
) -> ArmourOutcome {
    let mut current = packet;
    let mut reports = Vec::with_capacity(layers.len());

    for layer in layers {
        if current.is_spent() {
            break;
        }
        let result = if layer.totality.covers(facing) {
            resolve_layer(&current, &layer.material.layer, penetration)
        } else {
            LayerResult::bypassed(&current)
        };
        tracing::debug!(
            "Armour layer {} ({}): {:?}",
            layer.piece.id,
            layer.material.id,
            result.verdict
        );
        reports.push(ArmourLayerReport {
            piece: layer.piece.id.clone(),
            material: layer.material.id.clone(),
            slot: layer.slot,
            verdict: result.verdict,
        });
        current = result.passed;
    }

    ArmourOutcome {
        layers: reports,
        passed: current,
    }
}
