//! Wound system: severity mapping and per-part wound state
//!
//! Tissue damage accumulates per part. Severity is derived from three
//! numbers: thickness-weighted volume loss, structural (bone, tendon) loss
//! and penetration depth. Only high volume loss together with structural
//! loss takes a part off; depth alone tops out below that.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::combat::body::{BodyPartDef, BodyPlan, PartTag, WoundSeverity};
use crate::combat::tissue::{weighted_loss, TissueLayerDamage, TissueOutcome};
use crate::core::config::ResolutionConfig;

/// Map accumulated damage to a severity
pub fn map_severity(
    structural_loss: f32,
    volume_loss: f32,
    depth: f32,
    vital: bool,
    config: &ResolutionConfig,
) -> WoundSeverity {
    use WoundSeverity::*;

    if structural_loss >= config.destroy_structural_loss && volume_loss >= config.destroy_volume_loss
    {
        return Destroyed;
    }

    let mut score = volume_loss
        .max(structural_loss)
        .max(depth * config.depth_severity_weight);
    if vital {
        score *= config.vital_severity_factor;
    }

    if score >= config.critical_threshold {
        Critical
    } else if score >= config.serious_threshold {
        Serious
    } else if score >= config.minor_threshold {
        Minor
    } else if score >= config.scratch_threshold {
        Scratch
    } else {
        None
    }
}

/// Capabilities a wound takes away
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct CapabilityLoss {
    pub grasp: bool,
    pub stand: bool,
    pub sight: bool,
    pub hearing: bool,
    pub severed: bool,
    pub arterial_bleed: bool,
    pub incapacitating: bool,
}

impl CapabilityLoss {
    pub fn any(&self) -> bool {
        self.grasp
            || self.stand
            || self.sight
            || self.hearing
            || self.severed
            || self.arterial_bleed
            || self.incapacitating
    }
}

/// Capabilities lost at a given severity of a given part
pub fn capability_loss(part: &BodyPartDef, severity: WoundSeverity, depth: f32) -> CapabilityLoss {
    let disabled = severity >= WoundSeverity::Serious;
    CapabilityLoss {
        grasp: part.flags.can_grasp && disabled,
        stand: part.flags.can_stand && disabled,
        sight: part.flags.can_see && disabled,
        hearing: part.flags.can_hear && severity >= WoundSeverity::Critical,
        severed: severity == WoundSeverity::Destroyed && !part.flags.internal,
        arterial_bleed: part.has_major_artery && disabled && depth >= 0.5,
        incapacitating: part.flags.vital && severity >= WoundSeverity::Critical,
    }
}

/// Accumulated damage on one part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartWound {
    pub part: String,
    pub tag: PartTag,
    pub layers: Vec<TissueLayerDamage>,
    pub depth: f32,
    pub severity: WoundSeverity,
    pub lost: CapabilityLoss,
}

impl PartWound {
    fn new(part: &BodyPartDef) -> Self {
        Self {
            part: part.name.clone(),
            tag: part.tag.clone(),
            layers: Vec::new(),
            depth: 0.0,
            severity: WoundSeverity::None,
            lost: CapabilityLoss::default(),
        }
    }

    pub fn volume_loss(&self) -> f32 {
        weighted_loss(self.layers.iter())
    }

    pub fn structural_loss(&self) -> f32 {
        weighted_loss(self.layers.iter().filter(|l| l.structural))
    }

    fn absorb(&mut self, outcome: &TissueOutcome) {
        for (i, fresh) in outcome.layers.iter().enumerate() {
            match self.layers.get_mut(i) {
                Some(layer) => {
                    layer.deposited += fresh.deposited;
                    layer.volume_loss = (layer.volume_loss + fresh.volume_loss).min(1.0);
                    layer.verdict = fresh.verdict;
                }
                None => self.layers.push(fresh.clone()),
            }
        }
        self.depth = self.depth.max(outcome.depth);
    }
}

/// What one hit did to a part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WoundReport {
    pub part: String,
    pub tag: PartTag,
    pub before: WoundSeverity,
    pub severity: WoundSeverity,
    pub depth: f32,
    pub volume_loss: f32,
    pub structural_loss: f32,
    /// Capabilities lost by this hit (not already lost)
    pub lost: CapabilityLoss,
    /// Parts taken off with this one
    pub severed: Vec<String>,
}

impl WoundReport {
    pub fn escalated(&self) -> bool {
        self.severity > self.before
    }
}

/// Every wound a combatant carries
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WoundLedger {
    parts: BTreeMap<String, PartWound>,
    severed: BTreeSet<String>,
}

impl WoundLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one tissue outcome into the struck part
    ///
    /// Severity never decreases. A destroyed external part is severed
    /// together with everything below it.
    pub fn apply(
        &mut self,
        plan: &BodyPlan,
        part: &BodyPartDef,
        outcome: &TissueOutcome,
        config: &ResolutionConfig,
    ) -> WoundReport {
        let wound = self
            .parts
            .entry(part.name.clone())
            .or_insert_with(|| PartWound::new(part));

        let before = wound.severity;
        wound.absorb(outcome);
        let mapped = map_severity(
            wound.structural_loss(),
            wound.volume_loss(),
            wound.depth,
            part.flags.vital,
            config,
        );
        wound.severity = before.max(mapped);

        let total = capability_loss(part, wound.severity, wound.depth);
        let fresh = CapabilityLoss {
            grasp: total.grasp && !wound.lost.grasp,
            stand: total.stand && !wound.lost.stand,
            sight: total.sight && !wound.lost.sight,
            hearing: total.hearing && !wound.lost.hearing,
            severed: total.severed && !wound.lost.severed,
            arterial_bleed: total.arterial_bleed && !wound.lost.arterial_bleed,
            incapacitating: total.incapacitating && !wound.lost.incapacitating,
        };
        wound.lost = total;

        let report = WoundReport {
            part: wound.part.clone(),
            tag: wound.tag.clone(),
            before,
            severity: wound.severity,
            depth: wound.depth,
            volume_loss: wound.volume_loss(),
            structural_loss: wound.structural_loss(),
            lost: fresh,
            severed: Vec::new(),
        };

        if fresh.severed {
            let mut severed = vec![part.name.clone()];
            severed.extend(plan.descendants(&part.name).iter().map(|p| p.name.clone()));
            self.severed.extend(severed.iter().cloned());
            tracing::debug!("Severed {} ({} parts)", part.name, severed.len());
            return WoundReport { severed, ..report };
        }
        report
    }

    pub fn get(&self, part: &str) -> Option<&PartWound> {
        self.parts.get(part)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PartWound> {
        self.parts.values()
    }

    pub fn severity(&self, part: &str) -> WoundSeverity {
        if self.severed.contains(part) {
            return WoundSeverity::Destroyed;
        }
        self.parts
            .get(part)
            .map(|w| w.severity)
            .unwrap_or_default()
    }

    pub fn is_severed(&self, part: &str) -> bool {
        self.severed.contains(part)
    }

    /// Part cannot be used for its capability
    pub fn is_disabled(&self, part: &str) -> bool {
        self.severity(part) >= WoundSeverity::Serious
    }

    pub fn worst(&self) -> WoundSeverity {
        self.parts
            .values()
            .map(|w| w.severity)
            .max()
            .unwrap_or_default()
    }

    /// Any grasping part still usable
    pub fn can_grasp(&self, plan: &BodyPlan) -> bool {
        plan.parts
            .iter()
            .filter(|p| p.flags.can_grasp)
            .any(|p| !self.is_disabled(&p.name))
    }

    /// Every standing part still usable
    pub fn can_stand(&self, plan: &BodyPlan) -> bool {
        plan.parts
            .iter()
            .filter(|p| p.flags.can_stand)
            .all(|p| !self.is_disabled(&p.name))
    }

    pub fn is_bleeding(&self) -> bool {
        self.parts.values().any(|w| w.lost.arterial_bleed)
    }

    /// Parts with an open artery
    pub fn bleeding_parts(&self) -> usize {
        self.parts.values().filter(|w| w.lost.arterial_bleed).count()
    }

    /// Out of the fight
    ///
    /// A vital part at Critical, or accumulated wounds worth 10 points
    /// (Scratch 1, Minor 2, Serious 4, Critical 10).
    pub fn is_incapacitated(&self, plan: &BodyPlan) -> bool {
        if self.is_dead(plan) {
            return true;
        }
        if self.parts.values().any(|w| w.lost.incapacitating) {
            return true;
        }

        let total: u32 = self
            .parts
            .values()
            .map(|w| match w.severity {
                WoundSeverity::None => 0,
                WoundSeverity::Scratch => 1,
                WoundSeverity::Minor => 2,
                WoundSeverity::Serious => 4,
                WoundSeverity::Critical | WoundSeverity::Destroyed => 10,
            })
            .sum();
        total >= 10
    }

    /// A vital part destroyed, or a vital part critical while bleeding out
    pub fn is_dead(&self, plan: &BodyPlan) -> bool {
        let vital = |name: &str| plan.part(name).map_or(false, |p| p.flags.vital);
        self.parts.values().any(|w| {
            vital(&w.part)
                && (w.severity == WoundSeverity::Destroyed
                    || (w.severity >= WoundSeverity::Critical && self.is_bleeding()))
        })
    }
}
