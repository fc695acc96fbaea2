//! Hit location selection and guard modifiers
//!
//! The defender's exposure map is re-weighted by the attack's target
//! heights and side preference, then sampled once. The map itself is never
//! touched; normalisation happens at draw time.

use crate::combat::body::Height;
use crate::combat::constants::{
    OTHER_HEIGHT_WEIGHT, PRIMARY_HEIGHT_WEIGHT, SECONDARY_HEIGHT_WEIGHT, SIDE_PREFERENCE_BONUS,
};
use crate::combat::exposure::{ExposureMap, Orientation, PartExposure};
use crate::combat::random::{RandomSource, RandomStream};
use crate::combat::stance::Guard;
use crate::combat::technique::{SidePreference, Technique};
use crate::core::config::ResolutionConfig;

/// Where an attack is aimed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttackProfile {
    pub primary: Option<Height>,
    pub secondary: Option<Height>,
    pub side: SidePreference,
}

impl AttackProfile {
    pub fn from_technique(technique: &Technique) -> Self {
        Self {
            primary: technique.target_height,
            secondary: technique.secondary_height,
            side: technique.side_preference,
        }
    }

    fn height_factor(&self, height: Height) -> f32 {
        match self.primary {
            None => PRIMARY_HEIGHT_WEIGHT,
            Some(p) if p == height => PRIMARY_HEIGHT_WEIGHT,
            _ if self.secondary == Some(height) => SECONDARY_HEIGHT_WEIGHT,
            _ => OTHER_HEIGHT_WEIGHT,
        }
    }

    fn side_factor(&self, orientation: Option<Orientation>) -> f32 {
        let preferred = match self.side {
            SidePreference::Any => return 1.0,
            SidePreference::Lead => Orientation::Lead,
            SidePreference::Rear => Orientation::Rear,
        };
        if orientation == Some(preferred) {
            1.0 + SIDE_PREFERENCE_BONUS
        } else {
            1.0
        }
    }
}

/// Selection weight of one exposed part
pub fn location_weight(exposure: &PartExposure, profile: &AttackProfile) -> f32 {
    (exposure.weight * profile.height_factor(exposure.height) * profile.side_factor(exposure.orientation))
        .max(0.0)
}

/// Draw the struck part; `None` when nothing is exposed
pub fn select_location<'m>(
    map: &'m ExposureMap,
    profile: &AttackProfile,
    rng: &mut impl RandomSource,
) -> Option<&'m PartExposure> {
    let weights: Vec<f32> = map.iter().map(|e| location_weight(e, profile)).collect();
    let total: f32 = weights.iter().sum();
    if !(total > 0.0) {
        return None;
    }

    let target = rng.draw(RandomStream::Location).clamp(0.0, 1.0) * total;
    let mut cumulative = 0.0;
    let mut last = None;
    for (entry, &w) in map.iter().zip(&weights) {
        if w <= 0.0 {
            continue;
        }
        cumulative += w;
        last = Some(entry);
        if target < cumulative {
            return Some(entry);
        }
    }
    last
}

/// Hit-chance change from the defender's guard
///
/// Full penalty at the guarded height, a smaller one next to it when the
/// guard covers adjacent heights, and a bonus for any height it leaves open.
pub fn guard_modifier(
    attack_height: Option<Height>,
    guard: Option<Guard>,
    config: &ResolutionConfig,
) -> f32 {
    let (Some(height), Some(guard)) = (attack_height, guard) else {
        return 0.0;
    };
    if height == guard.height {
        -config.guard_penalty
    } else if guard.covers_adjacent && height.is_adjacent(guard.height) {
        -config.adjacent_guard_penalty
    } else {
        config.opening_bonus
    }
}
