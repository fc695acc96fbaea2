//! Fixed model constants
//!
//! These shape the model itself and are not exposed for tuning. Tunable
//! numbers live in `core::config::ResolutionConfig`.

// Hit location height weighting
pub const PRIMARY_HEIGHT_WEIGHT: f32 = 1.0;
pub const SECONDARY_HEIGHT_WEIGHT: f32 = 0.5;
pub const OTHER_HEIGHT_WEIGHT: f32 = 0.1;
/// Multiplier for parts on the side the attack prefers (lead or rear)
pub const SIDE_PREFERENCE_BONUS: f32 = 0.5;

// Axis shares of the amount that breaches a layer (sum to 1.0)
pub const GEOMETRY_TRANSFER_WEIGHT: f32 = 0.45;
pub const ENERGY_TRANSFER_WEIGHT: f32 = 0.35;
pub const RIGIDITY_TRANSFER_WEIGHT: f32 = 0.20;

/// Amounts below this are treated as fully stopped
pub const NEGLIGIBLE_AMOUNT: f32 = 0.01;

// Exposure stages
pub const EXTENSION_EXPOSURE_SCALE: f32 = 0.6;
pub const EXTENSION_CORE_COVER: f32 = 0.1;
pub const BLADED_LEAD_MULT: f32 = 1.3;
pub const BLADED_REAR_MULT: f32 = 0.6;
pub const BLADED_CENTER_MULT: f32 = 0.85;
pub const FLANK_REAR_MULT: f32 = 1.4;
pub const FLANK_LEAD_MULT: f32 = 0.8;
/// Inside/outside lines favour one side slightly
pub const LINE_SIDE_MULT: f32 = 1.15;
pub const CROUCH_SUPPORT_COVER: f32 = 0.4;
pub const CROUCH_HIGH_EXPOSE: f32 = 0.15;
pub const LEAN_HIGH_SHIFT: f32 = 0.2;
pub const LEAN_SUPPORT_SHIFT: f32 = 0.15;

// Engagement bounds
pub const CONTROL_MIN: f32 = -1.0;
pub const CONTROL_MAX: f32 = 1.0;
