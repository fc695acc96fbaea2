//! Arc Melee - tick-based melee resolution
//!
//! Stance-driven exposure, simultaneous action timing, and a layered
//! weapon → armour → tissue → wound pipeline over data tables.

pub mod combat;
pub mod core;
pub mod data;
