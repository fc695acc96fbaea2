//! Melee resolution
//!
//! Stance and exposure synthesis, the per-tick scheduler, and the layered
//! damage pipeline from weapon to wound.

pub mod action;
pub mod armor;
pub mod body;
pub mod constants;
pub mod context;
pub mod damage;
pub mod engagement;
pub mod events;
pub mod exposure;
pub mod hit_location;
pub mod penetration;
pub mod random;
pub mod resolution;
pub mod scheduler;
pub mod species;
pub mod stance;
pub mod state;
pub mod stats;
pub mod technique;
pub mod tissue;
pub mod weapons;
pub mod wounds;

pub use action::{ActionId, ActionModifiers, ActionQueue, CommittedAction, Stakes};
pub use armor::{ArmourMaterial, ArmourOutcome, ArmourPiece, Coverage, LayerSlot, Totality};
pub use body::{BodyPartDef, BodyPlan, Height, PartTag, Side, WoundSeverity};
pub use context::{build_context, ResolutionContext, SkipReason};
pub use damage::{derive_packet, DamageKind, Packet};
pub use engagement::{Engagement, EngagementTable, RelativeAngle};
pub use events::{CombatEvent, EventLog, EventSink, OutcomeKind};
pub use exposure::{synthesize, ExposureMap, PartExposure};
pub use hit_location::{guard_modifier, select_location, AttackProfile};
pub use penetration::{resolve_layer, LayerCoefficients, LayerPacket, LayerVerdict};
pub use random::{RandomSource, RandomStream, ScriptedRandom, StreamRandom};
pub use resolution::{
    hit_chance, resolve_attack, strike_part, Blow, Outcome, ResolutionEntry, Strike, SynergyRules,
};
pub use scheduler::TickResolver;
pub use species::{NaturalWeapon, SizeModifiers, Species, Vitals};
pub use stance::{DeltaStanceCost, FlatStanceCost, GripCategory, Guard, Stance, StanceCost};
pub use state::{Combatant, Encounter};
pub use stats::{Accessor, CombatStats};
pub use technique::{AttackMode, DefenseKind, Technique, TechniqueRole};
pub use tissue::{resolve_tissue, TissueOutcome, TissueTemplate};
pub use weapons::{Reach, WeaponTemplate};
pub use wounds::{WoundLedger, WoundReport};
