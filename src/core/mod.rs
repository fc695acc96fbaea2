pub mod config;
pub mod error;
pub mod types;

pub use config::{ResolutionConfig, StakesTable, StakesTier};
pub use error::{CombatError, Result};
pub use types::{AgentId, TeamId, Tick, TickTime};
