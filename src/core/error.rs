use thiserror::Error;

use crate::core::types::AgentId;

#[derive(Error, Debug)]
pub enum CombatError {
    #[error("Unknown weapon: {0}")]
    UnknownWeapon(String),

    #[error("Unknown technique: {0}")]
    UnknownTechnique(String),

    #[error("Unknown armour material: {0}")]
    UnknownArmourMaterial(String),

    #[error("Unknown armour piece: {0}")]
    UnknownArmourPiece(String),

    #[error("Unknown tissue material: {0}")]
    UnknownTissueMaterial(String),

    #[error("Unknown tissue template: {0}")]
    UnknownTissueTemplate(String),

    #[error("Unknown body plan: {0}")]
    UnknownBodyPlan(String),

    #[error("Unknown species: {0}")]
    UnknownSpecies(String),

    #[error("Body plan {plan} has no part named {part}")]
    UnknownBodyPart { plan: String, part: String },

    #[error("Combatant not found: {0:?}")]
    UnknownCombatant(AgentId),

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Data audit failed: {errors} error(s), {warnings} warning(s)")]
    AuditFailed { errors: usize, warnings: usize },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl CombatError {
    /// Data-integrity errors abort the whole tick; everything else is
    /// reported at the boundary that produced it.
    pub fn is_data_integrity(&self) -> bool {
        matches!(
            self,
            CombatError::UnknownWeapon(_)
                | CombatError::UnknownTechnique(_)
                | CombatError::UnknownArmourMaterial(_)
                | CombatError::UnknownArmourPiece(_)
                | CombatError::UnknownTissueMaterial(_)
                | CombatError::UnknownTissueTemplate(_)
                | CombatError::UnknownBodyPlan(_)
                | CombatError::UnknownSpecies(_)
                | CombatError::UnknownBodyPart { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CombatError>;
