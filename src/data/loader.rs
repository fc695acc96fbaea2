//! Table files on disk
//!
//! One document may carry any mix of table kinds. TOML uses arrays of
//! tables (`[[weapons]]`), JSON the same keys as arrays.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::combat::armor::{ArmourMaterial, ArmourPiece};
use crate::combat::body::BodyPlan;
use crate::combat::species::Species;
use crate::combat::technique::Technique;
use crate::combat::tissue::{TissueMaterial, TissueTemplate};
use crate::combat::weapons::WeaponTemplate;
use crate::core::error::Result;
use crate::data::scenario::CombatScenario;
use crate::data::CombatTables;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TableFile {
    pub weapons: Vec<WeaponTemplate>,
    pub techniques: Vec<Technique>,
    pub armour_materials: Vec<ArmourMaterial>,
    pub armour_pieces: Vec<ArmourPiece>,
    pub tissue_materials: Vec<TissueMaterial>,
    pub tissue_templates: Vec<TissueTemplate>,
    pub body_plans: Vec<BodyPlan>,
    pub species: Vec<Species>,
    /// Expected-outcome fixtures for the resolution pipeline
    pub scenarios: Vec<CombatScenario>,
}

impl TableFile {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load by extension: `.json` is JSON, anything else TOML
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let is_json = path.extension().map_or(false, |ext| ext == "json");
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    pub fn len(&self) -> usize {
        self.weapons.len()
            + self.techniques.len()
            + self.armour_materials.len()
            + self.armour_pieces.len()
            + self.tissue_materials.len()
            + self.tissue_templates.len()
            + self.body_plans.len()
            + self.species.len()
            + self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CombatTables {
    /// Load a file and merge it over the current tables
    pub fn load_file(&mut self, path: &Path) -> Result<usize> {
        let file = TableFile::load(path)?;
        let count = file.len();
        self.merge(file);
        tracing::info!("Loaded {} table entries from {}", count, path.display());
        Ok(count)
    }

    /// Load every `.toml` and `.json` file under a directory, in name order
    pub fn load_directory(&mut self, path: &Path) -> Result<usize> {
        let mut files: Vec<_> = fs::read_dir(path)?
            .collect::<std::io::Result<Vec<_>>>()?
            .into_iter()
            .map(|entry| entry.path())
            .collect();
        files.sort();

        let mut total = 0;
        for file in files {
            if file.is_dir() {
                total += self.load_directory(&file)?;
            } else if file
                .extension()
                .map_or(false, |ext| ext == "toml" || ext == "json")
            {
                total += self.load_file(&file)?;
            }
        }
        Ok(total)
    }
}
