//! Static combat tables
//!
//! The resolution core only reads these through [`DataTables`]. How the
//! tables were produced (builtin, TOML, JSON) is none of its business.

pub mod audit;
pub mod builtin;
pub mod loader;
pub mod scenario;

use ahash::AHashMap;

use crate::combat::armor::{ArmourMaterial, ArmourPiece};
use crate::combat::body::BodyPlan;
use crate::combat::species::Species;
use crate::combat::technique::Technique;
use crate::combat::tissue::{TissueMaterial, TissueTemplate};
use crate::combat::weapons::WeaponTemplate;
use crate::core::error::{CombatError, Result};

pub use audit::{audit, AuditReport};
pub use loader::TableFile;
pub use scenario::{CombatScenario, ScenarioMeasure};

/// Read-only lookup by identifier
pub trait DataTables {
    fn weapon(&self, id: &str) -> Result<&WeaponTemplate>;
    fn technique(&self, id: &str) -> Result<&Technique>;
    fn armour_material(&self, id: &str) -> Result<&ArmourMaterial>;
    fn armour_piece(&self, id: &str) -> Result<&ArmourPiece>;
    fn tissue_material(&self, id: &str) -> Result<&TissueMaterial>;
    fn tissue_template(&self, id: &str) -> Result<&TissueTemplate>;
    fn body_plan(&self, id: &str) -> Result<&BodyPlan>;
    fn species(&self, id: &str) -> Result<&Species>;
}

/// In-memory registry of every table kind
#[derive(Debug, Clone, Default)]
pub struct CombatTables {
    weapons: AHashMap<String, WeaponTemplate>,
    techniques: AHashMap<String, Technique>,
    armour_materials: AHashMap<String, ArmourMaterial>,
    armour_pieces: AHashMap<String, ArmourPiece>,
    tissue_materials: AHashMap<String, TissueMaterial>,
    tissue_templates: AHashMap<String, TissueTemplate>,
    body_plans: AHashMap<String, BodyPlan>,
    species: AHashMap<String, Species>,
    /// Fixtures only; resolution never reads these
    scenarios: AHashMap<String, CombatScenario>,
}

impl CombatTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_weapon(&mut self, weapon: WeaponTemplate) {
        self.weapons.insert(weapon.id.clone(), weapon);
    }

    pub fn insert_technique(&mut self, technique: Technique) {
        self.techniques.insert(technique.id.clone(), technique);
    }

    pub fn insert_armour_material(&mut self, material: ArmourMaterial) {
        self.armour_materials.insert(material.id.clone(), material);
    }

    pub fn insert_armour_piece(&mut self, piece: ArmourPiece) {
        self.armour_pieces.insert(piece.id.clone(), piece);
    }

    pub fn insert_tissue_material(&mut self, material: TissueMaterial) {
        self.tissue_materials.insert(material.id.clone(), material);
    }

    pub fn insert_tissue_template(&mut self, template: TissueTemplate) {
        self.tissue_templates.insert(template.id.clone(), template);
    }

    pub fn insert_body_plan(&mut self, plan: BodyPlan) {
        self.body_plans.insert(plan.id.clone(), plan);
    }

    pub fn insert_species(&mut self, species: Species) {
        self.species.insert(species.id.clone(), species);
    }

    pub fn insert_scenario(&mut self, scenario: CombatScenario) {
        self.scenarios.insert(scenario.id.clone(), scenario);
    }

    /// Fold a loaded file in; later entries replace earlier ones by id
    pub fn merge(&mut self, file: TableFile) {
        file.weapons.into_iter().for_each(|w| self.insert_weapon(w));
        file.techniques.into_iter().for_each(|t| self.insert_technique(t));
        file.armour_materials
            .into_iter()
            .for_each(|m| self.insert_armour_material(m));
        file.armour_pieces
            .into_iter()
            .for_each(|p| self.insert_armour_piece(p));
        file.tissue_materials
            .into_iter()
            .for_each(|m| self.insert_tissue_material(m));
        file.tissue_templates
            .into_iter()
            .for_each(|t| self.insert_tissue_template(t));
        file.body_plans.into_iter().for_each(|p| self.insert_body_plan(p));
        file.species.into_iter().for_each(|s| self.insert_species(s));
        file.scenarios.into_iter().for_each(|s| self.insert_scenario(s));
    }

    /// Total entries across every table
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

    /// Entries sorted by id, for stable reports
    fn sorted<V>(map: &AHashMap<String, V>) -> Vec<&V> {
        let mut keys: Vec<&String> = map.keys().collect();
        keys.sort();
        keys.into_iter().filter_map(|k| map.get(k)).collect()
    }

    pub fn weapons(&self) -> Vec<&WeaponTemplate> {
        Self::sorted(&self.weapons)
    }

    pub fn techniques(&self) -> Vec<&Technique> {
        Self::sorted(&self.techniques)
    }

    pub fn armour_materials(&self) -> Vec<&ArmourMaterial> {
        Self::sorted(&self.armour_materials)
    }

    pub fn armour_pieces(&self) -> Vec<&ArmourPiece> {
        Self::sorted(&self.armour_pieces)
    }

    pub fn tissue_materials(&self) -> Vec<&TissueMaterial> {
        Self::sorted(&self.tissue_materials)
    }

    pub fn tissue_templates(&self) -> Vec<&TissueTemplate> {
        Self::sorted(&self.tissue_templates)
    }

    pub fn body_plans(&self) -> Vec<&BodyPlan> {
        Self::sorted(&self.body_plans)
    }

    pub fn all_species(&self) -> Vec<&Species> {
        Self::sorted(&self.species)
    }

    pub fn scenarios(&self) -> Vec<&CombatScenario> {
        Self::sorted(&self.scenarios)
    }
}

impl DataTables for CombatTables {
    fn weapon(&self, id: &str) -> Result<&WeaponTemplate> {
        self.weapons
            .get(id)
            .ok_or_else(|| CombatError::UnknownWeapon(id.to_string()))
    }

    fn technique(&self, id: &str) -> Result<&Technique> {
        self.techniques
            .get(id)
            .ok_or_else(|| CombatError::UnknownTechnique(id.to_string()))
    }

    fn armour_material(&self, id: &str) -> Result<&ArmourMaterial> {
        self.armour_materials
            .get(id)
            .ok_or_else(|| CombatError::UnknownArmourMaterial(id.to_string()))
    }

    fn armour_piece(&self, id: &str) -> Result<&ArmourPiece> {
        self.armour_pieces
            .get(id)
            .ok_or_else(|| CombatError::UnknownArmourPiece(id.to_string()))
    }

    fn tissue_material(&self, id: &str) -> Result<&TissueMaterial> {
        self.tissue_materials
            .get(id)
            .ok_or_else(|| CombatError::UnknownTissueMaterial(id.to_string()))
    }

    fn tissue_template(&self, id: &str) -> Result<&TissueTemplate> {
        self.tissue_templates
            .get(id)
            .ok_or_else(|| CombatError::UnknownTissueTemplate(id.to_string()))
    }

    fn body_plan(&self, id: &str) -> Result<&BodyPlan> {
        self.body_plans
            .get(id)
            .ok_or_else(|| CombatError::UnknownBodyPlan(id.to_string()))
    }

    fn species(&self, id: &str) -> Result<&Species> {
        self.species
            .get(id)
            .ok_or_else(|| CombatError::UnknownSpecies(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_unknown_ids() {
        let tables = CombatTables::new();
        assert!(matches!(
            tables.weapon("glaive"),
            Err(CombatError::UnknownWeapon(_))
        ));
        assert!(matches!(
            tables.tissue_template("tentacle"),
            Err(CombatError::UnknownTissueTemplate(_))
        ));
        assert!(matches!(
            tables.species("troll"),
            Err(CombatError::UnknownSpecies(_))
        ));
        assert!(tables.is_empty());
    }

    #[test]
    fn test_merge_replaces_by_id() {
        let mut tables = CombatTables::new();
        tables.insert_weapon(WeaponTemplate::axe());

        let mut heavier = WeaponTemplate::axe();
        heavier.weight_kg = 3.0;
        tables.merge(TableFile {
            weapons: vec![heavier],
            ..TableFile::default()
        });

        assert_eq!(tables.weapon("axe").unwrap().weight_kg, 3.0);
        assert_eq!(tables.weapons().len(), 1);
    }

    #[test]
    fn test_sorted_listing() {
        let mut tables = CombatTables::new();
        tables.insert_weapon(WeaponTemplate::mace());
        tables.insert_weapon(WeaponTemplate::axe());
        let ids: Vec<&str> = tables.weapons().iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["axe", "mace"]);
    }
}
