//! Cross-reference audit of combat tables
//!
//! Errors mean a lookup can fail mid-tick. Warnings flag data that loads
//! fine but is probably mis-authored.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::combat::penetration::{LayerCoefficients, Susceptibility};
use crate::combat::technique::AttackMode;
use crate::core::error::{CombatError, Result};
use crate::data::{CombatTables, DataTables};

/// Thickness ratios of a template may stray this far from 1.0
pub const THICKNESS_TOLERANCE: f32 = 0.05;

/// Combined shielding above this is suspicious
pub const MAX_SHIELDING: f32 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Weapon,
    Technique,
    ArmourMaterial,
    ArmourPiece,
    TissueTemplate,
    BodyPlan,
    Species,
    Scenario,
}

impl Table {
    fn label(self) -> &'static str {
        match self {
            Table::Weapon => "weapon",
            Table::Technique => "technique",
            Table::ArmourMaterial => "armour material",
            Table::ArmourPiece => "armour piece",
            Table::TissueTemplate => "tissue template",
            Table::BodyPlan => "body plan",
            Table::Species => "species",
            Table::Scenario => "scenario",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditIssue {
    pub table: Table,
    pub id: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditReport {
    pub errors: Vec<AuditIssue>,
    pub warnings: Vec<AuditIssue>,
}

impl AuditReport {
    fn error(&mut self, table: Table, id: &str, message: impl Into<String>) {
        self.errors.push(AuditIssue {
            table,
            id: id.to_string(),
            message: message.into(),
        });
    }

    fn warn(&mut self, table: Table, id: &str, message: impl Into<String>) {
        self.warnings.push(AuditIssue {
            table,
            id: id.to_string(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    /// `Err(AuditFailed)` when any error was found
    pub fn into_result(self) -> Result<AuditReport> {
        if self.has_errors() {
            Err(CombatError::AuditFailed {
                errors: self.errors.len(),
                warnings: self.warnings.len(),
            })
        } else {
            Ok(self)
        }
    }

    pub fn to_markdown(&self) -> String {
        let mut out = String::from("# Combat Data Audit\n\n");
        let _ = writeln!(
            out,
            "- Errors: {}\n- Warnings: {}\n",
            self.errors.len(),
            self.warnings.len()
        );
        for (title, issues) in [("Errors", &self.errors), ("Warnings", &self.warnings)] {
            if issues.is_empty() {
                continue;
            }
            let _ = writeln!(out, "## {}\n", title);
            for issue in issues {
                let _ = writeln!(out, "- **{}** `{}`: {}", issue.table.label(), issue.id, issue.message);
            }
            out.push('\n');
        }
        out
    }
}

fn check_layer(report: &mut AuditReport, table: Table, id: &str, layer: &LayerCoefficients) {
    let shielding = layer.shielding_total();
    if shielding > MAX_SHIELDING {
        report.warn(
            table,
            id,
            format!("shielding total {:.2} exceeds {:.1}", shielding, MAX_SHIELDING),
        );
    }
    let axes: [(&str, Susceptibility); 3] = [
        ("geometry", layer.geometry),
        ("energy", layer.energy),
        ("rigidity", layer.rigidity),
    ];
    for (axis, s) in axes {
        if s.threshold == 0.0 && s.ratio < 1.0 {
            report.warn(
                table,
                id,
                format!("{} threshold is zero with ratio {:.2}", axis, s.ratio),
            );
        }
    }
}

/// Run every check over the tables
pub fn audit(tables: &CombatTables) -> AuditReport {
    let mut report = AuditReport::default();

    for weapon in tables.weapons() {
        let derived = [
            ("moment of inertia", weapon.moment_of_inertia),
            ("effective mass", weapon.effective_mass),
            ("reference energy", weapon.reference_energy_j),
            ("geometry coefficient", weapon.geometry_coeff),
            ("rigidity coefficient", weapon.rigidity_coeff),
            ("weight", weapon.weight_kg),
            ("length", weapon.length_m),
        ];
        for (what, value) in derived {
            if value <= 0.0 {
                report.warn(Table::Weapon, &weapon.id, format!("{} is zero", what));
            }
        }
    }

    let weapons = tables.weapons();
    for technique in tables.techniques() {
        let id = &technique.id;
        if technique.is_offensive() {
            if technique.attack_mode == AttackMode::None {
                report.error(Table::Technique, id, "offensive technique names no weapon mode");
            } else if !weapons.iter().any(|w| w.supports(technique.attack_mode)) {
                report.warn(Table::Technique, id, "no weapon supports its attack mode");
            }
            if technique.damage.is_empty() {
                report.warn(Table::Technique, id, "offensive technique has no damage instances");
            }
        }
        if technique.attack_mode != AttackMode::None && !technique.channels.any() {
            report.warn(Table::Technique, id, "no channels defined for combat technique");
        }
        let bias = &technique.axis_bias;
        for (axis, value) in [
            ("geometry", bias.geometry),
            ("energy", bias.energy),
            ("rigidity", bias.rigidity),
        ] {
            if value <= 0.0 {
                report.warn(Table::Technique, id, format!("{} bias {:.2} is not positive", axis, value));
            }
        }
    }

    for material in tables.armour_materials() {
        check_layer(&mut report, Table::ArmourMaterial, &material.id, &material.layer);
    }

    for piece in tables.armour_pieces() {
        let id = &piece.id;
        if piece.material.is_empty() {
            report.error(Table::ArmourPiece, id, "no material");
        } else if tables.armour_material(&piece.material).is_err() {
            report.error(
                Table::ArmourPiece,
                id,
                format!("unknown material '{}'", piece.material),
            );
        }
        if piece.coverage.is_empty() {
            report.error(Table::ArmourPiece, id, "empty coverage");
        }
        if piece.coverage.iter().any(|c| c.part_tags.is_empty()) {
            report.warn(Table::ArmourPiece, id, "coverage entry without part tags");
        }
    }

    for template in tables.tissue_templates() {
        let id = &template.id;
        if template.layers.is_empty() {
            report.error(Table::TissueTemplate, id, "no layers");
            continue;
        }
        let total = template.thickness_total();
        if (total - 1.0).abs() > THICKNESS_TOLERANCE {
            report.warn(
                Table::TissueTemplate,
                id,
                format!("thickness ratios sum to {:.3}", total),
            );
        }
        for layer in &template.layers {
            if tables.tissue_material(&layer.material).is_err() {
                report.error(
                    Table::TissueTemplate,
                    id,
                    format!("unknown tissue material '{}'", layer.material),
                );
            }
        }
    }

    for plan in tables.body_plans() {
        for part in &plan.parts {
            let id = format!("{}.{}", plan.id, part.name);
            if part.tissue_template.is_empty() {
                report.error(Table::BodyPlan, &id, "no tissue template");
            } else if tables.tissue_template(&part.tissue_template).is_err() {
                report.error(
                    Table::BodyPlan,
                    &id,
                    format!("unknown tissue template '{}'", part.tissue_template),
                );
            }
            if let Some(parent) = &part.parent {
                if plan.part(parent).is_none() {
                    report.error(Table::BodyPlan, &id, format!("unknown parent '{}'", parent));
                }
            }
            let g = &part.geometry;
            if g.thickness_cm <= 0.0 || g.length_cm <= 0.0 || g.area_cm2 <= 0.0 {
                report.warn(Table::BodyPlan, &id, "zero geometry");
            }
        }
    }

    for species in tables.all_species() {
        let id = &species.id;
        let plan = match tables.body_plan(&species.body_plan) {
            Ok(plan) => Some(plan),
            Err(_) => {
                report.error(
                    Table::Species,
                    id,
                    format!("unknown body plan '{}'", species.body_plan),
                );
                None
            }
        };
        for natural in &species.natural_weapons {
            if tables.weapon(&natural.weapon).is_err() {
                report.error(
                    Table::Species,
                    id,
                    format!("unknown natural weapon '{}'", natural.weapon),
                );
            }
            if let Some(plan) = plan {
                if !plan.parts.iter().any(|p| p.tag == natural.required_part) {
                    report.warn(
                        Table::Species,
                        id,
                        format!("no part tagged '{}' to wield '{}'", natural.required_part, natural.weapon),
                    );
                }
            }
        }
        for (pool, value) in [("blood", species.base_blood), ("stamina", species.base_stamina)] {
            if value <= 0.0 {
                report.warn(Table::Species, id, format!("base {} is not positive", pool));
            }
        }
        if species.base_focus < 0.0 {
            report.warn(Table::Species, id, "base focus is negative");
        }
        let recovery = species.recovery();
        if recovery.blood < 0.0 || recovery.stamina < 0.0 || recovery.focus < 0.0 {
            report.warn(Table::Species, id, "negative recovery rate");
        }
        if species.size.height <= 0.0 || species.size.mass <= 0.0 {
            report.warn(Table::Species, id, "size modifier is not positive");
        }
    }

    for scenario in tables.scenarios() {
        let id = &scenario.id;
        let refs = [
            ("species", tables.species(&scenario.attacker.species).is_ok(), &scenario.attacker.species),
            ("species", tables.species(&scenario.defender.species).is_ok(), &scenario.defender.species),
            ("weapon", tables.weapon(&scenario.attacker.weapon).is_ok(), &scenario.attacker.weapon),
            ("technique", tables.technique(&scenario.attacker.technique).is_ok(), &scenario.attacker.technique),
        ];
        for (what, known, name) in refs {
            if !known {
                report.error(Table::Scenario, id, format!("unknown {} '{}'", what, name));
            }
        }
        for piece in &scenario.defender.armour {
            if tables.armour_piece(piece).is_err() {
                report.error(Table::Scenario, id, format!("unknown armour piece '{}'", piece));
            }
        }
    }

    for issue in &report.warnings {
        tracing::warn!("Audit: {} {}: {}", issue.table.label(), issue.id, issue.message);
    }
    report
}
