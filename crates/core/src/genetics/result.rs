use crate::error::PedigreeError;

use super::cache::QueryStats;
use super::guard::CycleDiagnostic;
use super::risk::RiskLevel;

/// Round `value` to `decimals` decimal places. Display only.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// A coefficient returned by the engine, with what was observed computing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Coefficient {
    /// Full-precision value in `[0, 1]`.
    pub value: f64,
    /// Cycle and depth diagnostics raised during the query.
    pub diagnostics: Vec<CycleDiagnostic>,
    pub stats: QueryStats,
}

impl Coefficient {
    /// Value as a percentage, rounded to 4 decimals (12.5 for 0.125).
    pub fn percent(&self) -> f64 {
        round_to(self.value * 100.0, 4)
    }

    /// Value rounded to `decimals` places, for display or persistence of a
    /// cached copy.
    pub fn rounded(&self, decimals: u32) -> f64 {
        round_to(self.value, decimals)
    }

    pub fn risk(&self) -> RiskLevel {
        RiskLevel::classify(self.value)
    }

    /// Whether the pedigree behind this value needs correcting.
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Outcome of checking a proposed sire × dam mating.
#[derive(Debug, Clone, PartialEq)]
pub struct MatingAssessment {
    pub sire: String,
    pub dam: String,
    /// Relationship between sire and dam.
    pub relationship: f64,
    /// Inbreeding coefficient a calf, kid or lamb of this pair would have.
    pub offspring_inbreeding: f64,
    pub risk: RiskLevel,
    /// Offspring inbreeding exceeds the configured warning threshold.
    pub warning: bool,
    pub diagnostics: Vec<CycleDiagnostic>,
    pub stats: QueryStats,
}

impl MatingAssessment {
    pub fn summary(&self) -> String {
        let mut s = format!(
            "Mating {} x {}\n  Relationship:         {:.5}\n  Offspring inbreeding: {:.4} %  ({} risk)\n",
            self.sire,
            self.dam,
            self.relationship,
            round_to(self.offspring_inbreeding * 100.0, 4),
            self.risk
        );
        if self.warning {
            s.push_str("  WARNING: offspring inbreeding is above the configured threshold\n");
        }
        for diag in &self.diagnostics {
            s.push_str(&format!("  note: {}\n", diag));
        }
        s
    }
}

/// Inbreeding coefficient of one animal in a batch recomputation.
#[derive(Debug, Clone, PartialEq)]
pub struct InbreedingRecord {
    pub id: String,
    pub coefficient: Coefficient,
}

/// Outcome of recomputing every animal's inbreeding coefficient.
#[derive(Debug, Default)]
pub struct BatchInbreeding {
    pub records: Vec<InbreedingRecord>,
    /// Animals whose coefficient could not be produced, with the reason.
    pub failures: Vec<(String, PedigreeError)>,
}

/// Keep only inbred animals, most inbred first (ties by ID).
pub fn inbreeding_report(records: &[InbreedingRecord]) -> Vec<InbreedingRecord> {
    let mut inbred: Vec<InbreedingRecord> = records
        .iter()
        .filter(|r| r.coefficient.value > 0.0)
        .cloned()
        .collect();
    inbred.sort_by(|a, b| {
        b.coefficient
            .value
            .partial_cmp(&a.coefficient.value)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
    inbred
}

/// Format a batch of records as a text table.
pub fn format_report(records: &[InbreedingRecord]) -> String {
    let mut s = String::new();
    s.push_str("=== Inbreeding Report ===\n\n");
    s.push_str(&format!("{:<16} {:>10}  {}\n", "animal", "F (%)", "risk"));
    for r in records {
        s.push_str(&format!(
            "{:<16} {:>10.4}  {}{}\n",
            r.id,
            r.coefficient.percent(),
            r.coefficient.risk(),
            if r.coefficient.has_diagnostics() {
                "  (pedigree needs correction)"
            } else {
                ""
            }
        ));
    }
    s
}
