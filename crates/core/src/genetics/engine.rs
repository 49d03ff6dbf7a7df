use rayon::prelude::*;

use crate::error::{PedigreeError, Result};
use crate::types::{AnimalIndex, Sex};

use super::inbreeding::offspring_inbreeding;
use super::query::Query;
use super::result::{BatchInbreeding, Coefficient, InbreedingRecord, MatingAssessment};
use super::risk::RiskLevel;
use super::store::PedigreeStore;

/// Engine settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Maximum number of nested F/R frames per query. `None` (default) means
    /// unlimited; the cycle guard alone guarantees termination. Set it to
    /// bound latency on pathologically deep pedigrees: ancestry beyond the
    /// limit is treated as unknown and reported as a diagnostic.
    pub max_depth: Option<usize>,
    /// Offspring inbreeding above which a mating is flagged (default 0.125).
    pub warning_threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            warning_threshold: RiskLevel::HIGH_THRESHOLD,
        }
    }
}

impl EngineConfig {
    /// Create a configuration with the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the recursion depth of each query.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set the mating warning threshold (a fraction, not a percentage).
    pub fn warning_threshold(mut self, threshold: f64) -> Self {
        self.warning_threshold = threshold;
        self
    }

    /// # Errors
    /// Returns an error if the threshold is outside `[0, 1]` or the depth
    /// limit is zero.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.warning_threshold) {
            return Err(PedigreeError::InvalidConfig(format!(
                "warning threshold must be in [0, 1], got {}",
                self.warning_threshold
            )));
        }
        if self.max_depth == Some(0) {
            return Err(PedigreeError::InvalidConfig(
                "max depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Entry point for inbreeding and relationship queries over a
/// [`PedigreeStore`].
///
/// The engine itself holds no mutable state. Each call is a separate
/// top-level query with its own cache and cycle guard, so an engine can be
/// shared freely between threads when the store is `Sync`.
///
/// Cycles in the store are cut and reported as diagnostics, but rows that
/// list an animal as its own parent, or one animal as both sire and dam, can
/// push a coefficient above 1. Such a query fails with
/// [`PedigreeError::InvariantViolation`]. Run `Pedigree::issues` (or an
/// equivalent check on a custom store) before trusting results from
/// unvalidated data.
pub struct ConsanguinityEngine<'s, S: PedigreeStore + ?Sized> {
    store: &'s S,
    config: EngineConfig,
}

impl<'s, S: PedigreeStore + ?Sized> ConsanguinityEngine<'s, S> {
    /// Create an engine with the default configuration.
    pub fn new(store: &'s S) -> Self {
        Self {
            store,
            config: EngineConfig::default(),
        }
    }

    /// # Errors
    /// Returns an error if `config` fails [`EngineConfig::validate`].
    pub fn with_config(store: &'s S, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn resolve(&self, id: &str) -> Result<AnimalIndex> {
        self.store
            .resolve(id)
            .ok_or_else(|| PedigreeError::UnknownIndividual(id.to_string()))
    }

    fn query(&self) -> Query<'s, S> {
        Query::new(self.store, self.config.max_depth)
    }

    /// Coefficient of inbreeding of `id`.
    ///
    /// # Errors
    /// [`PedigreeError::UnknownIndividual`] if `id` does not resolve;
    /// [`PedigreeError::InvariantViolation`] if the result exceeds 1.
    pub fn inbreeding_coefficient(&self, id: &str) -> Result<Coefficient> {
        let index = self.resolve(id)?;
        self.inbreeding_at(index)
    }

    fn inbreeding_at(&self, index: AnimalIndex) -> Result<Coefficient> {
        let mut query = self.query();
        let raw = query.inbreeding(index);
        let (diagnostics, stats) = query.finish();
        let label = self.store.label(index);

        log::debug!(
            "F({}) = {} [{} F / {} R evaluations, {} cache hits]",
            label,
            raw,
            stats.inbreeding_evaluations,
            stats.relationship_evaluations,
            stats.cache_hits
        );

        Ok(Coefficient {
            value: finalize(raw, || format!("inbreeding of '{}'", label))?,
            diagnostics,
            stats,
        })
    }

    /// Coefficient of relationship between `a` and `b`.
    ///
    /// # Errors
    /// [`PedigreeError::UnknownIndividual`] if either ID does not resolve;
    /// [`PedigreeError::InvariantViolation`] if the result exceeds 1.
    pub fn relationship_coefficient(&self, a: &str, b: &str) -> Result<Coefficient> {
        let x = self.resolve(a)?;
        let y = self.resolve(b)?;

        let mut query = self.query();
        let raw = query.relationship(x, y);
        let (diagnostics, stats) = query.finish();

        log::debug!(
            "R({}, {}) = {} [{} R evaluations, {} cache hits]",
            a,
            b,
            raw,
            stats.relationship_evaluations,
            stats.cache_hits
        );

        Ok(Coefficient {
            value: finalize(raw, || format!("relationship of '{}' and '{}'", a, b))?,
            diagnostics,
            stats,
        })
    }

    /// Evaluate a proposed mating before it is recorded.
    ///
    /// Computes the sire-dam relationship and the inbreeding coefficient a
    /// prospective offspring would have, in one query.
    ///
    /// # Errors
    /// [`PedigreeError::UnknownIndividual`] for an unresolvable ID;
    /// [`PedigreeError::InvalidMating`] if sire and dam are the same animal,
    /// the sire is not male, or the dam is not female.
    pub fn assess_mating(&self, sire_id: &str, dam_id: &str) -> Result<MatingAssessment> {
        let sire = self.resolve(sire_id)?;
        let dam = self.resolve(dam_id)?;

        if sire == dam {
            return Err(PedigreeError::InvalidMating(format!(
                "'{}' cannot be both sire and dam",
                sire_id
            )));
        }
        if self.store.sex(sire) != Sex::Male {
            return Err(PedigreeError::InvalidMating(format!(
                "sire '{}' is not male",
                sire_id
            )));
        }
        if self.store.sex(dam) != Sex::Female {
            return Err(PedigreeError::InvalidMating(format!(
                "dam '{}' is not female",
                dam_id
            )));
        }

        let mut query = self.query();
        let f_sire = query.inbreeding(sire);
        let f_dam = query.inbreeding(dam);
        let r_parents = query.relationship(sire, dam);
        let (diagnostics, stats) = query.finish();

        let context = || format!("mating of '{}' and '{}'", sire_id, dam_id);
        let relationship = finalize(r_parents, context)?;
        let offspring = finalize(offspring_inbreeding(f_sire, f_dam, r_parents), context)?;
        let warning = offspring > self.config.warning_threshold;

        if warning {
            log::info!(
                "Mating {} x {} gives offspring inbreeding {:.5}, above threshold {}",
                sire_id,
                dam_id,
                offspring,
                self.config.warning_threshold
            );
        }

        Ok(MatingAssessment {
            sire: sire_id.to_string(),
            dam: dam_id.to_string(),
            relationship,
            offspring_inbreeding: offspring,
            risk: RiskLevel::classify(offspring),
            warning,
            diagnostics,
            stats,
        })
    }
}

impl<S: PedigreeStore + Sync + ?Sized> ConsanguinityEngine<'_, S> {
    /// Recompute the inbreeding coefficient of every animal in the store.
    ///
    /// Each animal is an independent query with its own cache; queries run
    /// in parallel on the rayon pool. Records are in index order. An animal
    /// whose coefficient cannot be produced is listed under `failures` and
    /// does not stop the others.
    pub fn inbreeding_all(&self) -> BatchInbreeding {
        let outcomes: Vec<(String, Result<Coefficient>)> = (0..self.store.len())
            .into_par_iter()
            .filter(|&i| self.store.contains(i))
            .map(|i| (self.store.label(i).to_string(), self.inbreeding_at(i)))
            .collect();

        let mut batch = BatchInbreeding::default();
        for (id, outcome) in outcomes {
            match outcome {
                Ok(coefficient) => batch.records.push(InbreedingRecord { id, coefficient }),
                Err(e) => batch.failures.push((id, e)),
            }
        }

        let flagged = batch
            .records
            .iter()
            .filter(|r| r.coefficient.has_diagnostics())
            .count();
        if flagged > 0 {
            log::warn!(
                "{} of {} animals have corrupt ancestry (cycles or depth cut-offs)",
                flagged,
                batch.records.len()
            );
        }
        if !batch.failures.is_empty() {
            log::warn!("{} animals could not be evaluated", batch.failures.len());
        }
        batch
    }
}

/// Apply the output policy: negative rounding residue is clamped to 0, a
/// value above 1 is a defect and is reported, never corrected.
fn finalize(value: f64, context: impl FnOnce() -> String) -> Result<f64> {
    if value > 1.0 || value.is_nan() {
        return Err(PedigreeError::InvariantViolation {
            context: context(),
            value,
        });
    }
    Ok(value.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genetics::{DiagnosticKind, Pedigree, PedigreeEntry, PedigreeIssue};

    fn full_sib_family() -> Pedigree {
        let entries = vec![
            PedigreeEntry::new("P", Sex::Male, None, None),
            PedigreeEntry::new("M", Sex::Female, None, None),
            PedigreeEntry::new("S", Sex::Male, Some("P"), Some("M")),
            PedigreeEntry::new("D", Sex::Female, Some("P"), Some("M")),
            PedigreeEntry::new("C", Sex::Female, Some("S"), Some("D")),
        ];
        Pedigree::from_entries(&entries).unwrap()
    }

    #[test]
    fn test_finalize_policy() {
        assert_eq!(finalize(-1e-17, String::new).unwrap(), 0.0);
        assert_eq!(finalize(0.5, String::new).unwrap(), 0.5);
        assert_eq!(finalize(1.0, String::new).unwrap(), 1.0);
        let err = finalize(1.0000001, || "test".to_string()).unwrap_err();
        assert!(matches!(err, PedigreeError::InvariantViolation { .. }));
    }

    #[test]
    fn test_config_validation() {
        assert!(EngineConfig::new().validate().is_ok());
        assert!(EngineConfig::new().warning_threshold(1.5).validate().is_err());
        assert!(EngineConfig::new().max_depth(0).validate().is_err());
        let ped = Pedigree::new();
        assert!(ConsanguinityEngine::with_config(&ped, EngineConfig::new().max_depth(0)).is_err());
    }

    #[test]
    fn test_unknown_individual() {
        let ped = full_sib_family();
        let engine = ConsanguinityEngine::new(&ped);
        assert!(matches!(
            engine.inbreeding_coefficient("nope"),
            Err(PedigreeError::UnknownIndividual(id)) if id == "nope"
        ));
        assert!(matches!(
            engine.relationship_coefficient("S", "nope"),
            Err(PedigreeError::UnknownIndividual(_))
        ));
    }

    #[test]
    fn test_same_sire_and_dam_can_exceed_one() {
        let entries = vec![
            PedigreeEntry::new("X", Sex::Male, None, None),
            PedigreeEntry::new("A", Sex::Male, Some("X"), Some("X")),
            PedigreeEntry::new("B", Sex::Male, Some("A"), Some("A")),
            PedigreeEntry::new("C", Sex::Male, Some("B"), Some("B")),
        ];
        let ped = Pedigree::from_entries(&entries).unwrap();
        let engine = ConsanguinityEngine::new(&ped);

        assert!((engine.inbreeding_coefficient("A").unwrap().value - 0.5).abs() < 1e-12);
        assert_eq!(engine.inbreeding_coefficient("B").unwrap().value, 1.0);
        assert!(matches!(
            engine.inbreeding_coefficient("C"),
            Err(PedigreeError::InvariantViolation { value, .. }) if value > 1.0
        ));
        // The offending rows are reported by validation.
        assert_eq!(
            ped.issues()
                .iter()
                .filter(|i| matches!(i, PedigreeIssue::SameSireAndDam { .. }))
                .count(),
            3
        );
    }

    #[test]
    fn test_mating_assessment() {
        let ped = full_sib_family();
        let engine = ConsanguinityEngine::new(&ped);

        let m = engine.assess_mating("S", "D").unwrap();
        assert!((m.relationship - 0.25).abs() < 1e-12);
        assert!((m.offspring_inbreeding - 0.125).abs() < 1e-12);
        assert_eq!(m.risk, RiskLevel::High);
        // Flagged only strictly above the threshold.
        assert!(!m.warning);

        let strict = ConsanguinityEngine::with_config(&ped, EngineConfig::new().warning_threshold(0.1))
            .unwrap();
        assert!(strict.assess_mating("S", "D").unwrap().warning);

        let unrelated = engine.assess_mating("P", "M").unwrap();
        assert_eq!(unrelated.offspring_inbreeding, 0.0);
        assert_eq!(unrelated.risk, RiskLevel::Low);
    }

    #[test]
    fn test_mating_preconditions() {
        let ped = full_sib_family();
        let engine = ConsanguinityEngine::new(&ped);
        assert!(matches!(engine.assess_mating("S", "S"), Err(PedigreeError::InvalidMating(_))));
        assert!(matches!(engine.assess_mating("D", "S"), Err(PedigreeError::InvalidMating(_))));
        assert!(matches!(engine.assess_mating("S", "P"), Err(PedigreeError::InvalidMating(_))));
    }

    #[test]
    fn test_depth_limit_cuts_ancestry() {
        let ped = full_sib_family();
        let engine = ConsanguinityEngine::with_config(&ped, EngineConfig::new().max_depth(1)).unwrap();

        let c = engine.inbreeding_coefficient("C").unwrap();
        assert_eq!(c.value, 0.0);
        assert!(c
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::DepthLimitReached));
    }

    #[test]
    fn test_inbreeding_all() {
        let ped = full_sib_family();
        let engine = ConsanguinityEngine::new(&ped);
        let batch = engine.inbreeding_all();
        assert!(batch.failures.is_empty());

        let all = batch.records;
        let ids: Vec<&str> = all.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["P", "M", "S", "D", "C"]);
        assert!((all[4].coefficient.value - 0.125).abs() < 1e-12);
        assert!(all[..4].iter().all(|r| r.coefficient.value == 0.0));
    }

    #[test]
    fn test_inbreeding_all_skips_removed() {
        let mut ped = full_sib_family();
        ped.remove_animal("P").unwrap();
        let engine = ConsanguinityEngine::new(&ped);
        let batch = engine.inbreeding_all();

        assert_eq!(batch.records.len(), 4);
        assert!(batch.records.iter().all(|r| r.id != "P"));
        // S and D are now only maternal half siblings.
        assert_eq!(batch.records[3].id, "C");
        assert!((batch.records[3].coefficient.value - 0.0625).abs() < 1e-12);
    }
}
