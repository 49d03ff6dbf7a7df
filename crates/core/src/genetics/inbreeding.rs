//! Coefficient of inbreeding of an individual (Wright).

use crate::types::AnimalIndex;

use super::guard::{DiagnosticKind, Entry};
use super::query::Query;
use super::store::PedigreeStore;

/// Weight of the sire-dam relationship in the inbreeding of their offspring.
///
/// Relationships produced by the kinship recursion are on the coancestry
/// scale (full siblings of unrelated founders score 0.25), so the offspring
/// receives half of that relationship.
pub const PARENTAL_RELATIONSHIP_WEIGHT: f64 = 0.5;

/// Inbreeding of an offspring given its parents' coefficients and the
/// relationship between them.
#[inline]
pub fn offspring_inbreeding(f_sire: f64, f_dam: f64, r_parents: f64) -> f64 {
    0.5 * (f_sire + f_dam) + PARENTAL_RELATIONSHIP_WEIGHT * r_parents
}

impl<S: PedigreeStore + ?Sized> Query<'_, S> {
    /// Coefficient of inbreeding F(x).
    ///
    /// - Either parent unknown: F = 0.
    /// - Otherwise F = ½·(F(sire) + F(dam)) + w·R(sire, dam).
    pub fn inbreeding(&mut self, x: AnimalIndex) -> f64 {
        if let Some(f) = self.cache.inbreeding(x) {
            return f;
        }

        let Some((sire, dam)) = self.store.parents(x).both() else {
            self.cache.store_inbreeding(x, 0.0);
            return 0.0;
        };

        let entry = self.guard.enter_individual(x);
        if entry != Entry::Entered {
            self.refuse(entry, &[x], DiagnosticKind::InbreedingCycle);
            return 0.0;
        }

        let refusals = self.guard.refusals();
        let f_sire = self.inbreeding(sire);
        let f_dam = self.inbreeding(dam);
        let r_parents = self.relationship(sire, dam);
        let f = offspring_inbreeding(f_sire, f_dam, r_parents);

        self.guard.leave_individual(x);
        if self.guard.refusals() == refusals {
            self.cache.store_inbreeding(x, f);
        } else {
            // Depends on the cut; recompute if asked again.
            self.cache.skip_inbreeding();
        }
        f
    }
}
