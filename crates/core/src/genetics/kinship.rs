//! Coefficient of relationship between two individuals.
//!
//! Recursive additive relationship, expanded over the parents of both
//! members of the pair:
//!
//! ```text
//! R(x, x) = 1
//! R(x, y) = 0                                  if neither x nor y has parents
//! R(x, y) = ( ½·[R(sx, y) + R(dx, y)]
//!           + ½·[R(x, sy) + R(x, dy)] ) / 2    otherwise
//! ```
//!
//! where an unknown parent contributes 0. Both expansion directions are
//! averaged, so the recursion visits pairs rather than following one side;
//! the query cache bounds the work to one evaluation per distinct pair.
//! Pairs whose expansion was cut by the cycle guard are not memoized.

use crate::types::AnimalIndex;

use super::guard::{DiagnosticKind, Entry};
use super::query::Query;
use super::store::PedigreeStore;

impl<S: PedigreeStore + ?Sized> Query<'_, S> {
    /// Coefficient of relationship R(x, y), in `[0, 1]`.
    ///
    /// Values are accumulated in full precision; never round them before
    /// feeding them back into a computation.
    pub fn relationship(&mut self, x: AnimalIndex, y: AnimalIndex) -> f64 {
        if x == y {
            return 1.0;
        }
        if let Some(r) = self.cache.relationship(x, y) {
            return r;
        }

        let px = self.store.parents(x);
        let py = self.store.parents(y);
        if px.is_founder() && py.is_founder() {
            self.cache.store_relationship(x, y, 0.0);
            return 0.0;
        }

        let entry = self.guard.enter_pair(x, y);
        if entry != Entry::Entered {
            self.refuse(entry, &[x, y], DiagnosticKind::RelationshipCycle);
            return 0.0;
        }

        let refusals = self.guard.refusals();
        let via_x = 0.5 * (self.relationship_to(px.sire, y) + self.relationship_to(px.dam, y));
        let via_y = 0.5 * (self.relationship_to(py.sire, x) + self.relationship_to(py.dam, x));
        let r = (via_x + via_y) / 2.0;

        self.guard.leave_pair(x, y);
        if self.guard.refusals() == refusals {
            self.cache.store_relationship(x, y, r);
        } else {
            self.cache.skip_relationship();
        }
        r
    }

    /// R between a possibly unknown ancestor and a known individual.
    fn relationship_to(&mut self, ancestor: Option<AnimalIndex>, other: AnimalIndex) -> f64 {
        match ancestor {
            Some(a) => self.relationship(a, other),
            None => 0.0,
        }
    }
}
