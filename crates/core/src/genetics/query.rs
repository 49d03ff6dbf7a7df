use crate::types::AnimalIndex;

use super::cache::{ComputationCache, QueryStats};
use super::guard::{CycleDiagnostic, CycleGuard, DiagnosticKind, Entry};
use super::store::PedigreeStore;

/// State owned by one top-level consanguinity query.
///
/// A `Query` bundles the store with a fresh [`ComputationCache`] and
/// [`CycleGuard`]; the kinship and inbreeding recursions are methods on it
/// so both share the same memo table and stack. Never reuse a `Query`
/// across requests or share it between threads: build one per request and
/// consume it with [`Query::finish`].
pub struct Query<'s, S: PedigreeStore + ?Sized> {
    pub(crate) store: &'s S,
    pub(crate) cache: ComputationCache,
    pub(crate) guard: CycleGuard,
}

impl<'s, S: PedigreeStore + ?Sized> Query<'s, S> {
    pub fn new(store: &'s S, max_depth: Option<usize>) -> Self {
        Self {
            store,
            cache: ComputationCache::new(),
            guard: CycleGuard::new(max_depth),
        }
    }

    pub fn stats(&self) -> QueryStats {
        self.cache.stats()
    }

    pub fn diagnostics(&self) -> &[CycleDiagnostic] {
        self.guard.diagnostics()
    }

    /// Consume the query, returning what it observed.
    pub fn finish(self) -> (Vec<CycleDiagnostic>, QueryStats) {
        debug_assert!(self.guard.is_idle());
        let stats = self.cache.stats();
        (self.guard.into_diagnostics(), stats)
    }

    /// Record why a frame was refused by the guard.
    pub(crate) fn refuse(&mut self, entry: Entry, members: &[AnimalIndex], cycle: DiagnosticKind) {
        let kind = match entry {
            Entry::Cycle => cycle,
            Entry::TooDeep => DiagnosticKind::DepthLimitReached,
            Entry::Entered => return,
        };
        let individuals = members
            .iter()
            .map(|&i| self.store.label(i).to_string())
            .collect();
        self.guard.record(CycleDiagnostic { kind, individuals });
    }
}
