use crate::types::{AnimalIndex, Parents, Sex};

/// Read-only access to pedigree data, as consumed by the consanguinity
/// engine.
///
/// Implementations must be free of side effects: the engine calls
/// [`PedigreeStore::parents`] many times for the same individual within a
/// query and relies on getting the same answer. Ancestors that cannot be
/// resolved must be reported as absent (`None`) rather than as an error.
///
/// Caching is the engine's job; implementations should not memoize on its
/// behalf.
pub trait PedigreeStore {
    /// Resolve an external identifier to an arena index.
    fn resolve(&self, id: &str) -> Option<AnimalIndex>;

    /// Sire and dam of the individual at `index`.
    fn parents(&self, index: AnimalIndex) -> Parents;

    /// Sex of the individual at `index`.
    fn sex(&self, index: AnimalIndex) -> Sex;

    /// External identifier of the individual at `index`.
    fn label(&self, index: AnimalIndex) -> &str;

    /// Number of index slots. Indices `0..len()` may include slots for which
    /// [`PedigreeStore::contains`] is false.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `index` refers to an individual that is still on record.
    fn contains(&self, index: AnimalIndex) -> bool {
        index < self.len()
    }
}
