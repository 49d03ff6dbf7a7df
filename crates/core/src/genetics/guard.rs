use std::collections::HashSet;
use std::fmt;

use crate::types::AnimalIndex;

use super::cache::pair_key;

/// What the guard short-circuited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// An individual was re-entered while computing its own inbreeding
    /// coefficient: it is recorded as its own ancestor.
    InbreedingCycle,
    /// A pair was re-entered while computing its own relationship.
    RelationshipCycle,
    /// The configured recursion depth was exhausted.
    DepthLimitReached,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::InbreedingCycle => "inbreeding_cycle",
            DiagnosticKind::RelationshipCycle => "relationship_cycle",
            DiagnosticKind::DepthLimitReached => "depth_limit_reached",
        }
    }
}

/// Non-fatal signal that part of the ancestry was treated as unknown.
///
/// A cycle diagnostic means the pedigree data is corrupt and the reported
/// individuals should be corrected upstream. The coefficient that carries it
/// is still finite and within `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CycleDiagnostic {
    pub kind: DiagnosticKind,
    /// Identifiers involved: one for an inbreeding cycle or depth cut, two
    /// for a relationship cycle.
    pub individuals: Vec<String>,
}

impl fmt::Display for CycleDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DiagnosticKind::InbreedingCycle => write!(
                f,
                "'{}' is recorded as its own ancestor",
                self.individuals.join("', '")
            ),
            DiagnosticKind::RelationshipCycle => write!(
                f,
                "relationship of ('{}') depends on itself",
                self.individuals.join("', '")
            ),
            DiagnosticKind::DepthLimitReached => write!(
                f,
                "recursion depth limit reached at '{}'",
                self.individuals.join("', '")
            ),
        }
    }
}

/// Outcome of asking the guard to enter a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    Entered,
    Cycle,
    TooDeep,
}

/// Tracks the individuals and pairs on the active recursion stack of one
/// top-level query.
///
/// Every successful `enter_*` must be matched by the corresponding `leave_*`
/// once the frame's value is known.
///
/// A refused frame contributes 0 in place of its real value, so every frame
/// open at that moment computes a value that depends on where the stack was
/// cut. Frames compare [`CycleGuard::refusals`] on entry and exit to tell
/// whether their value is safe to memoize.
#[derive(Debug, Default)]
pub struct CycleGuard {
    individuals: HashSet<AnimalIndex>,
    pairs: HashSet<(AnimalIndex, AnimalIndex)>,
    depth: usize,
    max_depth: Option<usize>,
    refusals: usize,
    diagnostics: Vec<CycleDiagnostic>,
}

impl CycleGuard {
    pub fn new(max_depth: Option<usize>) -> Self {
        Self {
            max_depth,
            ..Self::default()
        }
    }

    fn admit(&self) -> bool {
        self.max_depth.map_or(true, |max| self.depth < max)
    }

    fn refuse(&mut self, entry: Entry) -> Entry {
        self.refusals += 1;
        entry
    }

    pub fn enter_individual(&mut self, x: AnimalIndex) -> Entry {
        if self.individuals.contains(&x) {
            return self.refuse(Entry::Cycle);
        }
        if !self.admit() {
            return self.refuse(Entry::TooDeep);
        }
        self.individuals.insert(x);
        self.depth += 1;
        Entry::Entered
    }

    pub fn leave_individual(&mut self, x: AnimalIndex) {
        if self.individuals.remove(&x) {
            self.depth -= 1;
        }
    }

    pub fn enter_pair(&mut self, x: AnimalIndex, y: AnimalIndex) -> Entry {
        let key = pair_key(x, y);
        if self.pairs.contains(&key) {
            return self.refuse(Entry::Cycle);
        }
        if !self.admit() {
            return self.refuse(Entry::TooDeep);
        }
        self.pairs.insert(key);
        self.depth += 1;
        Entry::Entered
    }

    pub fn leave_pair(&mut self, x: AnimalIndex, y: AnimalIndex) {
        if self.pairs.remove(&pair_key(x, y)) {
            self.depth -= 1;
        }
    }

    /// Current number of open frames.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Frames refused so far, for cycles and the depth limit alike.
    pub fn refusals(&self) -> usize {
        self.refusals
    }

    /// No frame is open.
    pub fn is_idle(&self) -> bool {
        self.depth == 0
    }

    /// Record a diagnostic, ignoring exact repeats of one already recorded.
    pub fn record(&mut self, diagnostic: CycleDiagnostic) {
        if !self.diagnostics.contains(&diagnostic) {
            log::warn!("Consanguinity: {}", diagnostic);
            self.diagnostics.push(diagnostic);
        }
    }

    pub fn diagnostics(&self) -> &[CycleDiagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<CycleDiagnostic> {
        self.diagnostics
    }
}
