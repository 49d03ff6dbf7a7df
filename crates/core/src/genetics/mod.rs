//! Pedigree storage and the consanguinity engine.
//!
//! The engine answers two questions about a pedigree: how inbred is an
//! animal ([`ConsanguinityEngine::inbreeding_coefficient`]) and how related
//! are two animals ([`ConsanguinityEngine::relationship_coefficient`]). Both
//! are exact recursions over sire/dam links, memoized per query and guarded
//! against corrupt (cyclic) parentage.

pub mod cache;
pub mod engine;
pub mod guard;
pub mod inbreeding;
pub mod kinship;
pub mod pedigree;
pub mod query;
pub mod result;
pub mod risk;
pub mod store;

pub use cache::{ComputationCache, QueryStats};
pub use engine::{ConsanguinityEngine, EngineConfig};
pub use guard::{CycleDiagnostic, CycleGuard, DiagnosticKind};
pub use inbreeding::{offspring_inbreeding, PARENTAL_RELATIONSHIP_WEIGHT};
pub use pedigree::{Pedigree, PedigreeEntry, PedigreeIssue};
pub use query::Query;
pub use result::{
    format_report, inbreeding_report, BatchInbreeding, Coefficient, InbreedingRecord,
    MatingAssessment,
};
pub use risk::RiskLevel;
pub use store::PedigreeStore;
