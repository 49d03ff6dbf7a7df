pub mod error;
pub mod genetics;
pub mod types;

pub use error::{PedigreeError, Result};
pub use genetics::{ConsanguinityEngine, EngineConfig, Pedigree, PedigreeStore};
pub use types::{AnimalIndex, Parents, Sex};
