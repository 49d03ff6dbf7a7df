use thiserror::Error;

#[derive(Error, Debug)]
pub enum PedigreeError {
    #[error("Unknown individual: '{0}'")]
    UnknownIndividual(String),

    #[error("Pedigree error: {0}")]
    Pedigree(String),

    #[error("Invalid mating: {0}")]
    InvalidMating(String),

    #[error("Coefficient {value} exceeds 1.0 in {context}")]
    InvariantViolation { context: String, value: f64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, PedigreeError>;
