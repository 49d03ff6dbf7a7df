use std::fmt;
use std::str::FromStr;

use crate::error::PedigreeError;

/// Position of an individual in the pedigree arena.
///
/// Indices are stable for the lifetime of a [`crate::genetics::Pedigree`]:
/// records are only ever appended.
pub type AnimalIndex = usize;

/// Sex of an individual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sex {
    type Err = PedigreeError;

    /// Accepts `male`/`m` and `female`/`f`, plus the French `femelle`
    /// used by herd books exported from older systems.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Sex::Male),
            "female" | "f" | "femelle" => Ok(Sex::Female),
            other => Err(PedigreeError::Pedigree(format!(
                "Unrecognised sex '{}'",
                other
            ))),
        }
    }
}

/// Sire and dam of an individual. Either may be unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Parents {
    pub sire: Option<AnimalIndex>,
    pub dam: Option<AnimalIndex>,
}

impl Parents {
    pub fn new(sire: Option<AnimalIndex>, dam: Option<AnimalIndex>) -> Self {
        Self { sire, dam }
    }

    /// Both parents on record.
    pub fn both(&self) -> Option<(AnimalIndex, AnimalIndex)> {
        match (self.sire, self.dam) {
            (Some(s), Some(d)) => Some((s, d)),
            _ => None,
        }
    }

    /// Neither parent on record.
    pub fn is_founder(&self) -> bool {
        self.sire.is_none() && self.dam.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sex_parsing() {
        assert_eq!("male".parse::<Sex>().unwrap(), Sex::Male);
        assert_eq!(" M ".parse::<Sex>().unwrap(), Sex::Male);
        assert_eq!("Female".parse::<Sex>().unwrap(), Sex::Female);
        assert_eq!("femelle".parse::<Sex>().unwrap(), Sex::Female);
        assert!("ram".parse::<Sex>().is_err());
    }

    #[test]
    fn test_parents_helpers() {
        let p = Parents::new(Some(0), Some(1));
        assert_eq!(p.both(), Some((0, 1)));
        assert!(!p.is_founder());

        let half = Parents::new(Some(0), None);
        assert_eq!(half.both(), None);
        assert!(!half.is_founder());

        assert!(Parents::default().is_founder());
    }
}
