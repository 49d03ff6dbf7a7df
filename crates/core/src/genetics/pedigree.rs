use std::fmt;
use std::io;
use std::path::Path;

use indexmap::IndexMap;

use crate::error::{PedigreeError, Result};
use crate::types::{AnimalIndex, Parents, Sex};

use super::store::PedigreeStore;

/// A single pedigree record. The identifier is the key in the arena map.
#[derive(Debug, Clone)]
struct AnimalRecord {
    sex: Sex,
    /// Arena index of the sire, or `None` if unknown.
    sire: Option<AnimalIndex>,
    /// Arena index of the dam, or `None` if unknown.
    dam: Option<AnimalIndex>,
    active: bool,
    /// Removed records keep their slot so indices stay stable.
    removed: bool,
}

/// Input row for building a pedigree in one go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PedigreeEntry {
    pub id: String,
    pub sex: Sex,
    pub sire: Option<String>,
    pub dam: Option<String>,
    pub active: bool,
}

impl PedigreeEntry {
    pub fn new(id: &str, sex: Sex, sire: Option<&str>, dam: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            sex,
            sire: sire.map(str::to_string),
            dam: dam.map(str::to_string),
            active: true,
        }
    }
}

/// A data-integrity problem found by [`Pedigree::issues`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PedigreeIssue {
    OwnSire(String),
    OwnDam(String),
    SameSireAndDam { animal: String, parent: String },
    SireNotMale { animal: String, sire: String },
    DamNotFemale { animal: String, dam: String },
    /// Animals that are part of, or descend from, a parentage cycle.
    Cycle(Vec<String>),
}

impl fmt::Display for PedigreeIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PedigreeIssue::OwnSire(id) => write!(f, "Animal '{}' is listed as its own sire", id),
            PedigreeIssue::OwnDam(id) => write!(f, "Animal '{}' is listed as its own dam", id),
            PedigreeIssue::SameSireAndDam { animal, parent } => write!(
                f,
                "Animal '{}' has '{}' as both sire and dam",
                animal, parent
            ),
            PedigreeIssue::SireNotMale { animal, sire } => {
                write!(f, "Sire '{}' of animal '{}' is not male", sire, animal)
            }
            PedigreeIssue::DamNotFemale { animal, dam } => {
                write!(f, "Dam '{}' of animal '{}' is not female", dam, animal)
            }
            PedigreeIssue::Cycle(ids) => write!(
                f,
                "Pedigree contains a cycle involving: {}",
                ids.join(", ")
            ),
        }
    }
}

/// In-memory pedigree of sire/dam relationships.
///
/// Animals live in an arena addressed by a 0-based [`AnimalIndex`]: the
/// position of the record in insertion order. Unknown parents (coded as
/// `"0"`, empty or `"NA"` in input, or referring to an identifier that is not
/// in the pedigree) are represented as `None`.
///
/// The pedigree does not enforce acyclicity or sex consistency on write.
/// [`Pedigree::validate`] reports such problems; the consanguinity engine
/// tolerates them.
#[derive(Debug, Clone, Default)]
pub struct Pedigree {
    records: IndexMap<String, AnimalRecord>,
}

impl Pedigree {
    /// Create an empty pedigree.
    pub fn new() -> Self {
        Self {
            records: IndexMap::new(),
        }
    }

    /// Number of live (not removed) animals.
    pub fn n_animals(&self) -> usize {
        self.records.values().filter(|r| !r.removed).count()
    }

    /// Look up the index of a live animal by its ID string.
    pub fn animal_index(&self, id: &str) -> Option<AnimalIndex> {
        let (index, _, record) = self.records.get_full(id)?;
        (!record.removed).then_some(index)
    }

    /// Look up the ID string of an animal by its index.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn animal_id(&self, index: AnimalIndex) -> &str {
        self.records
            .get_index(index)
            .map(|(id, _)| id.as_str())
            .expect("animal index out of bounds")
    }

    /// Sire index for the animal at `index`, or `None` if unknown or removed.
    pub fn sire(&self, index: AnimalIndex) -> Option<AnimalIndex> {
        self.record(index)
            .and_then(|r| r.sire)
            .filter(|&s| self.is_live(s))
    }

    /// Dam index for the animal at `index`, or `None` if unknown or removed.
    pub fn dam(&self, index: AnimalIndex) -> Option<AnimalIndex> {
        self.record(index)
            .and_then(|r| r.dam)
            .filter(|&d| self.is_live(d))
    }

    /// Sex of the animal at `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn animal_sex(&self, index: AnimalIndex) -> Sex {
        self.records[index].sex
    }

    /// Whether the animal at `index` is flagged active in the herd.
    pub fn is_active(&self, index: AnimalIndex) -> bool {
        self.record(index).is_some_and(|r| r.active && !r.removed)
    }

    /// Iterate over the indices of live animals.
    pub fn indices(&self) -> impl Iterator<Item = AnimalIndex> + '_ {
        self.records
            .values()
            .enumerate()
            .filter(|(_, r)| !r.removed)
            .map(|(i, _)| i)
    }

    fn record(&self, index: AnimalIndex) -> Option<&AnimalRecord> {
        self.records.get_index(index).map(|(_, r)| r)
    }

    fn is_live(&self, index: AnimalIndex) -> bool {
        self.record(index).is_some_and(|r| !r.removed)
    }

    fn resolve_parent(&self, id: Option<&str>) -> Option<AnimalIndex> {
        let id = id?;
        let index = self.animal_index(id);
        if index.is_none() {
            log::debug!("Parent '{}' is not in the pedigree; treating as unknown", id);
        }
        index
    }

    /// Add an animal to the pedigree and return its index.
    ///
    /// `sire` and `dam` are optional parent ID strings. A parent that has not
    /// been added yet is recorded as unknown; use [`Pedigree::set_parents`]
    /// or [`Pedigree::from_entries`] when parents may come later.
    ///
    /// # Errors
    /// Returns an error if the animal ID already exists.
    pub fn add_animal(
        &mut self,
        id: &str,
        sex: Sex,
        sire: Option<&str>,
        dam: Option<&str>,
    ) -> Result<AnimalIndex> {
        if self.records.contains_key(id) {
            return Err(PedigreeError::Pedigree(format!(
                "Duplicate animal ID: '{}'",
                id
            )));
        }

        let sire_idx = self.resolve_parent(sire);
        let dam_idx = self.resolve_parent(dam);

        let (index, _) = self.records.insert_full(
            id.to_string(),
            AnimalRecord {
                sex,
                sire: sire_idx,
                dam: dam_idx,
                active: true,
                removed: false,
            },
        );
        Ok(index)
    }

    /// Replace the recorded sire and dam of an existing animal.
    ///
    /// Nothing is recomputed here: coefficients are derived on read.
    ///
    /// # Errors
    /// Returns [`PedigreeError::UnknownIndividual`] if `id` is not present.
    pub fn set_parents(&mut self, id: &str, sire: Option<&str>, dam: Option<&str>) -> Result<()> {
        let index = self
            .animal_index(id)
            .ok_or_else(|| PedigreeError::UnknownIndividual(id.to_string()))?;
        let sire_idx = self.resolve_parent(sire);
        let dam_idx = self.resolve_parent(dam);

        let record = &mut self.records[index];
        record.sire = sire_idx;
        record.dam = dam_idx;
        Ok(())
    }

    /// Set the active flag of an existing animal.
    pub fn set_active(&mut self, id: &str, active: bool) -> Result<()> {
        let index = self
            .animal_index(id)
            .ok_or_else(|| PedigreeError::UnknownIndividual(id.to_string()))?;
        self.records[index].active = active;
        Ok(())
    }

    /// Remove an animal from the pedigree.
    ///
    /// Descendants keep their link, which now reads as an unknown ancestor.
    /// The slot is retained so other indices do not move; the ID cannot be
    /// reused.
    pub fn remove_animal(&mut self, id: &str) -> Result<()> {
        let index = self
            .animal_index(id)
            .ok_or_else(|| PedigreeError::UnknownIndividual(id.to_string()))?;
        let record = &mut self.records[index];
        record.removed = true;
        record.active = false;
        Ok(())
    }

    /// Build a pedigree from entries given in any order.
    ///
    /// # Errors
    /// Returns an error if duplicate animal IDs are found.
    pub fn from_entries(entries: &[PedigreeEntry]) -> Result<Self> {
        let mut ped = Self::new();

        // First pass: register all animals so parent lookups can succeed
        // regardless of input order.
        for entry in entries {
            if ped.records.contains_key(&entry.id) {
                return Err(PedigreeError::Pedigree(format!(
                    "Duplicate animal ID: '{}'",
                    entry.id
                )));
            }
            ped.records.insert(
                entry.id.clone(),
                AnimalRecord {
                    sex: entry.sex,
                    sire: None,
                    dam: None,
                    active: entry.active,
                    removed: false,
                },
            );
        }

        // Second pass: resolve parent indices.
        for (i, entry) in entries.iter().enumerate() {
            let sire = ped.resolve_parent(entry.sire.as_deref());
            let dam = ped.resolve_parent(entry.dam.as_deref());
            let record = &mut ped.records[i];
            record.sire = sire;
            record.dam = dam;
        }

        Ok(ped)
    }

    /// Read a pedigree from a CSV file.
    ///
    /// Required columns (header required, case-insensitive): `animal`,
    /// `sire`, `dam`. Optional columns: `sex` and `active`. Unknown parents
    /// are coded as `"0"`, `""`, or `"NA"`.
    ///
    /// Without a `sex` column, animals referenced as a dam are female and all
    /// others are male.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, columns are missing, a
    /// field cannot be parsed, or duplicate animal IDs are found.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(file)
    }

    /// Read a pedigree in the [`Pedigree::from_csv`] format from any reader.
    pub fn from_reader<R: io::Read>(rdr: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .trim(csv::Trim::All)
            .from_reader(rdr);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.to_lowercase())
            .collect();

        let column = |name: &str| headers.iter().position(|h| h == name);
        let required = |name: &str| {
            column(name).ok_or_else(|| {
                PedigreeError::Pedigree(format!("CSV missing '{}' column", name))
            })
        };

        let animal_col = required("animal")?;
        let sire_col = required("sire")?;
        let dam_col = required("dam")?;
        let sex_col = column("sex");
        let active_col = column("active");

        let mut rows = Vec::new();

        for result in reader.records() {
            let record = result?;
            let field = |col: usize, name: &str| {
                record.get(col).ok_or_else(|| {
                    PedigreeError::Pedigree(format!("Missing {} field in row", name))
                })
            };

            let animal = field(animal_col, "animal")?.to_string();
            let sire = parse_parent(field(sire_col, "sire")?);
            let dam = parse_parent(field(dam_col, "dam")?);
            let sex = match sex_col {
                Some(col) => Some(field(col, "sex")?.parse::<Sex>()?),
                None => None,
            };
            let active = match active_col {
                Some(col) => parse_flag(field(col, "active")?)?,
                None => true,
            };

            rows.push((animal, sex, sire, dam, active));
        }

        let dams: std::collections::HashSet<&str> =
            rows.iter().filter_map(|(_, _, _, d, _)| d.as_deref()).collect();

        let entries: Vec<PedigreeEntry> = rows
            .iter()
            .map(|(id, sex, sire, dam, active)| PedigreeEntry {
                id: id.clone(),
                sex: sex.unwrap_or(if dams.contains(id.as_str()) {
                    Sex::Female
                } else {
                    Sex::Male
                }),
                sire: sire.clone(),
                dam: dam.clone(),
                active: *active,
            })
            .collect();

        Self::from_entries(&entries)
    }

    /// Collect every consistency problem in the pedigree.
    ///
    /// Checks:
    /// - No animal is its own sire or dam.
    /// - Sire and dam, when both known, are distinct.
    /// - Sires are male and dams are female.
    /// - No animal is its own ancestor (cycle detection).
    pub fn issues(&self) -> Vec<PedigreeIssue> {
        let mut issues = Vec::new();

        for index in self.indices() {
            let id = self.animal_id(index);
            let sire = self.sire(index);
            let dam = self.dam(index);

            if sire == Some(index) {
                issues.push(PedigreeIssue::OwnSire(id.to_string()));
            }
            if dam == Some(index) {
                issues.push(PedigreeIssue::OwnDam(id.to_string()));
            }
            if let (Some(s), Some(d)) = (sire, dam) {
                if s == d {
                    issues.push(PedigreeIssue::SameSireAndDam {
                        animal: id.to_string(),
                        parent: self.animal_id(s).to_string(),
                    });
                }
            }
            if let Some(s) = sire {
                if self.animal_sex(s) != Sex::Male {
                    issues.push(PedigreeIssue::SireNotMale {
                        animal: id.to_string(),
                        sire: self.animal_id(s).to_string(),
                    });
                }
            }
            if let Some(d) = dam {
                if self.animal_sex(d) != Sex::Female {
                    issues.push(PedigreeIssue::DamNotFemale {
                        animal: id.to_string(),
                        dam: self.animal_id(d).to_string(),
                    });
                }
            }
        }

        let stuck = self.unsortable_animals();
        if !stuck.is_empty() {
            issues.push(PedigreeIssue::Cycle(
                stuck.iter().map(|&i| self.animal_id(i).to_string()).collect(),
            ));
        }

        issues
    }

    /// Validate the pedigree for consistency.
    ///
    /// # Errors
    /// Returns an error describing the first problem found by
    /// [`Pedigree::issues`].
    pub fn validate(&self) -> Result<()> {
        match self.issues().into_iter().next() {
            Some(issue) => Err(PedigreeError::Pedigree(issue.to_string())),
            None => Ok(()),
        }
    }

    /// Descendants of `id`, nearest generation first, going down at most
    /// `max_generations` generations (all of them when `None`).
    ///
    /// These are the animals whose inbreeding coefficient can change when
    /// the parents of `id` are edited. The animal itself is never listed,
    /// even when a cycle leads back to it.
    ///
    /// # Errors
    /// Returns an error if `id` is not a live animal.
    pub fn descendants(&self, id: &str, max_generations: Option<usize>) -> Result<Vec<String>> {
        let root = self
            .animal_index(id)
            .ok_or_else(|| PedigreeError::UnknownIndividual(id.to_string()))?;
        let children_of = self.children_of();

        let mut seen = vec![false; self.records.len()];
        seen[root] = true;
        let mut found = Vec::new();
        let mut frontier = vec![root];
        let mut generation = 0;

        while !frontier.is_empty() && max_generations.map_or(true, |max| generation < max) {
            let mut next = Vec::new();
            for node in frontier {
                for &child in &children_of[node] {
                    if !seen[child] {
                        seen[child] = true;
                        next.push(child);
                    }
                }
            }
            found.extend(next.iter().map(|&c| self.animal_id(c).to_string()));
            frontier = next;
            generation += 1;
        }

        Ok(found)
    }

    /// Parent -> child adjacency over live animals, children in index order.
    fn children_of(&self) -> Vec<Vec<AnimalIndex>> {
        let mut children_of = vec![Vec::new(); self.records.len()];
        for i in self.indices() {
            for parent in [self.sire(i), self.dam(i)].into_iter().flatten() {
                children_of[parent].push(i);
            }
        }
        children_of
    }

    /// Animals left over by a topological sort (Kahn's algorithm): those on a
    /// parentage cycle and their descendants. Empty for a well-formed
    /// pedigree.
    fn unsortable_animals(&self) -> Vec<AnimalIndex> {
        let n = self.records.len();
        let children_of = self.children_of();

        let mut in_degree = vec![0u32; n];
        for &child in children_of.iter().flatten() {
            in_degree[child] += 1;
        }

        let mut queue: Vec<AnimalIndex> = self.indices().filter(|&i| in_degree[i] == 0).collect();
        let mut done = vec![false; n];

        while let Some(node) = queue.pop() {
            done[node] = true;
            for &child in &children_of[node] {
                in_degree[child] -= 1;
                if in_degree[child] == 0 {
                    queue.push(child);
                }
            }
        }

        self.indices().filter(|&i| !done[i]).collect()
    }
}

impl PedigreeStore for Pedigree {
    fn resolve(&self, id: &str) -> Option<AnimalIndex> {
        self.animal_index(id)
    }

    fn parents(&self, index: AnimalIndex) -> Parents {
        Parents::new(self.sire(index), self.dam(index))
    }

    fn sex(&self, index: AnimalIndex) -> Sex {
        self.animal_sex(index)
    }

    fn label(&self, index: AnimalIndex) -> &str {
        self.animal_id(index)
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    fn contains(&self, index: AnimalIndex) -> bool {
        self.is_live(index)
    }
}

/// Parse a parent string, returning `None` for unknown parents.
///
/// Unknown parents are coded as `"0"`, `""`, `"NA"`, or `"na"`.
fn parse_parent(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() || trimmed == "0" || trimmed.eq_ignore_ascii_case("na") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_flag(s: &str) -> Result<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "" | "1" | "true" | "yes" | "y" => Ok(true),
        "0" | "false" | "no" | "n" => Ok(false),
        other => Err(PedigreeError::Pedigree(format!(
            "Unrecognised active flag '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::atomic::{AtomicU64, Ordering};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    /// Helper: write CSV content to a temporary file and return the path.
    fn write_temp_csv(content: &str) -> String {
        let dir = std::env::temp_dir();
        let id = COUNTER.fetch_add(1, Ordering::Relaxed);
        let file_name = format!("test_pedigree_{}_{}.csv", std::process::id(), id);
        let path = dir.join(file_name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path.to_str().unwrap().to_string()
    }

    fn trio() -> Pedigree {
        let entries = vec![
            PedigreeEntry::new("1", Sex::Male, None, None),
            PedigreeEntry::new("2", Sex::Female, None, None),
            PedigreeEntry::new("3", Sex::Female, Some("1"), Some("2")),
        ];
        Pedigree::from_entries(&entries).unwrap()
    }

    #[test]
    fn test_simple_3_animal_pedigree() {
        let ped = trio();
        assert_eq!(ped.n_animals(), 3);

        assert_eq!(ped.animal_index("1"), Some(0));
        assert_eq!(ped.animal_index("2"), Some(1));
        assert_eq!(ped.animal_index("3"), Some(2));

        assert_eq!(ped.sire(2), Some(0));
        assert_eq!(ped.dam(2), Some(1));
        assert_eq!(ped.sire(0), None);
        assert_eq!(ped.dam(0), None);
        assert_eq!(ped.animal_sex(1), Sex::Female);
    }

    #[test]
    fn test_from_entries_offspring_first() {
        let entries = vec![
            PedigreeEntry::new("C", Sex::Male, Some("A"), Some("B")),
            PedigreeEntry::new("A", Sex::Male, None, None),
            PedigreeEntry::new("B", Sex::Female, None, None),
        ];
        let ped = Pedigree::from_entries(&entries).unwrap();
        let c = ped.animal_index("C").unwrap();
        assert_eq!(ped.sire(c), ped.animal_index("A"));
        assert_eq!(ped.dam(c), ped.animal_index("B"));
    }

    #[test]
    fn test_unresolvable_parent_is_unknown() {
        let entries = vec![PedigreeEntry::new("X", Sex::Male, Some("ghost"), None)];
        let ped = Pedigree::from_entries(&entries).unwrap();
        assert_eq!(ped.sire(0), None);
    }

    #[test]
    fn test_from_csv_basic() {
        let csv = "animal,sire,dam,sex\n1,0,0,male\n2,0,0,female\n3,1,2,female\n";
        let path = write_temp_csv(csv);
        let ped = Pedigree::from_csv(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(ped.n_animals(), 3);
        assert_eq!(ped.sire(2), Some(0));
        assert_eq!(ped.dam(2), Some(1));
        assert_eq!(ped.sire(0), None);
        assert_eq!(ped.animal_sex(2), Sex::Female);
    }

    #[test]
    fn test_from_csv_infers_sex_from_role() {
        let csv = "animal,sire,dam\nA,,\nB,NA,na\nC,A,B\n";
        let ped = Pedigree::from_reader(csv.as_bytes()).unwrap();

        assert_eq!(ped.animal_sex(0), Sex::Male);
        assert_eq!(ped.animal_sex(1), Sex::Female);
        assert_eq!(ped.animal_sex(2), Sex::Male);
        assert_eq!(ped.sire(2), Some(0));
        assert_eq!(ped.dam(2), Some(1));
    }

    #[test]
    fn test_from_csv_active_column() {
        let csv = "Animal,Sire,Dam,Sex,Active\nA,0,0,m,yes\nB,0,0,f,0\n";
        let ped = Pedigree::from_reader(csv.as_bytes()).unwrap();
        assert!(ped.is_active(0));
        assert!(!ped.is_active(1));
    }

    #[test]
    fn test_from_csv_missing_column() {
        let csv = "animal,sire\nA,0\n";
        let err = Pedigree::from_reader(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("'dam'"), "Error was: {}", err);
    }

    #[test]
    fn test_from_csv_bad_sex() {
        let csv = "animal,sire,dam,sex\nA,0,0,ram\n";
        assert!(Pedigree::from_reader(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_validate_ok() {
        assert!(trio().validate().is_ok());
    }

    #[test]
    fn test_validate_detects_self_parent() {
        let mut ped = trio();
        ped.set_parents("1", Some("1"), None).unwrap();

        let result = ped.validate();
        assert!(result.is_err());
        let msg = format!("{}", result.unwrap_err());
        assert!(msg.contains("own sire"), "Error was: {}", msg);
    }

    #[test]
    fn test_issues_sex_and_duplicate_parent() {
        let mut ped = trio();
        ped.add_animal("4", Sex::Male, Some("2"), Some("2")).unwrap();

        let issues = ped.issues();
        assert!(issues.contains(&PedigreeIssue::SameSireAndDam {
            animal: "4".to_string(),
            parent: "2".to_string(),
        }));
        assert!(issues.contains(&PedigreeIssue::SireNotMale {
            animal: "4".to_string(),
            sire: "2".to_string(),
        }));
    }

    #[test]
    fn test_issues_detects_cycle() {
        let mut ped = trio();
        // 1 becomes a son of his own daughter.
        ped.set_parents("1", None, Some("3")).unwrap();

        let cycle = ped
            .issues()
            .into_iter()
            .find_map(|issue| match issue {
                PedigreeIssue::Cycle(ids) => Some(ids),
                _ => None,
            })
            .expect("cycle should be reported");
        assert!(cycle.contains(&"1".to_string()));
        assert!(cycle.contains(&"3".to_string()));
        assert!(!cycle.contains(&"2".to_string()));
    }

    #[test]
    fn test_descendants_by_generation() {
        let entries = vec![
            PedigreeEntry::new("S", Sex::Male, None, None),
            PedigreeEntry::new("M", Sex::Female, None, None),
            PedigreeEntry::new("A", Sex::Male, Some("S"), Some("M")),
            PedigreeEntry::new("B", Sex::Female, Some("S"), Some("M")),
            PedigreeEntry::new("N", Sex::Female, None, None),
            PedigreeEntry::new("G", Sex::Male, Some("A"), Some("N")),
            PedigreeEntry::new("H", Sex::Male, Some("G"), Some("B")),
        ];
        let mut ped = Pedigree::from_entries(&entries).unwrap();

        assert_eq!(ped.descendants("S", None).unwrap(), vec!["A", "B", "G", "H"]);
        assert_eq!(ped.descendants("S", Some(1)).unwrap(), vec!["A", "B"]);
        assert_eq!(ped.descendants("S", Some(0)).unwrap(), Vec::<String>::new());
        assert_eq!(ped.descendants("A", None).unwrap(), vec!["G", "H"]);
        assert!(ped.descendants("H", None).unwrap().is_empty());
        assert!(matches!(
            ped.descendants("Z", None),
            Err(PedigreeError::UnknownIndividual(_))
        ));

        // A cycle back to S does not list S among its own descendants.
        ped.set_parents("S", Some("H"), None).unwrap();
        assert_eq!(ped.descendants("S", None).unwrap(), vec!["A", "B", "G", "H"]);

        // Removed animals drop out of the walk.
        ped.remove_animal("G").unwrap();
        assert_eq!(ped.descendants("A", None).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_duplicate_animal_id() {
        let entries = vec![
            PedigreeEntry::new("1", Sex::Male, None, None),
            PedigreeEntry::new("1", Sex::Male, None, None),
        ];
        let result = Pedigree::from_entries(&entries);
        let msg = format!("{}", result.unwrap_err());
        assert!(msg.contains("Duplicate"), "Error was: {}", msg);
    }

    #[test]
    fn test_add_animal_incremental() {
        let mut ped = Pedigree::new();
        ped.add_animal("S1", Sex::Male, None, None).unwrap();
        ped.add_animal("D1", Sex::Female, None, None).unwrap();
        let idx = ped.add_animal("O1", Sex::Male, Some("S1"), Some("D1")).unwrap();

        assert_eq!(ped.n_animals(), 3);
        assert_eq!(ped.sire(idx), Some(0));
        assert_eq!(ped.dam(idx), Some(1));
        assert!(ped.add_animal("S1", Sex::Male, None, None).is_err());
    }

    #[test]
    fn test_remove_animal_leaves_unknown_parent() {
        let mut ped = trio();
        ped.remove_animal("1").unwrap();

        assert_eq!(ped.n_animals(), 2);
        assert_eq!(ped.animal_index("1"), None);
        assert_eq!(ped.animal_index("3"), Some(2));
        assert_eq!(ped.sire(2), None);
        assert_eq!(ped.dam(2), Some(1));
        assert!(ped.remove_animal("1").is_err());
        assert!(ped.add_animal("1", Sex::Male, None, None).is_err());
    }

    #[test]
    fn test_parse_parent_variants() {
        assert_eq!(parse_parent("0"), None);
        assert_eq!(parse_parent(""), None);
        assert_eq!(parse_parent("  "), None);
        assert_eq!(parse_parent("NA"), None);
        assert_eq!(parse_parent("Na"), None);
        assert_eq!(parse_parent("SireA"), Some("SireA".to_string()));
    }
}
