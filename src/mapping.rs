//! Static model-to-TM lookup table.
//!
//! The table is assembled from named subsets once at startup and shared
//! behind an `Arc`. Keys are stored in their canonical uppercase form.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::identifiers::{normalize_model, strip_punctuation};

/// Errors raised while assembling the table.
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("model {model} is mapped in both {first} and {second}")]
    DuplicateModel {
        model: String,
        first: MappingCategory,
        second: MappingCategory,
    },
}

/// Named group of mapping entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingCategory {
    Generators,
    Communications,
    Vehicles,
}

impl MappingCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generators => "generators",
            Self::Communications => "communications",
            Self::Vehicles => "vehicles",
        }
    }
}

impl fmt::Display for MappingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named group of model → TM entries, in declaration order.
#[derive(Debug, Clone)]
pub struct MappingSubset {
    pub category: MappingCategory,
    pub entries: Vec<(String, Vec<String>)>,
}

impl MappingSubset {
    pub fn new(category: MappingCategory, entries: &[(&str, &[&str])]) -> Self {
        Self {
            category,
            entries: entries
                .iter()
                .map(|(model, tms)| {
                    (
                        model.to_string(),
                        tms.iter().map(|tm| tm.to_string()).collect(),
                    )
                })
                .collect(),
        }
    }
}

/// Union of all subsets, with an index for exact lookups.
#[derive(Debug, Clone)]
pub struct MappingTable {
    subsets: Vec<MappingSubset>,
    /// Flattened (model, tms) in subset order; fuzzy matching walks this.
    entries: Vec<(String, Vec<String>)>,
    index: HashMap<String, usize>,
}

impl MappingTable {
    /// Build a table, rejecting any model key that appears twice.
    pub fn from_subsets(subsets: Vec<MappingSubset>) -> Result<Self, MappingError> {
        let mut entries = Vec::new();
        let mut index = HashMap::new();
        let mut owners: HashMap<String, MappingCategory> = HashMap::new();

        for subset in &subsets {
            for (model, tms) in &subset.entries {
                let key = model.to_uppercase();
                if let Some(first) = owners.get(&key) {
                    return Err(MappingError::DuplicateModel {
                        model: key,
                        first: *first,
                        second: subset.category,
                    });
                }
                owners.insert(key.clone(), subset.category);
                index.insert(key.clone(), entries.len());
                entries.push((key, tms.clone()));
            }
        }

        Ok(Self {
            subsets,
            entries,
            index,
        })
    }

    /// The table shipped with the service.
    pub fn bundled() -> Result<Self, MappingError> {
        Self::from_subsets(vec![
            MappingSubset::new(MappingCategory::Generators, GENERATORS),
            MappingSubset::new(MappingCategory::Communications, COMMUNICATIONS),
            MappingSubset::new(MappingCategory::Vehicles, VEHICLES),
        ])
    }

    /// Number of model keys across all subsets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn subsets(&self) -> &[MappingSubset] {
        &self.subsets
    }

    /// Candidate TM numbers for a model, best match first.
    ///
    /// Exact keys win outright. Otherwise every key that matches after
    /// punctuation removal, or that contains (or is contained in) the
    /// model, contributes its TMs. The containment rule is loose: short
    /// inputs such as `M1` match every `M1xxx` key.
    pub fn lookup(&self, model: &str) -> Vec<String> {
        let normalized = normalize_model(model);
        if normalized.is_empty() {
            return Vec::new();
        }

        if let Some(&idx) = self.index.get(&normalized) {
            return self.entries[idx].1.clone();
        }

        let clean = strip_punctuation(&normalized);
        let mut found: Vec<String> = Vec::new();

        for (key, tms) in &self.entries {
            let fuzzy = !clean.is_empty() && strip_punctuation(key) == clean;
            let contains = key.contains(&normalized) || normalized.contains(key.as_str());
            if !(fuzzy || contains) {
                continue;
            }
            for tm in tms {
                if !found.contains(tm) {
                    found.push(tm.clone());
                }
            }
        }

        found
    }
}

const GENERATORS: &[(&str, &[&str])] = &[
    ("MEP-1030A", &["9-6115-749-10"]),
    ("MEP-1031", &["9-6115-749-10"]),
    ("MEP-802A", &["9-6115-641-10"]),
    ("MEP-803A", &["9-6115-642-10"]),
    ("MEP-804A", &["9-6115-643-10"]),
    ("MEP-804B", &["9-6115-643-10"]),
    ("MEP-805A", &["9-6115-644-10"]),
    ("MEP-806A", &["9-6115-645-10"]),
    ("MEP-806B", &["9-6115-672-14"]),
    ("MEP-812A", &["9-6115-641-10"]),
    ("MEP-813A", &["9-6115-642-10"]),
    ("MEP-814A", &["9-6115-643-10"]),
    ("MEP-814B", &["9-6115-643-10"]),
    ("MEP-815A", &["9-6115-644-10"]),
    ("MEP-816A", &["9-6115-645-10"]),
    ("MEP-816B", &["9-6115-672-14"]),
    ("MEP-952B", &["9-6115-664-13"]),
    ("MEP-831A", &["9-6115-639-13"]),
    ("MEP-832A", &["9-6115-639-13"]),
    ("MEP-003A", &["9-6115-585-24P"]),
    ("MEP-112A", &["9-6115-585-24P"]),
    ("MEP-113A", &["9-6115-464-34"]),
    ("MEP-004A", &["9-6115-464-34"]),
    ("MEP-103A", &["9-6115-464-34"]),
];

const COMMUNICATIONS: &[(&str, &[&str])] = &[
    ("AN/PRC-119", &["11-5820-890-10-3"]),
    ("AN/VRC-87", &["11-5820-890-10-3"]),
    ("AN/VRC-88", &["11-5820-890-10-3"]),
    ("AN/PRC-127", &["11-5820-1048-24"]),
];

const VEHICLES: &[(&str, &[&str])] = &[
    ("M1151", &["9-2320-387-10"]),
    ("M1152", &["9-2320-387-10"]),
    ("M1165", &["9-2320-387-10"]),
    ("HMMWV", &["9-2320-280-10", "9-2320-280-20"]),
    ("M998", &["9-2320-280-10"]),
    ("M1025", &["9-2320-280-10"]),
    ("M1043", &["9-2320-280-10"]),
    ("M200A/P", &["9-6150-226-13", "9-6150-226-23P"]),
    ("M200A", &["9-6150-226-13", "9-6150-226-23P"]),
    ("M200AP", &["9-6150-226-13", "9-6150-226-23P"]),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> MappingTable {
        MappingTable::bundled().unwrap()
    }

    #[test]
    fn test_bundled_table_builds() {
        let table = table();
        assert_eq!(table.len(), 38);
        assert_eq!(table.subsets().len(), 3);
        assert_eq!(table.subsets()[1].category, MappingCategory::Communications);
    }

    #[test]
    fn test_exact_lookup() {
        assert_eq!(table().lookup("MEP-803A"), vec!["9-6115-642-10"]);
        assert_eq!(
            table().lookup("hmmwv"),
            vec!["9-2320-280-10", "9-2320-280-20"]
        );
    }

    #[test]
    fn test_lookup_ignores_punctuation() {
        let table = table();
        assert_eq!(table.lookup("MEP-803A"), table.lookup("MEP803A"));
        assert_eq!(table.lookup("MEP 803A"), vec!["9-6115-642-10"]);
    }

    #[test]
    fn test_lookup_normalizes_numeric_model() {
        assert_eq!(table().lookup("803A"), vec!["9-6115-642-10"]);
    }

    #[test]
    fn test_lookup_slash_family() {
        let table = table();
        let expected = vec!["9-6150-226-13", "9-6150-226-23P"];
        assert_eq!(table.lookup("M200A"), expected);
        assert_eq!(table.lookup("M200AP"), expected);
        assert_eq!(table.lookup("M200A/P"), expected);
    }

    #[test]
    fn test_lookup_substring_has_no_duplicates() {
        // MEP-80 is contained in MEP-804A and MEP-804B, which share a TM
        let results = table().lookup("MEP-80");
        let mut deduped = results.clone();
        deduped.dedup();
        assert_eq!(results.len(), deduped.len());
        assert_eq!(
            results.iter().filter(|tm| *tm == "9-6115-643-10").count(),
            1
        );
    }

    #[test]
    fn test_lookup_fuzzy_and_substring_same_key() {
        // "MEP-1031-" hits MEP-1031 by punctuation removal and by containment
        let results = table().lookup("MEP-1031-");
        assert_eq!(results, vec!["9-6115-749-10"]);

        let results = table().lookup("AN/PRC119");
        assert_eq!(results, vec!["11-5820-890-10-3"]);
    }

    #[test]
    fn test_lookup_empty_and_unknown() {
        assert!(table().lookup("").is_empty());
        assert!(table().lookup("   ").is_empty());
        assert!(table().lookup("ZZ-9999").is_empty());
    }

    #[test]
    fn test_duplicate_model_rejected() {
        let err = MappingTable::from_subsets(vec![
            MappingSubset::new(MappingCategory::Generators, &[("MEP-803A", &["1-2-3-4"])]),
            MappingSubset::new(MappingCategory::Vehicles, &[("mep-803a", &["5-6-7-8"])]),
        ])
        .unwrap_err();

        match err {
            MappingError::DuplicateModel {
                model,
                first,
                second,
            } => {
                assert_eq!(model, "MEP-803A");
                assert_eq!(first, MappingCategory::Generators);
                assert_eq!(second, MappingCategory::Vehicles);
            }
        }
    }
}
