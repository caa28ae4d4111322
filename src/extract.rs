//! Nameplate field extraction from OCR text.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Identifiers read off a nameplate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NameplateFields {
    pub model: Option<String>,
    pub tm: Option<String>,
}

impl NameplateFields {
    /// Whether either field was found.
    pub fn found(&self) -> bool {
        self.model.is_some() || self.tm.is_some()
    }
}

static TM_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"TM[:\s]*(\d+-\d+-\d+-\d+[A-Z]*)",
        r"TM[:\s]*(\d+-\d+-\d+-\d+)",
        r"\b(\d+-\d+-\d+-\d+[A-Z]*)\b",
        r"TM[:\s]*(\d+-\d+-\d+-\d+-\d+)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static TM_SHAPE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+-\d+-\d+-").unwrap());

static MODEL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\b(MEP[-\s]*[0-9]+[A-Z]*)\b",
        r"MODEL[:\s]*([A-Z0-9\-/]+)",
        r"\b(M[0-9]+[A-Z]*/?[A-Z]*)\b",
        r"\b([A-Z]{2,4}-?[0-9]{2,5}[A-Z]*/?[A-Z]*)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Candidates that look like a model but are nameplate boilerplate.
static MODEL_EXCLUDE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^TM\b",
        r"^TO\b",
        r"^\d+-\d+-\d+-",
        r"^(120|208|240|480)\b",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

const EXCLUDED_WORDS: &[&str] = &[
    "US",
    "NATO",
    "DEPARTMENT",
    "GENERATOR",
    "ENGINE",
    "DIESEL",
    "POWER",
    "ARMY",
    "SYSTEM",
];

/// Pull the model and TM number out of raw OCR text.
pub fn extract_fields(text: &str) -> NameplateFields {
    if text.trim().is_empty() {
        return NameplateFields::default();
    }

    let upper = text.to_uppercase();
    NameplateFields {
        model: find_model(&upper),
        tm: find_tm(&upper),
    }
}

fn find_tm(text: &str) -> Option<String> {
    TM_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .find(|candidate| candidate.len() >= 8 && TM_SHAPE.is_match(candidate))
            .map(str::to_string)
    })
}

fn find_model(text: &str) -> Option<String> {
    MODEL_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| WHITESPACE.replace_all(m.as_str().trim(), "").into_owned())
            .find(|candidate| !is_excluded_model(candidate))
    })
}

fn is_excluded_model(candidate: &str) -> bool {
    candidate.len() < 2
        || candidate.chars().all(|c| c.is_ascii_digit())
        || MODEL_EXCLUDE.iter().any(|re| re.is_match(candidate))
        || EXCLUDED_WORDS.iter().any(|word| candidate.contains(word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_tm_with_label() {
        let fields = extract_fields("OPERATOR MANUAL TM 9-6115-749-10");
        assert_eq!(fields.tm.as_deref(), Some("9-6115-749-10"));
    }

    #[test]
    fn test_extract_tm_with_suffix() {
        let fields = extract_fields("tm: 9-6115-585-24p");
        assert_eq!(fields.tm.as_deref(), Some("9-6115-585-24P"));
    }

    #[test]
    fn test_extract_tm_without_label() {
        let fields = extract_fields("REFER TO 9-6115-642-10 FOR SERVICE");
        assert_eq!(fields.tm.as_deref(), Some("9-6115-642-10"));
    }

    #[test]
    fn test_extract_model_label() {
        let fields = extract_fields("MODEL: MEP-1030A\nSERIAL: 12345");
        assert_eq!(fields.model.as_deref(), Some("MEP-1030A"));
    }

    #[test]
    fn test_extract_model_collapses_whitespace() {
        let fields = extract_fields("GENERATOR SET MEP 803A");
        assert_eq!(fields.model.as_deref(), Some("MEP803A"));
    }

    #[test]
    fn test_extract_vehicle_model() {
        let fields = extract_fields("TRUCK UTILITY M1151 ARMORED");
        assert_eq!(fields.model.as_deref(), Some("M1151"));
    }

    #[test]
    fn test_boilerplate_is_ignored() {
        let fields = extract_fields("ARMY GENERATOR 120");
        assert_eq!(fields, NameplateFields::default());
        assert!(!fields.found());
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(extract_fields(""), NameplateFields::default());
        assert_eq!(extract_fields("  \n "), NameplateFields::default());
    }

    #[test]
    fn test_both_fields() {
        let fields = extract_fields("MODEL MEP-803A\nTM 9-6115-642-10\nUS ARMY");
        assert_eq!(fields.model.as_deref(), Some("MEP-803A"));
        assert_eq!(fields.tm.as_deref(), Some("9-6115-642-10"));
        assert!(fields.found());
    }
}
