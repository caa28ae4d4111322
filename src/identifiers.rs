//! TM and model identifier normalization.
//!
//! A TM number is parsed once into [`TmFormats`], which carries every textual
//! variant the site strategies need for URL templating and substring tests.
//! Model numbers are canonicalized with [`normalize_model`] before any
//! mapping lookup.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

/// Numeric model prefixes that belong to the MEP generator family.
const MEP_NUMERIC_PREFIXES: &[&str] = &[
    "1030", "1031", "803", "804", "805", "806", "807", "812", "813", "814", "815", "816", "817",
    "831", "832",
];

/// Canonical spelling of the "A or P" variant family.
const SLASH_FAMILY_CANONICAL: &str = "M200A/P";

/// Leading "TM" label, with any separator that follows it.
static TM_LABEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^TM[\s:\-]*").unwrap());

/// Segment separators accepted in raw TM input.
static TM_SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-_\s]+").unwrap());

/// TM number patterns recoverable from a URL, tried in order.
static URL_TM_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"tm[_-]?(\d+[_-]\d+[_-]\d+[_-]\d+[a-z]*)").unwrap(),
        Regex::new(r"/(\d+[_-]\d+[_-]\d+[_-]\d+[a-z]*)\.pdf").unwrap(),
        Regex::new(r"(\d+[_-]\d+[_-]\d+[_-]\d+[a-z]*)").unwrap(),
    ]
});

/// Three-segment prefix of a TM number, used for partial matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialTm {
    /// First three segments joined with dashes (`9-6115-585`).
    pub dashed: String,
    /// Prefix with punctuation removed (`96115585`).
    pub clean: String,
    /// Prefix with underscores (`9_6115_585`).
    pub underscore: String,
    /// Prefix followed by a dash, for "starts with" searches (`9-6115-585-`).
    pub pattern: String,
}

/// Every textual form of one TM number.
///
/// All fields derive from `dashed`; nothing is mutable after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TmFormats {
    /// The raw input as received.
    pub original: String,
    /// Canonical hyphenated form (`9-6115-585-24P`).
    pub dashed: String,
    /// Punctuation removed (`9611558524P`).
    pub clean: String,
    /// Hyphens replaced with underscores.
    pub underscore: String,
    /// Hyphens replaced with spaces.
    pub spaced: String,
    /// First three segments, when there are at least three.
    pub partial: Option<PartialTm>,
    /// First four segments, when there are at least four.
    pub partial_four: Option<String>,
}

/// Parse a raw TM number into its format variants.
///
/// Returns `None` when the input contains no segments at all.
pub fn format_tm(raw: &str) -> Option<TmFormats> {
    let upper = raw.trim().to_uppercase();
    let without_label = TM_LABEL.replace(&upper, "");

    let segments: Vec<&str> = TM_SEPARATORS
        .split(without_label.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if segments.is_empty() {
        return None;
    }

    let dashed = segments.join("-");

    let partial = (segments.len() >= 3).then(|| {
        let prefix = segments[..3].join("-");
        PartialTm {
            clean: prefix.replace('-', ""),
            underscore: prefix.replace('-', "_"),
            pattern: format!("{}-", prefix),
            dashed: prefix,
        }
    });

    let partial_four = (segments.len() >= 4).then(|| segments[..4].join("-"));

    Some(TmFormats {
        original: raw.to_string(),
        clean: dashed.replace('-', ""),
        underscore: dashed.replace('-', "_"),
        spaced: dashed.replace('-', " "),
        dashed,
        partial,
        partial_four,
    })
}

impl TmFormats {
    /// The hyphen-separated segments of the canonical form.
    pub fn segments(&self) -> Vec<&str> {
        self.dashed.split('-').collect()
    }

    /// Look up a variant by its template name (`tm_dashed`, `tm_partial`, ...).
    ///
    /// Returns `None` for prefix variants this TM is too short to have, and
    /// for names that are not variants at all; use [`is_known_variant`] to
    /// tell the two apart.
    pub fn variant(&self, name: &str) -> Option<String> {
        let value = match name {
            "tm_original" => self.original.clone(),
            "tm_dashed" => self.dashed.clone(),
            "tm_clean" => self.clean.clone(),
            "tm_underscore" => self.underscore.clone(),
            "tm_spaced" => self.spaced.clone(),
            "tm_partial" => self.partial.as_ref()?.dashed.clone(),
            "tm_partial_clean" => self.partial.as_ref()?.clean.clone(),
            "tm_partial_underscore" => self.partial.as_ref()?.underscore.clone(),
            "tm_partial_pattern" => self.partial.as_ref()?.pattern.clone(),
            "tm_partial_four" => self.partial_four.clone()?,
            "tm_partial_four_underscore" => self.partial_four.as_ref()?.replace('-', "_"),
            _ => return None,
        };
        Some(value)
    }

    /// All variants this TM has, keyed by template name.
    pub fn variants(&self) -> BTreeMap<&'static str, String> {
        TM_VARIANT_NAMES
            .iter()
            .filter_map(|name| self.variant(name).map(|v| (*name, v)))
            .collect()
    }
}

/// Every variant name a URL template may reference.
pub const TM_VARIANT_NAMES: &[&str] = &[
    "tm_original",
    "tm_dashed",
    "tm_clean",
    "tm_underscore",
    "tm_spaced",
    "tm_partial",
    "tm_partial_clean",
    "tm_partial_underscore",
    "tm_partial_pattern",
    "tm_partial_four",
    "tm_partial_four_underscore",
];

/// Whether `name` is a TM variant a template may reference.
pub fn is_known_variant(name: &str) -> bool {
    TM_VARIANT_NAMES.contains(&name)
}

/// Canonicalize a model number for mapping lookups.
pub fn normalize_model(raw: &str) -> String {
    let model = raw.trim().to_uppercase();

    if model.contains(SLASH_FAMILY_CANONICAL)
        || model.replace(['/', ' '], "") == "M200AP"
        || model.contains("M200A")
    {
        return SLASH_FAMILY_CANONICAL.to_string();
    }

    if !model.starts_with("MEP")
        && MEP_NUMERIC_PREFIXES
            .iter()
            .any(|prefix| model.starts_with(prefix))
    {
        return format!("MEP-{}", model);
    }

    model
}

/// Strip everything but letters and digits, for punctuation-insensitive
/// comparisons.
pub fn strip_punctuation(s: &str) -> String {
    s.chars().filter(|c| c.is_alphanumeric()).collect()
}

/// Spelling variants of a model number for free-text searches.
pub fn model_variants(raw: &str) -> Vec<String> {
    let model = raw.trim().to_uppercase();
    if model.is_empty() {
        return Vec::new();
    }

    let candidates = [
        model.clone(),
        model.replace('-', ""),
        model.replace(' ', ""),
        model.replace('/', "-"),
        if model.starts_with("MEP") {
            model.clone()
        } else {
            format!("MEP-{}", model)
        },
    ];

    let mut variants: Vec<String> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !variants.contains(&candidate) {
            variants.push(candidate);
        }
    }
    variants
}

/// Recover a 4-segment TM number from a document URL.
pub fn extract_tm_from_url(url: &str) -> Option<String> {
    let lower = url.to_lowercase();
    URL_TM_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures(&lower)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().replace('_', "-").to_uppercase())
    })
}
