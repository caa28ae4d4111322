//! URL template rendering.
//!
//! Direct-probe templates reference TM variants by name (`{tm_dashed}`);
//! search templates take a single URL-encoded `{query}`.

use std::sync::LazyLock;

use regex::Regex;

use crate::identifiers::TmFormats;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([A-Za-z_]+)\}").unwrap());

const GOOGLE_SEARCH: &str = "https://www.google.com/search?q=";

/// Placeholder names referenced by a template, in order of appearance.
pub fn placeholders(template: &str) -> Vec<&str> {
    PLACEHOLDER
        .captures_iter(template)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect()
}

/// Fill a template from TM variants.
///
/// Returns `None` when the template names a variant this TM does not have.
pub fn render_tm(template: &str, formats: &TmFormats) -> Option<String> {
    let mut rendered = template.to_string();
    for name in placeholders(template) {
        let value = formats.variant(name)?;
        rendered = rendered.replace(&format!("{{{}}}", name), &value);
    }
    Some(rendered)
}

/// Fill the `{query}` placeholder with a URL-encoded query.
pub fn render_query(template: &str, query: &str) -> String {
    template.replace("{query}", &urlencoding::encode(query))
}

/// Fill the `{query}` placeholder verbatim, for search-engine query strings.
pub fn render_raw_query(template: &str, query: &str) -> String {
    template.replace("{query}", query)
}

/// Google results page for a free-text query.
pub fn google_search_url(query: &str) -> String {
    format!("{}{}", GOOGLE_SEARCH, urlencoding::encode(query))
}
