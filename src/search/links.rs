//! Anchor scanning helpers shared by the scraping strategies.

use scraper::{Html, Selector};
use url::Url;

/// An `<a href>` element with its visible text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub href: String,
    pub text: String,
}

impl Anchor {
    pub fn href_lower(&self) -> String {
        self.href.to_lowercase()
    }

    pub fn text_lower(&self) -> String {
        self.text.to_lowercase()
    }

    pub fn is_pdf(&self) -> bool {
        self.href_lower().contains(".pdf")
    }
}

/// Every anchor with an `href`, in document order.
pub fn anchors(html: &str) -> Vec<Anchor> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| {
            element.value().attr("href").map(|href| Anchor {
                href: href.trim().to_string(),
                text: element.text().collect::<String>().trim().to_string(),
            })
        })
        .collect()
}

/// Resolve `href` against `https://<domain>/`.
pub fn absolutize(domain: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }

    let base = format!("https://{}/", domain);
    match Url::parse(&base).and_then(|base| base.join(href)) {
        Ok(url) => url.to_string(),
        Err(_) if href.starts_with('/') => format!("https://{}{}", domain, href),
        Err(_) => format!("https://{}/{}", domain, href),
    }
}

/// Number of segments that occur in `haystack`.
pub fn segment_hits(segments: &[String], haystack: &str) -> usize {
    segments.iter().filter(|s| haystack.contains(s.as_str())).count()
}
