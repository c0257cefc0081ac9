//! Link Extractor: pulls candidate links out of rendered HTML, resolves
//! them against the page's base URL, and normalizes/deduplicates the
//! result. Purely computational — no I/O.

use riptide_types::CanonicalUrl;
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use tracing::debug;
use url::Url;

/// Extract every in-document link from `html`, resolved against
/// `base_url`, normalized, and deduplicated. `javascript:`, `mailto:`,
/// `tel:` and empty-fragment links are dropped.
pub fn extract(base_url: &str, html: &str) -> Vec<CanonicalUrl> {
    let Ok(base) = Url::parse(base_url) else {
        debug!(base_url, "cannot extract links: base URL does not parse");
        return Vec::new();
    };

    let document = Html::parse_document(html);
    let anchor_selector = Selector::parse("a[href]").unwrap();
    let iframe_selector = Selector::parse("iframe[src]").unwrap();

    let mut seen = BTreeSet::new();
    let mut out = Vec::new();

    let raw_refs = document
        .select(&anchor_selector)
        .filter_map(|el| el.value().attr("href"))
        .chain(
            document
                .select(&iframe_selector)
                .filter_map(|el| el.value().attr("src")),
        );

    for raw in raw_refs {
        if is_ignorable(raw) {
            continue;
        }
        let Ok(resolved) = base.join(raw) else {
            continue;
        };
        let Ok(canonical) = riptide_url::normalize(resolved.as_str()) else {
            continue;
        };
        if seen.insert(canonical.clone()) {
            out.push(canonical);
        }
    }

    out
}

fn is_ignorable(href: &str) -> bool {
    let trimmed = href.trim();
    trimmed.is_empty()
        || trimmed.starts_with('#')
        || trimmed.starts_with("javascript:")
        || trimmed.starts_with("mailto:")
        || trimmed.starts_with("tel:")
}
