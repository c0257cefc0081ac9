//! URL normalization: a pure function that reduces a raw URL to the
//! canonical form used for equality, hashing, and visited-set membership
//! throughout the crawl engine.
//!
//! No DNS, no I/O — `normalize` only rewrites the string.

use riptide_types::CanonicalUrl;
use thiserror::Error;
use url::Url;

/// Failure reasons a raw URL can be rejected for.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("URL does not parse: {0}")]
    Unparseable(String),
    #[error("unsupported scheme, only http/https are accepted")]
    UnsupportedScheme,
    #[error("URL has no host")]
    MissingHost,
}

/// Normalize a raw URL string into its canonical form.
///
/// Contract: idempotent (`normalize(normalize(x)) == normalize(x)`),
/// deterministic, and rejects anything without an `http`/`https` scheme or
/// a host. The fragment is always dropped; the path has duplicate slashes
/// collapsed and a trailing slash removed unless the path is exactly `/`;
/// query keys are sorted (stable) by key, including blank-valued keys.
pub fn normalize(raw: &str) -> Result<CanonicalUrl, NormalizeError> {
    let parsed = Url::parse(raw).map_err(|e| NormalizeError::Unparseable(e.to_string()))?;
    canonicalize(parsed)
}

fn canonicalize(mut url: Url) -> Result<CanonicalUrl, NormalizeError> {
    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(NormalizeError::UnsupportedScheme),
    }
    if url.host_str().is_none() {
        return Err(NormalizeError::MissingHost);
    }

    url.set_fragment(None);

    let lower_host = url.host_str().unwrap().to_ascii_lowercase();
    url.set_host(Some(&lower_host))
        .map_err(|e| NormalizeError::Unparseable(e.to_string()))?;

    strip_default_port(&mut url);

    let collapsed_path = collapse_path(url.path());
    url.set_path(&collapsed_path);

    sort_query(&mut url);

    Ok(CanonicalUrl(url.to_string()))
}

fn strip_default_port(url: &mut Url) {
    let is_default = matches!(
        (url.scheme(), url.port()),
        ("http", Some(80)) | ("https", Some(443))
    );
    if is_default {
        let _ = url.set_port(None);
    }
}

fn collapse_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return "/".to_string();
    }
    format!("/{}", segments.join("/"))
}

fn sort_query(url: &mut Url) {
    if url.query().is_none() {
        return;
    }
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    url.query_pairs_mut().clear();
    if pairs.is_empty() {
        url.set_query(None);
    } else {
        let mut serializer = url.query_pairs_mut();
        for (k, v) in &pairs {
            serializer.append_pair(k, v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_scheme_and_host() {
        let n = normalize("HTTPS://Example.COM/path").unwrap();
        assert_eq!(n.as_str(), "https://example.com/path");
    }

    #[test]
    fn strips_default_port() {
        let n = normalize("http://example.com:80/").unwrap();
        assert_eq!(n.as_str(), "http://example.com/");
        let n = normalize("https://example.com:443/").unwrap();
        assert_eq!(n.as_str(), "https://example.com/");
    }

    #[test]
    fn keeps_non_default_port() {
        let n = normalize("http://example.com:8080/").unwrap();
        assert_eq!(n.as_str(), "http://example.com:8080/");
    }

    #[test]
    fn drops_fragment() {
        let n = normalize("https://example.com/a#frag").unwrap();
        assert_eq!(n.as_str(), "https://example.com/a");
    }

    #[test]
    fn collapses_duplicate_slashes_and_trailing_slash() {
        let n = normalize("https://example.com//a//b/").unwrap();
        assert_eq!(n.as_str(), "https://example.com/a/b");
    }

    #[test]
    fn root_path_stays_root() {
        let n = normalize("https://example.com").unwrap();
        assert_eq!(n.as_str(), "https://example.com/");
    }

    #[test]
    fn sorts_query_keys_stably() {
        let a = normalize("https://example.com/a?b=1&a=2").unwrap();
        let b = normalize("https://example.com/a?a=2&b=1").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "https://example.com/a?a=2&b=1");
    }

    #[test]
    fn rejects_non_http_scheme() {
        assert_eq!(
            normalize("ftp://example.com/"),
            Err(NormalizeError::UnsupportedScheme)
        );
    }

    #[test]
    fn rejects_missing_host() {
        assert!(matches!(
            normalize("mailto:someone@example.com"),
            Err(NormalizeError::UnsupportedScheme) | Err(NormalizeError::MissingHost)
        ));
    }

    #[test]
    fn is_idempotent() {
        let raw = "HTTPS://Example.com:443//a//b/?z=1&a=2#frag";
        let once = normalize(raw).unwrap();
        let twice = normalize(once.as_str()).unwrap();
        assert_eq!(once, twice);
    }
}
