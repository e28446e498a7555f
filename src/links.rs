//! URL detection in tweet content.

use once_cell::sync::Lazy;
use regex::Regex;

/// Greedy on purpose: everything up to the next whitespace is part of the
/// URL, trailing punctuation included.
static URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(https?://[^\s]+)").expect("Invalid URL regex"));

/// The first http(s) URL in `content`, exactly as written.
pub fn first_url(content: &str) -> Option<&str> {
    URL_REGEX.find(content).map(|m| m.as_str())
}

/// Network location of `url` with `www.` stripped, e.g. `example.com:8080`.
pub fn url_domain(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    let netloc = match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_owned(),
    };
    Some(netloc.replace("www.", ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_url() {
        assert_eq!(
            first_url("look at https://example.com/a and http://other.org"),
            Some("https://example.com/a")
        );
        assert_eq!(first_url("http://plain.org"), Some("http://plain.org"));
    }

    #[test]
    fn test_no_url() {
        assert_eq!(first_url("no links here, ftp://nope.example"), None);
        assert_eq!(first_url(""), None);
    }

    #[test]
    fn test_trailing_punctuation_is_kept() {
        assert_eq!(
            first_url("read this: https://example.com/post."),
            Some("https://example.com/post.")
        );
        assert_eq!(
            first_url("(see https://example.com/x)"),
            Some("https://example.com/x)")
        );
    }

    #[test]
    fn test_url_domain() {
        assert_eq!(
            url_domain("https://www.example.com/path?q=1"),
            Some("example.com".to_string())
        );
        assert_eq!(
            url_domain("http://news.example.org:8080/"),
            Some("news.example.org:8080".to_string())
        );
        assert_eq!(url_domain("not a url"), None);
    }
}
