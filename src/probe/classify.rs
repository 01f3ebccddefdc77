//! Response classification.
//!
//! Turns a status code and optional `Location` header into the result string
//! reported for a probe.

use crate::config::{NO_REDIRECT, PROTECTED_NO_REDIRECT, SEO_PROTECTED_NO_REDIRECT};

/// Returns `true` for the two statuses whose `Location` header is reported.
pub fn is_redirect_status(status: u16) -> bool {
    status == 301 || status == 302
}

/// Classifies a response for the primary country/user-agent probe.
///
/// A 301/302 with a non-empty `Location` reports the header value verbatim;
/// everything else is `No redirect`.
pub fn classify_response(status: u16, location: Option<&str>) -> String {
    match location {
        Some(location) if is_redirect_status(status) && !location.is_empty() => {
            location.to_string()
        }
        _ => NO_REDIRECT.to_string(),
    }
}

/// Classifies a response for the header-map probe.
///
/// Same as [`classify_response`], except a 200 is refined by the requested path:
/// `wp-admin` is protected, `robots.txt` and `sitemap` are SEO protected.
pub fn classify_special_response(url: &str, status: u16, location: Option<&str>) -> String {
    if status != 200 {
        return classify_response(status, location);
    }
    let path = requested_path(url);
    if path.contains("wp-admin") {
        PROTECTED_NO_REDIRECT.to_string()
    } else if path.contains("robots.txt") || path.contains("sitemap") {
        SEO_PROTECTED_NO_REDIRECT.to_string()
    } else {
        NO_REDIRECT.to_string()
    }
}

// Falls back to the raw string when the URL does not parse.
fn requested_path(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(parsed) => match parsed.query() {
            Some(query) => format!("{}?{query}", parsed.path()),
            None => parsed.path().to_string(),
        },
        Err(_) => url.to_string(),
    }
}
