//! Syntax checks for destination URLs and short codes.

use url::{Host, Url};

/// Punctuation a caller may use in a requested short code
pub const SHORT_PUNCTUATION: &[char] = &['_', '!', '-'];

/// Destinations must be shorter than this many bytes
pub const MAX_URL_LEN: usize = 2083;

/// Codes that collide with the service's own top-level routes
pub const RESERVED_SHORTS: &[&str] = &["admin", "api", "_internal"];

/// Strict URL check: explicit http/https scheme, a fully qualified domain
/// or IP address as host, no whitespace or angle brackets anywhere, and
/// shorter than [`MAX_URL_LEN`].
pub fn is_valid_url(candidate: &str) -> bool {
    if candidate.is_empty()
        || candidate.len() >= MAX_URL_LEN
        || candidate
            .chars()
            .any(|c| c.is_whitespace() || c == '<' || c == '>')
    {
        return false;
    }

    let lower = candidate.to_ascii_lowercase();
    if !lower.starts_with("http://") && !lower.starts_with("https://") {
        return false;
    }

    let url = match Url::parse(candidate) {
        Ok(url) => url,
        Err(_) => return false,
    };

    match url.host() {
        Some(Host::Domain(domain)) => is_fqdn(domain),
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => true,
        None => false,
    }
}

/// A requested short code may only hold ASCII letters, digits and
/// [`SHORT_PUNCTUATION`], must not be empty and must not be one of
/// [`RESERVED_SHORTS`].
pub fn is_valid_short(short: &str) -> bool {
    !short.is_empty()
        && !RESERVED_SHORTS.contains(&short)
        && short
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || SHORT_PUNCTUATION.contains(&c))
}

fn is_fqdn(domain: &str) -> bool {
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    let valid_labels = labels.iter().all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
    });
    if !valid_labels {
        return false;
    }

    // Punycode TLDs ("xn--...") are allowed, otherwise letters only
    labels.last().is_some_and(|tld| {
        tld.len() >= 2 && (tld.starts_with("xn--") || tld.chars().all(|c| c.is_ascii_alphabetic()))
    })
}
