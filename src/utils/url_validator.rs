//! URL validation for links accepted by the shortener.
//!
//! Validation never rewrites the URL: the string that passes is the string
//! that is stored and later used as the redirect target.

use url::{Host, Url};

/// Maximum accepted URL length in bytes.
pub const MAX_URL_LENGTH: usize = 2048;

/// Hosts that would redirect visitors back to their own machine.
const DISALLOWED_HOSTS: &[&str] = &["localhost", "127.0.0.1", "::1"];

/// Reasons a URL is rejected.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UrlValidationError {
    #[error("URL is empty")]
    Empty,

    #[error("URL is too long ({0} bytes, max 2048)")]
    TooLong(usize),

    #[error("URL has leading or trailing whitespace")]
    SurroundingWhitespace,

    #[error("URL contains control characters")]
    ControlCharacters,

    #[error("Malformed URL: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL has no host")]
    MissingHost,

    #[error("Disallowed host: {0}")]
    DisallowedHost(String),
}

/// Validates that `input` is an absolute `http`/`https` URL.
///
/// The accepted URL is returned byte for byte, so input with leading or
/// trailing whitespace is rejected rather than trimmed.
///
/// # Rules
///
/// 1. Non-empty, no surrounding whitespace, at most [`MAX_URL_LENGTH`] bytes
/// 2. No control characters (they would corrupt the `Location` header)
/// 3. Parses as an absolute URL
/// 4. Scheme is `http` or `https`
/// 5. Has a host that is not a loopback name, with or without a trailing dot
///
/// # Examples
///
/// ```ignore
/// assert_eq!(
///     validate_url("https://example.com/a/b?c=1").unwrap(),
///     "https://example.com/a/b?c=1"
/// );
/// assert!(validate_url("not-a-url").is_err());
/// ```
pub fn validate_url(input: &str) -> Result<&str, UrlValidationError> {
    if input.trim().is_empty() {
        return Err(UrlValidationError::Empty);
    }
    if input.trim() != input {
        return Err(UrlValidationError::SurroundingWhitespace);
    }
    if input.len() > MAX_URL_LENGTH {
        return Err(UrlValidationError::TooLong(input.len()));
    }
    if input.chars().any(char::is_control) {
        return Err(UrlValidationError::ControlCharacters);
    }

    let url = Url::parse(input).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlValidationError::UnsupportedProtocol),
    }

    let host = match url.host() {
        // `localhost.` is the fully qualified form of `localhost`.
        Some(Host::Domain(domain)) => domain.trim_end_matches('.').to_ascii_lowercase(),
        Some(Host::Ipv4(addr)) => addr.to_string(),
        Some(Host::Ipv6(addr)) => addr.to_string(),
        None => return Err(UrlValidationError::MissingHost),
    };
    if host.is_empty() {
        return Err(UrlValidationError::MissingHost);
    }
    if DISALLOWED_HOSTS.contains(&host.as_str()) {
        return Err(UrlValidationError::DisallowedHost(host));
    }

    Ok(input)
}
