//! URL canonicalization and resolution against the agent's origin.

/// Error type for URL canonicalization failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Resolve a manifest entry or request target against the origin.
///
/// Absolute paths (`/index.html`) and relative references join onto the
/// origin; anything carrying a scheme is canonicalized on its own.
pub fn resolve(origin: &url::Url, input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    if trimmed.contains("://") {
        return canonicalize(trimmed);
    }

    let mut joined = origin.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    joined.set_fragment(None);
    Ok(joined)
}

/// Canonicalize a URL string so equal resources share one request identity.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Default scheme to https:// if missing
/// 3. Lowercase the host
/// 4. Remove fragment (#...)
/// 5. Keep query string intact (do not reorder)
pub fn canonicalize(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let url_str = if trimmed.contains("://") { trimmed.to_string() } else { format!("https://{trimmed}") };

    let mut parsed = url::Url::parse(&url_str).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if let Some(mut host) = parsed.host_str() {
        let h = host.to_lowercase();
        host = h.as_str();
        parsed
            .set_host(Some(host))
            .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    }

    parsed.set_fragment(None);

    Ok(parsed)
}
