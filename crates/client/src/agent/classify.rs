//! Per-request classification.

use neu_core::Request;

/// Routing class of an intercepted GET request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    /// Under the API namespace. Never cached.
    Api,
    /// Loads an HTML document.
    Navigation,
    /// Everything else.
    StaticAsset,
}

/// Classify a request. API prefix wins over the Accept header.
pub fn classify(request: &Request, api_prefix: &str) -> RequestClass {
    if request.url.path().starts_with(api_prefix) {
        return RequestClass::Api;
    }

    if request.accept().is_some_and(accepts_html) {
        return RequestClass::Navigation;
    }

    RequestClass::StaticAsset
}

fn accepts_html(accept: &str) -> bool {
    accept
        .split(',')
        .any(|part| part.split(';').next().is_some_and(|media| media.trim().eq_ignore_ascii_case("text/html")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn req(path: &str) -> Request {
        Request::get(Url::parse("http://localhost:8080").unwrap().join(path).unwrap())
    }

    #[test]
    fn test_api_prefix() {
        assert_eq!(classify(&req("/api/checkin"), "/api/"), RequestClass::Api);
        assert_eq!(classify(&req("/api/"), "/api/"), RequestClass::Api);
        assert_eq!(classify(&req("/apis.js"), "/api/"), RequestClass::StaticAsset);
    }

    #[test]
    fn test_api_wins_over_html_accept() {
        let request = req("/api/page").with_header("Accept", "text/html");
        assert_eq!(classify(&request, "/api/"), RequestClass::Api);
    }

    #[test]
    fn test_navigation_accept_header() {
        let browser = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
        assert_eq!(classify(&req("/about").with_header("Accept", browser), "/api/"), RequestClass::Navigation);
        assert_eq!(
            classify(&req("/about").with_header("Accept", "TEXT/HTML; charset=utf-8"), "/api/"),
            RequestClass::Navigation
        );
    }

    #[test]
    fn test_static_asset() {
        assert_eq!(classify(&req("/app.js"), "/api/"), RequestClass::StaticAsset);
        assert_eq!(
            classify(&req("/logo.png").with_header("Accept", "image/avif,image/webp,*/*"), "/api/"),
            RequestClass::StaticAsset
        );
        assert_eq!(
            classify(&req("/data.json").with_header("Accept", "application/xhtml+xml"), "/api/"),
            RequestClass::StaticAsset
        );
    }
}
