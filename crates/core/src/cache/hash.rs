//! Request identity keys.

use sha2::{Digest, Sha256};
use url::Url;

use crate::http::{Method, Request};

/// Compute the bucket key for a request identity.
///
/// Identity is method plus URL; the fragment never reaches the server and
/// is ignored, matching how browser caches match requests.
pub fn compute_request_key(method: &Method, url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);

    let mut hasher = Sha256::new();
    hasher.update(method.as_str().as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_str().as_bytes());
    hex::encode(hasher.finalize())
}

/// Key for a full request.
pub fn request_key(request: &Request) -> String {
    compute_request_key(&request.method, &request.url)
}
