//! Request fingerprinting for deterministic cache keys
//!
//! A key has the shape `<host+path with "/" replaced by "-">-<METHOD>-<DIGEST>.json`
//! where `DIGEST` is the uppercase hex SHA-256 of the optional body, the
//! optional query and the caller identity, concatenated in that order.

use std::fmt;

use bytes::Bytes;
use hyper::header::HOST;
use hyper::http::uri::Authority;
use hyper::Request;
use sha2::{Digest, Sha256};

/// File extension of every cache entry
pub const KEY_EXTENSION: &str = ".json";

/// The parts of a request that can contribute to its cache key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    /// HTTP method, verbatim (e.g., "GET")
    pub method: String,
    /// Host without port
    pub host: String,
    /// Request path
    pub path: String,
    /// Query string including its leading `?`, or empty
    pub query: String,
    /// Request body
    pub body: Bytes,
    /// Caller identity
    pub identity: String,
}

impl RequestDescriptor {
    /// Capture the descriptor of an outbound request
    ///
    /// The host is taken from the URI authority, or from the `Host` header
    /// for origin-form URIs.
    #[must_use]
    pub fn from_request(request: &Request<Bytes>, identity: String) -> Self {
        let uri = request.uri();
        let host = uri
            .host()
            .map(str::to_string)
            .or_else(|| host_header(request))
            .unwrap_or_default();
        let query = uri.query().map(|q| format!("?{q}")).unwrap_or_default();

        Self {
            method: request.method().as_str().to_string(),
            host,
            path: uri.path().to_string(),
            query,
            body: request.body().clone(),
            identity,
        }
    }
}

fn host_header(request: &Request<Bytes>) -> Option<String> {
    let value = request.headers().get(HOST)?.to_str().ok()?;
    let authority = value.parse::<Authority>().ok()?;
    Some(authority.host().to_string())
}

/// Which request parts feed the fingerprint hash
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FingerprintOptions {
    /// Hash the query string
    pub include_query: bool,
    /// Hash the request body
    pub include_body: bool,
}

/// Filesystem-safe cache key; also the cache entry's file name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key as a file name
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the key into its file name
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Compute the cache key of a request
///
/// Pure function of its inputs: identical descriptors and options produce
/// identical keys across processes and runs.
#[must_use]
pub fn compute_key(descriptor: &RequestDescriptor, options: FingerprintOptions) -> CacheKey {
    let path_segment = format!("{}{}", descriptor.host, descriptor.path).replace('/', "-");

    let mut hasher = Sha256::new();
    if options.include_body {
        hasher.update(&descriptor.body);
    }
    if options.include_query {
        hasher.update(descriptor.query.as_bytes());
    }
    hasher.update(descriptor.identity.as_bytes());
    let digest = hex::encode_upper(hasher.finalize());

    CacheKey(format!(
        "{path_segment}-{}-{digest}{KEY_EXTENSION}",
        descriptor.method
    ))
}
