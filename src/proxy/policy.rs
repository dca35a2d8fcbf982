//! Per-mode request handling

use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::{Request, Response, StatusCode, Version};
use tracing::{debug, info};

use crate::config::{Mode, Options};
use crate::fingerprint::{compute_key, CacheKey, RequestDescriptor};
use crate::network::{empty_body, full_body, ResponseBody, Transport};
use crate::normalize::normalize;
use crate::storage::CacheStore;
use crate::{RepriseError, Result};

/// Applies one fixed [`Mode`] to requests
///
/// Callers must hold the cache lock for the duration of [`ModePolicy::apply`].
pub struct ModePolicy<'a, T> {
    transport: &'a T,
    store: &'a CacheStore,
    options: &'a Options,
}

impl<'a, T: Transport> ModePolicy<'a, T> {
    /// Create a policy over a transport and store
    pub fn new(transport: &'a T, store: &'a CacheStore, options: &'a Options) -> Self {
        Self {
            transport,
            store,
            options,
        }
    }

    /// Handle `request` according to the configured mode
    ///
    /// # Errors
    ///
    /// Returns error if the transport fails or a cache entry cannot be
    /// read or written
    pub async fn apply(&self, request: Request<Bytes>) -> Result<Response<ResponseBody>> {
        match self.options.mode() {
            Mode::Passthrough => self.passthrough(request).await,
            Mode::RecordOnly => {
                let key = self.key_for(&request);
                self.send_and_record(request, key).await
            }
            Mode::ReplayOnly => {
                let key = self.key_for(&request);
                self.replay(request.version(), &key)
            }
            Mode::RecordAndReplay => {
                let key = self.key_for(&request);
                match self.store.lookup(&key)? {
                    Some(entry) => {
                        debug!("Replaying {key}");
                        replayed(request.version(), entry)
                    }
                    None => self.send_and_record(request, key).await,
                }
            }
        }
    }

    /// Cache key of `request`, consulting the identity provider once
    #[must_use]
    pub fn key_for(&self, request: &Request<Bytes>) -> CacheKey {
        let identity = self.options.identity_provider().user_identifier();
        let descriptor = RequestDescriptor::from_request(request, identity);
        compute_key(&descriptor, self.options.fingerprint())
    }

    async fn passthrough(&self, request: Request<Bytes>) -> Result<Response<ResponseBody>> {
        debug!("Passthrough {} {}", request.method(), request.uri());
        self.transport.send(request).await
    }

    fn replay(&self, version: Version, key: &CacheKey) -> Result<Response<ResponseBody>> {
        match self.store.lookup(key)? {
            Some(entry) => {
                debug!("Replaying {key}");
                replayed(version, entry)
            }
            None => {
                debug!("No recording for {key}");
                Ok(Response::builder()
                    .status(StatusCode::NOT_FOUND)
                    .version(version)
                    .body(empty_body())?)
            }
        }
    }

    async fn send_and_record(
        &self,
        request: Request<Bytes>,
        key: CacheKey,
    ) -> Result<Response<ResponseBody>> {
        let response = self.transport.send(request).await?;
        if !response.status().is_success() {
            debug!("Not recording {key}: upstream returned {}", response.status());
            return Ok(response);
        }

        // The transport body is single-read: buffer it once for disk and caller
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| RepriseError::Transport(format!("Failed to read response body: {e}")))?
            .to_bytes();

        self.store.write(&key, &entry_contents(&body))?;
        info!("Recorded {key} ({} bytes)", body.len());

        Ok(Response::from_parts(parts, full_body(body)))
    }
}

fn replayed(version: Version, entry: Bytes) -> Result<Response<ResponseBody>> {
    Ok(Response::builder()
        .status(StatusCode::OK)
        .version(version)
        .body(full_body(entry))?)
}

/// On-disk form of a recorded body: normalized text plus a trailing newline
fn entry_contents(body: &[u8]) -> Vec<u8> {
    match std::str::from_utf8(body) {
        Ok(text) => {
            let mut contents = normalize(text);
            contents.push('\n');
            contents.into_bytes()
        }
        Err(_) => {
            let mut contents = body.to_vec();
            contents.push(b'\n');
            contents
        }
    }
}
