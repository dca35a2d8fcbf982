//! HTTP client transport for forwarding requests upstream

use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Request, Response};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tracing::{debug, warn};

use super::{BoxError, ResponseBody, Transport};
use crate::{RepriseError, Result};

/// Transport over hyper's pooled HTTP/1 client
///
/// Requests must carry absolute URIs.
#[derive(Clone)]
pub struct HyperTransport {
    client: Client<HttpConnector, Full<Bytes>>,
}

impl HyperTransport {
    /// Create a new transport
    #[must_use]
    pub fn new() -> Self {
        let client = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .build_http();

        Self { client }
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HyperTransport {
    async fn send(&self, request: Request<Bytes>) -> Result<Response<ResponseBody>> {
        debug!("Forwarding {} {}", request.method(), request.uri());

        let response = self
            .client
            .request(request.map(Full::new))
            .await
            .map_err(|e| {
                warn!("Request failed: {e}");
                RepriseError::Transport(format!("Request failed: {e}"))
            })?;

        Ok(response.map(|body| body.map_err(BoxError::from).boxed_unsync()))
    }
}
