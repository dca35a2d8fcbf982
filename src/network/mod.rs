//! Transport layer wrapped by the interceptor
//!
//! The interceptor only needs a way to send a request and get a response
//! back; [`Transport`] is that seam. [`HyperTransport`] is the default
//! implementation over hyper's pooled client.

mod client;

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full};
use hyper::{Request, Response};

use crate::Result;

pub use client::HyperTransport;

/// Type-erased error carried by response bodies
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Response body returned by transports and the interceptor
pub type ResponseBody = UnsyncBoxBody<Bytes, BoxError>;

/// Sends a request and resolves to its response
pub trait Transport: Send + Sync {
    /// Send `request` and return the response
    ///
    /// The response body may be a single-read stream.
    fn send(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Response<ResponseBody>>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn send(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Response<ResponseBody>>> + Send {
        self.as_ref().send(request)
    }
}

/// Body over an in-memory buffer
#[must_use]
pub fn full_body(bytes: impl Into<Bytes>) -> ResponseBody {
    Full::new(bytes.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Body with no content
#[must_use]
pub fn empty_body() -> ResponseBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed_unsync()
}
