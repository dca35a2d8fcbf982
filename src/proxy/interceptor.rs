//! Record-replay interceptor wrapping an inner transport

use bytes::Bytes;
use hyper::{Request, Response};
use tracing::debug;

use super::lock_cache;
use super::policy::ModePolicy;
use crate::config::{Mode, Options};
use crate::network::{ResponseBody, Transport};
use crate::storage::CacheStore;
use crate::Result;

/// Pipeline stage that records and replays responses of an inner transport
///
/// Every request is handled under the process-wide cache lock, including the
/// upstream call, so two interceptors sharing a cache directory never record
/// the same key concurrently. The lock is shared by all instances.
pub struct Interceptor<T> {
    transport: T,
    options: Options,
    store: CacheStore,
}

impl<T: Transport> Interceptor<T> {
    /// Wrap `transport` with the behaviour described by `options`
    ///
    /// The absolute cache directory is resolved here, once.
    ///
    /// # Errors
    ///
    /// Returns error if the cache directory cannot be resolved
    pub fn new(transport: T, options: Options) -> Result<Self> {
        let store = CacheStore::from_options(&options)?;
        debug!(
            "Interceptor in {} mode, cache at {}",
            options.mode(),
            store.directory().display()
        );

        Ok(Self {
            transport,
            options,
            store,
        })
    }

    /// Send `request` through the interceptor
    ///
    /// # Errors
    ///
    /// Returns error if the cache directory cannot be created, a cache entry
    /// cannot be read or written, or the inner transport fails
    pub async fn send(&self, request: Request<Bytes>) -> Result<Response<ResponseBody>> {
        let _guard = lock_cache().await;
        self.store.ensure_dir()?;
        ModePolicy::new(&self.transport, &self.store, &self.options)
            .apply(request)
            .await
    }

    /// Operating mode
    pub fn mode(&self) -> Mode {
        self.options.mode()
    }

    /// Options this interceptor was built with
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Cache store
    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    /// Inner transport
    pub fn transport(&self) -> &T {
        &self.transport
    }
}
