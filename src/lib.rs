//! Reprise - deterministic HTTP record-replay interceptor
//!
//! Wraps an HTTP transport and records upstream responses to a directory of
//! fixture files, replaying them for identical requests so tests can run
//! offline against real services.

#![deny(unsafe_code)]
#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::cargo)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::multiple_crate_versions
)]

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod identity;
pub mod network;
pub mod normalize;
pub mod proxy;
pub mod storage;

pub use config::{Config, Mode, Options};
pub use error::{RepriseError, Result};
pub use fingerprint::{compute_key, CacheKey, FingerprintOptions, RequestDescriptor};
pub use identity::{IdentityProvider, NoIdentity, StaticIdentity};
pub use network::{HyperTransport, ResponseBody, Transport};
pub use normalize::normalize;
pub use proxy::Interceptor;
