//! Caller identity mixed into request fingerprints
//!
//! Lets otherwise identical requests (for example the same endpoint called
//! on behalf of two users) map to separate cache entries when the user is not
//! part of the query or body.

/// Supplies the identity string appended to the fingerprint hash input
///
/// Consulted once per request.
pub trait IdentityProvider: Send + Sync {
    /// Identifier of the user the request is made for
    fn user_identifier(&self) -> String;
}

/// Identity provider that contributes nothing to the fingerprint
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIdentity;

impl IdentityProvider for NoIdentity {
    fn user_identifier(&self) -> String {
        String::new()
    }
}

/// Identity provider returning a fixed identifier
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticIdentity(pub String);

impl StaticIdentity {
    /// Create a provider for a fixed identifier
    #[must_use]
    pub fn new(identifier: impl Into<String>) -> Self {
        Self(identifier.into())
    }
}

impl IdentityProvider for StaticIdentity {
    fn user_identifier(&self) -> String {
        self.0.clone()
    }
}

impl<F> IdentityProvider for F
where
    F: Fn() -> String + Send + Sync,
{
    fn user_identifier(&self) -> String {
        self()
    }
}
