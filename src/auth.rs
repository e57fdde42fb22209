//! Authorization seam.
//!
//! The dispatcher never authenticates anyone. A route (or a whole controller
//! batch) declares an [`AuthRequirement`]; whether the request satisfies it is
//! the [`AuthorizationProvider`]'s call. Declaring a requirement without
//! installing a provider is a configuration fault and answers 500, never a
//! silent pass-through.

use crate::request::Request;

/// What a route demands of the caller.
///
/// An empty role list means "any authenticated caller".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AuthRequirement {
    roles: Vec<String>,
}

impl AuthRequirement {
    /// Requires authentication without naming roles.
    pub fn authenticated() -> Self {
        Self::default()
    }

    /// Requires any one of the given roles.
    pub fn roles<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn required_roles(&self) -> &[String] {
        &self.roles
    }
}

/// The provider's verdict on one request.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AuthDecision {
    Granted,
    Denied,
}

/// Judges requests against route requirements.
///
/// Implementations own the credential scheme entirely: header tokens,
/// cookies, mTLS identities forwarded by the proxy. The dispatcher only asks
/// for a verdict and, on denial, uses [`realm`](AuthorizationProvider::realm)
/// to build the `www-authenticate` challenge.
pub trait AuthorizationProvider: Send + Sync {
    /// The protection-space name quoted in the 401 challenge.
    fn realm(&self) -> &str;

    fn authorize(&self, request: &Request, requirement: &AuthRequirement) -> AuthDecision;
}
