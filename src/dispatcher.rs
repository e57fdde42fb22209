//! Request dispatch.
//!
//! The dispatcher walks one request through a fixed sequence of gates and
//! maps every way the walk can fail to exactly one response:
//!
//! | Condition | Response |
//! |---|---|
//! | Request incomplete or verb unknown | 400, before any matching |
//! | Path does not decode | 400, logged |
//! | No template fits the path shape | 400 |
//! | Shape fits, verb does not | 405 with `allow` |
//! | Auth declared but no provider installed | 500, logged |
//! | Provider denies | 401 with `www-authenticate` challenge |
//! | Parameter or body does not convert | 400 |
//! | Handler fault or panic | 500 with a plain-text diagnostic |
//!
//! Nothing escapes: [`Dispatcher::dispatch`] always returns a [`Response`],
//! and a handler panic is contained to the request that caused it.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use tracing::{debug, error, warn};

use crate::adapter;
use crate::auth::{AuthDecision, AuthorizationProvider};
use crate::content::{ContentDecoder, JsonDecoder};
use crate::error::DispatchError;
use crate::executor::{ContentExecutor, MethodExecutor, PlainExecutor};
use crate::method::AllowedMethods;
use crate::registry::RouteRegistry;
use crate::request::Request;
use crate::response::Response;
use crate::route::RouteEntry;
use crate::uri::ParsedUri;

/// Translates handler faults into responses before the default 500 applies.
///
/// Return `Some` to answer with your own response, `None` to fall through to
/// the standard diagnostic. The hook sees every handler fault, a caught panic
/// included (delivered as a synthesized error whose message starts with
/// `handler panicked`); protocol failures (400, 401, 405) are not negotiable.
pub trait ErrorHandler: Send + Sync {
    fn handle(&self, request: &Request, error: &anyhow::Error) -> Option<Response>;
}

/// Routes requests and runs their handlers.
pub struct Dispatcher {
    registry: RouteRegistry,
    authorizer: Option<Arc<dyn AuthorizationProvider>>,
    error_handler: Option<Arc<dyn ErrorHandler>>,
    plain: PlainExecutor,
    content: ContentExecutor,
}

impl Dispatcher {
    /// Builds a dispatcher over a registered route table, decoding bodies as
    /// JSON until told otherwise.
    pub fn new(registry: RouteRegistry) -> Self {
        Self {
            registry,
            authorizer: None,
            error_handler: None,
            plain: PlainExecutor,
            content: ContentExecutor::new(Arc::new(JsonDecoder)),
        }
    }

    /// Installs the authorization provider consulted for routes that declare
    /// a requirement.
    pub fn with_authorizer(mut self, provider: Arc<dyn AuthorizationProvider>) -> Self {
        self.authorizer = Some(provider);
        self
    }

    /// Replaces the JSON body decoder.
    pub fn with_decoder(mut self, decoder: Arc<dyn ContentDecoder>) -> Self {
        self.content = ContentExecutor::new(decoder);
        self
    }

    /// Installs a handler-fault hook.
    pub fn with_error_handler(mut self, hook: Arc<dyn ErrorHandler>) -> Self {
        self.error_handler = Some(hook);
        self
    }

    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    /// Dispatches one request. Infallible by construction: every failure
    /// inside becomes a response here.
    pub async fn dispatch(&self, request: Request) -> Response {
        match self.try_dispatch(&request).await {
            Ok(response) => response,
            Err(error) => self.error_response(&request, error),
        }
    }

    async fn try_dispatch(&self, request: &Request) -> Result<Response, DispatchError> {
        if !request.is_complete() {
            return Err(DispatchError::Incomplete);
        }
        if !request.method().is_supported() {
            return Err(DispatchError::UnsupportedVerb);
        }

        let uri = ParsedUri::parse(request.path())?;

        let candidates = self.registry.find_candidates(&uri);
        if candidates.is_empty() {
            return Err(DispatchError::NoRoute);
        }
        let Some(route) = candidates
            .iter()
            .find(|entry| entry.method() == request.method())
            .copied()
        else {
            let allowed = AllowedMethods::new(candidates.iter().map(|entry| entry.method()).collect());
            return Err(DispatchError::VerbMismatch(allowed));
        };
        debug!(route = %route, "route selected");

        if let Some(requirement) = route.auth_requirement() {
            let Some(provider) = &self.authorizer else {
                error!(route = %route, "authorization required but no provider is configured");
                return Err(DispatchError::AuthMisconfigured);
            };
            match provider.authorize(request, requirement) {
                AuthDecision::Granted => {}
                AuthDecision::Denied => {
                    return Err(DispatchError::AuthDenied {
                        realm: provider.realm().to_owned(),
                    });
                }
            }
        }

        self.run_handler(route, request, &uri).await
    }

    /// Extracts arguments, invokes the handler, and awaits a deferred result.
    /// The whole sequence runs under a panic guard so one bad handler cannot
    /// take the worker down.
    async fn run_handler(
        &self,
        route: &RouteEntry,
        request: &Request,
        uri: &ParsedUri,
    ) -> Result<Response, DispatchError> {
        let executor: &dyn MethodExecutor = if route.wants_body() {
            &self.content
        } else {
            &self.plain
        };
        let guarded = AssertUnwindSafe(async {
            let outcome = executor.execute(route, request, uri)?;
            adapter::resolve(outcome).await.map_err(DispatchError::Handler)
        });
        match guarded.catch_unwind().await {
            Ok(result) => result,
            Err(payload) => Err(DispatchError::Panic(panic_message(payload))),
        }
    }

    fn error_response(&self, request: &Request, error: DispatchError) -> Response {
        match error {
            DispatchError::Incomplete | DispatchError::UnsupportedVerb | DispatchError::NoRoute => {
                Response::bad_request()
            }
            DispatchError::Uri(e) => {
                warn!(path = %request.path(), "rejecting undecodable path: {e}");
                Response::bad_request()
            }
            DispatchError::Conversion(e) => {
                debug!(path = %request.path(), "parameter conversion failed: {e}");
                Response::bad_request()
            }
            DispatchError::Content(e) => {
                debug!(path = %request.path(), "content rejected: {e}");
                Response::bad_request()
            }
            DispatchError::VerbMismatch(allowed) => Response::method_not_allowed(&allowed),
            // Already logged where it was detected, with the route in scope.
            DispatchError::AuthMisconfigured => {
                Response::internal_error("authorization is misconfigured")
            }
            DispatchError::AuthDenied { realm } => Response::unauthorized(&realm),
            DispatchError::Handler(e) => {
                if let Some(response) = self.hook_response(request, &e) {
                    return response;
                }
                error!(path = %request.path(), "handler failed: {e:#}");
                Response::internal_error(format!("{e:#}"))
            }
            DispatchError::Panic(message) => {
                let fault = anyhow::anyhow!("handler panicked: {message}");
                if let Some(response) = self.hook_response(request, &fault) {
                    return response;
                }
                error!(path = %request.path(), "handler panicked: {message}");
                Response::internal_error(message)
            }
        }
    }

    fn hook_response(&self, request: &Request, error: &anyhow::Error) -> Option<Response> {
        self.error_handler.as_ref()?.handle(request, error)
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_owned()
    }
}
