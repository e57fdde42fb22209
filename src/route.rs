//! Route descriptors and handler type erasure.
//!
//! # How typed handlers are stored
//!
//! The registry needs to hold handlers with *different* controller and body
//! types in a single `Vec`. Rust collections can only hold one concrete type,
//! so each binding is erased into an [`Invoker`] closure behind a common
//! signature, and the registry stores those uniformly.
//!
//! The chain from user code to the erased call is:
//!
//! ```text
//! fn list(&self, args: Args) -> HandlerResult { … }     ← user writes this
//!        ↓ Route::get("/items").handle(Items::list)
//! ControllerRoute { kind, wants_body, bind }            ← typed, not yet erased
//!        ↓ registry.register(batch)
//! bind(factory)                                         ← factory injected once
//!        ↓ stored as Invoker = Arc<dyn Fn(Args, Option<Value>) → …>
//! entry.invoke(args, body)  at request time             ← one virtual call
//! ```
//!
//! Everything about the handler is declared explicitly at registration: the
//! verb, the template, the body type, whether the result is immediate or
//! deferred. Nothing is discovered by inspection at dispatch time.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::adapter::{HandlerOutcome, HandlerResult, ReturnKind};
use crate::auth::AuthRequirement;
use crate::error::ContentError;
use crate::method::Method;
use crate::params::Args;
use crate::template::Template;

// ── Controller construction ──────────────────────────────────────────────────

/// Produces the controller instance a handler runs against.
///
/// Implemented for free by any `Fn() -> Arc<C>` closure. Return a fresh
/// instance per call for stateless controllers, or clone one shared `Arc`
/// for controllers that carry state; [`ControllerRoutes::shared`] does the
/// latter for you.
pub trait ControllerFactory<C>: Send + Sync + 'static {
    fn create(&self) -> Arc<C>;
}

impl<C, F> ControllerFactory<C> for F
where
    F: Fn() -> Arc<C> + Send + Sync + 'static,
{
    fn create(&self) -> Arc<C> {
        self()
    }
}

// ── Internal types ───────────────────────────────────────────────────────────

/// A type-erased handler invocation, shared across concurrent requests.
///
/// The `Err` channel carries only body-binding failures, which are the
/// caller's fault. Handler faults travel inside the [`HandlerOutcome`].
pub(crate) type Invoker =
    Arc<dyn Fn(Args, Option<Value>) -> Result<HandlerOutcome, ContentError> + Send + Sync + 'static>;

/// Deferred erasure: turns the injected factory into an [`Invoker`] once, at
/// registration.
pub(crate) type BindFn<C> = Box<dyn FnOnce(Arc<dyn ControllerFactory<C>>) -> Invoker + Send>;

// ── Route descriptors ────────────────────────────────────────────────────────

/// A route declaration: verb, template, optional auth requirement.
///
/// Becomes a [`ControllerRoute`] once a handler is attached:
///
/// ```rust,no_run
/// # use ruta::{Args, AuthRequirement, HandlerResult, Response, Route};
/// # struct Items;
/// # impl Items {
/// #     fn list(&self, _args: Args) -> HandlerResult { Ok(Response::text("")) }
/// #     fn remove(&self, _args: Args) -> HandlerResult { Ok(Response::text("")) }
/// # }
/// Route::get("/items/{id:int}").handle(Items::list);
/// Route::delete("/items/{id:int}")
///     .authorize(AuthRequirement::roles(["admin"]))
///     .handle(Items::remove);
/// ```
pub struct Route {
    method: Method,
    template: String,
    auth: Option<AuthRequirement>,
}

impl Route {
    fn new(method: Method, template: &str) -> Self {
        Self { method, template: template.to_owned(), auth: None }
    }

    pub fn get(template: &str) -> Self {
        Self::new(Method::Get, template)
    }

    pub fn post(template: &str) -> Self {
        Self::new(Method::Post, template)
    }

    pub fn put(template: &str) -> Self {
        Self::new(Method::Put, template)
    }

    pub fn delete(template: &str) -> Self {
        Self::new(Method::Delete, template)
    }

    pub fn patch(template: &str) -> Self {
        Self::new(Method::Patch, template)
    }

    pub fn head(template: &str) -> Self {
        Self::new(Method::Head, template)
    }

    pub fn options(template: &str) -> Self {
        Self::new(Method::Options, template)
    }

    /// Declares an auth requirement for this route, overriding any batch
    /// default from [`ControllerRoutes::authorize_all`].
    pub fn authorize(mut self, requirement: AuthRequirement) -> Self {
        self.auth = Some(requirement);
        self
    }

    /// Binds a synchronous handler.
    pub fn handle<C, F>(self, handler: F) -> ControllerRoute<C>
    where
        C: Send + Sync + 'static,
        F: Fn(&C, Args) -> HandlerResult + Send + Sync + 'static,
    {
        self.bound(
            ReturnKind::Immediate,
            false,
            Box::new(move |factory| {
                Arc::new(move |args, _body| {
                    let controller = factory.create();
                    Ok(HandlerOutcome::Ready(handler(controller.as_ref(), args)))
                })
            }),
        )
    }

    /// Binds an asynchronous handler. Its future is produced here but only
    /// awaited by the dispatcher.
    pub fn handle_async<C, F, Fut>(self, handler: F) -> ControllerRoute<C>
    where
        C: Send + Sync + 'static,
        F: Fn(Arc<C>, Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.bound(
            ReturnKind::Deferred,
            false,
            Box::new(move |factory| {
                Arc::new(move |args, _body| {
                    let controller = factory.create();
                    Ok(HandlerOutcome::Pending(Box::pin(handler(controller, args))))
                })
            }),
        )
    }

    /// Binds a synchronous handler that takes a typed request body.
    pub fn handle_body<C, B, F>(self, handler: F) -> ControllerRoute<C>
    where
        C: Send + Sync + 'static,
        B: DeserializeOwned + Send + 'static,
        F: Fn(&C, Args, B) -> HandlerResult + Send + Sync + 'static,
    {
        self.bound(
            ReturnKind::Immediate,
            true,
            Box::new(move |factory| {
                Arc::new(move |args, body| {
                    let body = typed_body::<B>(body)?;
                    let controller = factory.create();
                    Ok(HandlerOutcome::Ready(handler(controller.as_ref(), args, body)))
                })
            }),
        )
    }

    /// Binds an asynchronous handler that takes a typed request body.
    pub fn handle_body_async<C, B, F, Fut>(self, handler: F) -> ControllerRoute<C>
    where
        C: Send + Sync + 'static,
        B: DeserializeOwned + Send + 'static,
        F: Fn(Arc<C>, Args, B) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.bound(
            ReturnKind::Deferred,
            true,
            Box::new(move |factory| {
                Arc::new(move |args, body| {
                    let body = typed_body::<B>(body)?;
                    let controller = factory.create();
                    Ok(HandlerOutcome::Pending(Box::pin(handler(controller, args, body))))
                })
            }),
        )
    }

    fn bound<C>(self, kind: ReturnKind, wants_body: bool, bind: BindFn<C>) -> ControllerRoute<C>
    where
        C: Send + Sync + 'static,
    {
        ControllerRoute {
            method: self.method,
            template: self.template,
            auth: self.auth,
            kind,
            wants_body,
            bind,
        }
    }
}

/// Converts an already-decoded body value into the handler's declared type.
fn typed_body<B: DeserializeOwned>(body: Option<Value>) -> Result<B, ContentError> {
    let value = body.ok_or(ContentError::MissingBody)?;
    Ok(serde_json::from_value(value)?)
}

/// A route with its handler bound, still typed to its controller.
pub struct ControllerRoute<C> {
    pub(crate) method: Method,
    pub(crate) template: String,
    pub(crate) auth: Option<AuthRequirement>,
    pub(crate) kind: ReturnKind,
    pub(crate) wants_body: bool,
    pub(crate) bind: BindFn<C>,
}

// ── Controller batches ───────────────────────────────────────────────────────

/// All routes for one controller, registered as a unit.
///
/// A batch either registers completely or not at all; see
/// [`RouteRegistry::register`](crate::RouteRegistry::register).
pub struct ControllerRoutes<C: Send + Sync + 'static> {
    pub(crate) factory: Arc<dyn ControllerFactory<C>>,
    pub(crate) default_auth: Option<AuthRequirement>,
    pub(crate) routes: Vec<ControllerRoute<C>>,
}

impl<C: Send + Sync + 'static> ControllerRoutes<C> {
    pub fn new(factory: impl ControllerFactory<C>) -> Self {
        Self {
            factory: Arc::new(factory),
            default_auth: None,
            routes: Vec::new(),
        }
    }

    /// Batch backed by one shared controller instance. Every request sees the
    /// same `C`, so state lives in the controller.
    pub fn shared(controller: C) -> Self {
        let shared = Arc::new(controller);
        Self::new(move || Arc::clone(&shared))
    }

    /// Default auth requirement for every route in the batch.
    ///
    /// Fills in only where a route declares nothing: a per-route
    /// [`Route::authorize`] replaces the default outright, even when it asks
    /// for less.
    pub fn authorize_all(mut self, requirement: AuthRequirement) -> Self {
        self.default_auth = Some(requirement);
        self
    }

    /// Adds a bound route. Returns `self` so registrations chain naturally.
    pub fn route(mut self, route: ControllerRoute<C>) -> Self {
        self.routes.push(route);
        self
    }
}

// ── Erased entries ───────────────────────────────────────────────────────────

/// One registered route after type erasure, as the registry stores it.
pub struct RouteEntry {
    method: Method,
    template: Template,
    auth: Option<AuthRequirement>,
    kind: ReturnKind,
    wants_body: bool,
    invoker: Invoker,
}

impl RouteEntry {
    pub(crate) fn erase<C: Send + Sync + 'static>(
        route: ControllerRoute<C>,
        factory: &Arc<dyn ControllerFactory<C>>,
        default_auth: &Option<AuthRequirement>,
        template: Template,
    ) -> Self {
        let ControllerRoute { method, template: _, auth, kind, wants_body, bind } = route;
        Self {
            method,
            template,
            auth: auth.or_else(|| default_auth.clone()),
            kind,
            wants_body,
            invoker: bind(Arc::clone(factory)),
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn auth_requirement(&self) -> Option<&AuthRequirement> {
        self.auth.as_ref()
    }

    pub fn return_kind(&self) -> ReturnKind {
        self.kind
    }

    pub fn wants_body(&self) -> bool {
        self.wants_body
    }

    pub(crate) fn invoke(
        &self,
        args: Args,
        body: Option<Value>,
    ) -> Result<HandlerOutcome, ContentError> {
        (self.invoker)(args, body)
    }
}

impl fmt::Display for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::Response;

    struct Probe;

    fn plain(_: &Probe, _: Args) -> HandlerResult {
        Ok(Response::text("ok"))
    }

    fn with_body(_: &Probe, _: Args, _: Value) -> HandlerResult {
        Ok(Response::text("ok"))
    }

    fn factory() -> Arc<dyn ControllerFactory<Probe>> {
        Arc::new(|| Arc::new(Probe))
    }

    #[test]
    fn binding_fixes_kind_and_body_appetite() {
        let sync = Route::get("/x").handle(plain);
        assert_eq!(sync.kind, ReturnKind::Immediate);
        assert!(!sync.wants_body);

        let body = Route::post("/x").handle_body(with_body);
        assert_eq!(body.kind, ReturnKind::Immediate);
        assert!(body.wants_body);
    }

    #[test]
    fn batch_default_auth_fills_unannotated_routes() {
        let template = Template::parse("/x").unwrap();
        let default = Some(AuthRequirement::authenticated());
        let entry = RouteEntry::erase(Route::get("/x").handle(plain), &factory(), &default, template);
        assert_eq!(entry.auth_requirement(), Some(&AuthRequirement::authenticated()));
    }

    #[test]
    fn route_auth_overrides_the_batch_default() {
        let template = Template::parse("/x").unwrap();
        let default = Some(AuthRequirement::authenticated());
        let route = Route::get("/x")
            .authorize(AuthRequirement::roles(["admin"]))
            .handle(plain);
        let entry = RouteEntry::erase(route, &factory(), &default, template);
        assert_eq!(
            entry.auth_requirement(),
            Some(&AuthRequirement::roles(["admin"]))
        );
    }

    #[test]
    fn body_routes_reject_a_missing_body() {
        let template = Template::parse("/x").unwrap();
        let route = Route::post("/x").handle_body(with_body);
        let entry = RouteEntry::erase(route, &factory(), &None, template);
        let err = entry.invoke(Args::new(Vec::new(), Vec::new()), None).unwrap_err();
        assert!(matches!(err, ContentError::MissingBody));
    }
}
