//! # ruta
//!
//! A typed request-routing and controller-dispatch core for Rust HTTP
//! services. Declare the whole route table up front; dispatch never
//! surprises you after that.
//!
//! ## The contract
//!
//! ruta owns the path from "bytes arrived" to "handler ran":
//!
//! - **Template matching** — `/items/{id:int}` against decoded path segments
//! - **Verb dispatch** — including the 400 / 405 distinction and `allow` headers
//! - **Typed extraction** — placeholders coerced to `int` / `float` / `bool` / `str`
//! - **Authorization** — declared per route or per controller, judged by your provider
//! - **Invocation** — sync or async controller methods, optional typed JSON body
//! - **Error mapping** — every failure becomes exactly one response, nothing escapes
//!
//! Everything else stays at the edges: hyper parses HTTP, a
//! [`ContentDecoder`] interprets bodies, an [`AuthorizationProvider`] judges
//! credentials, a [`ControllerFactory`] builds controller instances. The
//! route table is validated eagerly — a conflicting or malformed declaration
//! aborts startup instead of surfacing as a 500 in production.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use ruta::{Args, ControllerRoutes, Dispatcher, HandlerResult, Response, Route, RouteRegistry, Server};
//!
//! struct Items;
//!
//! impl Items {
//!     fn get_one(&self, args: Args) -> HandlerResult {
//!         let id = args.int("id")?;
//!         Ok(Response::json(format!(r#"{{"id":{id}}}"#).into_bytes()))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut registry = RouteRegistry::new();
//!     registry
//!         .register(
//!             ControllerRoutes::shared(Items)
//!                 .route(Route::get("/items/{id:int}").handle(Items::get_one)),
//!         )
//!         .unwrap();
//!
//!     Server::bind("0.0.0.0:3000")
//!         .serve(Dispatcher::new(registry))
//!         .await
//!         .unwrap();
//! }
//! ```

mod adapter;
mod auth;
mod content;
mod dispatcher;
mod error;
mod executor;
mod method;
mod params;
mod registry;
mod request;
mod response;
mod route;
mod server;
mod status;
mod template;
mod uri;

pub use adapter::{HandlerOutcome, HandlerResult, ResponseFuture, ReturnKind};
pub use auth::{AuthDecision, AuthRequirement, AuthorizationProvider};
pub use content::{ContentDecoder, JsonDecoder};
pub use dispatcher::{Dispatcher, ErrorHandler};
pub use error::{
    ContentError, ConversionError, DispatchError, ParseUriError, RegistrationError, ServerError,
    TemplateError,
};
pub use method::{AllowedMethods, Method};
pub use params::{ArgError, Args, ParamType, ParamValue};
pub use registry::RouteRegistry;
pub use request::Request;
pub use response::{ContentType, Response, ResponseBuilder};
pub use route::{ControllerFactory, ControllerRoute, ControllerRoutes, Route, RouteEntry};
pub use server::Server;
pub use status::Status;
pub use template::Template;
pub use uri::ParsedUri;
