//! Handler return plumbing.
//!
//! Handlers are either synchronous (value in hand) or asynchronous (future in
//! hand). Both funnel into [`HandlerOutcome`] at binding time and collapse at
//! a single await point during dispatch, so the rest of the pipeline never
//! branches on how the handler was written.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::response::Response;

/// What handlers return: a response, or a fault for the dispatcher to map.
pub type HandlerResult = Result<Response, anyhow::Error>;

/// A boxed future resolving to a [`HandlerResult`].
pub type ResponseFuture = Pin<Box<dyn Future<Output = HandlerResult> + Send + 'static>>;

/// How a route's handler produces its result.
///
/// Fixed when the handler is bound to the route, not inspected per request.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReturnKind {
    /// The handler returned a value directly.
    Immediate,
    /// The handler returned a future that must be awaited.
    Deferred,
}

/// One invocation's result, before the deferred case is awaited.
pub enum HandlerOutcome {
    Ready(HandlerResult),
    Pending(ResponseFuture),
}

// Not derivable: the pending future has no Debug of its own.
impl fmt::Debug for HandlerOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(result) => f.debug_tuple("Ready").field(result).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// Collapses an outcome into a plain result.
///
/// This is the pipeline's single await point. A future that resolves to an
/// error is indistinguishable from a synchronous failure from here on.
pub(crate) async fn resolve(outcome: HandlerOutcome) -> HandlerResult {
    match outcome {
        HandlerOutcome::Ready(result) => result,
        HandlerOutcome::Pending(future) => future.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ready_outcomes_pass_through() {
        let outcome = HandlerOutcome::Ready(Ok(Response::text("now")));
        let response = resolve(outcome).await.unwrap();
        assert_eq!(response.body(), b"now");
    }

    #[tokio::test]
    async fn pending_outcomes_are_awaited() {
        let outcome = HandlerOutcome::Pending(Box::pin(async { Ok(Response::text("later")) }));
        let response = resolve(outcome).await.unwrap();
        assert_eq!(response.body(), b"later");
    }

    #[tokio::test]
    async fn pending_failures_surface_like_ready_ones() {
        let outcome = HandlerOutcome::Pending(Box::pin(async {
            Err(anyhow::anyhow!("backend exploded"))
        }));
        let err = resolve(outcome).await.unwrap_err();
        assert_eq!(err.to_string(), "backend exploded");
    }

    #[test]
    fn outcome_debug_names_the_variant() {
        let ready = HandlerOutcome::Ready(Ok(Response::text("now")));
        assert!(format!("{ready:?}").starts_with("Ready"));

        let pending = HandlerOutcome::Pending(Box::pin(async { Ok(Response::text("later")) }));
        assert_eq!(format!("{pending:?}"), "Pending(..)");
    }
}
